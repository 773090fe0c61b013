use std::{borrow::Cow, fmt};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Marker every normalized entry starts with.
pub const ENTRY_MARKER: &str = "- ";

/// One bullet line of a changelog category, always starting with [`ENTRY_MARKER`].
///
/// Lines that are already canonical are borrowed; anything else is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEntry<'a>(Cow<'a, str>);

impl<'a> ChangeEntry<'a> {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Text after the marker.
  pub fn content(&self) -> &str {
    self.0.strip_prefix(ENTRY_MARKER).unwrap_or(&self.0)
  }
}

impl<'a> From<&'a str> for ChangeEntry<'a> {
  fn from(line: &'a str) -> Self {
    let line = line.trim_end();
    let unindented = line.trim_start();
    let content = unindented
      .strip_prefix('-')
      .map_or(unindented, str::trim_start);

    if line.strip_prefix(ENTRY_MARKER) == Some(content) {
      return ChangeEntry(Cow::Borrowed(line));
    }

    #[cfg(feature = "tracing")]
    trace!("Normalizing entry: {:?}", line);

    ChangeEntry(Cow::Owned(format!("{ENTRY_MARKER}{content}")))
  }
}

impl From<String> for ChangeEntry<'_> {
  fn from(line: String) -> Self {
    match ChangeEntry::from(line.as_str()) {
      ChangeEntry(Cow::Borrowed(_)) => ChangeEntry(Cow::Owned(line.trim_end().to_string())),
      ChangeEntry(Cow::Owned(cleaned)) => ChangeEntry(Cow::Owned(cleaned)),
    }
  }
}

impl fmt::Display for ChangeEntry<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl PartialEq<str> for ChangeEntry<'_> {
  fn eq(&self, other: &str) -> bool {
    self.0 == other
  }
}

impl PartialEq<&str> for ChangeEntry<'_> {
  fn eq(&self, other: &&str) -> bool {
    self.0 == *other
  }
}

/// Splits the body of a category heading into normalized entries, skipping blank lines.
pub fn change_list(raw: &str) -> Vec<ChangeEntry<'_>> {
  raw
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(ChangeEntry::from)
    .collect()
}
