//! Replaces the `[Unreleased]` section of a changelog with a rendered [`Unreleased`].
//!
//! The section starts at the first line reading `## [Unreleased]` (case-insensitive) and ends
//! right before the next `## [` version heading. Without a following version heading it ends
//! at the first link reference definition (`[label]: target`) or at the end of the document.
//! Everything outside that span is copied byte for byte.

use std::{borrow::Cow, ops::Range};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::unreleased::Unreleased;

const SECTION_PREFIX: &str = "##";
const UNRELEASED_TITLE: &str = "unreleased]";

/// Substitutes the unreleased section of `document` with `unreleased`.
///
/// Returns the document untouched when it has no unreleased heading.
pub fn splice<'d>(document: &'d str, unreleased: &Unreleased<'_>) -> Cow<'d, str> {
  let Some(span) = unreleased_span(document) else {
    #[cfg(feature = "tracing")]
    debug!("No unreleased heading found, leaving document unchanged");

    return Cow::Borrowed(document);
  };

  #[cfg(feature = "tracing")]
  debug!("Replacing unreleased section at bytes {:?}", span);

  let rendered = unreleased.to_string();
  let mut spliced = String::with_capacity(document.len() + rendered.len());
  spliced.push_str(&document[..span.start]);
  spliced.push_str(&rendered);
  if span.end < document.len() {
    spliced.push('\n');
    spliced.push_str(&document[span.end..]);
  }

  Cow::Owned(spliced)
}

fn unreleased_span(document: &str) -> Option<Range<usize>> {
  let mut lines = document
    .split_inclusive('\n')
    .scan(0, |offset, line| {
      let start = *offset;
      *offset += line.len();
      Some((start, line))
    });

  let (start, _) = lines.find(|(_, line)| is_unreleased_heading(line))?;

  let mut footer = None;
  for (offset, line) in lines {
    if version_title(line).is_some() {
      return Some(start..offset);
    }
    if footer.is_none() && is_link_definition(line) {
      footer = Some(offset);
    }
  }

  Some(start..footer.unwrap_or(document.len()))
}

/// Text following `## [` on a version heading line.
fn version_title(line: &str) -> Option<&str> {
  let rest = line.strip_prefix(SECTION_PREFIX)?;
  let title = rest.trim_start();
  if title.len() == rest.len() {
    return None;
  }
  title.strip_prefix('[')
}

fn is_unreleased_heading(line: &str) -> bool {
  version_title(line)
    .and_then(|title| title.get(..UNRELEASED_TITLE.len()))
    .is_some_and(|title| title.eq_ignore_ascii_case(UNRELEASED_TITLE))
}

fn is_link_definition(line: &str) -> bool {
  line
    .trim_start()
    .strip_prefix('[')
    .and_then(|rest| rest.split_once("]:"))
    .is_some_and(|(label, _)| !label.is_empty() && !label.contains(']'))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::ChangeEntry;

  fn mapping<'a>(categories: &[(&'a str, &[&'a str])]) -> Unreleased<'a> {
    Unreleased {
      categories: categories
        .iter()
        .map(|(category, entries)| {
          (
            Cow::Borrowed(*category),
            entries.iter().map(|e| ChangeEntry::from(*e)).collect(),
          )
        })
        .collect(),
    }
  }

  #[test]
  fn test_splice_appends_entry() {
    let document = "# Changelog\n\n## [Unreleased]\n\n### Added\n- old\n\n## [1.0.0] - date\n\n### Fixed\n- kept\n";
    let merged = mapping(&[("Added", &["- old", "- new"])]);

    assert_eq!(
      splice(document, &merged),
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- old\n- new\n\n## [1.0.0] - date\n\n### Fixed\n- kept\n"
    );
  }

  #[test]
  fn test_splice_empty_section() {
    let document = "# Changelog\n\n## [Unreleased]\n\n## [1.0.0] - 2017-06-20\n### Added\n- Release\n";
    let merged = mapping(&[
      ("Removed", &["- Four", "- Five", "- Six"]),
      ("Added", &["- One"]),
      ("Changed", &["- Two", "- Three"]),
    ]);

    assert_eq!(
      splice(document, &merged),
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- One\n\n### Changed\n- Two\n- Three\n\n### Removed\n- Four\n- Five\n- Six\n\n## [1.0.0] - 2017-06-20\n### Added\n- Release\n"
    );
  }

  #[test]
  fn test_splice_without_unreleased_is_noop() {
    let document = "# Changelog\n\n## [1.0.0] - 2017-06-20\n### Added\n- Release\n";
    let spliced = splice(document, &mapping(&[("Added", &["- New"])]));

    assert!(matches!(spliced, Cow::Borrowed(_)));
    assert_eq!(spliced, document);
  }

  #[test]
  fn test_splice_preserves_surrounding_bytes() {
    let before = "# Changelog\r\n\r\nSome *intro*  \r\n\r\n";
    let after = "## [0.1.0]\r\n### Fixed\r\n-   odd   spacing\r\n";
    let document = format!("{before}## [Unreleased] - pending\n### Added\n- x\n\n{after}");

    let spliced = splice(&document, &mapping(&[("Added", &["- x", "- y"])]));

    assert!(spliced.starts_with(before));
    assert!(spliced.ends_with(&format!("\n\n{after}")));
  }

  #[test]
  fn test_splice_matches_case_insensitively() {
    let document = "## [unreleased]\n### Added\n- a\n## [1.0.0]\n";

    assert_eq!(
      splice(document, &mapping(&[("Added", &["- a", "- b"])])),
      "## [Unreleased]\n\n### Added\n- a\n- b\n\n## [1.0.0]\n"
    );
  }

  #[test]
  fn test_splice_ignores_deeper_bracket_headings() {
    let document = "## [Unreleased]\n### [Scoped]\n- a\n## [1.0.0]\n";

    assert_eq!(
      splice(document, &mapping(&[("[Scoped]", &["- a"])])),
      "## [Unreleased]\n\n### [Scoped]\n- a\n\n## [1.0.0]\n"
    );
  }

  #[test]
  fn test_splice_last_section_runs_to_end() {
    let document = "# Changelog\n\n## [Unreleased]\n### Added\n- a\n";

    assert_eq!(
      splice(document, &mapping(&[("Added", &["- a", "- b"])])),
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- a\n- b\n"
    );
  }

  #[test]
  fn test_splice_last_section_keeps_link_footer() {
    let document = "# Changelog\n\n## [Unreleased]\n### Added\n- a\n\n[Unreleased]: https://example.com/compare/v1.0.0...HEAD\n";

    assert_eq!(
      splice(document, &mapping(&[("Added", &["- a", "- b"])])),
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- a\n- b\n\n[Unreleased]: https://example.com/compare/v1.0.0...HEAD\n"
    );
  }

  #[test]
  fn test_version_title() {
    assert_eq!(version_title("## [1.0.0] - date\n"), Some("1.0.0] - date\n"));
    assert_eq!(version_title("##\t[Unreleased]"), Some("Unreleased]"));
    assert_eq!(version_title("##[1.0.0]"), None);
    assert_eq!(version_title("### [1.0.0]"), None);
    assert_eq!(version_title("## Notes"), None);
  }

  #[test]
  fn test_is_link_definition() {
    assert!(is_link_definition("[Unreleased]: https://example.com\n"));
    assert!(is_link_definition("[1.0.0]: https://example.com"));
    assert!(!is_link_definition("- [link](https://example.com): text"));
    assert!(!is_link_definition("[]: nothing"));
  }
}
