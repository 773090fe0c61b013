//! The category → entries mapping of an `[Unreleased]` section.
//!
//! An [`Unreleased`] is built from a parsed [`MarkdownTree`], merged with another one, and
//! rendered back to Markdown through its [`Display`](fmt::Display) implementation.

use std::{borrow::Cow, collections::BTreeMap, fmt};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::entry::{ChangeEntry, change_list};
use crate::parse::{MarkdownNode, MarkdownTree};

/// Key of the unreleased section in a parsed changelog.
pub const UNRELEASED_KEY: &str = "[Unreleased]";

/// Change entries of an unreleased section, grouped by category.
///
/// Categories are kept in a sorted map, so rendering always lists them alphabetically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unreleased<'a> {
  pub categories: BTreeMap<Cow<'a, str>, Vec<ChangeEntry<'a>>>,
}

impl<'a> Unreleased<'a> {
  /// Locates the unreleased section under `title` and normalizes its categories.
  pub fn extract(tree: &'a MarkdownTree<'_>, title: &str) -> Result<Self, UnreleasedError> {
    locate(tree, title).map(Self::from_section)
  }

  /// Builds the mapping from the category sub-headings of an unreleased section.
  ///
  /// A category heading that appears more than once contributes all of its entries.
  pub fn from_section(section: &'a MarkdownNode<'_>) -> Self {
    let mut unreleased = Self::default();

    for (category, node) in section.children() {
      let entries = change_list(node.raw());

      #[cfg(feature = "tracing")]
      trace!("Category {} has {} entries", category, entries.len());

      unreleased
        .categories
        .entry(category.clone())
        .or_default()
        .extend(entries);
    }

    unreleased
  }

  /// Merges `incoming` into `base`.
  ///
  /// Every category of either side is kept. Within a category the base entries come first,
  /// followed by incoming entries the base does not contain, in their original order.
  pub fn merge(incoming: Self, base: Self) -> Self {
    #[cfg(feature = "tracing")]
    debug!(
      "Merging {} incoming categories into {} base categories",
      incoming.categories.len(),
      base.categories.len()
    );

    let mut merged = base;

    for (category, entries) in incoming.categories {
      let target = merged.categories.entry(category).or_default();
      let base_len = target.len();

      for entry in entries {
        if !target[..base_len].contains(&entry) {
          #[cfg(feature = "tracing")]
          trace!("Appending {}", entry);

          target.push(entry);
        }
      }
    }

    merged
  }

  /// Entries of `category`, if present.
  pub fn get(&self, category: &str) -> Option<&[ChangeEntry<'a>]> {
    self.categories.get(category).map(Vec::as_slice)
  }

  /// True when no category is present.
  pub fn is_empty(&self) -> bool {
    self.categories.is_empty()
  }
}

/// Renders `## [Unreleased]`, then each category as a `###` heading with its entries,
/// separated by blank lines. An empty mapping renders as `## [Unreleased]\n` alone.
impl fmt::Display for Unreleased<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "## {}", UNRELEASED_KEY)?;

    for (index, (category, entries)) in self.categories.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      writeln!(f)?;
      writeln!(f, "### {}", category)?;
      for entry in entries {
        writeln!(f, "{}", entry)?;
      }
    }

    Ok(())
  }
}

/// Finds the `[Unreleased]` node under the root heading `title`.
pub fn locate<'t, 'a>(tree: &'t MarkdownTree<'a>, title: &str) -> Result<&'t MarkdownNode<'a>, UnreleasedError> {
  tree
    .get(title)
    .and_then(|root| {
      root
        .children()
        .iter()
        .find_map(|(key, node)| key.eq_ignore_ascii_case(UNRELEASED_KEY).then_some(node))
    })
    .ok_or_else(|| UnreleasedError::MissingSection(title.to_string()))
}

/// Errors raised while reading an unreleased section.
#[derive(Debug, thiserror::Error)]
pub enum UnreleasedError {
  /// No `[Unreleased]` heading under the given title
  #[error("Cannot find Unreleased section under \"{0}\"")]
  MissingSection(String),
}
