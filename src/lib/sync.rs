//! Changelog merging over files.
//!
//! This module reads two changelogs, merges the `[Unreleased]` section of the source into
//! the one of the destination, and writes the spliced destination to an output file or
//! stdout.
//!
//! # Merge Logic
//!
//! The merge process:
//! 1. Parses both changelogs and locates `[Unreleased]` under the configured title
//! 2. For each category found in either changelog:
//!    - Keeps the destination entries in their order
//!    - Appends source entries the destination does not have yet
//! 3. Replaces the destination's unreleased section with the merged one, leaving the
//!    rest of the destination untouched
//!
//! # Examples
//!
//! ```rust,no_run
//! use unreleased_merge::sync::{ChangelogSync, ChangelogSyncOptions};
//! use std::path::PathBuf;
//!
//! let options = ChangelogSyncOptions {
//!     source_file: PathBuf::from("CHANGELOG.md"),
//!     destination_file: PathBuf::from("CHANGELOG.md.remote"),
//!     output_file: None,
//!     title: "Changelog".to_string(),
//! };
//!
//! ChangelogSync::sync_with_options(options).unwrap();
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::parse::MarkdownTree;
use crate::splice::splice;
use crate::unreleased::{Unreleased, UnreleasedError};

pub const DEFAULT_SOURCE_FILENAME: &str = "CHANGELOG.md";
pub const DEFAULT_DESTINATION_FILENAME: &str = "CHANGELOG.md.remote";
pub const DEFAULT_TITLE: &str = "Changelog";

/// Main merging service for changelog files.
pub struct ChangelogSync;

impl ChangelogSync {
  /// Merges changelog files using the provided options.
  ///
  /// Writes to `output_file` when set, to stdout otherwise.
  pub fn sync_with_options(options: ChangelogSyncOptions) -> Result<(), ChangelogSyncError> {
    #[cfg(feature = "tracing")]
    info!("Starting changelog merge");

    let ChangelogSyncOptions {
      source_file,
      destination_file,
      output_file,
      title,
    } = options;

    #[cfg(feature = "tracing")]
    debug!(?source_file, ?destination_file, ?output_file, "Resolved file paths");

    if !source_file.exists() {
      return Err(ChangelogSyncError::SourceNotFound(source_file));
    }
    if !destination_file.exists() {
      return Err(ChangelogSyncError::DestinationNotFound(destination_file));
    }

    let source = std::fs::read_to_string(&source_file).map_err(ChangelogSyncError::SourceIo)?;
    let destination =
      std::fs::read_to_string(&destination_file).map_err(ChangelogSyncError::DestinationIo)?;

    let merged = Self::merge_documents(&source, &destination, &title)?;

    match output_file {
      Some(path) => Self::write_output(&merged, path),
      None => std::io::stdout()
        .lock()
        .write_all(merged.as_bytes())
        .map_err(ChangelogSyncError::Write),
    }
  }

  /// Merges the unreleased section of `source` into `destination` and returns the
  /// spliced destination text.
  pub fn merge_documents(
    source: &str,
    destination: &str,
    title: &str,
  ) -> Result<String, ChangelogSyncError> {
    let source_tree = MarkdownTree::from(source);
    let destination_tree = MarkdownTree::from(destination);

    let incoming =
      Unreleased::extract(&source_tree, title).map_err(ChangelogSyncError::SourceSection)?;
    let base = Unreleased::extract(&destination_tree, title)
      .map_err(ChangelogSyncError::DestinationSection)?;

    #[cfg(feature = "tracing")]
    debug!(
      "Source has {} categories, destination has {}",
      incoming.categories.len(),
      base.categories.len()
    );

    let merged = Unreleased::merge(incoming, base);

    Ok(splice(destination, &merged).into_owned())
  }

  fn write_output<P: AsRef<Path>>(content: &str, output_path: P) -> Result<(), ChangelogSyncError> {
    #[cfg(feature = "tracing")]
    debug!("Writing merged changelog to {:?}", output_path.as_ref());

    std::fs::write(output_path, content).map_err(ChangelogSyncError::Write)?;

    #[cfg(feature = "tracing")]
    info!("Merge completed successfully");

    Ok(())
  }
}

/// Errors that can occur while merging changelog files.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogSyncError {
  /// Error reading the source changelog
  #[error("Source changelog IO error: {0}")]
  SourceIo(std::io::Error),
  /// Source changelog has no unreleased section
  #[error("Source changelog: {0}")]
  SourceSection(UnreleasedError),
  /// Error reading the destination changelog
  #[error("Destination changelog IO error: {0}")]
  DestinationIo(std::io::Error),
  /// Destination changelog has no unreleased section
  #[error("Destination changelog: {0}")]
  DestinationSection(UnreleasedError),
  /// Error writing the merged changelog
  #[error("Write error: {0}")]
  Write(std::io::Error),
  /// Source changelog does not exist
  #[error("Source changelog not found: {0}")]
  SourceNotFound(PathBuf),
  /// Destination changelog does not exist
  #[error("Destination changelog not found: {0}")]
  DestinationNotFound(PathBuf),
}

/// Configuration options for merging changelog files.
#[derive(Debug, Clone)]
pub struct ChangelogSyncOptions {
  /// Changelog whose unreleased entries are merged in, usually the feature branch.
  pub source_file: PathBuf,
  /// Changelog that receives the merged section, usually the main branch.
  pub destination_file: PathBuf,
  /// Where to write the result. If None, the result goes to stdout.
  pub output_file: Option<PathBuf>,
  /// Top-level heading the unreleased section lives under.
  pub title: String,
}

impl Default for ChangelogSyncOptions {
  fn default() -> Self {
    Self {
      source_file: PathBuf::from(DEFAULT_SOURCE_FILENAME),
      destination_file: PathBuf::from(DEFAULT_DESTINATION_FILENAME),
      output_file: None,
      title: DEFAULT_TITLE.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FEATURE: &str = "# Changelog

## [Unreleased]

### Added
- Test 1
- Test 4 added in local branch

### Fixed
-Fixed the ABC bug preventing login.

## [1.0.0] - 2017-06-20
";

  const MAIN: &str = "# Changelog

## [Unreleased]

### Added
- Test 1
  - Test 2

## [1.0.0] - 2017-06-20

### Added
- Release entry
";

  #[test]
  fn test_merge_documents() {
    let merged = ChangelogSync::merge_documents(FEATURE, MAIN, DEFAULT_TITLE).unwrap();

    assert_eq!(
      merged,
      "# Changelog

## [Unreleased]

### Added
- Test 1
- Test 2
- Test 4 added in local branch

### Fixed
- Fixed the ABC bug preventing login.

## [1.0.0] - 2017-06-20

### Added
- Release entry
"
    );
  }

  #[test]
  fn test_merge_documents_keeps_heading_like_and_dashed_entries() {
    let source = "# Changelog\n\n## [Unreleased]\n\n### Added\n- # of retries configurable\n- --dry-run flag added\n\n## [1.0.0]\n";
    let destination = "# Changelog\n\n## [Unreleased]\n\n### Added\n- Other\n\n## [1.0.0]\n";

    let merged = ChangelogSync::merge_documents(source, destination, DEFAULT_TITLE).unwrap();

    assert_eq!(
      merged,
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- Other\n- # of retries configurable\n- --dry-run flag added\n\n## [1.0.0]\n"
    );
  }

  #[test]
  fn test_merge_documents_missing_destination_section() {
    let destination = "# Changelog\n\n## [1.0.0] - 2017-06-20\n";

    match ChangelogSync::merge_documents(FEATURE, destination, DEFAULT_TITLE) {
      Err(ChangelogSyncError::DestinationSection(UnreleasedError::MissingSection(title))) => {
        assert_eq!(title, DEFAULT_TITLE)
      }
      other => panic!("Expected DestinationSection error, got {:?}", other),
    }
  }

  #[test]
  fn test_merge_documents_wrong_title() {
    let result = ChangelogSync::merge_documents(FEATURE, MAIN, "Release Notes");

    assert!(matches!(result, Err(ChangelogSyncError::SourceSection(_))));
  }

  #[test]
  fn test_source_not_found() {
    let options = ChangelogSyncOptions {
      source_file: PathBuf::from("nonexistent.CHANGELOG.md"),
      ..ChangelogSyncOptions::default()
    };

    let result = ChangelogSync::sync_with_options(options);
    assert!(result.is_err());

    match result.unwrap_err() {
      ChangelogSyncError::SourceNotFound(path) => {
        assert_eq!(path, PathBuf::from("nonexistent.CHANGELOG.md"));
      }
      _ => panic!("Expected SourceNotFound error"),
    }
  }
}
