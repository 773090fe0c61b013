//! Keep-a-Changelog `[Unreleased]` section merging library.
//!
//! This library merges the unreleased change entries of two changelogs, typically a
//! feature branch and the main branch, and writes the result back into one of them. It's
//! designed for resolving changelog merge conflicts without hand edits.
//!
//! # Features
//!
//! - **Borrowed parsing**: Headings and canonical entries borrow from the input via `Cow<str>`
//! - **Entry normalization**: Bullet lines are cleaned to the `- ` marker before comparing
//! - **Union merge**: Categories from both sides are kept, duplicate entries collapse
//! - **Surgical splicing**: Only the unreleased section of the target text changes
//! - **Optional tracing**: Detailed logging when the `tracing` feature is enabled
//!
//! # Example
//!
//! ```rust
//! use unreleased_merge::parse::MarkdownTree;
//! use unreleased_merge::splice::splice;
//! use unreleased_merge::unreleased::Unreleased;
//!
//! let feature = "# Changelog\n\n## [Unreleased]\n\n### Added\n- old\n- new\n\n## [1.0.0]\n";
//! let base = "# Changelog\n\n## [Unreleased]\n\n### Added\n- old\n\n## [1.0.0]\n";
//!
//! let feature_tree = MarkdownTree::from(feature);
//! let base_tree = MarkdownTree::from(base);
//!
//! let merged = Unreleased::merge(
//!     Unreleased::extract(&feature_tree, "Changelog").unwrap(),
//!     Unreleased::extract(&base_tree, "Changelog").unwrap(),
//! );
//!
//! assert_eq!(
//!     splice(base, &merged),
//!     "# Changelog\n\n## [Unreleased]\n\n### Added\n- old\n- new\n\n## [1.0.0]\n"
//! );
//! ```

pub mod entry;
pub mod parse;
pub mod splice;
pub mod sync;
pub mod unreleased;
