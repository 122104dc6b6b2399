//! bucket-listing - browsable directory listings for flat object-storage buckets.
//!
//! The library fetches a bucket's complete object list, folds the keys into
//! a pseudo-directory tree, collapses version-named release directories to
//! their newest entry, and offers search and "recently modified" views over
//! the flat list. Rendering is left to the optional `cli` and `web` front ends.
//!
//! # Example
//!
//! ```no_run
//! use bucket_listing::{ListingConfig, NoProgress, Session};
//!
//! # async fn example() -> bucket_listing::Result<()> {
//! let config = ListingConfig::new("archive.example.net");
//! let session = Session::fetch(&config, &NoProgress).await?;
//!
//! println!("{}: {} files", session.title(), session.files().len());
//! for file in session.recent() {
//!     println!("{}", file.path);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod collapse;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod listing;
pub mod session;
pub mod tree;
pub mod views;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "web")]
pub mod server;

// Re-export main types for convenience
pub use collapse::{CollapsePlan, collapse_releases, is_release_name};
pub use config::{AppConfig, ListingConfig, ServerConfig};
pub use error::{Error, Result};
pub use extract::{FileRecord, extract_files};
pub use fetch::{FetchProgress, HttpListingSource, ListingSource, NoProgress, fetch_all_objects};
pub use format::{format_age, format_size};
pub use listing::{ListingPage, RawObject, parse_page};
pub use session::Session;
pub use tree::{NodeId, NodeView, Tree, TreeNode, build_tree};
pub use views::{recent, search};
