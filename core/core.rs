pub mod bundle;
pub mod config;
pub mod error;
pub mod filter;
pub mod gather;
pub mod matcher;

pub use bundle::{BundleOutcome, generate_bundle, render_bundle, write_bundle};
pub use config::BundleConfig;
pub use error::{AppError, Result};
pub use filter::{is_eligible_extension, is_skipped_directory, language_for};
pub use gather::discover_files;
pub use matcher::{PatternSet, matches_content, read_text_lossy};
