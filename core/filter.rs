//! Path predicates used to prune traversal and pick candidate files.

use crate::config::BundleConfig;
use std::path::{Component, Path};

/// True if any component of `relative_path` is a skip-listed directory name.
///
/// Callers pass paths relative to the repository root, so directories above
/// the root never cause a prune.
pub fn is_skipped_directory(relative_path: &Path, config: &BundleConfig) -> bool {
    relative_path.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| config.skip_dirs.contains(name)),
        _ => false,
    })
}

pub fn is_eligible_extension(path: &Path, config: &BundleConfig) -> bool {
    language_for(path, config).is_some()
}

/// Code fence label for `path`, or `None` if its extension is not in scope.
pub fn language_for<'a>(path: &Path, config: &'a BundleConfig) -> Option<&'a str> {
    let ext = path.extension()?.to_str()?;
    config.languages.get(ext).map(String::as_str)
}
