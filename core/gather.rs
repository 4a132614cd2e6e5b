use crate::config::BundleConfig;
use crate::error::{AppError, Result};
use crate::filter;
use crate::matcher::{self, PatternSet};
use log;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects the files that go into the bundle.
///
/// Every eligible file under the primary directory is taken as is. The rest
/// of the tree, minus skip-listed directories, contributes only files whose
/// text matches one of the patterns. The result holds no duplicates and
/// primary-directory files come first.
pub fn discover_files(
    project_root: &Path,
    config: &BundleConfig,
    patterns: &PatternSet,
) -> Result<Vec<PathBuf>> {
    log::debug!("Starting file discovery in {}", project_root.display());
    let primary_dir = config.primary_dir_path(project_root);

    let mut files = gather_primary_files(project_root, &primary_dir, config)?;
    let primary_count = files.len();
    log::info!(
        "Included {} files from primary directory {}",
        primary_count,
        primary_dir.display()
    );

    files.extend(gather_matching_files(
        project_root,
        &primary_dir,
        config,
        patterns,
    )?);
    log::info!(
        "Found {} content matches outside the primary directory.",
        files.len() - primary_count
    );

    let ordered = dedup_preserving_order(files);
    log::debug!("Discovery complete: {} unique files.", ordered.len());
    Ok(ordered)
}

fn gather_primary_files(
    project_root: &Path,
    primary_dir: &Path,
    config: &BundleConfig,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !primary_dir.exists() {
        log::debug!(
            "Primary directory not present, skipping: {}",
            primary_dir.display()
        );
        return Ok(files);
    }

    let mut walker = WalkDir::new(primary_dir).sort_by_file_name().into_iter();
    while let Some(entry_result) = walker.next() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(AppError::from(e)),
            Err(e) => {
                log::warn!("Error walking primary directory: {}", e);
                continue;
            }
        };
        let path = entry.path();

        if entry.file_type().is_dir() {
            let relative_path = pathdiff::diff_paths(path, project_root)
                .unwrap_or_else(|| path.to_path_buf());
            if filter::is_skipped_directory(&relative_path, config) {
                log::trace!("Pruning skip-listed directory: {}", relative_path.display());
                walker.skip_current_dir();
            }
            continue;
        }

        if path.is_file() && filter::is_eligible_extension(path, config) {
            log::trace!("Including primary file: {}", path.display());
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn gather_matching_files(
    project_root: &Path,
    primary_dir: &Path,
    config: &BundleConfig,
    patterns: &PatternSet,
) -> Result<Vec<PathBuf>> {
    let output_path = config.output_path(project_root);
    let mut files = Vec::new();
    let mut walker = WalkDir::new(project_root).sort_by_file_name().into_iter();

    log::debug!("Scanning repository for content matches...");
    while let Some(entry_result) = walker.next() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(AppError::from(e)),
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        let path = entry.path();

        if entry.file_type().is_dir() {
            let relative_path = pathdiff::diff_paths(path, project_root)
                .unwrap_or_else(|| path.to_path_buf());
            if filter::is_skipped_directory(&relative_path, config) {
                log::trace!("Pruning skip-listed directory: {}", relative_path.display());
                walker.skip_current_dir();
            } else if path.starts_with(primary_dir) {
                log::trace!("Primary directory already gathered: {}", path.display());
                walker.skip_current_dir();
            }
            continue;
        }

        if path == output_path.as_path() {
            log::trace!("Skipping previous bundle output: {}", path.display());
            continue;
        }
        if filter::is_eligible_extension(path, config)
            && matcher::matches_content(path, config, patterns)
        {
            log::trace!("Including matching file: {}", path.display());
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Drops later occurrences of a file already seen, comparing resolved paths.
fn dedup_preserving_order(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|path| {
            let key = path.canonicalize().unwrap_or_else(|_| path.clone());
            seen.insert(key)
        })
        .collect()
}
