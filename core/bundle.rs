use crate::config::BundleConfig;
use crate::error::{AppError, Result};
use crate::filter;
use crate::gather;
use crate::matcher;
use chrono::{Local, NaiveDateTime};
use log;
use std::fs;
use std::path::{Path, PathBuf};

pub const BUNDLE_TITLE: &str = "# Lighting Code Bundle";
pub const BUNDLE_DESCRIPTION: &str =
    "This file aggregates lighting-related code for review and optimization.";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// Discovery came back empty. Nothing was written.
    NothingFound,
    Written {
        file_count: usize,
        output_path: PathBuf,
    },
}

/// Discovers the lighting files under `project_root` and writes the bundle.
/// The output file is only touched when at least one file qualifies.
pub fn generate_bundle(project_root: &Path, config: &BundleConfig) -> Result<BundleOutcome> {
    let patterns = config.compile_patterns()?;
    let files = gather::discover_files(project_root, config, &patterns)?;
    if files.is_empty() {
        log::info!("No files qualified for the bundle; leaving output untouched.");
        return Ok(BundleOutcome::NothingFound);
    }
    let output_path = write_bundle(&files, project_root, config)?;
    Ok(BundleOutcome::Written {
        file_count: files.len(),
        output_path,
    })
}

/// Renders and writes the bundle, replacing any previous one.
pub fn write_bundle(
    files: &[PathBuf],
    project_root: &Path,
    config: &BundleConfig,
) -> Result<PathBuf> {
    let generated = Local::now().naive_local();
    let content = render_bundle(files, project_root, config, &generated);
    let output_path = config.output_path(project_root);

    log::info!(
        "Writing bundle of {} files ({} bytes) to {}",
        files.len(),
        content.len(),
        output_path.display()
    );
    fs::write(&output_path, content).map_err(|e| AppError::FileWrite {
        path: output_path.clone(),
        source: e,
    })?;
    Ok(output_path)
}

pub fn render_bundle(
    files: &[PathBuf],
    project_root: &Path,
    config: &BundleConfig,
    generated: &NaiveDateTime,
) -> String {
    let rel_paths: Vec<String> = files
        .iter()
        .map(|path| {
            pathdiff::diff_paths(path, project_root)
                .unwrap_or_else(|| path.clone())
                .display()
                .to_string()
        })
        .collect();

    let mut lines: Vec<String> = vec![
        BUNDLE_TITLE.to_string(),
        String::new(),
        format!("Generated: {}", generated.format(TIMESTAMP_FORMAT)),
        format!("Repository: {}", project_root.display()),
        String::new(),
        BUNDLE_DESCRIPTION.to_string(),
        String::new(),
        "## Table of Contents".to_string(),
    ];
    for (i, rel_path) in rel_paths.iter().enumerate() {
        lines.push(format!("- [{}] (#file-{})", rel_path, i + 1));
    }
    lines.push(String::new());

    for (i, (rel_path, path)) in rel_paths.iter().zip(files).enumerate() {
        let (lang, content) = match matcher::read_text_lossy(path) {
            Ok(content) => (filter::language_for(path, config).unwrap_or(""), content),
            Err(e) => {
                log::warn!("Could not read {} while bundling: {}", path.display(), e);
                ("", format!("<Error reading file: {}>", e))
            }
        };
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push(format!("## {}", rel_path));
        lines.push(format!("<a id=\"file-{}\"></a>", i + 1));
        lines.push(String::new());
        lines.push(format!("```{}", lang));
        lines.push(content);
        lines.push("```".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap()
    }

    #[test]
    fn renders_exact_layout() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.rs"), "fn a() {}\n").unwrap();
        fs::write(root.join("Cargo.toml"), "[package]\n").unwrap();

        let files = vec![root.join("src/a.rs"), root.join("Cargo.toml")];
        let rendered = render_bundle(&files, root, &BundleConfig::default(), &fixed_time());

        let expected = format!(
            "# Lighting Code Bundle\n\
             \n\
             Generated: 2024-01-15T12:30:05\n\
             Repository: {root}\n\
             \n\
             This file aggregates lighting-related code for review and optimization.\n\
             \n\
             ## Table of Contents\n\
             - [{a}] (#file-1)\n\
             - [Cargo.toml] (#file-2)\n\
             \n\
             ---\n\
             \n\
             ## {a}\n\
             <a id=\"file-1\"></a>\n\
             \n\
             ```rust\n\
             fn a() {{}}\n\
             \n\
             ```\n\
             \n\
             ---\n\
             \n\
             ## Cargo.toml\n\
             <a id=\"file-2\"></a>\n\
             \n\
             ```toml\n\
             [package]\n\
             \n\
             ```\n",
            root = root.display(),
            a = Path::new("src").join("a.rs").display(),
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn unreadable_file_gets_placeholder_and_no_language() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let gone = root.join("gone.rs");

        let rendered = render_bundle(&[gone], root, &BundleConfig::default(), &fixed_time());
        assert!(rendered.contains("## gone.rs\n<a id=\"file-1\"></a>\n\n```\n<Error reading file: "));
        assert!(!rendered.contains("```rust"));
    }

    #[test]
    fn write_overwrites_previous_bundle() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let config = BundleConfig::default();
        fs::write(root.join("a.rs"), "struct Lighting;\n").unwrap();
        fs::write(config.output_path(root), "stale contents").unwrap();

        let output = write_bundle(&[root.join("a.rs")], root, &config).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with(BUNDLE_TITLE));
        assert!(!written.contains("stale contents"));
    }

    #[test]
    fn write_failure_is_reported() {
        let tmp = tempdir().unwrap();
        let config = BundleConfig {
            output_file: PathBuf::from("missing-dir/LightingBundle.md"),
            ..BundleConfig::default()
        };
        let err = write_bundle(&[], tmp.path(), &config).unwrap_err();
        assert!(matches!(err, AppError::FileWrite { .. }));
    }
}
