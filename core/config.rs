use crate::error::{AppError, Result};
use crate::matcher::PatternSet;
use indexmap::{IndexMap, IndexSet};
use log;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "lightbundle.toml";
pub const DEFAULT_OUTPUT_FILENAME: &str = "LightingBundle.md";
pub const DEFAULT_PRIMARY_DIR: &str = "crates/geist-lighting";

static DEFAULT_SKIP_DIRS: Lazy<IndexSet<String>> = Lazy::new(|| {
    [
        ".git",
        "target",
        "old-codebase",
        "assets", // textures and palettes, no code
        "showcase_output",
        "schematics",
        "worlds",
        ".claude",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

static DEFAULT_LANGUAGES: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    [("rs", "rust"), ("toml", "toml"), ("ron", "ron")]
        .into_iter()
        .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
        .collect()
});

static DEFAULT_PATTERNS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        r"\bgeist_lighting\b",
        r"\bLighting(Store|Border|s|)\b",
        r"\bLight(Borders|Emitter|ing|)\b",
        r"\bRebuildCause::LightingBorder\b",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// Everything the pipeline needs to know about what to collect and where to
/// write it. Loaded once per run and never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Directory (relative to the repository root) whose eligible files are
    /// always bundled, without a content check.
    pub primary_dir: PathBuf,
    /// Bundle file name, written into the repository root.
    pub output_file: PathBuf,
    /// Directory names pruned from traversal at any depth.
    pub skip_dirs: IndexSet<String>,
    /// Extension (without the dot) to code fence language label. The keys
    /// are the universe of eligible extensions.
    pub languages: IndexMap<String, String>,
    /// Regular expressions; a file outside the primary directory qualifies
    /// if any of them matches its text.
    pub patterns: Vec<String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            primary_dir: PathBuf::from(DEFAULT_PRIMARY_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            skip_dirs: DEFAULT_SKIP_DIRS.clone(),
            languages: DEFAULT_LANGUAGES.clone(),
            patterns: DEFAULT_PATTERNS.clone(),
        }
    }
}

impl BundleConfig {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_to_resolve = match cli_project_root {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&PathBuf>,
    ) -> Result<Option<PathBuf>> {
        match cli_config_file {
            Some(p) => {
                let expanded = PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref());
                let path = if expanded.is_absolute() {
                    expanded
                } else {
                    project_root.join(expanded)
                };
                if !path.is_file() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.is_file() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let config = toml::from_str::<BundleConfig>(toml_content)
            .map_err(|e| AppError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the override file if there is one, otherwise the built-in defaults.
    pub fn load(project_root: &Path, cli_config_file: Option<&PathBuf>) -> Result<Self> {
        match Self::resolve_config_path(project_root, cli_config_file)? {
            Some(path) => Self::load_from_path(&path),
            None => {
                log::debug!("Using built-in configuration.");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_file.as_os_str().is_empty()
            || self.output_file.is_absolute()
            || has_parent_component(&self.output_file)
        {
            return Err(AppError::Config(format!(
                "output_file must be a relative file name, got '{}'",
                self.output_file.display()
            )));
        }
        if self.primary_dir.is_absolute() || has_parent_component(&self.primary_dir) {
            return Err(AppError::Config(format!(
                "primary_dir must be relative to the repository root, got '{}'",
                self.primary_dir.display()
            )));
        }
        if let Some(ext) = self.languages.keys().find(|ext| ext.starts_with('.')) {
            return Err(AppError::Config(format!(
                "language extensions are written without the leading dot, got '{}'",
                ext
            )));
        }
        Ok(())
    }

    pub fn compile_patterns(&self) -> Result<PatternSet> {
        PatternSet::compile(&self.patterns)
    }

    pub fn primary_dir_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.primary_dir)
    }

    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.output_file)
    }
}

fn has_parent_component(path: &Path) -> bool {
    path.components().any(|c| c == Component::ParentDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_lighting_layout() {
        let config = BundleConfig::default();
        assert_eq!(config.primary_dir, PathBuf::from("crates/geist-lighting"));
        assert_eq!(config.output_file, PathBuf::from("LightingBundle.md"));
        assert!(config.skip_dirs.contains("target"));
        assert!(config.skip_dirs.contains(".claude"));
        assert_eq!(config.languages.get("rs").map(String::as_str), Some("rust"));
        assert_eq!(config.languages.len(), 3);
        assert_eq!(config.patterns.len(), 4);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = BundleConfig::from_toml_str(
            r#"
            primary_dir = "crates/other"
            patterns = ['\bShadow\b']
            "#,
        )
        .unwrap();
        assert_eq!(config.primary_dir, PathBuf::from("crates/other"));
        assert_eq!(config.patterns, vec![r"\bShadow\b".to_string()]);
        assert_eq!(config.output_file, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        assert_eq!(config.skip_dirs, *DEFAULT_SKIP_DIRS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BundleConfig::from_toml_str("format = \"json\"").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn dotted_extensions_are_rejected() {
        let err = BundleConfig::from_toml_str("[languages]\n\".rs\" = \"rust\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn absolute_output_file_is_rejected() {
        let err = BundleConfig::from_toml_str("output_file = \"/tmp/out.md\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn paths_escaping_the_root_are_rejected() {
        for toml in [
            "output_file = \"../LightingBundle.md\"",
            "output_file = \"docs/../../out.md\"",
            "primary_dir = \"../elsewhere\"",
        ] {
            let err = BundleConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "accepted {toml}");
        }
    }

    #[test]
    fn compile_patterns_reports_bad_regex() {
        let config = BundleConfig {
            patterns: vec!["(unclosed".to_string()],
            ..BundleConfig::default()
        };
        assert!(matches!(
            config.compile_patterns().unwrap_err(),
            AppError::Pattern { .. }
        ));
        assert!(BundleConfig::default().compile_patterns().is_ok());
    }

    #[test]
    fn config_file_is_optional() {
        let tmp = tempdir().unwrap();
        assert_eq!(
            BundleConfig::resolve_config_path(tmp.path(), None).unwrap(),
            None
        );
        assert_eq!(
            BundleConfig::load(tmp.path(), None).unwrap(),
            BundleConfig::default()
        );
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILENAME),
            "output_file = \"Bundle.md\"\n",
        )
        .unwrap();
        let config = BundleConfig::load(tmp.path(), None).unwrap();
        assert_eq!(config.output_path(tmp.path()), tmp.path().join("Bundle.md"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = tempdir().unwrap();
        let missing = PathBuf::from("nope.toml");
        let err = BundleConfig::resolve_config_path(tmp.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn project_root_is_canonicalized() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("repo");
        fs::create_dir(&nested).unwrap();
        let given = nested.join("..").join("repo");
        let root = BundleConfig::determine_project_root(Some(&given)).unwrap();
        assert_eq!(root, nested.canonicalize().unwrap());
    }
}
