use crate::config::BundleConfig;
use crate::error::{AppError, Result};
use crate::filter;
use log;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

/// The compiled heuristic patterns, in configuration order.
#[derive(Debug, Clone)]
pub struct PatternSet {
    regexes: Vec<Regex>,
}

impl PatternSet {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let regexes = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| AppError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::trace!("Compiled {} content patterns.", regexes.len());
        Ok(PatternSet { regexes })
    }

    /// Index of the first pattern that matches anywhere in `text`.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.regexes.iter().position(|rx| rx.is_match(text))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }
}

/// Reads a whole file as text. Invalid UTF-8 sequences become U+FFFD instead
/// of failing the read.
pub fn read_text_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Whether `path` is an eligible regular file whose text matches any pattern.
/// Read errors count as no match.
pub fn matches_content(path: &Path, config: &BundleConfig, patterns: &PatternSet) -> bool {
    if !path.is_file() || !filter::is_eligible_extension(path, config) {
        return false;
    }
    let text = match read_text_lossy(path) {
        Ok(text) => text,
        Err(e) => {
            log::debug!(
                "Treating unreadable file as non-matching: {} ({})",
                path.display(),
                e
            );
            return false;
        }
    };
    match patterns.first_match(&text) {
        Some(index) => {
            log::trace!(
                "Content match in {} (pattern {:?})",
                path.display(),
                config.patterns.get(index)
            );
            true
        }
        None => false,
    }
}
