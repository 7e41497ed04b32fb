//! Job description index — discovers JD files at startup and keys them by position.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::documents::extract_text;

/// Mapping from position label to full JD text. Built once at startup;
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct JobDescriptionIndex {
    positions: HashMap<String, String>,
}

impl JobDescriptionIndex {
    /// Scans `dir` for JD documents and extracts their text.
    /// Files that fail extraction are logged and skipped — a bad JD file must
    /// not prevent the service from starting.
    pub fn load(dir: &Path) -> Self {
        let mut positions = HashMap::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("JD directory {} not readable: {e}", dir.display());
                return Self { positions };
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = position_key(filename);
            match extract_text(&path) {
                Ok(text) => {
                    positions.insert(key, text);
                }
                Err(e) => warn!("Skipping JD file {}: {e}", path.display()),
            }
        }

        info!("Loaded {} job descriptions from {}", positions.len(), dir.display());
        Self { positions }
    }

    pub fn lookup(&self, position: &str) -> Option<&str> {
        self.positions.get(position).map(String::as_str)
    }

    pub fn position_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.positions.keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[cfg(test)]
    pub fn from_map(positions: HashMap<String, String>) -> Self {
        Self { positions }
    }
}

/// Derives the position label from a JD filename.
///
/// Files follow the `<Position>_<company>_JD.<ext>` convention; the trailing
/// company/JD segments are dropped. Anything else keys by filename stem.
pub fn position_key(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);

    if stem.contains("JD") || stem.to_ascii_lowercase().contains("talenscout") {
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() > 2 {
            return parts[..parts.len() - 2].join("_");
        }
    }
    stem.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_key_strips_company_and_jd_suffix() {
        assert_eq!(position_key("BackendEngineer_talenscout_JD.pdf"), "BackendEngineer");
        assert_eq!(position_key("Data_Scientist_acme_JD.docx"), "Data_Scientist");
    }

    #[test]
    fn test_position_key_plain_filename_uses_stem() {
        assert_eq!(position_key("MLEngineer.pdf"), "MLEngineer");
        assert_eq!(position_key("frontend-developer.docx"), "frontend-developer");
    }

    #[test]
    fn test_position_key_short_jd_name_keeps_stem() {
        // Too few segments to carve a suffix off.
        assert_eq!(position_key("JD.pdf"), "JD");
    }

    #[test]
    fn test_lookup_absent_position_is_none() {
        let index = JobDescriptionIndex::default();
        assert!(index.lookup("Backend Engineer").is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_position_labels_are_sorted() {
        let mut map = HashMap::new();
        map.insert("Zephyr".to_owned(), "jd-z".to_owned());
        map.insert("Alpha".to_owned(), "jd-a".to_owned());
        let index = JobDescriptionIndex::from_map(map);
        assert_eq!(index.position_labels(), vec!["Alpha", "Zephyr"]);
        assert_eq!(index.lookup("Alpha"), Some("jd-a"));
    }

    #[test]
    fn test_load_missing_directory_yields_empty_index() {
        let index = JobDescriptionIndex::load(Path::new("/nonexistent/JDs"));
        assert!(index.is_empty());
    }
}
