//! Flow and waste taxonomy
//!
//! The taxonomy is the externally configured vocabulary used by every other
//! part of the service: the set of valid flow identifiers, the set of valid
//! waste identifiers, and the keyword synonyms that trigger each of them.
//!
//! It is loaded once at startup from a YAML document and then shared
//! read-only behind an `Arc`.
//!
//! # File format
//!
//! ```yaml
//! flows: [field_ops, post_harvest]
//! wastes: [waiting, motion]
//! synonyms:
//!   post_harvest: [cooler, spoilage]
//!   waiting: [idle, queue]
//! ```
//!
//! Order matters: synonym entries are consulted in file order, so earlier
//! flows win ties during classification.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Flow used whenever nothing more specific can be established
pub const DEFAULT_FLOW: &str = "field_ops";

/// Waste used whenever no valid waste survives filtering
pub const DEFAULT_WASTE: &str = "motion";

/// Errors raised while loading the taxonomy. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Malformed taxonomy: {0}")]
    Malformed(String),

    #[error("Taxonomy is missing the default {kind} '{id}'")]
    MissingDefault { kind: &'static str, id: &'static str },
}

#[derive(Debug, Deserialize)]
struct RawTaxonomy {
    flows: Vec<String>,
    wastes: Vec<String>,
    #[serde(default)]
    synonyms: serde_yaml::Mapping,
}

/// Immutable flow/waste vocabulary with keyword synonyms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    flows: Vec<String>,
    wastes: Vec<String>,
    /// Synonym entries in file order; keywords are lower-cased
    synonyms: Vec<(String, Vec<String>)>,
}

impl Taxonomy {
    /// Reads and parses a taxonomy file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let taxonomy = Self::from_yaml_str(&contents)?;

        info!(
            "Loaded taxonomy from {}: {} flows, {} wastes, {} synonym entries",
            path.display(),
            taxonomy.flows.len(),
            taxonomy.wastes.len(),
            taxonomy.synonyms.len()
        );

        Ok(taxonomy)
    }

    /// Parses a taxonomy from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TaxonomyError> {
        let raw: RawTaxonomy = serde_yaml::from_str(yaml)?;

        let mut synonyms = Vec::with_capacity(raw.synonyms.len());
        for (key, value) in raw.synonyms {
            let id = match key {
                serde_yaml::Value::String(s) => s,
                other => {
                    return Err(TaxonomyError::Malformed(format!(
                        "synonym key must be a string, got {:?}",
                        other
                    )))
                }
            };

            let words: Vec<String> = serde_yaml::from_value(value).map_err(|e| {
                TaxonomyError::Malformed(format!("synonyms for '{}' must be a list of strings: {}", id, e))
            })?;

            synonyms.push((id, words));
        }

        Self::new(raw.flows, raw.wastes, synonyms)
    }

    /// Builds a taxonomy from already-parsed parts
    pub fn new(
        flows: Vec<String>,
        wastes: Vec<String>,
        synonyms: Vec<(String, Vec<String>)>,
    ) -> Result<Self, TaxonomyError> {
        if flows.is_empty() {
            return Err(TaxonomyError::Malformed("'flows' cannot be empty".to_string()));
        }
        if wastes.is_empty() {
            return Err(TaxonomyError::Malformed("'wastes' cannot be empty".to_string()));
        }
        if !flows.iter().any(|f| f == DEFAULT_FLOW) {
            return Err(TaxonomyError::MissingDefault {
                kind: "flow",
                id: DEFAULT_FLOW,
            });
        }
        if !wastes.iter().any(|w| w == DEFAULT_WASTE) {
            return Err(TaxonomyError::MissingDefault {
                kind: "waste",
                id: DEFAULT_WASTE,
            });
        }

        for (id, _) in &synonyms {
            if !flows.contains(id) && !wastes.contains(id) {
                debug!("Synonym entry '{}' is neither a flow nor a waste, ignoring", id);
            }
        }

        // A blank keyword would match every input. Padding is kept so
        // " rot" can require a word boundary.
        let synonyms = synonyms
            .into_iter()
            .map(|(id, words)| {
                let words = words
                    .into_iter()
                    .filter(|w| !w.trim().is_empty())
                    .map(|w| w.to_lowercase())
                    .collect();
                (id, words)
            })
            .collect();

        Ok(Self {
            flows,
            wastes,
            synonyms,
        })
    }

    /// Valid flow identifiers in file order
    pub fn flows(&self) -> &[String] {
        &self.flows
    }

    /// Valid waste identifiers in file order
    pub fn wastes(&self) -> &[String] {
        &self.wastes
    }

    pub fn is_flow(&self, id: &str) -> bool {
        self.flows.iter().any(|f| f == id)
    }

    pub fn is_waste(&self, id: &str) -> bool {
        self.wastes.iter().any(|w| w == id)
    }

    /// Synonym entries in file order, including keys that are not valid ids
    pub fn synonyms(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.synonyms
            .iter()
            .map(|(id, words)| (id.as_str(), words.as_slice()))
    }

    /// Keywords registered for an id, empty when there are none
    pub fn keywords(&self, id: &str) -> &[String] {
        self.synonyms
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
flows: [field_ops, post_harvest, livestock]
wastes: [waiting, motion, defects]
synonyms:
  post_harvest: [Cooler, "spoilage"]
  livestock: [herd]
  waiting: [idle, queue]
  unknown_key: [whatever]
"#;

    #[test]
    fn test_parse_preserves_file_order() {
        let tax = Taxonomy::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(tax.flows(), &["field_ops", "post_harvest", "livestock"]);
        assert_eq!(tax.wastes(), &["waiting", "motion", "defects"]);

        let keys: Vec<&str> = tax.synonyms().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["post_harvest", "livestock", "waiting", "unknown_key"]);
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let tax = Taxonomy::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(tax.keywords("post_harvest"), &["cooler", "spoilage"]);
        assert!(tax.keywords("defects").is_empty());
    }

    #[test]
    fn test_membership() {
        let tax = Taxonomy::from_yaml_str(SAMPLE).unwrap();
        assert!(tax.is_flow("livestock"));
        assert!(!tax.is_flow("waiting"));
        assert!(tax.is_waste("defects"));
        assert!(!tax.is_waste("unknown_key"));
    }

    #[test]
    fn test_empty_keywords_dropped() {
        let yaml = r#"
flows: [field_ops]
wastes: [motion]
synonyms:
  motion: ["", "  ", walk]
"#;
        let tax = Taxonomy::from_yaml_str(yaml).unwrap();
        assert_eq!(tax.keywords("motion"), &["walk"]);
    }

    #[test]
    fn test_keyword_padding_is_kept() {
        let yaml = r#"
flows: [field_ops]
wastes: [motion, defects]
synonyms:
  defects: [" Rot", "mould "]
"#;
        let tax = Taxonomy::from_yaml_str(yaml).unwrap();
        assert_eq!(tax.keywords("defects"), &[" rot", "mould "]);
    }

    #[test]
    fn test_missing_synonyms_section_is_allowed() {
        let tax = Taxonomy::from_yaml_str("flows: [field_ops]\nwastes: [motion]\n").unwrap();
        assert_eq!(tax.synonyms().count(), 0);
    }

    #[test]
    fn test_missing_flows_key_is_error() {
        let result = Taxonomy::from_yaml_str("wastes: [motion]\nsynonyms: {}\n");
        assert!(matches!(result, Err(TaxonomyError::Yaml(_))));
    }

    #[test]
    fn test_synonym_value_must_be_list() {
        let yaml = "flows: [field_ops]\nwastes: [motion]\nsynonyms:\n  motion: 42\n";
        let result = Taxonomy::from_yaml_str(yaml);
        assert!(matches!(result, Err(TaxonomyError::Malformed(_))));
    }

    #[test]
    fn test_missing_default_flow() {
        let result = Taxonomy::from_yaml_str("flows: [livestock]\nwastes: [motion]\n");
        assert!(matches!(
            result,
            Err(TaxonomyError::MissingDefault { kind: "flow", .. })
        ));
    }

    #[test]
    fn test_missing_default_waste() {
        let result = Taxonomy::from_yaml_str("flows: [field_ops]\nwastes: [waiting]\n");
        assert!(matches!(
            result,
            Err(TaxonomyError::MissingDefault { kind: "waste", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let tax = Taxonomy::load(file.path()).unwrap();
        assert_eq!(tax.flows().len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Taxonomy::load("/nonexistent/taxonomy.yaml");
        match result {
            Err(TaxonomyError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/taxonomy.yaml"));
            }
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
