//! Format-agnostic loading of attribute documents

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result, io};

/// Format-agnostic document store.
///
/// Detects the format from the file extension and deserializes
/// transparently. TOML has no null, so explicit nulls can only be
/// expressed in JSON or YAML documents.
#[derive(Debug, Default)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    ///
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        tracing::debug!(path = %path.display(), format = %extension, "Loading document");

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error(path, "TOML", e)),
            "json" => serde_json::from_str(&content).map_err(|e| parse_error(path, "JSON", e)),
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(path, "YAML", e))
            }
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }
}

fn parse_error(path: &Path, format: &str, e: impl std::fmt::Display) -> Error {
    Error::DocumentParse {
        path: path.to_path_buf(),
        format: format.into(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_json_preserves_explicit_null() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("attrs.json");
        fs::write(&path, r#"{"max_message_size": null}"#).unwrap();

        let value: Value = DocumentStore::new().load(&path).unwrap();
        assert!(value.get("max_message_size").unwrap().is_null());
    }

    #[test]
    fn load_toml_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("attrs.toml");
        fs::write(&path, "protocol = \"udp\"\n\n[imfile]\nPollingInterval = 10\n").unwrap();

        let value: Value = DocumentStore::new().load(&path).unwrap();
        assert_eq!(value["protocol"], "udp");
        assert_eq!(value["imfile"]["PollingInterval"], 10);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("attrs.ini");
        fs::write(&path, "protocol=udp").unwrap();

        let result: Result<Value> = DocumentStore::new().load(&path);
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    }
}
