//! FAQ catalog loading and validation.
//!
//! A catalog source is either a single JSON/YAML file or a directory of such
//! files. Each file holds an ordered list of records, either as a top-level
//! array or under a `faqs` key. Entry and variation order is preserved
//! exactly; directory members are read in sorted path order.

use crate::types::{FaqEntry, FaqRecord};
use helpdesk_core::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Serialization format of a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// The validated, ordered set of FAQ entries.
#[derive(Debug, Clone, Default)]
pub struct FaqCatalog {
    entries: Vec<FaqEntry>,
    positions: HashMap<String, usize>,
}

impl FaqCatalog {
    /// Load a catalog from a file or directory.
    ///
    /// # Errors
    /// `AppError::CatalogLoad` if the source is missing, unreadable, in an
    /// unsupported format, or contains a malformed record.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::CatalogLoad(format!(
                "FAQ source not found: {:?}",
                path
            )));
        }

        let files = if path.is_dir() {
            catalog_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        if files.is_empty() {
            tracing::warn!("No catalog files found in {:?}", path);
        }

        let mut records = Vec::new();
        for file in &files {
            let format = CatalogFormat::from_path(file).ok_or_else(|| {
                AppError::CatalogLoad(format!(
                    "Unsupported catalog file {:?}: expected .json, .yaml or .yml",
                    file
                ))
            })?;

            let contents = fs::read_to_string(file).map_err(|e| {
                AppError::CatalogLoad(format!("Failed to read catalog {:?}: {}", file, e))
            })?;

            let origin = file.display().to_string();
            records.extend(parse_records(&contents, format, &origin)?);
        }

        let catalog = Self::from_records(records)?;

        tracing::info!(
            "Loaded FAQ catalog from {:?}: {} entries, {} phrases",
            path,
            catalog.len(),
            catalog.phrase_count()
        );

        Ok(catalog)
    }

    /// Parse a catalog from an in-memory document.
    pub fn parse(contents: &str, format: CatalogFormat) -> AppResult<Self> {
        Self::from_records(parse_records(contents, format, "<inline>")?)
    }

    /// Build a catalog from raw records, assigning `faq-<n>` ids where missing.
    pub fn from_records(records: Vec<FaqRecord>) -> AppResult<Self> {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| FaqEntry {
                id: record.id.unwrap_or_else(|| format!("faq-{}", i + 1)),
                question: record.question,
                variations: record.variations,
                answer: record.answer,
            })
            .collect();

        Self::from_entries(entries)
    }

    /// Build a catalog from entries, validating every one.
    pub fn from_entries(entries: Vec<FaqEntry>) -> AppResult<Self> {
        let mut positions = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            validate_entry(entry)?;

            if positions.insert(entry.id.clone(), position).is_some() {
                return Err(AppError::CatalogLoad(format!(
                    "Duplicate FAQ id '{}'",
                    entry.id
                )));
            }
        }

        Ok(Self { entries, positions })
    }

    /// Entries in load order.
    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&FaqEntry> {
        self.positions.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of questions and variations.
    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(FaqEntry::phrase_count).sum()
    }
}

/// Catalog files directly inside `dir`, sorted by path.
fn catalog_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            AppError::CatalogLoad(format!("Failed to read catalog directory {:?}: {}", dir, e))
        })?;
        if entry.file_type().is_file() && CatalogFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn parse_records(contents: &str, format: CatalogFormat, origin: &str) -> AppResult<Vec<FaqRecord>> {
    let document: Value = match format {
        CatalogFormat::Json => serde_json::from_str(contents).map_err(|e| {
            AppError::CatalogLoad(format!("Failed to parse JSON catalog {}: {}", origin, e))
        })?,
        CatalogFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| {
            AppError::CatalogLoad(format!("Failed to parse YAML catalog {}: {}", origin, e))
        })?,
    };

    let items = match document {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("faqs") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => {
                return Err(AppError::CatalogLoad(format!(
                    "Catalog {} must be a list of records or contain a 'faqs' list",
                    origin
                )))
            }
        },
        _ => {
            return Err(AppError::CatalogLoad(format!(
                "Catalog {} must be a list of records",
                origin
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<FaqRecord>(item).map_err(|e| {
                AppError::CatalogLoad(format!("{}: record {}: {}", origin, i + 1, e))
            })
        })
        .collect()
}

fn validate_entry(entry: &FaqEntry) -> AppResult<()> {
    if entry.id.trim().is_empty() {
        return Err(AppError::CatalogLoad("FAQ id cannot be empty".to_string()));
    }

    if entry.question.trim().is_empty() {
        return Err(AppError::CatalogLoad(format!(
            "FAQ '{}' has an empty question",
            entry.id
        )));
    }

    if entry.answer.trim().is_empty() {
        return Err(AppError::CatalogLoad(format!(
            "FAQ '{}' has an empty answer",
            entry.id
        )));
    }

    if let Some(i) = entry.variations.iter().position(|v| v.trim().is_empty()) {
        return Err(AppError::CatalogLoad(format!(
            "FAQ '{}' has an empty variation at position {}",
            entry.id, i
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUPPORT_FAQ: &str = r#"[
        {
            "question": "What are your support hours?",
            "variations": ["hours?", "when are you open"],
            "answer": "9am-5pm"
        },
        {
            "question": "How can I reset my password?",
            "answer": "Use the 'Forgot password' link on the login page."
        }
    ]"#;

    #[test]
    fn test_parse_json_array_preserves_order() {
        let catalog = FaqCatalog::parse(SUPPORT_FAQ, CatalogFormat::Json).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.phrase_count(), 4);
        assert_eq!(catalog.entries()[0].id, "faq-1");
        assert_eq!(catalog.entries()[1].id, "faq-2");
        assert_eq!(
            catalog.entries()[0].variations,
            vec!["hours?".to_string(), "when are you open".to_string()]
        );
        assert_eq!(catalog.get("faq-2").unwrap().variations.len(), 0);
    }

    #[test]
    fn test_parse_yaml_wrapped() {
        let yaml = r#"
faqs:
  - id: refunds
    question: Can I get a refund?
    variations:
      - refund policy
    answer: Refunds are available within 30 days.
"#;
        let catalog = FaqCatalog::parse(yaml, CatalogFormat::Yaml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("refunds").unwrap().answer,
            "Refunds are available within 30 days."
        );
    }

    #[test]
    fn test_missing_required_field() {
        let json = r#"[{"question": "Orphan question"}]"#;
        let err = FaqCatalog::parse(json, CatalogFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::CatalogLoad(_)));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": "a", "question": "Q1", "answer": "A1"},
            {"id": "a", "question": "Q2", "answer": "A2"}
        ]"#;
        let err = FaqCatalog::parse(json, CatalogFormat::Json).unwrap_err();
        assert!(err.to_string().contains("Duplicate FAQ id 'a'"));
    }

    #[test]
    fn test_explicit_id_colliding_with_assigned_id() {
        let json = r#"[
            {"question": "Q1", "answer": "A1"},
            {"id": "faq-1", "question": "Q2", "answer": "A2"}
        ]"#;
        assert!(FaqCatalog::parse(json, CatalogFormat::Json).is_err());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let blank_answer = r#"[{"question": "Q", "answer": "   "}]"#;
        assert!(FaqCatalog::parse(blank_answer, CatalogFormat::Json).is_err());

        let blank_variation = r#"[{"question": "Q", "variations": ["ok", ""], "answer": "A"}]"#;
        let err = FaqCatalog::parse(blank_variation, CatalogFormat::Json).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_non_list_document_rejected() {
        let err = FaqCatalog::parse(r#"{"items": []}"#, CatalogFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::CatalogLoad(_)));
    }

    #[test]
    fn test_empty_document_is_empty_catalog() {
        let catalog = FaqCatalog::parse("[]", CatalogFormat::Json).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.phrase_count(), 0);
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("faq.json");
        fs::write(&path, SUPPORT_FAQ).unwrap();

        let catalog = FaqCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = FaqCatalog::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AppError::CatalogLoad(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("faq.csv");
        fs::write(&path, "question,answer").unwrap();

        assert!(FaqCatalog::load(&path).is_err());
    }

    #[test]
    fn test_load_directory_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("b_billing.yaml"),
            "- id: billing\n  question: How do I pay?\n  answer: By card.\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("a_account.json"),
            r#"[{"id": "account", "question": "How do I sign up?", "answer": "Click Register."}]"#,
        )
        .unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let catalog = FaqCatalog::load(temp.path()).unwrap();
        let ids: Vec<_> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["account", "billing"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("faqs");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("faq.json"), SUPPORT_FAQ).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o300)).unwrap();

        // Root ignores directory permissions.
        if fs::read_dir(&dir).is_ok() {
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = FaqCatalog::load(&dir);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(AppError::CatalogLoad(msg)) => {
                assert!(msg.contains("Failed to read catalog directory"), "{}", msg)
            }
            other => panic!("expected CatalogLoad, got {:?}", other.map(|c| c.len())),
        }
    }
}
