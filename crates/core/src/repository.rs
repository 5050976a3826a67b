//! Read-only property storage
//!
//! The query engine only sees the [`PropertyRepository`] trait, so tests can
//! hand it any fixed collection. [`InMemoryRepository`] is the production
//! implementation, filled once at startup from a JSON file or the bundled
//! dataset.

use crate::{property::Property, PropsearchError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Bundled Brisbane listings used when no dataset path is configured
const EMBEDDED_DATASET: &str = include_str!("../data/properties.json");

/// Read-only access to the property collection
pub trait PropertyRepository: Send + Sync {
    /// Every record, in dataset order
    fn all(&self) -> &[Property];

    /// Exact identifier lookup
    fn find_by_id(&self, id: &str) -> Option<&Property> {
        self.all().iter().find(|property| property.id == id)
    }

    /// Number of records held
    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable in-memory collection
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    properties: Vec<Property>,
}

impl InMemoryRepository {
    /// Build a repository from records, rejecting blank or duplicate identifiers
    pub fn new(properties: Vec<Property>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(properties.len());
        for property in &properties {
            if property.id.trim().is_empty() {
                return Err(PropsearchError::dataset(format!(
                    "Property at address '{}' has an empty id",
                    property.address
                )));
            }
            if !seen.insert(property.id.as_str()) {
                return Err(PropsearchError::dataset(format!(
                    "Duplicate property id: {}",
                    property.id
                )));
            }
        }

        Ok(Self { properties })
    }

    /// Parse a JSON array of records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let properties: Vec<Property> = serde_json::from_str(json)?;
        Self::new(properties)
    }

    /// Load a JSON array of records from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PropsearchError::dataset(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let repository = Self::from_json_str(&contents)?;

        info!(
            "Loaded {} properties from {}",
            repository.properties.len(),
            path.display()
        );
        Ok(repository)
    }

    /// The bundled dataset
    pub fn embedded() -> Result<Self> {
        let repository = Self::from_json_str(EMBEDDED_DATASET)?;
        info!(
            "Loaded {} properties from bundled dataset",
            repository.properties.len()
        );
        Ok(repository)
    }

    /// Load from `path` when given, otherwise use the bundled dataset
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Self::embedded(),
        }
    }
}

impl PropertyRepository for InMemoryRepository {
    fn all(&self) -> &[Property] {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(id: &str) -> Property {
        Property {
            id: id.to_string(),
            address: format!("{} Test Street, Paddington QLD 4064", id),
            suburb: "Paddington".to_string(),
            price: 500_000,
            bedrooms: 2,
            bathrooms: 1,
            parking: 1,
            description: String::new(),
        }
    }

    #[test]
    fn test_embedded_dataset_loads() {
        let repository = InMemoryRepository::embedded().unwrap();
        assert_eq!(repository.len(), 30);
        let first = repository.find_by_id("prop_001").unwrap();
        assert_eq!(first.suburb, "West End");
        assert!(!first.description.is_empty());
    }

    #[test]
    fn test_find_by_id_is_exact() {
        let repository = InMemoryRepository::new(vec![record("prop_a")]).unwrap();
        assert!(repository.find_by_id("prop_a").is_some());
        assert!(repository.find_by_id("PROP_A").is_none());
        assert!(repository.find_by_id("prop_a ").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = InMemoryRepository::new(vec![record("dup"), record("dup")]);
        assert!(matches!(result, Err(PropsearchError::Dataset { .. })));
    }

    #[test]
    fn test_blank_id_rejected() {
        let result = InMemoryRepository::new(vec![record("  ")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_price_rejected_by_parser() {
        let json = r#"[{"id":"x","address":"a","suburb":"s","price":-1,
            "bedrooms":1,"bathrooms":1,"parking":0,"description":""}]"#;
        assert!(matches!(
            InMemoryRepository::from_json_str(json),
            Err(PropsearchError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let records = vec![record("one"), record("two")];
        write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();

        let repository = InMemoryRepository::load(Some(file.path())).unwrap();
        assert_eq!(repository.len(), 2);
        assert_eq!(repository.all()[1].id, "two");
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let result = InMemoryRepository::from_json_file(Path::new("/nonexistent/props.json"));
        assert!(matches!(result, Err(PropsearchError::Dataset { .. })));
    }
}
