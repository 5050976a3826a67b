//! Property records and their response projections

use serde::{Deserialize, Serialize};

/// A single listing as stored in the dataset
///
/// Records are loaded once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Opaque unique identifier, e.g. `prop_001`
    pub id: String,
    /// Display address
    pub address: String,
    /// Suburb used for filtering
    pub suburb: String,
    /// Asking price in whole dollars
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: u32,
    /// Long-form listing text, only exposed by the detail lookup
    pub description: String,
}

impl Property {
    /// Whether this record belongs to the given suburb, ignoring case and
    /// surrounding whitespace
    pub fn in_suburb(&self, suburb: &str) -> bool {
        normalise_suburb(&self.suburb) == normalise_suburb(suburb)
    }

    /// Price as a float for comparison against request bounds
    pub fn price_value(&self) -> f64 {
        self.price as f64
    }
}

/// Canonical form used for suburb comparison
pub fn normalise_suburb(suburb: &str) -> String {
    suburb.trim().to_lowercase()
}

/// Listing shape returned by the collection search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: String,
    pub address: String,
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: u32,
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id.clone(),
            address: property.address.clone(),
            price: property.price,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            parking: property.parking,
        }
    }
}

/// Listing shape returned by the single-resource lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetail {
    pub id: String,
    pub address: String,
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking: u32,
    pub description: String,
}

impl From<&Property> for PropertyDetail {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id.clone(),
            address: property.address.clone(),
            price: property.price,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            parking: property.parking,
            description: property.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Property {
        Property {
            id: "prop_100".to_string(),
            address: "1 Example Street, West End QLD 4101".to_string(),
            suburb: "West End".to_string(),
            price: 750_000,
            bedrooms: 2,
            bathrooms: 1,
            parking: 1,
            description: "Sample listing".to_string(),
        }
    }

    #[test]
    fn test_suburb_match_ignores_case_and_whitespace() {
        let property = sample();
        assert!(property.in_suburb("west end"));
        assert!(property.in_suburb("  WEST END "));
        assert!(!property.in_suburb("West"));
        assert!(!property.in_suburb("West End QLD"));
    }

    #[test]
    fn test_summary_omits_description_and_suburb() {
        let value = serde_json::to_value(PropertySummary::from(&sample())).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert!(object.get("description").is_none());
        assert!(object.get("suburb").is_none());
        assert_eq!(value["price"], 750_000);
    }

    #[test]
    fn test_detail_includes_description() {
        let detail = PropertyDetail::from(&sample());
        assert_eq!(detail.description, "Sample listing");
        let value = serde_json::to_value(detail).unwrap();
        assert!(value.get("suburb").is_none());
    }
}
