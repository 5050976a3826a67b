//! Query parameter validation for the property search endpoint
//!
//! Checks run in a fixed order and the first failure wins:
//! suburb, address, minPrice, maxPrice, the min/max pair, then page.

use crate::error::ApiError;
use propsearch_core::FilterCriteria;
use std::collections::HashMap;

/// Upper bound (exclusive) for a page number, i.e. 2^64
const PAGE_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// A search request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Filters with `coordinates` still unset
    pub criteria: FilterCriteria,
    /// Trimmed address to geocode, if one was supplied
    pub address: Option<String>,
}

/// Decoded query string, keeping every value of repeated parameters
#[derive(Debug, Default)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

enum Param<'a> {
    Absent,
    Single(&'a str),
    Repeated,
}

impl QueryParams {
    /// Decode a raw `application/x-www-form-urlencoded` query string
    pub fn parse(raw: Option<&str>) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            values
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    fn get(&self, name: &str) -> Param<'_> {
        match self.values.get(name).map(Vec::as_slice) {
            None | Some([]) => Param::Absent,
            Some([value]) => Param::Single(value),
            Some(_) => Param::Repeated,
        }
    }

    fn text(&self, name: &str) -> Result<Option<String>, ApiError> {
        let invalid =
            || ApiError::invalid_request(format!("{} must be a non-empty string when provided.", name));

        match self.get(name) {
            Param::Absent => Ok(None),
            Param::Single(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            Param::Single(_) | Param::Repeated => Err(invalid()),
        }
    }

    fn price(&self, name: &str) -> Result<Option<f64>, ApiError> {
        let value = match self.get(name) {
            Param::Absent => return Ok(None),
            Param::Single(value) => parse_number(value),
            Param::Repeated => None,
        };

        let value = value.ok_or_else(|| {
            ApiError::invalid_request(format!("{} must be a valid number.", name))
        })?;

        if value < 0.0 {
            return Err(ApiError::invalid_request(format!(
                "{} must be greater than or equal to 0.",
                name
            )));
        }

        Ok(Some(value))
    }

    fn page(&self) -> Result<u64, ApiError> {
        let value = match self.get("page") {
            Param::Absent => return Ok(1),
            Param::Single(value) => parse_number(value),
            Param::Repeated => None,
        };

        match value {
            Some(page) if page.fract() == 0.0 && page >= 1.0 && page < PAGE_LIMIT => Ok(page as u64),
            _ => Err(ApiError::invalid_request(
                "page must be a positive integer when provided.",
            )),
        }
    }
}

/// Parse a finite decimal number, ignoring surrounding whitespace
///
/// A blank value reads as zero, so `minPrice=` is a lower bound of 0 and
/// `page=` still fails the positive-integer check.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Validate the raw query string of `GET /properties`
pub fn validate_search_query(raw: Option<&str>) -> Result<SearchRequest, ApiError> {
    let params = QueryParams::parse(raw);

    let suburb = params.text("suburb")?;
    let address = params.text("address")?;
    let min_price = params.price("minPrice")?;
    let max_price = params.price("maxPrice")?;

    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(ApiError::invalid_request(
                "minPrice cannot be greater than maxPrice.",
            ));
        }
    }

    let page = params.page()?;

    Ok(SearchRequest {
        criteria: FilterCriteria {
            suburb,
            min_price,
            max_price,
            page,
            coordinates: None,
        },
        address,
    })
}
