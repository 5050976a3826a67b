//! Property query engine
//!
//! Filters the read-only collection by suburb and price bounds, slices out
//! one page, and optionally annotates the page with the geocoded search
//! origin. The origin never influences which records come back.

use crate::geocoding::Coordinates;
use crate::property::{normalise_suburb, Property};
use crate::repository::PropertyRepository;
use crate::{PropsearchError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Records per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Radius reported alongside a geocoded search origin
pub const LOCATION_CONTEXT_RADIUS_METERS: u32 = 100;

/// Validated constraints for one search
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Suburb to match exactly, ignoring case and surrounding whitespace
    pub suburb: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// 1-indexed page number
    pub page: u64,
    /// Geocoded origin; annotates the response only
    pub coordinates: Option<Coordinates>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            suburb: None,
            min_price: None,
            max_price: None,
            page: 1,
            coordinates: None,
        }
    }
}

impl FilterCriteria {
    /// Whether a record satisfies every filter
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(ref suburb) = self.suburb {
            if normalise_suburb(&property.suburb) != normalise_suburb(suburb) {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if property.price_value() < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if property.price_value() > max {
                return false;
            }
        }

        true
    }
}

/// Pagination metadata for a search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page, echoed even when it lies past the last match
    pub page: u64,
    pub page_size: usize,
    /// Matches after filtering, before slicing
    pub total: usize,
}

/// Geocoded origin attached to a search response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContext {
    pub search_origin: Coordinates,
    pub radius_meters: u32,
}

impl LocationContext {
    pub fn new(search_origin: Coordinates) -> Self {
        Self {
            search_origin,
            radius_meters: LOCATION_CONTEXT_RADIUS_METERS,
        }
    }
}

/// One page of search results borrowed from the repository
#[derive(Debug, Clone)]
pub struct SearchPage<'a> {
    pub properties: Vec<&'a Property>,
    pub pagination: Pagination,
    pub location_context: Option<LocationContext>,
}

/// Search and lookup over an injected repository
#[derive(Clone)]
pub struct PropertyQueryEngine {
    repository: Arc<dyn PropertyRepository>,
    page_size: usize,
}

impl PropertyQueryEngine {
    /// Create an engine with the default page size
    pub fn new(repository: Arc<dyn PropertyRepository>) -> Self {
        Self {
            repository,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size; values below 1 are raised to 1
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn repository(&self) -> &dyn PropertyRepository {
        self.repository.as_ref()
    }

    /// Filter, paginate and annotate
    ///
    /// A page past the end of the matches yields an empty slice with the
    /// usual metadata rather than an error.
    pub fn search(&self, criteria: &FilterCriteria) -> SearchPage<'_> {
        let matches: Vec<&Property> = self
            .repository
            .all()
            .iter()
            .filter(|property| criteria.matches(property))
            .collect();

        let total = matches.len();
        let start = usize::try_from(criteria.page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(self.page_size);

        let properties = if start >= total {
            Vec::new()
        } else {
            let end = start.saturating_add(self.page_size).min(total);
            matches[start..end].to_vec()
        };

        tracing::debug!(
            "Search matched {} properties, returning {} for page {}",
            total,
            properties.len(),
            criteria.page
        );

        SearchPage {
            properties,
            pagination: Pagination {
                page: criteria.page,
                page_size: self.page_size,
                total,
            },
            location_context: criteria.coordinates.map(LocationContext::new),
        }
    }

    /// Exact identifier lookup
    pub fn get_by_id(&self, id: &str) -> Result<&Property> {
        self.repository
            .find_by_id(id)
            .ok_or_else(|| PropsearchError::not_found(format!("property {}", id)))
    }
}

impl std::fmt::Debug for PropertyQueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyQueryEngine")
            .field("properties", &self.repository.len())
            .field("page_size", &self.page_size)
            .finish()
    }
}
