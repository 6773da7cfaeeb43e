use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::propertymodel::{Property, PropertyWithSeller, SellerSummary};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw `GET /properties` query string. Every field stays a string so that
/// malformed values are coerced by the search service instead of rejected
/// by the extractor.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchPropertiesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,

    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub approval: Option<String>,
    pub location: Option<String>,

    #[validate(length(max = 100, message = "Search text must be at most 100 characters"))]
    pub search: Option<String>,

    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,

    pub is_verified: Option<String>,
    pub seller_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn positive_int(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok().filter(|v| *v > 0)
}

impl SearchPropertiesQuery {
    /// `limit` takes precedence over `pageSize`. Non-integer, zero or
    /// negative values fall back to the defaults.
    pub fn pagination(&self) -> Pagination {
        let page = positive_int(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = positive_int(self.limit.as_deref())
            .or_else(|| positive_int(self.page_size.as_deref()))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        Pagination { page, limit }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyDto {
    #[serde(flatten)]
    pub property: Property,
    pub seller: Option<SellerSummary>,
}

impl PropertyDto {
    pub fn filter_property(item: &PropertyWithSeller) -> Self {
        PropertyDto {
            property: item.property.clone(),
            seller: item.seller.clone(),
        }
    }

    pub fn filter_properties(items: &[PropertyWithSeller]) -> Vec<PropertyDto> {
        items.iter().map(PropertyDto::filter_property).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyListResponseDto {
    pub properties: Vec<PropertyDto>,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "totalProperties")]
    pub total_properties: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyTypesResponseDto {
    pub types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewCountResponseDto {
    pub view_count: i64,
}
