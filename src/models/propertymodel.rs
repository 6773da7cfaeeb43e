use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

/// Where a property is. Older listings only carry a free-text location,
/// newer ones the structured form. Only structured locations take part in
/// city matching and text search.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    Text {
        value: String,
    },
    Structured {
        #[serde(default)]
        address_line_1: Option<String>,
        #[serde(default)]
        address_line_2: Option<String>,
        #[serde(default)]
        city: Option<String>,
        #[serde(default)]
        state: Option<String>,
        #[serde(default)]
        country: Option<String>,
        #[serde(default)]
        pincode: Option<String>,
        #[serde(default)]
        latitude: Option<f64>,
        #[serde(default)]
        longitude: Option<f64>,
    },
}

impl Location {
    pub fn city(&self) -> Option<&str> {
        match self {
            Location::Structured { city, .. } => city.as_deref(),
            Location::Text { .. } => None,
        }
    }

    /// Fields covered by the free-text `search` parameter.
    pub fn searchable_fields(&self) -> Vec<&str> {
        match self {
            Location::Structured {
                address_line_1,
                city,
                state,
                ..
            } => [address_line_1, city, state]
                .into_iter()
                .filter_map(|f| f.as_deref())
                .collect(),
            Location::Text { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PropertyImage {
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeyAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub seller_id: Uuid,

    pub title: String,
    pub description: String,
    pub price: i64,

    #[sqlx(json)]
    pub location: Location,
    pub area_size: Option<String>,

    pub property_type: String,
    pub approval: Option<String>,
    pub status: String,
    pub is_verified: bool,

    #[sqlx(json)]
    pub images: Vec<PropertyImage>,
    pub view_count: i64,
    #[sqlx(json)]
    pub key_attributes: Vec<KeyAttribute>,

    #[serde(rename = "advertiseOnSocialMedia")]
    pub advertise_on_social_media: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A property with its seller joined inline. `seller` is `None` when the
/// owning account no longer exists.
#[derive(Debug, Clone)]
pub struct PropertyWithSeller {
    pub property: Property,
    pub seller: Option<SellerSummary>,
}

impl<'r> FromRow<'r, PgRow> for PropertyWithSeller {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let property = Property::from_row(row)?;
        let seller_name: Option<String> = row.try_get("seller_name")?;
        let seller_email: Option<String> = row.try_get("seller_email")?;

        let seller = match (seller_name, seller_email) {
            (Some(name), Some(email)) => Some(SellerSummary {
                id: property.seller_id,
                name,
                email,
            }),
            _ => None,
        };

        Ok(Self { property, seller })
    }
}

/// One row of the `property_types` or `approval_types` lookup tables.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ReferenceType {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub visible_to_seller: bool,
}

impl ReferenceType {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    PropertyType,
    ApprovalType,
}

impl ReferenceKind {
    pub fn table(&self) -> &'static str {
        match self {
            ReferenceKind::PropertyType => "property_types",
            ReferenceKind::ApprovalType => "approval_types",
        }
    }
}

/// Lowest and highest listed price across all properties.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceStats {
    pub min_price: i64,
    pub max_price: i64,
}
