// src/service/property_filter.rs
//
// Search filters as small predicates. A `PropertyFilter` is the AND of its
// predicates; an empty filter matches every property. Each predicate can
// render itself into a Postgres WHERE clause or evaluate against an
// in-memory `Property`, and both paths must agree.
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{models::propertymodel::Property, utils::currency::parse_price};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    PropertyType(String),
    Approval(String),
    /// City of a structured location, compared after trimming the stored value.
    /// Text locations never match.
    City(String),
    /// Case-insensitive literal substring over title, address line 1, city, state.
    Text(String),
    MinPrice(i64),
    MaxPrice(i64),
    Verified(bool),
    /// Seller must be one of these ids. An empty set matches nothing.
    SellerIn(Vec<Uuid>),
}

impl Predicate {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            Predicate::PropertyType(t) => property.property_type == *t,
            Predicate::Approval(a) => property.approval.as_deref() == Some(a.as_str()),
            Predicate::City(c) => property.location.city().map(str::trim) == Some(c.as_str()),
            Predicate::Text(needle) => {
                let needle = needle.to_lowercase();
                std::iter::once(property.title.as_str())
                    .chain(property.location.searchable_fields())
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            Predicate::MinPrice(min) => property.price >= *min,
            Predicate::MaxPrice(max) => property.price <= *max,
            Predicate::Verified(v) => property.is_verified == *v,
            Predicate::SellerIn(ids) => ids.contains(&property.seller_id),
        }
    }

    /// Appends this predicate as one boolean SQL expression. Columns are
    /// qualified with the `p` alias of the `properties` table.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::PropertyType(t) => {
                qb.push("p.property_type = ").push_bind(t.clone());
            }
            Predicate::Approval(a) => {
                qb.push("p.approval = ").push_bind(a.clone());
            }
            Predicate::City(c) => {
                qb.push("BTRIM(p.location->>'city') = ").push_bind(c.clone());
            }
            Predicate::Text(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                qb.push("(p.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR p.location->>'address_line_1' ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR p.location->>'city' ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR p.location->>'state' ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Predicate::MinPrice(min) => {
                qb.push("p.price >= ").push_bind(*min);
            }
            Predicate::MaxPrice(max) => {
                qb.push("p.price <= ").push_bind(*max);
            }
            Predicate::Verified(v) => {
                qb.push("p.is_verified = ").push_bind(*v);
            }
            Predicate::SellerIn(ids) => {
                if ids.is_empty() {
                    qb.push("FALSE");
                } else {
                    qb.push("p.seller_id = ANY(").push_bind(ids.clone()).push(")");
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    predicates: Vec<Predicate>,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the predicate when present. Absent parameters add no constraint.
    pub fn and(mut self, predicate: Option<Predicate>) -> Self {
        if let Some(p) = predicate {
            self.predicates.push(p);
        }
        self
    }

    pub fn and_all(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.predicates.iter().all(|p| p.matches(property))
    }

    /// Appends ` WHERE a AND b ...`, or nothing for an empty filter.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn by_type(raw: Option<&str>) -> Option<Predicate> {
    non_empty(raw).map(Predicate::PropertyType)
}

pub fn by_approval(raw: Option<&str>) -> Option<Predicate> {
    non_empty(raw).map(Predicate::Approval)
}

pub fn by_city(raw: Option<&str>) -> Option<Predicate> {
    non_empty(raw).map(Predicate::City)
}

pub fn by_text(raw: Option<&str>) -> Option<Predicate> {
    non_empty(raw).map(Predicate::Text)
}

/// Inclusive price bounds. Bounds that are not finite non-negative numbers
/// are dropped; fractional bounds round inward so integral prices on the
/// boundary keep matching.
pub fn by_price(min: Option<&str>, max: Option<&str>) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(min) = min.and_then(parse_price) {
        predicates.push(Predicate::MinPrice(min.ceil() as i64));
    }
    if let Some(max) = max.and_then(parse_price) {
        predicates.push(Predicate::MaxPrice(max.floor() as i64));
    }
    predicates
}

pub fn by_verified(raw: Option<&str>) -> Option<Predicate> {
    parse_flag(raw?).map(Predicate::Verified)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Escapes LIKE metacharacters so user input is matched literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::propertymodel::Location;
    use chrono::Utc;

    pub(crate) fn property(title: &str, price: i64, location: Location) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            price,
            location,
            area_size: Some("1500 sqft".to_string()),
            property_type: "Villa".to_string(),
            approval: Some("RERA".to_string()),
            status: "available".to_string(),
            is_verified: false,
            images: Vec::new(),
            view_count: 0,
            key_attributes: Vec::new(),
            advertise_on_social_media: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn structured(city: &str, state: &str, line1: &str) -> Location {
        Location::Structured {
            address_line_1: Some(line1.to_string()),
            address_line_2: None,
            city: Some(city.to_string()),
            state: Some(state.to_string()),
            country: Some("India".to_string()),
            pincode: None,
            latitude: None,
            longitude: None,
        }
    }

    fn sql_of(filter: &PropertyFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM properties p");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn text_search_is_case_insensitive_over_title() {
        let villa = property("Sea facing Villa", 100, Location::Text { value: "Goa".into() });
        let apartment = property("Apartment", 100, Location::Text { value: "villa road".into() });
        let predicate = by_text(Some("villa")).unwrap();

        assert!(predicate.matches(&villa));
        assert!(!predicate.matches(&apartment));
    }

    #[test]
    fn text_search_covers_structured_location_fields() {
        let p = property("Apartment", 100, structured("Pune", "Maharashtra", "12 Villa Street"));
        assert!(by_text(Some("villa")).unwrap().matches(&p));
        assert!(by_text(Some("MAHA")).unwrap().matches(&p));
        assert!(by_text(Some("pun")).unwrap().matches(&p));
        assert!(!by_text(Some("India")).unwrap().matches(&p));
    }

    #[test]
    fn city_only_matches_structured_locations() {
        let structured_pune = property("A", 1, structured("Pune", "MH", "x"));
        let text_pune = property("B", 1, Location::Text { value: "Pune".into() });
        let predicate = by_city(Some("Pune")).unwrap();

        assert!(predicate.matches(&structured_pune));
        assert!(!predicate.matches(&text_pune));
        assert!(!by_city(Some("pune")).unwrap().matches(&structured_pune));
    }

    #[test]
    fn city_ignores_padding_in_stored_value() {
        let padded = property("A", 1, structured(" Goa ", "GA", "x"));
        let predicate = by_city(Some("Goa")).unwrap();

        assert!(predicate.matches(&padded));
        assert_eq!(
            sql_of(&PropertyFilter::new().and(Some(predicate))),
            "SELECT 1 FROM properties p WHERE BTRIM(p.location->>'city') = $1"
        );
    }

    #[test]
    fn blank_parameters_add_no_constraint() {
        assert_eq!(by_type(Some("  ")), None);
        assert_eq!(by_approval(None), None);
        assert_eq!(by_text(Some("")), None);
        let filter = PropertyFilter::new().and(by_type(Some(""))).and(by_city(None));
        assert!(filter.is_empty());
        assert!(filter.matches(&property("any", 5, Location::Text { value: String::new() })));
    }

    #[test]
    fn price_bounds_are_inclusive_and_ignore_garbage() {
        assert_eq!(
            by_price(Some("100"), Some("200")),
            vec![Predicate::MinPrice(100), Predicate::MaxPrice(200)]
        );
        assert_eq!(by_price(Some("abc"), Some("NaN")), vec![]);
        assert_eq!(by_price(Some("-5"), None), vec![]);
        assert_eq!(
            by_price(Some("99.5"), Some("200.9")),
            vec![Predicate::MinPrice(100), Predicate::MaxPrice(200)]
        );

        let filter = PropertyFilter::new().and_all(by_price(Some("100"), Some("200")));
        let loc = || Location::Text { value: String::new() };
        assert!(filter.matches(&property("edge low", 100, loc())));
        assert!(filter.matches(&property("edge high", 200, loc())));
        assert!(!filter.matches(&property("below", 99, loc())));
        assert!(!filter.matches(&property("above", 201, loc())));
    }

    #[test]
    fn verified_flag_parsing() {
        assert_eq!(by_verified(Some("true")), Some(Predicate::Verified(true)));
        assert_eq!(by_verified(Some("0")), Some(Predicate::Verified(false)));
        assert_eq!(by_verified(Some("maybe")), None);
        assert_eq!(by_verified(None), None);
    }

    #[test]
    fn empty_seller_set_matches_nothing() {
        let p = property("A", 1, Location::Text { value: String::new() });
        assert!(!Predicate::SellerIn(vec![]).matches(&p));
        assert!(Predicate::SellerIn(vec![p.seller_id]).matches(&p));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        let p = property("100 percent", 1, Location::Text { value: String::new() });
        assert!(!by_text(Some("%")).unwrap().matches(&p));
    }

    #[test]
    fn sql_rendering_joins_predicates_with_and() {
        assert_eq!(sql_of(&PropertyFilter::new()), "SELECT 1 FROM properties p");

        let filter = PropertyFilter::new()
            .and(by_type(Some("Villa")))
            .and(by_text(Some("sea")))
            .and(Some(Predicate::SellerIn(vec![])));
        let sql = sql_of(&filter);

        assert!(sql.contains(" WHERE p.property_type = $1 AND (p.title ILIKE $2"));
        assert!(sql.contains("p.location->>'state' ILIKE $5)"));
        assert!(sql.ends_with(" AND FALSE"));
    }
}
