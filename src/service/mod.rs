pub mod error;
pub mod price_ranges;
pub mod property_filter;
pub mod property_service;
pub mod reference_data;
pub mod view_service;
