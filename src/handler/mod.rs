pub mod properties;
pub mod property_types;
pub mod property_views;
