pub mod propertydtos;
pub mod viewdtos;
