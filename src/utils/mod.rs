pub mod client_ip;
pub mod currency;
pub mod token;
