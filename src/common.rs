pub mod error;
pub mod postcode;
