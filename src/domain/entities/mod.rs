pub mod currency;
pub mod edit;
pub mod price;
