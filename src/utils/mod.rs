pub mod area;
pub mod currency;
pub mod token;
