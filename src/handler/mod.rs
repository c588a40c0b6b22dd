pub mod dashboard;
pub mod tools;
