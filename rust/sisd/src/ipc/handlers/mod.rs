pub mod assistant;
pub mod core;
pub mod records;
pub mod reports;
pub mod students;
pub mod view;
