pub mod auth;
pub mod dashboard;
pub mod open;
pub mod records;
pub mod resources;
pub mod upload;
