pub mod flight;
pub mod gemini;
pub mod pump;
pub mod repository;
pub mod store;
pub mod tips;
