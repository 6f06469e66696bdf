pub mod chart;
pub mod stats;
pub mod trip;
