pub mod dataset;
pub mod series;
