//! Structural classification of a series

pub mod series;

pub use series::SeriesClassifier;
