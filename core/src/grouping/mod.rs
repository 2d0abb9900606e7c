//! Ordering, grouping and cleanup of the instances of one series

pub mod filter;
pub mod instances;

pub use filter::filter_series;
pub use instances::{group_instances, sort_instances, stack_position, Grouping};
