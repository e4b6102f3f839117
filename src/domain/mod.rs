// Domain layer - pure data model and transformations, no I/O
pub mod hierarchy;
pub mod metrics;
pub mod series;
