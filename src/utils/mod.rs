// Utility functions module
pub mod duration;
pub mod formatters;
