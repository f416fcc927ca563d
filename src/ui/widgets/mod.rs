//! Reusable widgets

pub mod confidence;

pub use confidence::{confidence_color, ConfidenceBar};
