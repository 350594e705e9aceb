//! Terminal UI primitives.

pub mod progress;

pub use progress::Spinner;
