pub mod entities;

// Re-export tracing for use in this crate
pub use tracing;

/// Currency assigned to monetary records when none is given.
pub const DEFAULT_CURRENCY: &str = "RUB";

/// Generates a new opaque record identifier.
///
/// Identifiers are random UUID v4 strings. Nothing relies on their ordering.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
