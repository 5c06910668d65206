//! Errors reported when a table cannot be configured as requested.
use thiserror::Error;

/// Rejected table configuration.
///
/// The plain constructors and capacity methods panic with this error's message; the `try_*`
/// variants return it instead.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CapacityError {
    /// The load factor is not strictly between 0 and 1.
    #[error("loadFactor must be > 0 and < 1: {0}")]
    InvalidLoadFactor(f32),
    /// The table needed to hold the requested capacity would exceed the maximum table length.
    #[error("The required capacity is too large: {0}")]
    TooLarge(usize),
}
