//! Caller-side input checks
//!
//! The analyses trust their numeric inputs. Front ends (CLI, server) run these
//! checks first so a non-positive cash balance or extension never reaches them.

use crate::error::{Error, Result};

/// Reject zero, negative, NaN and infinite values
pub fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidData(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}
