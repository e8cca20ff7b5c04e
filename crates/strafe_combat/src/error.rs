//! Error types for the combat system

use thiserror::Error;

/// Combat system errors
///
/// Gameplay-level rejections (firing while reloading, damaging a corpse)
/// are not errors; they come back as outcome values. Errors are reserved
/// for inputs that violate the API contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// Negative, NaN or infinite damage/heal/armor amount
    #[error("invalid {what} amount: {value}")]
    InvalidAmount {
        /// Which operation received the amount
        what: &'static str,
        /// The rejected value
        value: f32,
    },

    /// Weapon or enemy stat outside its allowed range
    #[error("invalid stat `{field}` on '{owner}': {reason}")]
    InvalidStat {
        /// Weapon/enemy name
        owner: String,
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Result type for combat operations
pub type CombatResult<T> = Result<T, CombatError>;

/// Reject amounts that are negative or not finite
pub(crate) fn check_amount(what: &'static str, value: f32) -> CombatResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        log::warn!("Rejected {} amount {}", what, value);
        Err(CombatError::InvalidAmount { what, value })
    }
}
