use thiserror::Error;

use super::units::ServingUnit;

/// Failures raised while turning a serving into base-unit amounts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("serving quantity must be a positive number, got {0}")]
    InvalidQuantity(f64),

    #[error("unknown serving unit '{0}'")]
    UnknownUnit(String),

    #[error("unit '{unit}' is not resolvable for food '{food}'")]
    UnitNotResolvable { unit: ServingUnit, food: String },

    #[error("cannot parse serving '{0}'")]
    InvalidServing(String),
}
