use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::nutrition::{ConversionError, ServingUnit};

/// Rejections raised at the data-entry boundary, before anything is stored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name_en must not be empty")]
    EmptyName,

    #[error("{field} must be a non-negative number, got {value}")]
    NegativeNutrient { field: &'static str, value: f64 },

    #[error("custom conversion for '{unit}' must be a positive number, got {value}")]
    NonPositiveConversion { unit: ServingUnit, value: f64 },

    #[error("meal must contain at least one food")]
    EmptyMeal,

    #[error("portion for food {food_id} must be a positive number of grams, got {grams}")]
    NonPositivePortion { food_id: Uuid, grams: f64 },

    #[error("scale bounds must satisfy 0 < min_scale <= max_scale, got {min}..{max}")]
    InvalidScaleBounds { min: f64, max: f64 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("scale {scale} is outside the allowed range {min}..{max}")]
    ScaleOutOfRange { scale: f64, min: f64, max: f64 },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Conversion(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ScaleOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(e) => {
                error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
