//! Unit conversion and meal aggregation.
//!
//! Everything in here is pure: no I/O, no shared state. Callers hand in the
//! food snapshot they have and get values back.

pub mod aggregate;
pub mod error;
pub mod model;
pub mod resolver;
pub mod tables;
pub mod units;

pub use aggregate::{aggregate_meal, serving_nutrition, MealAggregate};
pub use error::ConversionError;
pub use model::{BaseNutrition, CustomConversions, Food, FoodCategory, MealFoodEntry, Nutrients};
pub use resolver::ResolvedServing;
pub use units::{FoodType, Serving, ServingUnit};
