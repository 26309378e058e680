use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ConversionError;

/// Physical state of a food. Decides the base unit of its nutrition basis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Solid,
    Liquid,
}

impl FoodType {
    pub fn base_unit(self) -> ServingUnit {
        match self {
            FoodType::Solid => ServingUnit::G,
            FoodType::Liquid => ServingUnit::Ml,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FoodType::Solid => "solid",
            FoodType::Liquid => "liquid",
        }
    }
}

impl FromStr for FoodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(FoodType::Solid),
            "liquid" => Ok(FoodType::Liquid),
            other => Err(format!("unknown food type '{other}'")),
        }
    }
}

/// Units a serving may be expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServingUnit {
    Ml,
    L,
    G,
    Cup,
    Tbsp,
    Tsp,
    Plate,
    Fist,
    Piece,
}

impl ServingUnit {
    pub const ALL: [ServingUnit; 9] = [
        ServingUnit::Ml,
        ServingUnit::L,
        ServingUnit::G,
        ServingUnit::Cup,
        ServingUnit::Tbsp,
        ServingUnit::Tsp,
        ServingUnit::Plate,
        ServingUnit::Fist,
        ServingUnit::Piece,
    ];

    /// Units that convert without any lookup: g, ml and l.
    pub fn is_exact(self) -> bool {
        matches!(self, ServingUnit::G | ServingUnit::Ml | ServingUnit::L)
    }

    /// Base units per one unit for the exact units.
    pub fn exact_factor(self) -> Option<f64> {
        match self {
            ServingUnit::G | ServingUnit::Ml => Some(1.0),
            ServingUnit::L => Some(1000.0),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServingUnit::Ml => "ml",
            ServingUnit::L => "l",
            ServingUnit::G => "g",
            ServingUnit::Cup => "cup",
            ServingUnit::Tbsp => "tbsp",
            ServingUnit::Tsp => "tsp",
            ServingUnit::Plate => "plate",
            ServingUnit::Fist => "fist",
            ServingUnit::Piece => "piece",
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServingUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_lowercase().as_str() {
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => ServingUnit::Ml,
            "l" | "liter" | "liters" | "litre" | "litres" => ServingUnit::L,
            "g" | "gram" | "grams" | "gr" => ServingUnit::G,
            "cup" | "cups" => ServingUnit::Cup,
            "tbsp" | "tablespoon" | "tablespoons" => ServingUnit::Tbsp,
            "tsp" | "teaspoon" | "teaspoons" => ServingUnit::Tsp,
            "plate" | "plates" => ServingUnit::Plate,
            "fist" | "fists" => ServingUnit::Fist,
            "piece" | "pieces" | "pc" | "pcs" => ServingUnit::Piece,
            _ => return Err(ConversionError::UnknownUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// A quantity paired with a unit, e.g. "1.5 cups".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Serving {
    pub quantity: f64,
    pub unit: ServingUnit,
}

impl Serving {
    pub fn new(quantity: f64, unit: ServingUnit) -> Self {
        Self { quantity, unit }
    }
}

impl FromStr for Serving {
    type Err = ConversionError;

    /// Accepts "150g", "1.5 cups", "1,5 cup" and "1/2 cup".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref SERVING_RE: Regex = Regex::new(
                r"^\s*(?:(?P<num>\d+)\s*/\s*(?P<den>\d+)|(?P<dec>\d+(?:[.,]\d+)?|[.,]\d+))\s*(?P<unit>[A-Za-z]+)\.?\s*$"
            )
            .unwrap();
        }

        let caps = SERVING_RE
            .captures(s)
            .ok_or_else(|| ConversionError::InvalidServing(s.to_string()))?;

        let quantity = match (caps.name("num"), caps.name("den"), caps.name("dec")) {
            (Some(num), Some(den), _) => {
                let num: f64 = num
                    .as_str()
                    .parse()
                    .map_err(|_| ConversionError::InvalidServing(s.to_string()))?;
                let den: f64 = den
                    .as_str()
                    .parse()
                    .map_err(|_| ConversionError::InvalidServing(s.to_string()))?;
                if den == 0.0 {
                    return Err(ConversionError::InvalidServing(s.to_string()));
                }
                num / den
            }
            (_, _, Some(dec)) => dec
                .as_str()
                .replace(',', ".")
                .parse()
                .map_err(|_| ConversionError::InvalidServing(s.to_string()))?,
            _ => return Err(ConversionError::InvalidServing(s.to_string())),
        };

        let unit = caps["unit"].parse()?;
        Ok(Serving { quantity, unit })
    }
}
