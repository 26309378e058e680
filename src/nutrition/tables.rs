//! Built-in conversion tables.
//!
//! Both tables are immutable data compiled into the binary. Amounts are in the
//! food's base unit (grams for solids, millilitres for liquids) per one unit.

use lazy_static::lazy_static;
use regex::Regex;

use super::units::{FoodType, ServingUnit};

/// Food-specific amounts for the units where food identity matters most.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordConversion {
    pub cup: Option<f64>,
    pub plate: Option<f64>,
    pub piece: Option<f64>,
}

impl KeywordConversion {
    pub fn get(&self, unit: ServingUnit) -> Option<f64> {
        match unit {
            ServingUnit::Cup => self.cup,
            ServingUnit::Plate => self.plate,
            ServingUnit::Piece => self.piece,
            _ => None,
        }
    }
}

const fn kw(cup: Option<f64>, plate: Option<f64>, piece: Option<f64>) -> KeywordConversion {
    KeywordConversion { cup, plate, piece }
}

/// Keyword dictionary scanned in order; the first keyword found as a word of
/// the lowercased food name wins.
///
/// A keyword that contains another keyword ("brown rice" / "rice",
/// "eggplant" / "egg", "steak" / "tea") must be listed before it.
pub static KEYWORD_CONVERSIONS: &[(&str, KeywordConversion)] = &[
    // grains
    ("brown rice", kw(Some(195.0), Some(250.0), None)),
    ("rice", kw(Some(185.0), Some(250.0), None)),
    ("oatmeal", kw(Some(235.0), Some(250.0), None)),
    ("oats", kw(Some(80.0), None, None)),
    ("quinoa", kw(Some(185.0), Some(230.0), None)),
    ("spaghetti", kw(Some(140.0), Some(250.0), None)),
    ("pasta", kw(Some(140.0), Some(250.0), None)),
    ("noodle", kw(Some(160.0), Some(250.0), None)),
    ("cereal", kw(Some(30.0), None, None)),
    ("tortilla", kw(None, None, Some(45.0))),
    ("bread", kw(None, None, Some(30.0))),
    // fruits
    ("apple", kw(Some(125.0), None, Some(180.0))),
    ("banana", kw(Some(150.0), None, Some(120.0))),
    ("orange juice", kw(Some(248.0), None, None)),
    ("orange", kw(Some(180.0), None, Some(130.0))),
    ("strawberr", kw(Some(150.0), None, Some(12.0))),
    ("grape", kw(Some(150.0), None, Some(5.0))),
    ("avocado", kw(Some(150.0), None, Some(200.0))),
    // vegetables
    ("eggplant", kw(Some(82.0), Some(200.0), Some(450.0))),
    ("tomato", kw(Some(180.0), None, Some(120.0))),
    ("potato", kw(Some(150.0), Some(250.0), Some(170.0))),
    ("carrot", kw(Some(128.0), None, Some(60.0))),
    ("broccoli", kw(Some(90.0), Some(150.0), None)),
    ("spinach", kw(Some(30.0), Some(100.0), None)),
    ("salad", kw(Some(50.0), Some(150.0), None)),
    ("lettuce", kw(Some(50.0), Some(150.0), None)),
    // proteins
    ("chicken breast", kw(Some(140.0), Some(200.0), Some(170.0))),
    ("chicken", kw(Some(140.0), Some(200.0), Some(120.0))),
    ("steak", kw(None, Some(200.0), Some(225.0))),
    ("beef", kw(Some(150.0), Some(200.0), Some(150.0))),
    ("salmon", kw(Some(140.0), Some(200.0), Some(150.0))),
    ("fish", kw(Some(140.0), Some(200.0), Some(120.0))),
    ("tofu", kw(Some(250.0), Some(200.0), Some(85.0))),
    ("egg", kw(Some(243.0), None, Some(50.0))),
    ("lentil", kw(Some(200.0), Some(250.0), None)),
    ("bean", kw(Some(170.0), Some(250.0), None)),
    ("almond", kw(Some(143.0), None, Some(1.2))),
    // dairy
    ("yogurt", kw(Some(245.0), None, None)),
    ("cheese", kw(Some(113.0), None, Some(28.0))),
    ("milk", kw(Some(244.0), None, None)),
    // drinks and soups
    ("soup", kw(Some(245.0), Some(300.0), None)),
    ("smoothie", kw(Some(245.0), None, None)),
    ("juice", kw(Some(248.0), None, None)),
    ("coffee", kw(Some(240.0), None, None)),
    ("tea", kw(Some(240.0), None, None)),
    ("water", kw(Some(240.0), None, None)),
];

lazy_static! {
    /// One whole-word pattern per keyword, in table order. A keyword may carry
    /// a plural suffix ("eggs", "potatoes", "strawberries") but never sits
    /// inside another word ("grapefruit", "pineapple", "steamed").
    static ref KEYWORD_PATTERNS: Vec<Regex> = KEYWORD_CONVERSIONS
        .iter()
        .map(|(keyword, _)| {
            Regex::new(&format!(r"\b{}(?:s|es|ies)?\b", regex::escape(keyword))).unwrap()
        })
        .collect();
}

/// First keyword entry matching `name`, compared case-insensitively.
pub fn keyword_match(name: &str) -> Option<(&'static str, &'static KeywordConversion)> {
    let name = name.to_lowercase();
    KEYWORD_PATTERNS
        .iter()
        .zip(KEYWORD_CONVERSIONS)
        .find(|(pattern, _)| pattern.is_match(&name))
        .map(|(_, (keyword, table))| (*keyword, table))
}

/// Average amount per fuzzy unit. Spoon and cup sizes depend on whether the
/// food is measured by volume (liquid) or weighed (solid).
pub fn generic_default(unit: ServingUnit, food_type: FoodType) -> Option<f64> {
    let amount = match (unit, food_type) {
        (ServingUnit::Cup, FoodType::Liquid) => 240.0,
        (ServingUnit::Cup, FoodType::Solid) => 200.0,
        (ServingUnit::Tbsp, FoodType::Liquid) => 15.0,
        (ServingUnit::Tbsp, FoodType::Solid) => 12.0,
        (ServingUnit::Tsp, FoodType::Liquid) => 5.0,
        (ServingUnit::Tsp, FoodType::Solid) => 4.0,
        (ServingUnit::Plate, _) => 200.0,
        (ServingUnit::Fist, _) => 80.0,
        (ServingUnit::Piece, _) => 50.0,
        (ServingUnit::G | ServingUnit::Ml | ServingUnit::L, _) => return None,
    };
    Some(amount)
}
