//! Micronutrient reference intakes
//!
//! RDA is the recommended daily allowance (or the AI where no RDA exists);
//! UL the tolerable upper intake level. Several ULs are deliberately high
//! placeholders for nutrients with no established UL, and only serve to
//! keep the search bounded. Where sources disagree the higher RDA and lower
//! UL are used. Values are for adult males.
//!
//! Not tracked: biotin, choline, vitamin D, vitamin K, pantothenic acid,
//! chromium, fluoride, iodine, molybdenum, potassium, sodium, chloride and
//! the trace elements without an RDA/AI.

use nndb_common::FoodDocument;

/// Reference intake for one nutrient, keyed by NUTR_DEF number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Micronutrient {
    pub name: &'static str,
    pub nutrient_id: &'static str,
    pub units: &'static str,
    pub rda: f64,
    pub ul: f64,
}

const fn micro(
    name: &'static str,
    nutrient_id: &'static str,
    units: &'static str,
    rda: f64,
    ul: f64,
) -> Micronutrient {
    Micronutrient {
        name,
        nutrient_id,
        units,
        rda,
        ul,
    }
}

pub const ALL_MICROS: [Micronutrient; 17] = [
    // Vitamin A as RAE: 1 mcg retinol = 12 mcg b-carotene = 24 mcg a-carotene
    micro("Vitamin A", "320", "mcg", 900.0, 3000.0),
    micro("Vitamin B6", "415", "mg", 1.7, 100.0),
    micro("Vitamin B12", "418", "mcg", 2.4, 500.0),
    micro("Vitamin C", "401", "mg", 90.0, 2000.0),
    micro("Vitamin E", "323", "mg", 15.0, 1000.0),
    // Folate as DFE
    micro("Folate", "435", "mcg", 400.0, 1000.0),
    micro("Niacin", "406", "mg", 16.0, 35.0),
    micro("Riboflavin", "405", "mg", 1.3, 1000.0),
    micro("Thiamin", "404", "mg", 1.2, 1000.0),
    micro("Calcium", "301", "mg", 1200.0, 2500.0),
    micro("Copper", "312", "mcg", 900.0, 10000.0),
    // 18.0 for females 19-50
    micro("Iron", "303", "mg", 8.0, 45.0),
    // Published UL (350 mg) covers supplements only and sits below the RDA
    micro("Magnesium", "304", "mg", 420.0, 10000.0),
    micro("Manganese", "315", "mg", 2.3, 11.0),
    micro("Phosphorus", "305", "mg", 700.0, 4000.0),
    micro("Selenium", "317", "mcg", 55.0, 400.0),
    micro("Zinc", "309", "mg", 11.0, 40.0),
];

/// Amount of each tracked micronutrient per 100 g, absent values as zero
pub fn extract_nutrients(food: &FoodDocument) -> Vec<f64> {
    ALL_MICROS
        .iter()
        .map(|m| food.nutrient_value(m.nutrient_id).unwrap_or(0.0))
        .collect()
}
