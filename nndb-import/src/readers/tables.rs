//! Typed records for each SR27 file
//!
//! Field order follows the SR27 documentation (sr27_doc.pdf); positions
//! are fixed by the file format.

use super::{files, NndbRecord, RawRecord};
use nndb_common::models::{Footnote, LangualEntry, Measure};

/// FOOD_DES: one row per food item
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDescription {
    pub ndb_num: String,
    pub food_group_code: String,
    pub descrip: String,
    pub short_descrip: String,
    pub common_name: String,
    pub mfg_name: String,
    pub survey: String,
    pub refuse_descrip: String,
    pub refuse: Option<f64>,
    pub scientific_name: String,
    pub n_factor: Option<f64>,
    pub protein_factor: Option<f64>,
    pub fat_factor: Option<f64>,
    pub carb_factor: Option<f64>,
}

impl NndbRecord for FoodDescription {
    const FILE: &'static str = files::FOOD_DES;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            food_group_code: raw.text(1),
            descrip: raw.text(2),
            short_descrip: raw.text(3),
            common_name: raw.text(4),
            mfg_name: raw.text(5),
            survey: raw.text(6),
            refuse_descrip: raw.text(7),
            refuse: raw.number(8),
            scientific_name: raw.text(9),
            n_factor: raw.number(10),
            protein_factor: raw.number(11),
            fat_factor: raw.number(12),
            carb_factor: raw.number(13),
        }
    }
}

/// NUT_DATA: nutrient value for one food
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientValue {
    pub ndb_num: String,
    pub nutrient_id: String,
    pub nutrient_val: Option<f64>,
    pub data_point_count: Option<f64>,
    pub std_error: Option<f64>,
    pub source_code: String,
    pub derivation_code: String,
    pub ref_ndb_num: String,
    pub add_nutrition_mark: String,
    pub num_studies: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub degrees_freedom: Option<f64>,
    pub lower_err_bound: Option<f64>,
    pub upper_err_bound: Option<f64>,
    pub statistical_comments: String,
    pub confidence_code: String,
}

impl NndbRecord for NutrientValue {
    const FILE: &'static str = files::NUT_DATA;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            nutrient_id: raw.text(1),
            nutrient_val: raw.number(2),
            data_point_count: raw.number(3),
            std_error: raw.number(4),
            source_code: raw.text(5),
            derivation_code: raw.text(6),
            ref_ndb_num: raw.text(7),
            add_nutrition_mark: raw.text(8),
            num_studies: raw.number(9),
            min_value: raw.number(10),
            max_value: raw.number(11),
            degrees_freedom: raw.number(12),
            lower_err_bound: raw.number(13),
            upper_err_bound: raw.number(14),
            statistical_comments: raw.text(15),
            confidence_code: raw.text(16),
        }
    }
}

/// NUTR_DEF: nutrient definition
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientDefinition {
    pub nutrient_id: String,
    pub units: String,
    pub tagname: String,
    pub descrip: String,
    pub decimal_places: String,
    pub sr_sort_order: String,
}

impl NndbRecord for NutrientDefinition {
    const FILE: &'static str = files::NUTR_DEF;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            nutrient_id: raw.text(0),
            units: normalize_units(raw.field(1)),
            tagname: raw.text(2),
            descrip: raw.text(3),
            decimal_places: raw.text(4),
            sr_sort_order: raw.text(5),
        }
    }
}

/// Map unit spellings onto the abbreviations used in documents
///
/// Resulting units are mcg, mg, g, IU, kcal and kJ. The micro sign may
/// arrive decoded (`µg`) or as a replacement character when a file was
/// re-encoded upstream.
pub fn normalize_units(units: &str) -> String {
    match units {
        "\u{b5}g" | "\u{fffd}g" => "mcg".to_string(),
        other => other.to_string(),
    }
}

/// WEIGHT: household measures
impl NndbRecord for Measure {
    const FILE: &'static str = files::WEIGHT;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            seq: raw.text(1),
            amount: raw.number(2),
            descrip: raw.text(3),
            gram_weight: raw.number(4),
            num_data_points: raw.number(5),
            stddev: raw.number(6),
        }
    }
}

/// FOOTNOTE
impl NndbRecord for Footnote {
    const FILE: &'static str = files::FOOTNOTE;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            footnote_num: raw.text(1),
            footnote_type: raw.text(2),
            nutr_num: raw.text(3),
            text: raw.text(4),
        }
    }
}

/// LANGDESC: LanguaL factor descriptions
impl NndbRecord for LangualEntry {
    const FILE: &'static str = files::LANGDESC;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            code: raw.text(0),
            descrip: raw.text(1),
        }
    }
}

/// LANGUAL: food to LanguaL factor link
#[derive(Debug, Clone, PartialEq)]
pub struct LangualLink {
    pub ndb_num: String,
    pub code: String,
}

impl NndbRecord for LangualLink {
    const FILE: &'static str = files::LANGUAL;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            code: raw.text(1),
        }
    }
}

/// DATA_SRC: literature citation
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub datasrc_id: String,
    pub authors: String,
    pub title: String,
    pub year: String,
    pub journal: String,
    pub vol_city: String,
    pub issue_state: String,
    pub start_page: String,
    pub end_page: String,
}

impl NndbRecord for DataSource {
    const FILE: &'static str = files::DATA_SRC;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            datasrc_id: raw.text(0),
            authors: raw.text(1),
            title: raw.text(2),
            year: raw.text(3),
            journal: raw.text(4),
            vol_city: raw.text(5),
            issue_state: raw.text(6),
            start_page: raw.text(7),
            end_page: raw.text(8),
        }
    }
}

/// DATSRCLN: food/nutrient to citation link
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceLink {
    pub ndb_num: String,
    pub nutr_num: String,
    pub datasrc_id: String,
}

impl NndbRecord for DataSourceLink {
    const FILE: &'static str = files::DATSRCLN;

    fn from_raw(raw: &RawRecord) -> Self {
        Self {
            ndb_num: raw.text(0),
            nutr_num: raw.text(1),
            datasrc_id: raw.text(2),
        }
    }
}
