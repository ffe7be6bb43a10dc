//! Denormalized food document models
//!
//! One `FoodDocument` per food description, embedding every nutrient value,
//! weight, LanguaL factor and footnote that references it.

use serde::{Deserialize, Serialize};

/// Nutrient number for energy in kcal
pub const ENERGY_KCAL_ID: &str = "208";

/// Nutrient number for total sugars in grams
pub const SUGARS_ID: &str = "269";

/// Survey flag value for foods used in FNDDS (nutrient data should be complete)
pub const SURVEY_COMPLETE: &str = "Y";

/// A food with all of its related records embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDocument {
    /// NDB number
    #[serde(rename = "_id")]
    pub id: String,
    pub ndb_num: String,
    pub food_group_code: String,
    pub food_group_descrip: String,
    pub descrip: String,
    pub short_descrip: String,
    pub common_name: String,
    pub mfg_name: String,
    /// "Y" when the food is used in FNDDS
    pub survey: String,
    /// Description of inedible parts (seed, bone, etc)
    pub refuse_descrip: String,
    /// Percentage of refuse
    pub refuse: Option<f64>,
    pub scientific_name: String,
    /// Factor for nitrogen to protein
    pub n_factor: Option<f64>,
    pub protein_factor: Option<f64>,
    pub fat_factor: Option<f64>,
    pub carb_factor: Option<f64>,
    #[serde(default)]
    pub nutrients: Vec<NutrientEntry>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub langual_entries: Vec<LangualEntry>,
    #[serde(default)]
    pub footnotes: Vec<FootnoteEntry>,
}

impl FoodDocument {
    /// Nutrient value per 100 g edible portion, if the food reports it
    pub fn nutrient_value(&self, nutrient_id: &str) -> Option<f64> {
        self.nutrients
            .iter()
            .find(|n| n.nutrient_id == nutrient_id)
            .and_then(|n| n.nutrient_val)
    }

    /// True when the survey flag marks the nutrient data as complete
    pub fn is_survey_complete(&self) -> bool {
        self.survey == SURVEY_COMPLETE
    }
}

/// One nutrient measurement, enriched with its definition and code descriptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientEntry {
    pub ndb_num: String,
    pub nutrient_id: String,
    /// Amount in 100 g edible portion
    pub nutrient_val: Option<f64>,
    pub data_point_count: Option<f64>,
    /// Null when fewer than 3 data points
    pub std_error: Option<f64>,
    pub source_code: String,
    pub source_descrip: String,
    pub derivation_code: String,
    pub derivation_descrip: String,
    /// Item used to calculate a missing value
    pub ref_ndb_num: String,
    /// Used for fortified cereals
    pub add_nutrition_mark: String,
    pub num_studies: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub degrees_freedom: Option<f64>,
    pub lower_err_bound: Option<f64>,
    pub upper_err_bound: Option<f64>,
    pub statistical_comments: String,
    pub confidence_code: String,

    // From NUTR_DEF
    pub units: String,
    /// INFOODS tag
    pub tagname: String,
    #[serde(rename = "descrip")]
    pub nutrient_descrip: String,
    pub decimal_places: String,
    pub sr_sort_order: String,
}

/// Household measure and its gram weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub ndb_num: String,
    pub seq: String,
    pub amount: Option<f64>,
    pub descrip: String,
    pub gram_weight: Option<f64>,
    pub num_data_points: Option<f64>,
    pub stddev: Option<f64>,
}

/// LanguaL thesaurus factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangualEntry {
    pub code: String,
    pub descrip: String,
}

/// Footnotes and data-source citations share one list, told apart by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FootnoteEntry {
    Footnote(Footnote),
    DataSource(DataSourceNote),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub ndb_num: String,
    pub footnote_num: String,
    pub footnote_type: String,
    pub nutr_num: String,
    pub text: String,
}

/// A DATSRCLN link merged with its DATA_SRC citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceNote {
    pub ndb_num: String,
    pub nutr_num: String,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> FoodDocument {
        FoodDocument {
            id: "01001".to_string(),
            ndb_num: "01001".to_string(),
            food_group_code: "0100".to_string(),
            food_group_descrip: "Dairy and Egg Products".to_string(),
            descrip: "Butter, salted".to_string(),
            short_descrip: "BUTTER,WITH SALT".to_string(),
            common_name: String::new(),
            mfg_name: String::new(),
            survey: "Y".to_string(),
            refuse_descrip: String::new(),
            refuse: Some(0.0),
            scientific_name: String::new(),
            n_factor: Some(6.38),
            protein_factor: Some(4.27),
            fat_factor: Some(8.79),
            carb_factor: Some(3.87),
            nutrients: vec![NutrientEntry {
                ndb_num: "01001".to_string(),
                nutrient_id: "208".to_string(),
                nutrient_val: Some(717.0),
                data_point_count: Some(0.0),
                std_error: None,
                source_code: "4".to_string(),
                source_descrip: "Calculated".to_string(),
                derivation_code: "NC".to_string(),
                derivation_descrip: "Calculated".to_string(),
                ref_ndb_num: String::new(),
                add_nutrition_mark: String::new(),
                num_studies: None,
                min_value: None,
                max_value: None,
                degrees_freedom: None,
                lower_err_bound: None,
                upper_err_bound: None,
                statistical_comments: String::new(),
                confidence_code: String::new(),
                units: "kcal".to_string(),
                tagname: "ENERC_KCAL".to_string(),
                nutrient_descrip: "Energy".to_string(),
                decimal_places: "0".to_string(),
                sr_sort_order: "300".to_string(),
            }],
            measures: vec![],
            langual_entries: vec![],
            footnotes: vec![FootnoteEntry::Footnote(Footnote {
                ndb_num: "01001".to_string(),
                footnote_num: "01".to_string(),
                footnote_type: "D".to_string(),
                nutr_num: String::new(),
                text: "Salted".to_string(),
            })],
        }
    }

    #[test]
    fn test_nutrient_value_lookup() {
        let doc = sample_doc();
        assert_eq!(doc.nutrient_value(ENERGY_KCAL_ID), Some(717.0));
        assert_eq!(doc.nutrient_value(SUGARS_ID), None);
        assert!(doc.is_survey_complete());
    }

    #[test]
    fn test_document_json_shape() {
        let json = serde_json::to_value(sample_doc()).unwrap();
        assert_eq!(json["_id"], "01001");
        assert_eq!(json["footnotes"][0]["type"], "footnote");
        assert_eq!(json["nutrients"][0]["units"], "kcal");
        // NUTR_DEF fields are embedded under their own names
        assert_eq!(json["nutrients"][0]["descrip"], "Energy");
        assert!(json["nutrients"][0].get("nutrient_descrip").is_none());
        assert_eq!(json["nutrients"][0]["tagname"], "ENERC_KCAL");
        assert_eq!(json["refuse"], 0.0);
        assert!(json["nutrients"][0]["std_error"].is_null());
    }

    #[test]
    fn test_data_source_tag() {
        let note = FootnoteEntry::DataSource(DataSourceNote {
            ndb_num: "01001".to_string(),
            nutr_num: "203".to_string(),
            datasrc_id: "S1".to_string(),
            authors: "Doe".to_string(),
            title: "Butter".to_string(),
            year: "1999".to_string(),
            journal: String::new(),
            vol_city: String::new(),
            issue_state: String::new(),
            start_page: String::new(),
            end_page: String::new(),
        });

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "data-source");

        let back: FootnoteEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }
}
