//! Food document joiner
//!
//! Builds one denormalized `FoodDocument` per FOOD_DES row and attaches
//! every child row (nutrients, weights, LanguaL factors, footnotes, data
//! source citations) by NDB number. Children are appended in source-file
//! order. A child whose NDB number has no food is dropped and counted as
//! an orphan; a child referencing an unknown code is an error.

use crate::error::{ImportError, ImportResult};
use crate::models::{ImportStats, TableStats};
use crate::readers::{
    files, DataSource, DataSourceLink, FoodDescription, LangualLink, NutrientDefinition,
    NutrientValue,
};
use nndb_common::models::{
    DataSourceNote, FoodDocument, Footnote, FootnoteEntry, LangualEntry, Measure, NutrientEntry,
};
use std::collections::HashMap;

/// Code tables the joiner resolves references against
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    /// FD_GROUP: food group code → description
    pub food_groups: HashMap<String, String>,
    /// LANGDESC: factor code → entry
    pub langual: HashMap<String, LangualEntry>,
    /// SRC_CD: source code → description
    pub source_codes: HashMap<String, String>,
    /// DERIV_CD: derivation code → description
    pub derivation_codes: HashMap<String, String>,
    /// DATA_SRC: citation id → citation
    pub data_sources: HashMap<String, DataSource>,
    /// NUTR_DEF: nutrient number → definition
    pub nutrient_defs: HashMap<String, NutrientDefinition>,
}

/// Accumulates food documents and attaches child rows to them
#[derive(Debug, Default)]
pub struct Joiner {
    docs: Vec<FoodDocument>,
    index: HashMap<String, usize>,
    stats: ImportStats,
}

fn resolve<'a, V>(
    map: &'a HashMap<String, V>,
    key: &str,
    file: &'static str,
    line: usize,
    kind: &'static str,
) -> ImportResult<&'a V> {
    map.get(key).ok_or_else(|| ImportError::UnknownReference {
        file,
        line,
        kind,
        key: key.to_string(),
    })
}

impl Joiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of food documents created so far
    pub fn food_count(&self) -> usize {
        self.docs.len()
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    fn doc_mut(&mut self, ndb_num: &str) -> Option<&mut FoodDocument> {
        let idx = *self.index.get(ndb_num)?;
        self.docs.get_mut(idx)
    }

    /// Create the document for one FOOD_DES row
    pub fn add_food(
        &mut self,
        line: usize,
        food: FoodDescription,
        lookups: &Lookups,
    ) -> ImportResult<()> {
        if self.index.contains_key(&food.ndb_num) {
            return Err(ImportError::DuplicateFood {
                file: files::FOOD_DES,
                line,
                ndb_num: food.ndb_num,
            });
        }

        let food_group_descrip = resolve(
            &lookups.food_groups,
            &food.food_group_code,
            files::FOOD_DES,
            line,
            "food group",
        )?
        .clone();

        *self.stats.survey.entry(food.survey.clone()).or_insert(0) += 1;
        self.stats.foods += 1;

        self.index.insert(food.ndb_num.clone(), self.docs.len());
        self.docs.push(FoodDocument {
            id: food.ndb_num.clone(),
            ndb_num: food.ndb_num,
            food_group_code: food.food_group_code,
            food_group_descrip,
            descrip: food.descrip,
            short_descrip: food.short_descrip,
            common_name: food.common_name,
            mfg_name: food.mfg_name,
            survey: food.survey,
            refuse_descrip: food.refuse_descrip,
            refuse: food.refuse,
            scientific_name: food.scientific_name,
            n_factor: food.n_factor,
            protein_factor: food.protein_factor,
            fat_factor: food.fat_factor,
            carb_factor: food.carb_factor,
            nutrients: Vec::new(),
            measures: Vec::new(),
            langual_entries: Vec::new(),
            footnotes: Vec::new(),
        });

        Ok(())
    }

    /// Attach a WEIGHT row; returns false for an orphan
    pub fn attach_measure(&mut self, measure: Measure) -> bool {
        let attached = match self.doc_mut(&measure.ndb_num) {
            Some(doc) => {
                doc.measures.push(measure);
                true
            }
            None => false,
        };
        self.stats.measures.record(attached);
        attached
    }

    /// Attach the LanguaL description for a LANGUAL link
    pub fn attach_langual(
        &mut self,
        line: usize,
        link: LangualLink,
        lookups: &Lookups,
    ) -> ImportResult<bool> {
        let entry = resolve(&lookups.langual, &link.code, files::LANGUAL, line, "LanguaL code")?;

        let attached = match self.doc_mut(&link.ndb_num) {
            Some(doc) => {
                doc.langual_entries.push(entry.clone());
                true
            }
            None => false,
        };
        self.stats.langual.record(attached);
        Ok(attached)
    }

    /// Attach a FOOTNOTE row
    pub fn attach_footnote(&mut self, footnote: Footnote) -> bool {
        let attached = match self.doc_mut(&footnote.ndb_num) {
            Some(doc) => {
                doc.footnotes.push(FootnoteEntry::Footnote(footnote));
                true
            }
            None => false,
        };
        self.stats.footnotes.record(attached);
        attached
    }

    /// Attach a DATSRCLN row merged with its DATA_SRC citation
    pub fn attach_data_source(
        &mut self,
        line: usize,
        link: DataSourceLink,
        lookups: &Lookups,
    ) -> ImportResult<bool> {
        let source = resolve(
            &lookups.data_sources,
            &link.datasrc_id,
            files::DATSRCLN,
            line,
            "data source",
        )?;

        let note = DataSourceNote {
            ndb_num: link.ndb_num,
            nutr_num: link.nutr_num,
            datasrc_id: link.datasrc_id,
            authors: source.authors.clone(),
            title: source.title.clone(),
            year: source.year.clone(),
            journal: source.journal.clone(),
            vol_city: source.vol_city.clone(),
            issue_state: source.issue_state.clone(),
            start_page: source.start_page.clone(),
            end_page: source.end_page.clone(),
        };

        let attached = match self.doc_mut(&note.ndb_num) {
            Some(doc) => {
                doc.footnotes.push(FootnoteEntry::DataSource(note));
                true
            }
            None => false,
        };
        self.stats.data_sources.record(attached);
        Ok(attached)
    }

    /// Attach a NUT_DATA row enriched with its definition and code descriptions
    pub fn attach_nutrient(
        &mut self,
        line: usize,
        value: NutrientValue,
        lookups: &Lookups,
    ) -> ImportResult<bool> {
        let source_descrip = resolve(
            &lookups.source_codes,
            &value.source_code,
            files::NUT_DATA,
            line,
            "source code",
        )?
        .clone();
        let derivation_descrip = resolve(
            &lookups.derivation_codes,
            &value.derivation_code,
            files::NUT_DATA,
            line,
            "derivation code",
        )?
        .clone();
        let def = resolve(
            &lookups.nutrient_defs,
            &value.nutrient_id,
            files::NUT_DATA,
            line,
            "nutrient",
        )?;

        let entry = NutrientEntry {
            ndb_num: value.ndb_num,
            nutrient_id: value.nutrient_id,
            nutrient_val: value.nutrient_val,
            data_point_count: value.data_point_count,
            std_error: value.std_error,
            source_code: value.source_code,
            source_descrip,
            derivation_code: value.derivation_code,
            derivation_descrip,
            ref_ndb_num: value.ref_ndb_num,
            add_nutrition_mark: value.add_nutrition_mark,
            num_studies: value.num_studies,
            min_value: value.min_value,
            max_value: value.max_value,
            degrees_freedom: value.degrees_freedom,
            lower_err_bound: value.lower_err_bound,
            upper_err_bound: value.upper_err_bound,
            statistical_comments: value.statistical_comments,
            confidence_code: value.confidence_code,
            units: def.units.clone(),
            tagname: def.tagname.clone(),
            nutrient_descrip: def.descrip.clone(),
            decimal_places: def.decimal_places.clone(),
            sr_sort_order: def.sr_sort_order.clone(),
        };

        let attached = match self.doc_mut(&entry.ndb_num) {
            Some(doc) => {
                doc.nutrients.push(entry);
                true
            }
            None => false,
        };
        self.stats.nutrients.record(attached);
        Ok(attached)
    }

    /// Consume the joiner, yielding documents in FOOD_DES order
    pub fn finish(self) -> (Vec<FoodDocument>, ImportStats) {
        (self.docs, self.stats)
    }
}

impl TableStats {
    fn record(&mut self, attached: bool) {
        if attached {
            self.attached += 1;
        } else {
            self.orphaned += 1;
        }
    }
}
