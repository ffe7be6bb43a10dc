//! Import statistics
//!
//! Collected while joining and loading; logged at the end of a run and
//! stored as JSON on the run record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attach/orphan counts for one child table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    /// Rows attached to a food document
    pub attached: usize,
    /// Rows whose NDB number has no food
    pub orphaned: usize,
}

impl TableStats {
    pub fn total(&self) -> usize {
        self.attached + self.orphaned
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} read, {} orphaned", self.total(), self.orphaned)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    /// Food documents created
    pub foods: usize,
    /// Foods per survey flag ("" or "Y")
    pub survey: BTreeMap<String, usize>,
    pub measures: TableStats,
    pub langual: TableStats,
    pub footnotes: TableStats,
    pub data_sources: TableStats,
    pub nutrients: TableStats,
    /// Documents removed from the collection before loading
    pub removed: u64,
    /// Documents written to the collection
    pub inserted: u64,
}

impl ImportStats {
    /// Total child rows dropped because their food does not exist
    pub fn orphans(&self) -> usize {
        self.measures.orphaned
            + self.langual.orphaned
            + self.footnotes.orphaned
            + self.data_sources.orphaned
            + self.nutrients.orphaned
    }

    /// Survey histogram lines, e.g. `     Y:         1234`
    pub fn survey_lines(&self) -> Vec<String> {
        self.survey
            .iter()
            .map(|(flag, count)| format!("{:>4}: {:>12}", flag, count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphans_sum() {
        let stats = ImportStats {
            measures: TableStats { attached: 3, orphaned: 1 },
            nutrients: TableStats { attached: 10, orphaned: 2 },
            ..Default::default()
        };
        assert_eq!(stats.orphans(), 3);
        assert_eq!(stats.nutrients.total(), 12);
    }

    #[test]
    fn test_survey_lines_format() {
        let mut stats = ImportStats::default();
        stats.survey.insert(String::new(), 5);
        stats.survey.insert("Y".to_string(), 12);

        let lines = stats.survey_lines();
        assert_eq!(lines[0], "    :            5");
        assert_eq!(lines[1], "   Y:           12");
    }
}
