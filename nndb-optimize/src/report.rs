//! Human-readable solution reports

use crate::engine::{OptEngine, ScoredSolution};
use crate::micros::ALL_MICROS;

/// Separator written between reported solutions
pub fn separator() -> String {
    "=".repeat(78)
}

/// Report lines for one solution
///
/// Score and weighted components, each micronutrient against its RDA and
/// UL, each food in the solution with its calories, then total calories.
pub fn describe(engine: &OptEngine, solution: &ScoredSolution) -> Vec<String> {
    let mut lines = Vec::with_capacity(ALL_MICROS.len() + 8);

    lines.push(format!(
        "Solution with score {:12.4} (vector {})",
        solution.score,
        format_vector(&solution.components)
    ));

    for (m, amt) in ALL_MICROS.iter().zip(&solution.nutrition) {
        lines.push(format!(
            "  NUTR {:<15}: {:8.2} {:<5}, {:8.2}% of RDA {:8.2} (UL {:8.2})",
            m.name,
            amt,
            m.units,
            amt / m.rda * 100.0,
            m.rda,
            m.ul
        ));
    }

    let mut total_calories = 0.0;
    for (idx, amt) in solution.instance.iter().enumerate() {
        if amt.abs() < 0.00001 {
            continue;
        }
        let Some(food) = engine.foods().get(idx) else {
            continue;
        };

        let calories = match engine.entry_calories(idx, *amt) {
            Some(kcal) => {
                total_calories += kcal;
                format!("{:8.2}", kcal)
            }
            None => "?".repeat(8),
        };

        lines.push(format!(
            "  FOOD {:8.2} units ({} cals) of {} (grp {})",
            amt, calories, food.short_descrip, food.food_group_descrip
        ));
    }

    lines.push(format!("Total Calories: {:8.2}", total_calories));
    lines
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&[1.0, -0.25]), "[1.0000, -0.2500]");
        assert_eq!(format_vector(&[]), "[]");
    }

    #[test]
    fn test_separator_width() {
        assert_eq!(separator().len(), 78);
    }
}
