use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::date_key::DateKey;
use super::meal_period::MealPeriod;

/// On-disk shape of a record: exactly three dish lists.
type MealSlots = [Vec<String>; 3];

/// The dishes served on one day, per period.
///
/// Every period is always present; a period with no menu is an empty list.
/// Serialised as a JSON array of three arrays of dish names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MealSlots", into = "MealSlots")]
pub struct MealRecord {
    pub breakfast: Vec<String>,
    pub lunch: Vec<String>,
    pub dinner: Vec<String>,
}

/// Records keyed by date, as returned by one or more page fetches.
pub type MealBatch = BTreeMap<DateKey, MealRecord>;

impl MealRecord {
    pub fn new(breakfast: Vec<String>, lunch: Vec<String>, dinner: Vec<String>) -> Self {
        Self {
            breakfast,
            lunch,
            dinner,
        }
    }

    pub fn period(&self, period: MealPeriod) -> &[String] {
        match period {
            MealPeriod::Breakfast => &self.breakfast,
            MealPeriod::Lunch => &self.lunch,
            MealPeriod::Dinner => &self.dinner,
        }
    }

    pub fn period_mut(&mut self, period: MealPeriod) -> &mut Vec<String> {
        match period {
            MealPeriod::Breakfast => &mut self.breakfast,
            MealPeriod::Lunch => &mut self.lunch,
            MealPeriod::Dinner => &mut self.dinner,
        }
    }

    pub fn is_empty(&self) -> bool {
        MealPeriod::ALL.iter().all(|p| self.period(*p).is_empty())
    }
}

impl From<MealSlots> for MealRecord {
    fn from([breakfast, lunch, dinner]: MealSlots) -> Self {
        Self::new(breakfast, lunch, dinner)
    }
}

impl From<MealRecord> for MealSlots {
    fn from(record: MealRecord) -> Self {
        [record.breakfast, record.lunch, record.dinner]
    }
}

impl fmt::Display for MealRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for period in MealPeriod::ALL {
            writeln!(f, "   {}", period)?;
            for dish in self.period(period) {
                writeln!(f, "    - {}", dish)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dishes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_serializes_as_three_arrays() {
        let record = MealRecord::new(dishes(&["rice", "soup"]), vec![], dishes(&["noodles"]));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"[["rice","soup"],[],["noodles"]]"#);
    }

    #[test]
    fn test_deserialize_requires_three_slots() {
        let parsed: MealRecord = serde_json::from_str(r#"[["a"],["b"],["c"]]"#).unwrap();
        assert_eq!(parsed.period(MealPeriod::Lunch), ["b".to_string()]);

        assert!(serde_json::from_str::<MealRecord>(r#"[["a"],["b"]]"#).is_err());
        assert!(serde_json::from_str::<MealRecord>(r#"[[],[],[],[]]"#).is_err());
    }

    #[test]
    fn test_period_mut_and_is_empty() {
        let mut record = MealRecord::default();
        assert!(record.is_empty());
        record.period_mut(MealPeriod::Dinner).push("kimchi".into());
        assert!(!record.is_empty());
        assert_eq!(record.dinner, dishes(&["kimchi"]));
    }

    #[test]
    fn test_display_lists_periods_in_order() {
        let record = MealRecord::new(dishes(&["toast"]), dishes(&["bibimbap"]), vec![]);
        let output = record.to_string();
        assert_eq!(
            output,
            "   breakfast\n    - toast\n   lunch\n    - bibimbap\n   dinner\n"
        );
    }
}
