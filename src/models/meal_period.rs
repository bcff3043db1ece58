use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three daily serving slots, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealPeriod {
    /// All periods in the order they are stored and rendered.
    pub const ALL: [MealPeriod; 3] = [MealPeriod::Breakfast, MealPeriod::Lunch, MealPeriod::Dinner];

    /// Position of this period inside a stored record.
    pub fn index(self) -> usize {
        match self {
            MealPeriod::Breakfast => 0,
            MealPeriod::Lunch => 1,
            MealPeriod::Dinner => 2,
        }
    }
}

impl fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealPeriod::Breakfast => write!(f, "breakfast"),
            MealPeriod::Lunch => write!(f, "lunch"),
            MealPeriod::Dinner => write!(f, "dinner"),
        }
    }
}

impl FromStr for MealPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealPeriod::Breakfast),
            "lunch" => Ok(MealPeriod::Lunch),
            "dinner" => Ok(MealPeriod::Dinner),
            _ => Err(format!(
                "Invalid meal period '{}'. Valid options: breakfast, lunch, dinner",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_period_display() {
        assert_eq!(format!("{}", MealPeriod::Breakfast), "breakfast");
        assert_eq!(format!("{}", MealPeriod::Lunch), "lunch");
        assert_eq!(format!("{}", MealPeriod::Dinner), "dinner");
    }

    #[test]
    fn test_meal_period_from_str() {
        assert_eq!(
            MealPeriod::from_str("breakfast").unwrap(),
            MealPeriod::Breakfast
        );
        assert_eq!(MealPeriod::from_str("LUNCH").unwrap(), MealPeriod::Lunch);
        assert_eq!(MealPeriod::from_str("Dinner").unwrap(), MealPeriod::Dinner);
        assert!(MealPeriod::from_str("snack").is_err());
        assert!(MealPeriod::from_str("").is_err());
    }

    #[test]
    fn test_all_is_in_index_order() {
        for (i, period) in MealPeriod::ALL.iter().enumerate() {
            assert_eq!(period.index(), i);
        }
    }
}
