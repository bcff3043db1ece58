mod date_key;
mod meal_period;
mod meal_record;

pub use date_key::DateKey;
pub use meal_period::MealPeriod;
pub use meal_record::{MealBatch, MealRecord};
