//! Day-boundary reset for per-day accumulators.
//!
//! The check runs when the app is activated, never on a timer: a session left
//! open across midnight keeps the old day until the next activation.

use crate::models::{MealsToday, WaterToday};
use chrono::{Local, NaiveDate};

pub trait DailyState: Sized {
    fn date(&self) -> NaiveDate;

    /// Fresh state for `today`, carrying over whatever survives a new day.
    fn reset_for(&self, today: NaiveDate) -> Self;
}

impl DailyState for WaterToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn reset_for(&self, today: NaiveDate) -> Self {
        Self {
            date: today,
            ml: 0,
            step: self.step,
        }
    }
}

impl DailyState for MealsToday {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn reset_for(&self, today: NaiveDate) -> Self {
        MealsToday::new(today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover<T> {
    pub state: T,
    pub rolled: bool,
}

pub fn roll_over<T: DailyState>(state: T, today: NaiveDate) -> Rollover<T> {
    if state.date() == today {
        return Rollover {
            state,
            rolled: false,
        };
    }
    Rollover {
        state: state.reset_for(today),
        rolled: true,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    #[test]
    fn water_from_yesterday_resets_and_keeps_step() {
        let today = day();
        let stored = WaterToday {
            date: today - Duration::days(1),
            ml: 1500,
            step: 250,
        };
        let result = roll_over(stored, today);
        assert!(result.rolled);
        assert_eq!(
            result.state,
            WaterToday {
                date: today,
                ml: 0,
                step: 250
            }
        );
    }

    #[test]
    fn custom_step_survives_rollover() {
        let today = day();
        let stored = WaterToday {
            date: today - Duration::days(9),
            ml: 400,
            step: 330,
        };
        assert_eq!(roll_over(stored, today).state.step, 330);
    }

    #[test]
    fn same_day_is_unchanged() {
        let stored = WaterToday {
            date: day(),
            ml: 1250,
            step: 200,
        };
        let result = roll_over(stored.clone(), day());
        assert!(!result.rolled);
        assert_eq!(result.state, stored);
    }

    #[test]
    fn meals_reset_independently_of_water() {
        let today = day();
        let meals = MealsToday {
            date: today - Duration::days(1),
            breakfast: true,
            lunch: true,
            dinner: false,
            snack: true,
        };
        let water = WaterToday {
            date: today,
            ml: 500,
            step: 250,
        };

        let meals = roll_over(meals, today);
        let water = roll_over(water, today);
        assert!(meals.rolled);
        assert_eq!(meals.state, MealsToday::new(today));
        assert!(!water.rolled);
        assert_eq!(water.state.ml, 500);
    }

    #[test]
    fn future_dated_state_also_resets() {
        let today = day();
        let meals = MealsToday {
            date: today + Duration::days(1),
            breakfast: true,
            lunch: false,
            dinner: false,
            snack: false,
        };
        assert_eq!(roll_over(meals, today).state, MealsToday::new(today));
    }
}
