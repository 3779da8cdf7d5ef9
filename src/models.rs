use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const DEFAULT_WATER_GOAL_ML: u32 = 2000;
pub const DEFAULT_STEP_ML: u32 = 250;
pub const MIN_WATER_GOAL_ML: u32 = 500;
pub const MIN_STEP_ML: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    #[default]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Loss,
    Gain,
    #[default]
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ru,
    En,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    pub height: u32,
    pub weight: u32,
    pub goal: Goal,
    pub water_goal_ml: u32,
    pub lang: Lang,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            sex: Sex::Female,
            age: 30,
            height: 170,
            weight: 65,
            goal: Goal::Balance,
            water_goal_ml: DEFAULT_WATER_GOAL_ML,
            lang: Lang::Ru,
        }
    }
}

impl Profile {
    /// Merges the fields present in `update`, clamping numeric input.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(sex) = update.sex {
            self.sex = sex;
        }
        if let Some(age) = update.age {
            self.age = age.clamp_min(0);
        }
        if let Some(height) = update.height {
            self.height = height.clamp_min(0);
        }
        if let Some(weight) = update.weight {
            self.weight = weight.clamp_min(0);
        }
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
        if let Some(water_goal) = update.water_goal_ml {
            self.water_goal_ml = water_goal.clamp_min(MIN_WATER_GOAL_ML);
        }
        if let Some(lang) = update.lang {
            self.lang = lang;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterToday {
    pub date: NaiveDate,
    pub ml: u32,
    pub step: u32,
}

impl WaterToday {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ml: 0,
            step: DEFAULT_STEP_ML,
        }
    }

    pub fn add(&mut self, ml: u32) {
        self.ml = self.ml.saturating_add(ml);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealsToday {
    pub date: NaiveDate,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub snack: bool,
}

impl MealsToday {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: false,
            lunch: false,
            dinner: false,
            snack: false,
        }
    }

    pub fn is_marked(&self, meal: Meal) -> bool {
        match meal {
            Meal::Breakfast => self.breakfast,
            Meal::Lunch => self.lunch,
            Meal::Dinner => self.dinner,
            Meal::Snack => self.snack,
        }
    }

    /// Flips the checkmark and returns its new value.
    pub fn toggle(&mut self, meal: Meal) -> bool {
        let slot = match meal {
            Meal::Breakfast => &mut self.breakfast,
            Meal::Lunch => &mut self.lunch,
            Meal::Dinner => &mut self.dinner,
            Meal::Snack => &mut self.snack,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl Meal {
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner, Meal::Snack];

    pub fn as_str(self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
            Meal::Snack => "snack",
        }
    }
}

impl FromStr for Meal {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Meal::ALL
            .into_iter()
            .find(|meal| meal.as_str() == value.trim())
            .ok_or_else(|| format!("unknown meal '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Meals,
    Knowledge,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Meals, Tab::Knowledge, Tab::Profile];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Meals => "meals",
            Tab::Knowledge => "knowledge",
            Tab::Profile => "profile",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == value.trim())
            .ok_or_else(|| format!("unknown tab '{value}'"))
    }
}

/// Form input that may arrive as a number or as raw text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Empty or non-numeric text reads as zero.
    pub fn value(&self) -> i64 {
        let number = match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(text) => text.trim().parse::<f64>().ok(),
        };
        number
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64)
            .unwrap_or(0)
    }

    pub fn clamp_min(&self, min: u32) -> u32 {
        self.value().clamp(i64::from(min), i64::from(u32::MAX)) as u32
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<NumericInput>,
    pub height: Option<NumericInput>,
    pub weight: Option<NumericInput>,
    pub goal: Option<Goal>,
    pub water_goal_ml: Option<NumericInput>,
    pub lang: Option<Lang>,
}

#[derive(Debug, Deserialize)]
pub struct StepUpdate {
    pub step: NumericInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddWaterRequest {
    pub ml: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainButton {
    pub text: String,
    pub color: String,
    pub is_visible: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tip {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub key: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressView {
    pub ratio: f64,
    pub percent: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodView {
    pub mood: String,
    pub glyph: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub profile: Profile,
    pub water: WaterToday,
    pub meals: MealsToday,
    pub tab: Tab,
    pub progress: ProgressView,
    pub water_mood: MoodView,
    pub mood: MoodView,
    pub tip: Tip,
    pub main_button: MainButton,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaterResponse {
    pub water: WaterToday,
    pub progress: ProgressView,
    pub water_mood: MoodView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealToggleResponse {
    pub meals: MealsToday,
    pub marked: bool,
    pub mood: MoodView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub text: String,
    pub forward_to_host: bool,
}
