use crate::models::{Lang, MainButton, Meal, MealsToday, Profile, WaterToday};

pub const MAIN_BUTTON_COLOR: &str = "#EA9CAF";

const DONE: &str = "✅";
const MISSED: &str = "—";

fn meal_icon(meal: Meal) -> &'static str {
    match meal {
        Meal::Breakfast => "🥣",
        Meal::Lunch => "🍲",
        Meal::Dinner => "🍽️",
        Meal::Snack => "🍎",
    }
}

/// Three-line daily summary handed to the host bridge.
pub fn compose_report(water: &WaterToday, meals: &MealsToday, profile: &Profile) -> String {
    let marks = Meal::ALL
        .into_iter()
        .map(|meal| {
            let mark = if meals.is_marked(meal) { DONE } else { MISSED };
            format!("{} {mark}", meal_icon(meal))
        })
        .collect::<Vec<_>>()
        .join(" ");

    let goal = profile.water_goal_ml;
    let lines = match profile.lang {
        Lang::Ru => [
            "🐰 Lumo — отчёт за сегодня".to_string(),
            format!("Вода: {} мл / {goal} мл", water.ml),
            format!("Приёмы пищи: {marks}"),
        ],
        Lang::En => [
            "🐰 Lumo — today's report".to_string(),
            format!("Water: {} ml / {goal} ml", water.ml),
            format!("Meals: {marks}"),
        ],
    };
    lines.join("\n")
}

pub fn main_button(lang: Lang) -> MainButton {
    let text = match lang {
        Lang::Ru => "Сохранить прогресс",
        Lang::En => "Save progress",
    };
    MainButton {
        text: text.to_string(),
        color: MAIN_BUTTON_COLOR.to_string(),
        is_visible: true,
        is_active: true,
    }
}
