use crate::models::{Tip, Topic};
use chrono::{Datelike, NaiveDate};

const TIPS: [(&str, &str); 3] = [
    (
        "Совет дня",
        "Начни день со стакана воды: это ускорит пробуждение и поможет контролировать аппетит.",
    ),
    (
        "Совет дня",
        "Не бойся углеводов: цельные крупы и фрукты дают энергию и клетчатку.",
    ),
    (
        "Совет дня",
        "Если отекаешь, проверь соль: уменьшение соли часто даёт быстрый эффект.",
    ),
];

const TOPICS: [(&str, &str, &str); 8] = [
    ("water", "Вода", "💧🐰"),
    ("protein", "Белки", "🏋️🐰"),
    ("fat", "Жиры", "🥑🐰"),
    ("carb", "Углеводы", "🍞🐰"),
    ("when", "Когда есть", "⏰🐰"),
    ("how", "Как считать еду", "📏🐰"),
    ("cheat", "Читмил", "🍔🐰"),
    ("edema", "Отеки", "🧂🐰"),
];

pub fn tip_index(date: NaiveDate, len: usize) -> usize {
    let key = i64::from(date.year()) * 1000 + i64::from(date.month0()) * 50 + i64::from(date.day());
    key.rem_euclid(len as i64) as usize
}

pub fn tip_of_the_day(date: NaiveDate) -> Tip {
    let (title, body) = TIPS[tip_index(date, TIPS.len())];
    Tip {
        title: title.to_string(),
        body: body.to_string(),
    }
}

pub fn topics() -> Vec<Topic> {
    TOPICS
        .iter()
        .map(|(key, title, icon)| Topic {
            key: key.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
        })
        .collect()
}
