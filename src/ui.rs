use crate::handlers::Snapshot;
use crate::models::{Goal, Lang, MainButton, Meal, Tab, Tip, Topic};
use crate::mood::Mood;
use crate::progress::Ring;

pub const PROGRESS_COLOR: &str = "#C2DC80";

pub struct PageView {
    pub snapshot: Snapshot,
    pub ratio: f64,
    pub water_mood: Mood,
    pub mood: Mood,
    pub tip: Tip,
    pub topics: Vec<Topic>,
    pub main_button: MainButton,
}

pub fn render_index(view: &PageView) -> String {
    let snapshot = &view.snapshot;
    fill(INDEX_HTML, |key| {
        let value = match key {
            "TAB" => snapshot.tab.as_str().to_string(),
            "TABS" => render_tabs(snapshot.tab),
            "WATER_MOOD" => view.water_mood.glyph().to_string(),
            "MOOD" => view.mood.glyph().to_string(),
            "RING" => Ring::default().render_svg(view.ratio, PROGRESS_COLOR),
            "ML" => snapshot.water.ml.to_string(),
            "GOAL" => snapshot.profile.water_goal_ml.to_string(),
            "STEP" => snapshot.water.step.to_string(),
            "TIP_TITLE" => escape_html(&view.tip.title),
            "TIP_BODY" => escape_html(&view.tip.body),
            "MEALS" => render_meals(snapshot),
            "TOPICS" => render_topics(&view.topics),
            "NAME" => escape_html(&snapshot.profile.name),
            "GOAL_OPTIONS" => render_goal_options(snapshot.profile.goal),
            "LANG_OPTIONS" => render_lang_options(snapshot.profile.lang),
            "BUTTON_TEXT" => escape_html(&view.main_button.text),
            "BUTTON_COLOR" => escape_html(&view.main_button.color),
            "PROGRESS_COLOR" => PROGRESS_COLOR.to_string(),
            _ => return None,
        };
        Some(value)
    })
}

/// Substitutes `{{KEY}}` markers in one pass. Inserted values are never
/// rescanned; unknown markers are kept as written.
fn fill(template: &str, mut value_for: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match value_for(key) {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Dashboard => "Главная",
        Tab::Meals => "Питание",
        Tab::Knowledge => "Знания",
        Tab::Profile => "Профиль",
    }
}

fn meal_label(meal: Meal) -> &'static str {
    match meal {
        Meal::Breakfast => "Завтрак",
        Meal::Lunch => "Обед",
        Meal::Dinner => "Ужин",
        Meal::Snack => "Перекус",
    }
}

fn render_tabs(active: Tab) -> String {
    Tab::ALL
        .into_iter()
        .map(|tab| {
            let class = if tab == active { "tab active" } else { "tab" };
            format!(
                r#"<button class="{class}" type="button" data-tab="{tab}">{}</button>"#,
                tab_label(tab)
            )
        })
        .collect()
}

fn render_meals(snapshot: &Snapshot) -> String {
    Meal::ALL
        .into_iter()
        .map(|meal| {
            let mark = if snapshot.meals.is_marked(meal) { " ✅" } else { "" };
            format!(
                r#"<button class="meal meal-{name}" type="button" data-meal="{name}">{}<span class="mark">{mark}</span></button>"#,
                meal_label(meal),
                name = meal.as_str(),
            )
        })
        .collect()
}

fn render_topics(topics: &[Topic]) -> String {
    topics
        .iter()
        .map(|topic| {
            format!(
                concat!(
                    r#"<details class="topic" data-topic="{}"><summary><span class="icon">{}</span>"#,
                    r#"<span>{}</span></summary><p>Статья появится позже.</p></details>"#
                ),
                escape_html(&topic.key),
                escape_html(&topic.icon),
                escape_html(&topic.title),
            )
        })
        .collect()
}

fn render_goal_options(selected: Goal) -> String {
    [
        (Goal::Loss, "loss", "Похудение"),
        (Goal::Gain, "gain", "Набор"),
        (Goal::Balance, "balance", "Баланс"),
    ]
    .into_iter()
    .map(|(goal, value, label)| option(value, label, goal == selected))
    .collect()
}

fn render_lang_options(selected: Lang) -> String {
    [(Lang::Ru, "ru", "Русский"), (Lang::En, "en", "English")]
        .into_iter()
        .map(|(lang, value, label)| option(value, label, lang == selected))
        .collect()
}

fn option(value: &str, label: &str, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(r#"<option value="{value}"{selected}>{label}</option>"#)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ru">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Lumo</title>
  <script src="https://telegram.org/js/telegram-web-app.js"></script>
  <style>
    :root {
      --tg-bg: #F3EEF1;
      --tg-text: #121212;
      --pink: #EA9CAF;
      --berry: #B5577A;
      --green: #C2DC80;
      --card: #ffffff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--tg-bg);
      color: var(--tg-text);
      font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
      padding: 12px 16px 32px;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 12px;
    }

    header .brand {
      font-size: 1.1rem;
      font-weight: 600;
    }

    header .subtitle {
      font-size: 0.85rem;
      opacity: 0.6;
    }

    .tabs {
      display: flex;
      gap: 8px;
      margin-bottom: 16px;
      flex-wrap: wrap;
    }

    .tab {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      background: white;
      color: rgba(0, 0, 0, 0.8);
      cursor: pointer;
    }

    .tab.active {
      background: var(--berry);
      color: white;
    }

    .panel {
      display: none;
      background: var(--card);
      border-radius: 18px;
      padding: 16px;
      box-shadow: 0 6px 18px rgba(0, 0, 0, 0.06);
    }

    .panel.active {
      display: grid;
      gap: 12px;
    }

    .center {
      display: flex;
      flex-direction: column;
      align-items: center;
      gap: 8px;
    }

    .mascot {
      font-size: 3rem;
    }

    .amount {
      font-size: 1.25rem;
      font-weight: 600;
    }

    .primary {
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      background: var(--pink);
      color: white;
      font-weight: 500;
      cursor: pointer;
    }

    .link {
      border: none;
      background: none;
      text-decoration: underline;
      opacity: 0.6;
      cursor: pointer;
    }

    .tip {
      display: flex;
      gap: 12px;
      padding: 12px;
      border-radius: 12px;
      background: #C2DC8033;
      font-size: 0.9rem;
    }

    .meals {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
      width: 100%;
    }

    .meal {
      border: none;
      border-radius: 18px;
      padding: 16px;
      font-weight: 600;
      color: white;
      cursor: pointer;
    }

    .meal-breakfast { background: var(--pink); }
    .meal-lunch { background: var(--berry); }
    .meal-dinner { background: var(--green); color: black; }
    .meal-snack { background: white; color: black; border: 1px solid rgba(0, 0, 0, 0.1); }

    .topic {
      border: 1px solid rgba(0, 0, 0, 0.1);
      border-radius: 12px;
      padding: 12px;
    }

    .topic summary {
      display: flex;
      gap: 8px;
      align-items: center;
      cursor: pointer;
    }

    .topic p {
      font-size: 0.9rem;
      opacity: 0.75;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
    }

    input, select {
      padding: 10px;
      border-radius: 12px;
      border: 1px solid rgba(0, 0, 0, 0.15);
      font-size: 1rem;
    }

    .grid-2 {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    .hint {
      font-size: 0.85rem;
      opacity: 0.6;
    }
  </style>
</head>
<body data-tab="{{TAB}}">
  <header>
    <div class="brand">Lumo</div>
    <div class="subtitle">Нутри-ассистент</div>
  </header>

  <nav class="tabs">{{TABS}}</nav>

  <section class="panel" data-panel="dashboard">
    <div class="center">
      <div class="mascot" id="water-mood">{{WATER_MOOD}}</div>
      <div class="hint">Вода за сегодня</div>
      <div id="ring">{{RING}}</div>
      <div class="amount"><span id="ml">{{ML}}</span> / <span id="goal">{{GOAL}}</span> мл</div>
      <button class="primary" id="add-water" type="button">+ Стакан (+<span id="step">{{STEP}}</span> мл)</button>
      <button class="link" type="button" data-goto="profile">Настроить шаг и цель</button>
    </div>
    <div class="tip">
      <div class="mascot" style="font-size: 1.5rem">👍🐰</div>
      <div>
        <strong>{{TIP_TITLE}}</strong>
        <div>{{TIP_BODY}}</div>
      </div>
    </div>
  </section>

  <section class="panel" data-panel="meals">
    <div class="center">
      <div class="mascot" id="mood">{{MOOD}}</div>
      <div class="meals">{{MEALS}}</div>
      <div class="hint">Пропустила приём? Нажми ещё раз, чтобы снять отметку.</div>
    </div>
  </section>

  <section class="panel" data-panel="knowledge">{{TOPICS}}</section>

  <section class="panel" data-panel="profile">
    <label>Имя
      <input id="name" value="{{NAME}}" />
    </label>
    <div class="grid-2">
      <label>Цель
        <select id="goal-select">{{GOAL_OPTIONS}}</select>
      </label>
      <label>Шаг стакана (мл)
        <input id="step-input" type="number" value="{{STEP}}" />
      </label>
      <label>Дневная цель воды (мл)
        <input id="goal-input" type="number" value="{{GOAL}}" />
      </label>
      <label>Язык
        <select id="lang-select">{{LANG_OPTIONS}}</select>
      </label>
    </div>
  </section>

  <script>
    const tg = window.Telegram ? window.Telegram.WebApp : null;
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const panels = Array.from(document.querySelectorAll('.panel'));

    const api = async (method, path, body) => {
      const res = await fetch(path, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error(await res.text());
      }
      return res.json();
    };

    const showTab = (tab) => {
      document.body.dataset.tab = tab;
      tabs.forEach((button) => button.classList.toggle('active', button.dataset.tab === tab));
      panels.forEach((panel) => panel.classList.toggle('active', panel.dataset.panel === tab));
    };

    const selectTab = (tab) => {
      showTab(tab);
      api('PUT', '/api/tab', { tab }).catch(console.error);
    };

    const ringSvg = (ratio) => {
      const size = 180;
      const stroke = 16;
      const r = (size - stroke) / 2;
      const c = 2 * Math.PI * r;
      const dash = Math.max(0, Math.min(1, ratio)) * c;
      return `<svg class="ring" width="${size}" height="${size}" viewBox="0 0 ${size} ${size}">` +
        `<circle cx="90" cy="90" r="${r}" stroke="#ffffff55" stroke-width="${stroke}" fill="none" />` +
        `<circle cx="90" cy="90" r="${r}" stroke="{{PROGRESS_COLOR}}" stroke-width="${stroke}" fill="none" ` +
        `stroke-linecap="round" stroke-dasharray="${dash.toFixed(2)} ${(c - dash).toFixed(2)}" transform="rotate(-90 90 90)" />` +
        `<text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" font-size="20" fill="currentColor">${Math.round(ratio * 100)}%</text></svg>`;
    };

    const renderWater = (data) => {
      document.getElementById('ml').textContent = data.water.ml;
      document.getElementById('step').textContent = data.water.step;
      document.getElementById('ring').innerHTML = ringSvg(data.progress.ratio);
      document.getElementById('water-mood').textContent = data.water_mood.glyph;
    };

    const renderMeals = (meals) => {
      document.querySelectorAll('.meal').forEach((button) => {
        button.querySelector('.mark').textContent = meals[button.dataset.meal] ? ' ✅' : '';
      });
    };

    const applyMainButton = (params) => {
      if (!tg) {
        return;
      }
      tg.MainButton.setParams({
        text: params.text,
        color: params.color,
        is_active: params.is_active,
        is_visible: params.is_visible
      });
    };

    const refresh = async () => {
      const state = await api('GET', '/api/state');
      applyMainButton(state.main_button);
      renderWater(state);
      renderMeals(state.meals);
      document.getElementById('goal').textContent = state.profile.water_goal_ml;
      document.getElementById('mood').textContent = state.mood.glyph;
    };

    const pollMood = () => {
      setTimeout(() => {
        api('GET', '/api/mood')
          .then((data) => {
            document.getElementById('mood').textContent = data.mood.glyph;
            if (data.pending) {
              pollMood();
            }
          })
          .catch(console.error);
      }, 500);
    };

    tabs.forEach((button) => button.addEventListener('click', () => selectTab(button.dataset.tab)));
    document.querySelectorAll('[data-goto]').forEach((button) => {
      button.addEventListener('click', () => selectTab(button.dataset.goto));
    });

    document.getElementById('add-water').addEventListener('click', () => {
      api('POST', '/api/water').then(renderWater).catch(console.error);
    });

    document.querySelectorAll('.meal').forEach((button) => {
      button.addEventListener('click', () => {
        api('POST', `/api/meals/${button.dataset.meal}/toggle`)
          .then((data) => {
            renderMeals(data.meals);
            document.getElementById('mood').textContent = data.mood.glyph;
            pollMood();
          })
          .catch(console.error);
      });
    });

    const saveProfile = (patch) => {
      api('PUT', '/api/profile', patch)
        .then((profile) => {
          document.getElementById('goal').textContent = profile.water_goal_ml;
          return refresh();
        })
        .catch(console.error);
    };

    document.getElementById('name').addEventListener('change', (event) => saveProfile({ name: event.target.value }));
    document.getElementById('goal-select').addEventListener('change', (event) => saveProfile({ goal: event.target.value }));
    document.getElementById('lang-select').addEventListener('change', (event) => saveProfile({ lang: event.target.value }));
    document.getElementById('goal-input').addEventListener('change', (event) => {
      saveProfile({ water_goal_ml: event.target.value });
    });
    document.getElementById('step-input').addEventListener('change', (event) => {
      api('PUT', '/api/water/step', { step: event.target.value })
        .then((data) => {
          event.target.value = data.water.step;
          renderWater(data);
        })
        .catch(console.error);
    });

    if (tg) {
      const applyTheme = () => {
        const tp = tg.themeParams || {};
        document.documentElement.style.setProperty('--tg-bg', tp.bg_color || '#F3EEF1');
        document.documentElement.style.setProperty('--tg-text', tp.text_color || '#121212');
      };
      tg.ready();
      tg.expand();
      applyTheme();
      tg.onEvent('themeChanged', applyTheme);
      applyMainButton({
        text: '{{BUTTON_TEXT}}',
        color: '{{BUTTON_COLOR}}',
        is_active: true,
        is_visible: true
      });
      const sendReport = () => {
        api('POST', '/api/report')
          .then((data) => {
            if (data.forward_to_host) {
              tg.sendData(data.text);
            }
          })
          .catch(console.error);
      };
      tg.onEvent('mainButtonClicked', sendReport);
      window.addEventListener('pagehide', () => {
        tg.offEvent('themeChanged', applyTheme);
        tg.offEvent('mainButtonClicked', sendReport);
      });
    }

    showTab(document.body.dataset.tab);
  </script>
</body>
</html>
"##;
