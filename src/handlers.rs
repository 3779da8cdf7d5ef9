use crate::errors::AppError;
use crate::models::{
    AddWaterRequest, MIN_STEP_ML, Meal, MealToggleResponse, MealsToday, Profile, ProfileUpdate,
    ReportResponse, StateResponse, StepUpdate, Tab, TabRequest, Topic, WaterResponse, WaterToday,
};
use crate::mood::{Mood, water_mood};
use crate::progress;
use crate::report::compose_report;
use crate::rollover::{roll_over, today};
use crate::state::AppState;
use crate::storage::{MEALS_KEY, PROFILE_KEY, Repository, TAB_KEY, WATER_KEY};
use crate::tips::{tip_of_the_day, topics};
use crate::ui::{PageView, render_index};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::Html,
};
use chrono::{Local, NaiveDate, Timelike};
use serde_json::{Value, json};
use tracing::{debug, info};

/// All four state cells as currently stored.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub profile: Profile,
    pub water: WaterToday,
    pub meals: MealsToday,
    pub tab: Tab,
}

impl Snapshot {
    pub fn read(repo: &Repository, today: NaiveDate) -> Self {
        Self {
            profile: repo.get(PROFILE_KEY, Profile::default()),
            water: repo.get(WATER_KEY, WaterToday::new(today)),
            meals: repo.get(MEALS_KEY, MealsToday::new(today)),
            tab: repo.get(TAB_KEY, Tab::default()),
        }
    }

    pub fn ratio(&self) -> f64 {
        progress::ratio(self.water.ml, self.profile.water_goal_ml)
    }
}

/// Reads every cell and applies the day rollover to water and meals, each
/// checked and written on its own.
pub async fn activate(repo: &mut Repository, today: NaiveDate) -> Snapshot {
    let mut snapshot = Snapshot::read(repo, today);

    let water = roll_over(snapshot.water, today);
    if water.rolled {
        info!(%today, "water rolled over to a new day");
        repo.set(WATER_KEY, &water.state).await;
    }
    snapshot.water = water.state;

    let meals = roll_over(snapshot.meals, today);
    if meals.rolled {
        info!(%today, "meals rolled over to a new day");
        repo.set(MEALS_KEY, &meals.state).await;
    }
    snapshot.meals = meals.state;

    snapshot
}

fn current_water_mood(ratio: f64) -> Mood {
    water_mood(ratio, Local::now().hour())
}

/// Mood shown before any meal is marked, from today's water progress.
/// Stale water counts as a fresh day without writing anything.
pub fn opening_mood(repo: &Repository, today: NaiveDate, hour: u32) -> Mood {
    let snapshot = Snapshot::read(repo, today);
    let water = roll_over(snapshot.water, today).state;
    water_mood(progress::ratio(water.ml, snapshot.profile.water_goal_ml), hour)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let snapshot = {
        let mut repo = state.repo.lock().await;
        activate(&mut repo, today).await
    };
    let ratio = snapshot.ratio();
    let view = PageView {
        water_mood: current_water_mood(ratio),
        mood: state.mood.current(),
        tip: tip_of_the_day(today),
        topics: topics(),
        main_button: state.bridge.main_button(snapshot.profile.lang),
        ratio,
        snapshot,
    };
    Html(render_index(&view))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let today = today();
    let snapshot = {
        let mut repo = state.repo.lock().await;
        activate(&mut repo, today).await
    };
    let ratio = snapshot.ratio();
    Json(StateResponse {
        progress: progress::view(snapshot.water.ml, snapshot.profile.water_goal_ml),
        water_mood: current_water_mood(ratio).view(),
        mood: state.mood.current().view(),
        tip: tip_of_the_day(today),
        main_button: state.bridge.main_button(snapshot.profile.lang),
        profile: snapshot.profile,
        water: snapshot.water,
        meals: snapshot.meals,
        tab: snapshot.tab,
    })
}

/// An empty body means one step. Anything else must be a valid request.
pub fn requested_ml(body: &[u8]) -> Result<Option<u32>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: AddWaterRequest = serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid water request: {err}")))?;
    match request.ml {
        Some(0) => Err(AppError::bad_request("ml must be positive")),
        ml => Ok(ml),
    }
}

pub async fn add_water(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WaterResponse>, AppError> {
    let requested = requested_ml(&body)?;

    let mut repo = state.repo.lock().await;
    let snapshot = Snapshot::read(&repo, today());
    let mut water = snapshot.water;
    let amount = requested.unwrap_or(water.step);
    water.add(amount);
    repo.set(WATER_KEY, &water).await;
    debug!(amount, total = water.ml, "water added");

    Ok(Json(water_response(water, &snapshot.profile)))
}

pub async fn set_step(
    State(state): State<AppState>,
    Json(update): Json<StepUpdate>,
) -> Json<WaterResponse> {
    let mut repo = state.repo.lock().await;
    let snapshot = Snapshot::read(&repo, today());
    let mut water = snapshot.water;
    water.step = update.step.clamp_min(MIN_STEP_ML);
    repo.set(WATER_KEY, &water).await;

    Json(water_response(water, &snapshot.profile))
}

fn water_response(water: WaterToday, profile: &Profile) -> WaterResponse {
    let progress = progress::view(water.ml, profile.water_goal_ml);
    WaterResponse {
        water_mood: current_water_mood(progress.ratio).view(),
        progress,
        water,
    }
}

pub async fn toggle_meal(
    State(state): State<AppState>,
    Path(meal): Path<String>,
) -> Result<Json<MealToggleResponse>, AppError> {
    let meal: Meal = meal.parse().map_err(AppError::not_found)?;

    let mut repo = state.repo.lock().await;
    let snapshot = Snapshot::read(&repo, today());
    let mut meals = snapshot.meals.clone();
    let marked = meals.toggle(meal);
    repo.set(MEALS_KEY, &meals).await;
    drop(repo);

    let mood = state.mood.react(meal, current_water_mood(snapshot.ratio()));
    Ok(Json(MealToggleResponse {
        meals,
        marked,
        mood: mood.view(),
    }))
}

pub async fn get_mood(State(state): State<AppState>) -> Json<Value> {
    let mood = state.mood.current();
    Json(json!({ "mood": mood.view(), "pending": state.mood.is_pending() }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Json<Profile> {
    let mut repo = state.repo.lock().await;
    let mut profile = repo.get(PROFILE_KEY, Profile::default());
    profile.apply(update);
    repo.set(PROFILE_KEY, &profile).await;
    Json(profile)
}

pub async fn set_tab(
    State(state): State<AppState>,
    Json(request): Json<TabRequest>,
) -> Result<Json<Value>, AppError> {
    let tab: Tab = request.tab.parse().map_err(AppError::bad_request)?;
    state.repo.lock().await.set(TAB_KEY, &tab).await;
    Ok(Json(json!({ "tab": tab })))
}

pub async fn knowledge() -> Json<Vec<Topic>> {
    Json(topics())
}

pub async fn send_report(State(state): State<AppState>) -> Json<ReportResponse> {
    let text = {
        let repo = state.repo.lock().await;
        let snapshot = Snapshot::read(&repo, today());
        compose_report(&snapshot.water, &snapshot.meals, &snapshot.profile)
    };
    state.bridge.send_data(text.clone());
    Json(ReportResponse {
        forward_to_host: state.bridge.forwards_to_host(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{HostBridge, RecordingBridge};
    use chrono::Duration;
    use std::sync::Arc;

    #[tokio::test]
    async fn activation_rolls_stale_cells_and_persists() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let yesterday = today - Duration::days(1);
        let mut repo = Repository::in_memory();
        repo.set(
            WATER_KEY,
            &WaterToday {
                date: yesterday,
                ml: 1500,
                step: 250,
            },
        )
        .await;
        let mut meals = MealsToday::new(today);
        meals.toggle(Meal::Lunch);
        repo.set(MEALS_KEY, &meals).await;

        let snapshot = activate(&mut repo, today).await;
        assert_eq!(
            snapshot.water,
            WaterToday {
                date: today,
                ml: 0,
                step: 250
            }
        );
        assert!(snapshot.meals.lunch);

        let stored: WaterToday = repo.get(WATER_KEY, WaterToday::new(yesterday));
        assert_eq!(stored, snapshot.water);
    }

    #[tokio::test]
    async fn fresh_store_uses_defaults() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let mut repo = Repository::in_memory();
        let snapshot = activate(&mut repo, today).await;
        assert_eq!(snapshot.profile, Profile::default());
        assert_eq!(snapshot.water, WaterToday::new(today));
        assert_eq!(snapshot.meals, MealsToday::new(today));
        assert_eq!(snapshot.tab, Tab::Dashboard);
        assert!(repo.keys().is_empty());
    }

    #[test]
    fn snapshot_ratio_is_clamped() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let snapshot = Snapshot {
            profile: Profile::default(),
            water: WaterToday {
                date: today,
                ml: 3000,
                step: 250,
            },
            meals: MealsToday::new(today),
            tab: Tab::Meals,
        };
        assert_eq!(snapshot.ratio(), 1.0);
    }

    #[test]
    fn empty_water_body_means_one_step() {
        assert_eq!(requested_ml(b"").unwrap(), None);
        assert_eq!(requested_ml(b"  \n").unwrap(), None);
        assert_eq!(requested_ml(b"{}").unwrap(), None);
        assert_eq!(requested_ml(br#"{"ml":120}"#).unwrap(), Some(120));
    }

    #[test]
    fn invalid_water_amounts_are_rejected() {
        let bodies: [&[u8]; 4] = [
            br#"{"ml":-100}"#,
            br#"{"ml":"abc"}"#,
            br#"{"ml":0}"#,
            b"not json",
        ];
        for body in bodies {
            let err = requested_ml(body).unwrap_err();
            assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn opening_mood_follows_water_progress() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let mut repo = Repository::in_memory();
        assert_eq!(opening_mood(&repo, today, 10), Mood::Smile);
        assert_eq!(opening_mood(&repo, today, 21), Mood::Sad);

        let mut store = crate::storage::KvStore::default();
        let water = WaterToday {
            date: today,
            ml: 2500,
            step: 250,
        };
        store.set_raw(WATER_KEY, serde_json::to_string(&water).unwrap());
        repo = Repository::new(std::env::temp_dir().join("unused-lumo.json"), store);
        assert_eq!(opening_mood(&repo, today, 21), Mood::Shine);
        // Yesterday's full glass does not count today.
        assert_eq!(opening_mood(&repo, today + Duration::days(1), 21), Mood::Sad);
    }

    struct DirectBridge(RecordingBridge);

    impl HostBridge for DirectBridge {
        fn send_data(&self, text: String) {
            self.0.send_data(text);
        }

        fn forwards_to_host(&self) -> bool {
            false
        }
    }

    fn app_state(bridge: Arc<dyn HostBridge>) -> AppState {
        AppState::new(
            Repository::in_memory(),
            bridge,
            crate::mood::DEFAULT_REVERT_DELAY,
            Mood::Smile,
        )
    }

    #[tokio::test]
    async fn report_leaves_through_page_when_bridge_does_not_deliver() {
        let recorder = RecordingBridge::default();
        let state = app_state(Arc::new(recorder.clone()));

        let Json(report) = send_report(State(state)).await;
        assert!(report.forward_to_host);
        assert_eq!(recorder.sent(), vec![report.text.clone()]);
        assert!(report.text.contains("Вода: 0 мл / 2000 мл"));
    }

    #[tokio::test]
    async fn report_is_not_forwarded_when_bridge_delivers() {
        let recorder = RecordingBridge::default();
        let state = app_state(Arc::new(DirectBridge(recorder.clone())));

        let Json(report) = send_report(State(state)).await;
        assert!(!report.forward_to_host);
        assert_eq!(recorder.sent().len(), 1);
    }

    #[tokio::test]
    async fn state_starts_with_seeded_mood() {
        let state = AppState::new(
            Repository::in_memory(),
            Arc::new(RecordingBridge::default()),
            crate::mood::DEFAULT_REVERT_DELAY,
            Mood::Sad,
        );
        let Json(snapshot) = get_state(State(state)).await;
        assert_eq!(snapshot.mood.mood, "sad");
    }
}
