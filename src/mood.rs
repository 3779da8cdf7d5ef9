//! Mascot mood. Derived from water progress, briefly overridden when a meal
//! is marked, then reverted by a cancellable timer.

use crate::models::{Meal, MoodView};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_millis(1500);

/// Hour of day from which low progress makes the mascot sad.
const EVENING_HOUR: u32 = 19;
const EVENING_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Smile,
    Shine,
    Sad,
    Chef,
    Soup,
    Tea,
    Thumb,
    Shock,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Smile => "smile",
            Mood::Shine => "shine",
            Mood::Sad => "sad",
            Mood::Chef => "chef",
            Mood::Soup => "soup",
            Mood::Tea => "tea",
            Mood::Thumb => "thumb",
            Mood::Shock => "shock",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Mood::Smile => "🐰",
            Mood::Shine => "✨🐰✨",
            Mood::Sad => "🥺🐰",
            Mood::Chef => "🍳🐰",
            Mood::Soup => "🍲🐰",
            Mood::Tea => "🫖🐰",
            Mood::Thumb => "👍🐰",
            Mood::Shock => "😮🐰",
        }
    }

    pub fn view(self) -> MoodView {
        MoodView {
            mood: self.as_str().to_string(),
            glyph: self.glyph().to_string(),
        }
    }
}

pub fn water_mood(ratio: f64, hour: u32) -> Mood {
    if ratio >= 1.0 {
        Mood::Shine
    } else if hour >= EVENING_HOUR && ratio < EVENING_RATIO {
        Mood::Sad
    } else {
        Mood::Smile
    }
}

pub fn meal_mood(meal: Meal) -> Mood {
    match meal {
        Meal::Breakfast => Mood::Chef,
        Meal::Lunch => Mood::Soup,
        Meal::Dinner => Mood::Tea,
        Meal::Snack => Mood::Smile,
    }
}

/// Pending reversion; aborted when dropped.
#[derive(Debug)]
struct Reversion {
    task: Option<JoinHandle<()>>,
}

impl Drop for Reversion {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Mood,
    generation: u64,
    pending: Option<Reversion>,
}

/// Current mood plus at most one scheduled reversion.
///
/// The timer task only holds a weak reference, so dropping the board drops
/// the pending [`Reversion`] and aborts it.
#[derive(Debug)]
pub struct MoodBoard {
    slot: Arc<Mutex<Slot>>,
    delay: Duration,
}

impl MoodBoard {
    pub fn new(initial: Mood, delay: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                current: initial,
                ..Slot::default()
            })),
            delay,
        }
    }

    pub fn current(&self) -> Mood {
        lock(&self.slot).current
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }

    /// Replaces the mood outright, dropping any pending reversion.
    pub fn set(&self, mood: Mood) {
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        slot.pending = None;
        slot.current = mood;
    }

    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        slot.pending = None;
    }

    /// Shows the meal mood now and reverts to `revert_to` after the delay.
    /// Must be called from within a tokio runtime.
    pub fn react(&self, meal: Meal, revert_to: Mood) -> Mood {
        let mood = meal_mood(meal);
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;
        let weak = Arc::downgrade(&self.slot);
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            revert(weak, generation, revert_to);
        });
        slot.current = mood;
        slot.pending = Some(Reversion { task: Some(task) });
        debug!(meal = meal.as_str(), mood = mood.as_str(), "mascot reacting");
        mood
    }
}

fn revert(weak: Weak<Mutex<Slot>>, generation: u64, mood: Mood) {
    let Some(slot) = weak.upgrade() else {
        return;
    };
    let mut slot = lock(&slot);
    if slot.generation != generation {
        return;
    }
    slot.current = mood;
    // Detach our own handle rather than aborting the running task.
    if let Some(mut pending) = slot.pending.take() {
        pending.task.take();
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_mood_thresholds() {
        assert_eq!(water_mood(1.0, 9), Mood::Shine);
        assert_eq!(water_mood(1.0, 22), Mood::Shine);
        assert_eq!(water_mood(0.3, 19), Mood::Sad);
        assert_eq!(water_mood(0.6, 20), Mood::Smile);
        assert_eq!(water_mood(0.3, 18), Mood::Smile);
    }

    #[test]
    fn every_meal_has_a_mood() {
        let moods: Vec<_> = Meal::ALL.into_iter().map(meal_mood).collect();
        assert_eq!(moods, vec![Mood::Chef, Mood::Soup, Mood::Tea, Mood::Smile]);
    }

    #[tokio::test(start_paused = true)]
    async fn reaction_reverts_after_delay() {
        let board = MoodBoard::new(Mood::Smile, DEFAULT_REVERT_DELAY);
        assert_eq!(board.react(Meal::Breakfast, Mood::Shine), Mood::Chef);
        assert!(board.is_pending());

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(board.current(), Mood::Chef);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(board.current(), Mood::Shine);
        assert!(!board.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_reaction_replaces_pending_one() {
        let board = MoodBoard::new(Mood::Smile, DEFAULT_REVERT_DELAY);
        board.react(Meal::Breakfast, Mood::Sad);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        board.react(Meal::Dinner, Mood::Smile);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(board.current(), Mood::Tea);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(board.current(), Mood::Smile);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_keeps_meal_mood() {
        let board = MoodBoard::new(Mood::Smile, DEFAULT_REVERT_DELAY);
        board.react(Meal::Lunch, Mood::Shine);
        board.cancel();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(board.current(), Mood::Soup);
    }

    #[tokio::test(start_paused = true)]
    async fn set_overrides_reaction() {
        let board = MoodBoard::new(Mood::Smile, DEFAULT_REVERT_DELAY);
        board.react(Meal::Lunch, Mood::Sad);
        board.set(Mood::Shine);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(board.current(), Mood::Shine);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_board_aborts_timer() {
        let board = MoodBoard::new(Mood::Smile, DEFAULT_REVERT_DELAY);
        board.react(Meal::Snack, Mood::Shine);
        let weak = Arc::downgrade(&board.slot);
        drop(board);
        assert!(weak.upgrade().is_none());
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
}
