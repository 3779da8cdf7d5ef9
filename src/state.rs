use crate::bridge::HostBridge;
use crate::mood::{Mood, MoodBoard};
use crate::storage::Repository;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Mutex<Repository>>,
    pub mood: Arc<MoodBoard>,
    pub bridge: Arc<dyn HostBridge>,
}

impl AppState {
    pub fn new(
        repo: Repository,
        bridge: Arc<dyn HostBridge>,
        mood_revert: Duration,
        opening_mood: Mood,
    ) -> Self {
        Self {
            repo: Arc::new(Mutex::new(repo)),
            mood: Arc::new(MoodBoard::new(opening_mood, mood_revert)),
            bridge,
        }
    }
}
