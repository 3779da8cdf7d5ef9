use crate::bridge::{BotApiBridge, HostBridge, LogBridge};
use crate::mood::DEFAULT_REVERT_DELAY;
use std::{collections::HashMap, env, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub mood_revert: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bot_token: None,
            chat_id: None,
            mood_revert: DEFAULT_REVERT_DELAY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let mut config = Config::default();

        if let Some(value) = vars.get("PORT") {
            match value.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("invalid PORT '{value}', using {DEFAULT_PORT}"),
            }
        }
        if let Some(path) = vars.get("APP_DATA_PATH").filter(|path| !path.is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        config.bot_token = non_empty(&vars, "LUMO_BOT_TOKEN");
        config.chat_id = non_empty(&vars, "LUMO_CHAT_ID");
        if let Some(value) = vars.get("LUMO_MOOD_REVERT_MS") {
            match value.parse::<u64>() {
                Ok(ms) => config.mood_revert = Duration::from_millis(ms),
                Err(_) => warn!("invalid LUMO_MOOD_REVERT_MS '{value}', using default"),
            }
        }

        config
    }

    /// Bot API delivery when both token and chat are set, log-only otherwise.
    pub fn bridge(&self) -> Arc<dyn HostBridge> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            info!("no bot credentials, reports are logged only");
            return Arc::new(LogBridge);
        };
        match BotApiBridge::new(token, chat_id.clone()) {
            Ok(bridge) => Arc::new(bridge),
            Err(err) => {
                warn!("bot api client unavailable: {err}");
                Arc::new(LogBridge)
            }
        }
    }
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(Config::from_vars(HashMap::new()), Config::default());
    }

    #[test]
    fn reads_all_values() {
        let config = Config::from_vars(vars(&[
            ("PORT", "9191"),
            ("APP_DATA_PATH", "/tmp/lumo.json"),
            ("LUMO_BOT_TOKEN", "123:abc"),
            ("LUMO_CHAT_ID", " 77 "),
            ("LUMO_MOOD_REVERT_MS", "200"),
        ]));
        assert_eq!(config.port, 9191);
        assert_eq!(config.data_path, PathBuf::from("/tmp/lumo.json"));
        assert_eq!(config.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.chat_id.as_deref(), Some("77"));
        assert_eq!(config.mood_revert, Duration::from_millis(200));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_vars(vars(&[
            ("PORT", "http"),
            ("LUMO_MOOD_REVERT_MS", "-5"),
            ("LUMO_BOT_TOKEN", "  "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.mood_revert, DEFAULT_REVERT_DELAY);
        assert_eq!(config.bot_token, None);
    }
}
