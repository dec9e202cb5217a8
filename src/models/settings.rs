//! User preferences persisted in the store.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub timed_mode: bool,
    /// Seconds allowed per question in timed mode
    pub time_per_question: u32,
    pub explanations_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            timed_mode: false,
            time_per_question: 60,
            explanations_enabled: true,
            sound_enabled: false,
        }
    }
}
