use crate::scoring::{Sex, UserSelection};
use chrono::NaiveTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::questionnaire::Persona;

const USER_ID: &str = "user_id";
const PHONE_NUMBER: &str = "phone_number";
const SEX: &str = "sex";
const SELECTED_CATEGORIES: &str = "selected_categories";
const SELECTED_PERSONA: &str = "selected_persona";
const MEAL_TIME: &str = "meal_time";
const SLEEP_TIME: &str = "sleep_time";
const WAKE_UP_TIME: &str = "wake_up_time";
const TOTAL_SCORE: &str = "total_score";

pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to access preference file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preference file '{}' is not a JSON object of strings: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Session and profile values shared by the app flow, persisted as a flat
/// JSON object. Writes overwrite; there is no merge with concurrent writers.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads `path` if it exists; a missing file starts an empty store.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| PreferenceError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| PreferenceError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = values.len(), "preferences opened");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the whole store through a temporary sibling file and a rename.
    pub fn save(&self) -> Result<(), PreferenceError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let io_error = |source| PreferenceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content =
            serde_json::to_string_pretty(&self.values).map_err(|source| PreferenceError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(io_error)?;
        fs::rename(&staging, path).map_err(io_error)?;

        debug!(path = %path.display(), keys = self.values.len(), "preferences saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    fn set_or_remove(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID).filter(|value| !value.is_empty())
    }

    pub fn set_user_id(&mut self, user_id: &str) {
        self.set(USER_ID, user_id);
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.get(PHONE_NUMBER)
    }

    pub fn set_phone_number(&mut self, phone_number: &str) {
        self.set(PHONE_NUMBER, phone_number);
    }

    pub fn sex(&self) -> Option<Sex> {
        self.get(SEX).and_then(Sex::parse)
    }

    pub fn set_sex(&mut self, sex: Option<Sex>) {
        self.set_or_remove(SEX, sex.map(|sex| sex.label().to_string()));
    }

    pub fn selection(&self) -> UserSelection {
        self.get(SELECTED_CATEGORIES)
            .map(UserSelection::parse)
            .unwrap_or_default()
    }

    pub fn set_selection(&mut self, selection: &UserSelection) {
        self.set(SELECTED_CATEGORIES, selection.joined());
    }

    pub fn persona(&self) -> Option<Persona> {
        self.get(SELECTED_PERSONA).and_then(Persona::from_label)
    }

    pub fn set_persona(&mut self, persona: Option<Persona>) {
        self.set_or_remove(
            SELECTED_PERSONA,
            persona.map(|persona| persona.label().to_string()),
        );
    }

    pub fn meal_time(&self) -> Option<NaiveTime> {
        self.time(MEAL_TIME)
    }

    pub fn set_meal_time(&mut self, time: Option<NaiveTime>) {
        self.set_time(MEAL_TIME, time);
    }

    pub fn sleep_time(&self) -> Option<NaiveTime> {
        self.time(SLEEP_TIME)
    }

    pub fn set_sleep_time(&mut self, time: Option<NaiveTime>) {
        self.set_time(SLEEP_TIME, time);
    }

    pub fn wake_up_time(&self) -> Option<NaiveTime> {
        self.time(WAKE_UP_TIME)
    }

    pub fn set_wake_up_time(&mut self, time: Option<NaiveTime>) {
        self.set_time(WAKE_UP_TIME, time);
    }

    fn time(&self, key: &str) -> Option<NaiveTime> {
        self.get(key)
            .and_then(|raw| NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok())
    }

    fn set_time(&mut self, key: &str, time: Option<NaiveTime>) {
        self.set_or_remove(key, time.map(|time| time.format(TIME_FORMAT).to_string()));
    }

    pub fn total_score(&self) -> Option<f32> {
        self.get(TOTAL_SCORE)
            .and_then(|raw| raw.trim().parse::<f32>().ok())
    }

    pub fn set_total_score(&mut self, score: f32) {
        self.set(TOTAL_SCORE, score.to_string());
    }

    pub fn display_name(&self, user_id: &str) -> Option<&str> {
        self.get(&display_name_key(user_id))
    }

    pub fn set_display_name(&mut self, user_id: &str, name: &str) {
        self.set(&display_name_key(user_id), name);
    }

    pub fn history_log(&self, user_id: &str) -> Option<&str> {
        self.get(&history_key(user_id))
    }

    pub fn set_history_log(&mut self, user_id: &str, log: String) {
        self.set(&history_key(user_id), log);
    }

    /// Forgets who is logged in; questionnaire answers and history stay.
    pub fn clear_session(&mut self) {
        self.remove(USER_ID);
        self.remove(PHONE_NUMBER);
        self.remove(SEX);
    }
}

fn display_name_key(user_id: &str) -> String {
    format!("user_name_{user_id}")
}

fn history_key(user_id: &str) -> String {
    format!("score_history_{user_id}")
}
