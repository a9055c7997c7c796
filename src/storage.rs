use crate::errors::AppError;
use crate::models::Appointment;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const APPOINTMENTS_KEY: &str = "helix_appointments";
pub const LOGIN_FLAG_KEY: &str = "helix_logged_in";

/// String key/value entries, persisted together as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KvStore {
    entries: BTreeMap<String, String>,
}

impl KvStore {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_store(path: &Path) -> KvStore {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                KvStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => KvStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            KvStore::default()
        }
    }
}

pub async fn persist_store(path: &Path, store: &KvStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

pub fn load_appointments(store: &KvStore) -> Vec<Appointment> {
    let Some(raw) = store.get(APPOINTMENTS_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(err) => {
            warn!("discarding unreadable appointments entry: {err}");
            Vec::new()
        }
    }
}

pub fn save_appointments(store: &mut KvStore, list: &[Appointment]) -> Result<(), AppError> {
    let raw = serde_json::to_string(list).map_err(AppError::internal)?;
    store.set(APPOINTMENTS_KEY, raw);
    Ok(())
}

/// Read-modify-write; a concurrent writer between load and save is lost.
pub fn append_appointment(store: &mut KvStore, appt: Appointment) -> Result<(), AppError> {
    let mut list = load_appointments(store);
    list.push(appt);
    save_appointments(store, &list)
}

pub fn is_logged_in(store: &KvStore) -> bool {
    store.get(LOGIN_FLAG_KEY) == Some("true")
}

pub fn clear_login_flag(store: &mut KvStore) {
    store.remove(LOGIN_FLAG_KEY);
}
