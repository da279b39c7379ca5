//! JSON file persistence for sessions.
//!
//! A saved session is the engine state serialized verbatim, so loading is
//! exactly the inverse of saving and a loaded session resumes mid-turn.
//! There is no versioning or migration; a file that doesn't parse as the
//! current state shape is an error.

use std::fs;
use std::path::Path;
use warfront_core::GameState;

use crate::store::StoreError;

/// Write a session to `path` as pretty-printed JSON.
///
/// Parent directories are created as needed.
pub fn save_session(state: &GameState, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a session back from a JSON file.
pub fn load_session(path: &Path) -> Result<GameState, StoreError> {
    let json = fs::read_to_string(path)?;
    let state = serde_json::from_str(&json)?;
    Ok(state)
}
