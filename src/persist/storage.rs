use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;

use crate::config::EditorConfig;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::store::state::CanvasState;

/// Key under which the canvas snapshot is stored.
pub const APP_STATE_KEY: &str = "appState";

/// String key-value store for persisted editor state.
pub trait StateStorage {
    fn load(&self, key: &str) -> CanvasResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> CanvasResult<()>;
}

/// Process-local storage. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> CanvasResult<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> CanvasResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CanvasResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CanvasError::storage(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStorage for DirStorage {
    fn load(&self, key: &str) -> CanvasResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CanvasError::storage(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn save(&self, key: &str, value: &str) -> CanvasResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create storage dir '{}'", self.dir.display()))?;
        std::fs::write(&path, value).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

/// Store subscriber that writes every snapshot under [`APP_STATE_KEY`].
///
/// Failures are logged and swallowed; in-memory state stays authoritative.
pub fn persist_listener<S: StateStorage + 'static>(storage: S) -> impl FnMut(&CanvasState) + 'static {
    move |state: &CanvasState| {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize canvas state");
                return;
            }
        };
        if let Err(err) = storage.save(APP_STATE_KEY, &json) {
            tracing::warn!(error = %err, "could not persist canvas state");
        }
    }
}

/// Load persisted state, shallow-merged over the configured defaults.
///
/// Missing keys keep their defaults, unknown keys are ignored, and anything unreadable falls back
/// to defaults with a warning.
pub fn hydrate(storage: &dyn StateStorage, config: &EditorConfig) -> CanvasState {
    let defaults = CanvasState::with_size(config.canvas_width, config.canvas_height);
    let raw = match storage.load(APP_STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return defaults,
        Err(err) => {
            tracing::warn!(error = %err, "could not read persisted state; using defaults");
            return defaults;
        }
    };
    match merge_over(&defaults, &raw) {
        Ok(mut state) => {
            sanitize_selection(&mut state);
            tracing::info!(layers = state.layers.len(), "hydrated canvas state");
            state
        }
        Err(err) => {
            tracing::warn!(error = %err, "persisted state is invalid; using defaults");
            defaults
        }
    }
}

fn merge_over(defaults: &CanvasState, raw: &str) -> CanvasResult<CanvasState> {
    let persisted: serde_json::Value = serde_json::from_str(raw)?;
    let serde_json::Value::Object(persisted) = persisted else {
        return Err(CanvasError::serde("persisted state is not a JSON object"));
    };
    let mut merged = serde_json::to_value(defaults)?;
    if let serde_json::Value::Object(base) = &mut merged {
        for (k, v) in persisted {
            base.insert(k, v);
        }
    }
    Ok(serde_json::from_value(merged)?)
}

fn sanitize_selection(state: &mut CanvasState) {
    let Some(li) = state.selected_layer_index else {
        state.selected_element = None;
        return;
    };
    match state.layers.get(li) {
        None => {
            state.selected_layer_index = None;
            state.selected_element = None;
        }
        Some(layer) => {
            if state.selected_element.is_some_and(|ei| ei >= layer.elements.len()) {
                state.selected_element = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/storage.rs"]
mod tests;
