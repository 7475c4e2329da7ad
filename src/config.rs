use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::CanvasResult;
use crate::model::element::TextStyle;

/// Editor-wide defaults. Missing fields in a config file fall back to these values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Export file name without extension.
    pub file_name: String,
    /// Frames written by GIF export when the caller does not specify a count.
    pub animation_frame_count: usize,
    /// Playback rate assigned to newly uploaded GIFs.
    pub gif_frame_rate: f64,
    /// Per-frame delay written into exported GIFs.
    pub export_frame_delay_ms: u32,
    /// Style applied to text added without explicit styling.
    pub text: TextStyle,
    /// Maximum undo entries kept; 0 keeps everything.
    pub history_limit: usize,
    pub resize_handle_px: f64,
    /// Smallest font size reachable by dragging the resize handle.
    pub min_font_size: f64,
    pub selection_padding_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            file_name: "something_broke".to_owned(),
            animation_frame_count: 60,
            gif_frame_rate: 24.0,
            export_frame_delay_ms: 100,
            text: TextStyle::default(),
            history_limit: 100,
            resize_handle_px: 10.0,
            min_font_size: 10.0,
            selection_padding_px: 4.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_gif_frame_rate(mut self, fps: f64) -> Self {
        self.gif_frame_rate = fps;
        self
    }

    /// `<file_name>.<ext>`
    pub fn default_file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.file_name, ext.trim_start_matches('.'))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
