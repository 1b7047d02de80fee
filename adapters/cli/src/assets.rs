//! Filesystem asset catalog.
//!
//! Assets are plain properties files (`key=value`, `#` comments) resolved
//! relative to the level file's directory. Frame artwork is never decoded
//! here; every distinct frame name is assigned a fresh handle, and a real
//! renderer would map those handles to images on its side of the draw
//! channel.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use pondlife_core::{Animation, FrameHandle};
use pondlife_world::{AssetCatalog, AssetError, TileArt};

const KEY_TILE_SIZE: &str = "size";
const KEY_FRAME_FILES: &str = "frame.files";
const KEY_FRAME_DURATIONS: &str = "frame.duration_sequence";

pub struct FileCatalog {
    base: PathBuf,
    handles: RefCell<HashMap<String, FrameHandle>>,
}

impl FileCatalog {
    /// Creates a catalog resolving asset paths relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            handles: RefCell::new(HashMap::new()),
        }
    }

    fn read_properties(&self, path: &str) -> Result<Vec<(String, String)>, AssetError> {
        let full = self.base.join(path);
        let text = fs::read_to_string(&full).map_err(|e| AssetError {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(parse_properties(&text))
    }

    fn handle_for(&self, name: &str) -> FrameHandle {
        let mut handles = self.handles.borrow_mut();
        if let Some(handle) = handles.get(name) {
            return *handle;
        }
        let handle = FrameHandle::new(handles.len() as u32);
        let _ = handles.insert(name.to_owned(), handle);
        handle
    }
}

impl AssetCatalog for FileCatalog {
    fn tile_art(&self, path: &str) -> Result<TileArt, AssetError> {
        let entries = self.read_properties(path)?;
        let size = entries
            .iter()
            .find(|(key, _)| key == KEY_TILE_SIZE)
            .and_then(|(_, value)| value.parse().ok())
            .ok_or_else(|| AssetError {
                path: path.to_owned(),
                reason: format!("missing or malformed {KEY_TILE_SIZE}"),
            })?;
        Ok(TileArt {
            handle: self.handle_for(path),
            size,
        })
    }

    fn sprite_descriptor(&self, path: &str) -> Result<Vec<(String, String)>, AssetError> {
        self.read_properties(path)
    }

    fn animation(&self, path: &str) -> Result<Animation, AssetError> {
        let entries = self.read_properties(path)?;
        let lookup = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, value)| value.as_str())
                .ok_or_else(|| AssetError {
                    path: path.to_owned(),
                    reason: format!("missing {key}"),
                })
        };

        let frames = lookup(KEY_FRAME_FILES)?
            .split(';')
            .map(|name| self.handle_for(name.trim()))
            .collect();
        let schedule = lookup(KEY_FRAME_DURATIONS)?
            .split(';')
            .map(|field| {
                field.trim().parse().map_err(|_| AssetError {
                    path: path.to_owned(),
                    reason: format!("malformed {KEY_FRAME_DURATIONS} entry {field:?}"),
                })
            })
            .collect::<Result<Vec<f32>, AssetError>>()?;

        Animation::new(frames, schedule).map_err(|e| AssetError {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Splits `key=value` lines, ignoring blanks and `#` comments. Only the
/// first `=` separates; values may contain more.
fn parse_properties(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=')
                .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Directory a level file's assets are resolved from.
pub fn asset_base(level_path: &Path) -> PathBuf {
    level_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
