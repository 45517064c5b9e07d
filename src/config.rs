//! Runtime settings
//!
//! Settings are read once at startup from JSON. The first file found wins:
//!
//! 1. `<user config dir>/starter2d/settings.json`
//! 2. `assets/config/settings.json`
//!
//! A missing file is normal (defaults are used); a malformed one is logged
//! and ignored. Nothing is ever written back.

use crate::audio::Volumes;
use crate::error::GameResult;
use crate::screen::ScreenId;
use crate::screen::transition::TransitionKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_VIRTUAL_WIDTH: u32 = 1280;
pub const DEFAULT_VIRTUAL_HEIGHT: u32 = 720;
pub const MAX_WINDOW_SCALE: u32 = 4;

const PROJECT_SETTINGS: &str = "assets/config/settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub virtual_width: u32,
    pub virtual_height: u32,
    /// Integer window scale; `None` picks the largest that fits the desktop
    pub window_scale: Option<u32>,
    pub fullscreen: bool,
    pub vsync: bool,
    pub target_fps: u32,
    pub debug_mode: bool,
    pub show_fps: bool,
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub vox_volume: f32,
    pub ambience_volume: f32,
    pub transition: TransitionKind,
    pub transition_duration: f32,
    pub initial_screen: ScreenId,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            title: "Starter 2D".to_string(),
            virtual_width: DEFAULT_VIRTUAL_WIDTH,
            virtual_height: DEFAULT_VIRTUAL_HEIGHT,
            window_scale: None,
            fullscreen: false,
            vsync: true,
            target_fps: 60,
            debug_mode: false,
            show_fps: false,
            master_volume: 1.0,
            music_volume: 0.7,
            sfx_volume: 0.7,
            vox_volume: 0.7,
            ambience_volume: 0.7,
            transition: TransitionKind::Fade,
            transition_duration: 1.0,
            initial_screen: ScreenId::Init,
        }
    }
}

impl Settings {
    pub fn load_from_file(path: &Path) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings.sanitized())
    }

    /// Search the standard locations, falling back to defaults
    pub fn load_or_default() -> Self {
        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => warn!("Ignoring settings file {}: {}", path.display(), e),
            }
        }
        info!("No settings file found, using defaults");
        Settings::default()
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("starter2d").join("settings.json"));
        }
        paths.push(PathBuf::from(PROJECT_SETTINGS));
        paths
    }

    /// Clamp values into ranges the rest of the game can rely on
    pub fn sanitized(mut self) -> Self {
        if self.virtual_width == 0 || self.virtual_height == 0 {
            warn!("Virtual resolution must be non-zero, using defaults");
            self.virtual_width = DEFAULT_VIRTUAL_WIDTH;
            self.virtual_height = DEFAULT_VIRTUAL_HEIGHT;
        }
        self.window_scale = self.window_scale.map(|s| s.clamp(1, MAX_WINDOW_SCALE));
        self.target_fps = self.target_fps.max(1);
        self.transition_duration = self.transition_duration.max(0.0);
        for volume in [
            &mut self.master_volume,
            &mut self.music_volume,
            &mut self.sfx_volume,
            &mut self.vox_volume,
            &mut self.ambience_volume,
        ] {
            *volume = volume.clamp(0.0, 1.0);
        }
        self
    }

    pub fn virtual_size(&self) -> (u32, u32) {
        (self.virtual_width, self.virtual_height)
    }

    pub fn volumes(&self) -> Volumes {
        Volumes {
            master: self.master_volume,
            music: self.music_volume,
            sfx: self.sfx_volume,
            vox: self.vox_volume,
            ambience: self.ambience_volume,
        }
    }

    /// Window size for a desktop of `desktop` pixels
    ///
    /// Uses the configured scale, or the largest integer scale that fits in
    /// 90% of the desktop (leaving room for taskbars and decorations).
    pub fn window_size(&self, desktop: Option<(i32, i32)>) -> (u32, u32) {
        let scale = self.window_scale.unwrap_or_else(|| match desktop {
            Some((w, h)) => {
                let usable_w = (w as f32 * 0.9) as u32;
                let usable_h = (h as f32 * 0.9) as u32;
                (usable_w / self.virtual_width)
                    .min(usable_h / self.virtual_height)
                    .clamp(1, MAX_WINDOW_SCALE)
            }
            None => {
                warn!("Could not detect monitor size, using 1x scale");
                1
            }
        });
        (self.virtual_width * scale, self.virtual_height * scale)
    }
}
