use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::CategoryConfig;
use crate::transport::TransportKind;

/// RGB color represented as a 3-element array.
pub type Rgb = [u8; 3];

/// Default chat endpoint of a locally running storyteller.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Connection settings for the storytelling service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Chat endpoint URL (can also be set via STORY_CHAT_ENDPOINT)
    pub endpoint: String,
    /// Session identifier; generated at startup when unset
    pub session: Option<String>,
    /// How the service delivers replies
    pub transport: TransportKind,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            session: None,
            transport: TransportKind::OneShot,
        }
    }
}

/// Behavior configuration for the UI.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Lines to scroll with Page Up/Down
    pub scroll_page_size: usize,
    /// Idle polling interval in milliseconds
    pub idle_poll_ms: u64,
    /// Polling interval while a reply is pending
    pub busy_poll_ms: u64,
    /// Sidebar width in columns
    pub sidebar_width: u16,
    /// Check the service's health endpoint at startup
    pub health_check: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            scroll_page_size: 10,
            idle_poll_ms: 50,
            busy_poll_ms: 16, // ~60 FPS
            sidebar_width: 42,
            health_check: true,
        }
    }
}

/// Color configuration for the UI.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorConfig {
    /// Chat border gradient start (Purple by default)
    pub chat_gradient_start: Rgb,
    /// Chat border gradient end (Blue by default)
    pub chat_gradient_end: Rgb,
    /// Sidebar border gradient start (Orange by default)
    pub sidebar_gradient_start: Rgb,
    /// Sidebar border gradient end (Pink by default)
    pub sidebar_gradient_end: Rgb,
    /// User message text
    pub user: Rgb,
    /// Assistant message text
    pub assistant: Rgb,
    /// Highlights: cursor, open category, Send button
    pub accent: Rgb,
    /// Status: Ready
    pub status_ready: Rgb,
    /// Status: waiting for a reply
    pub status_busy: Rgb,
    /// Status: offline or failed
    pub status_error: Rgb,
    /// Main background color
    pub bg_primary: Rgb,
    /// Input row background color
    pub bg_secondary: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            chat_gradient_start: [147, 51, 234],   // Purple
            chat_gradient_end: [59, 130, 246],     // Blue
            sidebar_gradient_start: [255, 140, 0], // Orange
            sidebar_gradient_end: [255, 0, 128],   // Pink
            user: [0, 200, 255],
            assistant: [120, 230, 140],
            accent: [255, 196, 0],
            status_ready: [100, 255, 100],
            status_busy: [100, 200, 255],
            status_error: [255, 100, 100],
            bg_primary: [20, 20, 25],
            bg_secondary: [30, 30, 35],
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub behavior: BehaviorConfig,
    pub colors: ColorConfig,
    /// Replaces the built-in prompt catalog when non-empty
    pub catalog: Vec<CategoryConfig>,
}

impl Config {
    /// Returns the default config file path: ~/.config/story-chat/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("story-chat").join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults.
    ///
    /// A missing file is normal. A file that cannot be read or parsed is
    /// logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                eprintln!("Warning: ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl ColorConfig {
    /// Convert an RGB array to a tuple for gradient math.
    pub fn to_tuple(rgb: &Rgb) -> (u8, u8, u8) {
        (rgb[0], rgb[1], rgb[2])
    }

    /// Convert an RGB array to a ratatui Color.
    pub fn to_color(rgb: &Rgb) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(rgb[0], rgb[1], rgb[2])
    }

    /// Get chat gradient colors as tuples.
    pub fn chat_gradient(&self) -> ((u8, u8, u8), (u8, u8, u8)) {
        (
            Self::to_tuple(&self.chat_gradient_start),
            Self::to_tuple(&self.chat_gradient_end),
        )
    }

    /// Get sidebar gradient colors as tuples.
    pub fn sidebar_gradient(&self) -> ((u8, u8, u8), (u8, u8, u8)) {
        (
            Self::to_tuple(&self.sidebar_gradient_start),
            Self::to_tuple(&self.sidebar_gradient_end),
        )
    }

    pub fn user(&self) -> ratatui::style::Color {
        Self::to_color(&self.user)
    }

    pub fn assistant(&self) -> ratatui::style::Color {
        Self::to_color(&self.assistant)
    }

    pub fn accent(&self) -> ratatui::style::Color {
        Self::to_color(&self.accent)
    }

    pub fn status_ready(&self) -> ratatui::style::Color {
        Self::to_color(&self.status_ready)
    }

    pub fn status_busy(&self) -> ratatui::style::Color {
        Self::to_color(&self.status_busy)
    }

    pub fn status_error(&self) -> ratatui::style::Color {
        Self::to_color(&self.status_error)
    }

    pub fn bg_primary(&self) -> ratatui::style::Color {
        Self::to_color(&self.bg_primary)
    }

    pub fn bg_secondary(&self) -> ratatui::style::Color {
        Self::to_color(&self.bg_secondary)
    }
}
