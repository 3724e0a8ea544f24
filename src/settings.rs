//! Settings management for Multiview
//!
//! Window and engine configuration, stored as XML in the user's config
//! directory.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::EngineOptions;

/// Smallest panel edge, in points
pub const MIN_PANEL_SIZE: f32 = 50.0;

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "MultiviewSettings")]
pub struct PlayerSettings {
    /// Title of the main window
    #[serde(rename = "windowTitle", default = "default_window_title")]
    pub window_title: String,

    /// Initial window width
    #[serde(rename = "windowWidth", default = "default_window_width")]
    pub window_width: u32,

    /// Initial window height
    #[serde(rename = "windowHeight", default = "default_window_height")]
    pub window_height: u32,

    /// Whether presentation waits for the display refresh
    #[serde(rename = "vsyncEnabled", default = "default_vsync")]
    pub vsync_enabled: bool,

    /// Default width of a new video panel, in points
    #[serde(rename = "panelWidth", default = "default_panel_width")]
    pub panel_width: f32,

    /// Default height of a new video panel, in points
    #[serde(rename = "panelHeight", default = "default_panel_height")]
    pub panel_height: f32,

    /// Minimum level of engine messages forwarded to the log
    #[serde(rename = "engineLogLevel", default = "default_engine_log_level")]
    pub engine_log_level: String,

    /// Hardware decoding mode handed to the engine
    #[serde(rename = "hwdec", default = "default_hwdec")]
    pub hwdec: String,

    /// Write logs to this file in addition to the console
    #[serde(rename = "logFile", default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

fn default_window_title() -> String {
    "Multiview".to_string()
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_vsync() -> bool {
    true
}

fn default_panel_width() -> f32 {
    400.0
}

fn default_panel_height() -> f32 {
    300.0
}

fn default_engine_log_level() -> String {
    "debug".to_string()
}

fn default_hwdec() -> String {
    "auto".to_string()
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync_enabled: default_vsync(),
            panel_width: default_panel_width(),
            panel_height: default_panel_height(),
            engine_log_level: default_engine_log_level(),
            hwdec: default_hwdec(),
            log_file: None,
        }
    }
}

impl PlayerSettings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("Multiview");
            p.push("settings.xml");
            p
        })
    }

    /// Load settings from the config directory.
    ///
    /// A missing file is created with the defaults. On error the caller falls
    /// back to the defaults; the file is left untouched.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;

        if !path.exists() {
            let settings = Self::default();
            settings.save_to_file(&path)?;
            return Ok(settings);
        }

        Self::load_from_file(&path)
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_xml(&contents)
    }

    /// Parse settings from XML, filling missing fields with defaults
    pub fn from_xml(xml: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = from_str(xml).map_err(SettingsError::XmlParse)?;
        settings.clamp();
        Ok(settings)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to_file(&path)
    }

    /// Save settings to an XML file, creating its directory
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }
        fs::write(path, self.to_xml()?).map_err(SettingsError::Io)?;
        Ok(())
    }

    /// Serialize to an XML document
    pub fn to_xml(&self) -> Result<String, SettingsError> {
        let xml = to_string(self).map_err(SettingsError::XmlWrite)?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml))
    }

    /// Keep dimensions in range
    pub fn clamp(&mut self) {
        self.window_width = self.window_width.max(1);
        self.window_height = self.window_height.max(1);
        self.panel_width = clamp_panel_edge(self.panel_width, default_panel_width());
        self.panel_height = clamp_panel_edge(self.panel_height, default_panel_height());
    }

    /// Default size of a new panel window, in points
    pub fn panel_size(&self) -> egui::Vec2 {
        egui::vec2(self.panel_width, self.panel_height)
    }

    /// Options handed to every engine instance
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            log_level: self.engine_log_level.clone(),
            hwdec: self.hwdec.clone(),
        }
    }
}

fn clamp_panel_edge(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_PANEL_SIZE)
    } else {
        fallback
    }
}

/// Settings-related errors
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    XmlParse(quick_xml::DeError),
    XmlWrite(quick_xml::SeError),
    NoConfigDir,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::XmlParse(e) => write!(f, "XML parse error: {}", e),
            SettingsError::XmlWrite(e) => write!(f, "XML write error: {}", e),
            SettingsError::NoConfigDir => write!(f, "Could not find config directory"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.window_title, "Multiview");
        assert_eq!(settings.window_width, 1280);
        assert_eq!(settings.window_height, 720);
        assert!(settings.vsync_enabled);
        assert_eq!(settings.panel_size(), egui::vec2(400.0, 300.0));
        assert_eq!(settings.engine_log_level, "debug");
        assert_eq!(settings.hwdec, "auto");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn test_partial_xml_fills_defaults() {
        let xml = r#"<MultiviewSettings><windowWidth>1920</windowWidth><hwdec>no</hwdec></MultiviewSettings>"#;
        let settings = PlayerSettings::from_xml(xml).unwrap();

        assert_eq!(settings.window_width, 1920);
        assert_eq!(settings.window_height, 720);
        assert_eq!(settings.hwdec, "no");
        assert_eq!(settings.window_title, "Multiview");
        assert!(settings.vsync_enabled);
    }

    #[test]
    fn test_clamping() {
        let mut settings = PlayerSettings {
            window_width: 0,
            window_height: 0,
            panel_width: 10.0,
            panel_height: f32::NAN,
            ..Default::default()
        };
        settings.clamp();

        assert_eq!(settings.window_width, 1);
        assert_eq!(settings.window_height, 1);
        assert_eq!(settings.panel_width, MIN_PANEL_SIZE);
        assert_eq!(settings.panel_height, 300.0);
    }

    #[test]
    fn test_from_xml_clamps() {
        let xml = r#"<MultiviewSettings><panelWidth>5</panelWidth></MultiviewSettings>"#;
        let settings = PlayerSettings::from_xml(xml).unwrap();
        assert_eq!(settings.panel_width, MIN_PANEL_SIZE);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = PlayerSettings::from_xml("<MultiviewSettings><windowWidth>wide</windowWidth>").unwrap_err();
        assert!(matches!(err, SettingsError::XmlParse(_)));
    }

    #[test]
    fn test_xml_roundtrip_keeps_log_file() {
        let settings = PlayerSettings {
            log_file: Some("/tmp/multiview.log".to_string()),
            vsync_enabled: false,
            ..Default::default()
        };
        let xml = settings.to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));

        let parsed = PlayerSettings::from_xml(&xml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("multiview-settings-{}", std::process::id()));
        let path = dir.join("nested").join("settings.xml");

        let settings = PlayerSettings {
            window_title: "Wall".to_string(),
            ..Default::default()
        };
        settings.save_to_file(&path).unwrap();
        let loaded = PlayerSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded.window_title, "Wall");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_engine_options_from_settings() {
        let settings = PlayerSettings {
            engine_log_level: "warn".to_string(),
            hwdec: "vaapi".to_string(),
            ..Default::default()
        };
        let options = settings.engine_options();
        assert_eq!(options.log_level, "warn");
        assert_eq!(options.hwdec, "vaapi");
    }
}
