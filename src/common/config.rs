use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::model::engine::DEFAULT_PREVIEW_MAX_HEIGHT;
use crate::model::ratio::{CustomRatio, RatioSelection};
use crate::model::session::SessionOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preview: PreviewSettings,
    /// Used until the user toggles the preference.
    pub close_on_apply: bool,
    pub default_ratio: RatioSelection,
    /// Starting custom ratio inputs as `[width, height]`.
    pub custom_ratio: [f64; 2],
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_filter: String,
    pub prefs_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let custom = CustomRatio::default();
        Self {
            preview: PreviewSettings::default(),
            close_on_apply: true,
            default_ratio: RatioSelection::Free,
            custom_ratio: [custom.width, custom.height],
            log_filter: "info".to_string(),
            prefs_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub container_width: f64,
    pub max_height: f64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            container_width: 480.0,
            max_height: DEFAULT_PREVIEW_MAX_HEIGHT,
        }
    }
}

impl Config {
    /// `<config dir>/window-resizer/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("window-resizer").join("config.toml"))
    }

    pub fn parse(text: &str) -> Result<Config> { Ok(toml::from_str(text)?) }

    pub fn read(path: &Path) -> Result<Config> { Self::parse(&fs::read_to_string(path)?) }

    /// Reads `path`, or the default path. A missing default file yields the
    /// defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            return Self::read(path);
        }
        let Some(path) = Self::default_path() else { return Ok(Config::default()) };
        match Self::read(&path) {
            Err(crate::Error::Io(err)) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Config::default())
            }
            other => other,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        let s = &self.settings;
        SessionOptions {
            target: None,
            selection: s.default_ratio,
            custom: CustomRatio::new(s.custom_ratio[0], s.custom_ratio[1]),
            container_width: s.preview.container_width,
            max_preview_height: s.preview.max_height,
            close_on_apply: s.close_on_apply,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ratio::NamedRatio;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_settings() {
        let config = Config::parse(
            r#"
            [settings]
            close_on_apply = false
            default_ratio = "16:9"
            custom_ratio = [21, 9]

            [settings.preview]
            max_height = 300
            "#,
        )
        .unwrap();
        let s = &config.settings;
        assert!(!s.close_on_apply);
        assert_eq!(s.default_ratio, RatioSelection::Named(NamedRatio::Wide));
        assert_eq!(s.preview.max_height, 300.0);
        assert_eq!(s.preview.container_width, 480.0);

        let options = config.session_options();
        assert_eq!(options.custom, CustomRatio::new(21.0, 9.0));
        assert!(!options.close_on_apply);
    }

    #[test]
    fn rejects_unknown_ratio() {
        let err = Config::parse("[settings]\ndefault_ratio = \"21:9\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
