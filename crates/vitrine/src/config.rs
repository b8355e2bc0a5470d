use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use vitrine_core::{CarouselConfig, CubeConfig, WrapMode};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub photos: Vec<PathBuf>,
    pub wrap: WrapMode,
    pub clones: bool,
    pub quiet_ms: u64,
    pub frame_coalescing: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let circular = CarouselConfig::circular();
        Self {
            photos: Vec::new(),
            wrap: circular.wrap,
            clones: circular.clones,
            quiet_ms: circular.quiet_period.as_millis() as u64,
            frame_coalescing: circular.frame_coalescing,
        }
    }
}

impl GalleryConfig {
    pub fn carousel_config(&self) -> CarouselConfig {
        CarouselConfig {
            wrap: self.wrap,
            clones: self.clones,
            start_index: 0,
            quiet_period: Duration::from_millis(self.quiet_ms),
            frame_coalescing: self.frame_coalescing,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CubeSettings {
    pub faces: Vec<String>,
    pub gallery_face: String,
    pub wheel_threshold: f64,
    pub cooldown_ms: u64,
    pub invert: bool,
}

impl Default for CubeSettings {
    fn default() -> Self {
        let cube = CubeConfig::default();
        Self {
            faces: ["Intro", "Projects", "Work", "Gallery"]
                .map(String::from)
                .to_vec(),
            gallery_face: "Gallery".to_string(),
            wheel_threshold: cube.wheel_threshold,
            cooldown_ms: cube.cooldown.as_millis() as u64,
            invert: cube.invert,
        }
    }
}

impl CubeSettings {
    pub fn cube_config(&self) -> CubeConfig {
        CubeConfig {
            wheel_threshold: self.wheel_threshold,
            cooldown: Duration::from_millis(self.cooldown_ms),
            invert: self.invert,
        }
    }

    pub fn gallery_index(&self) -> Option<usize> {
        self.faces
            .iter()
            .position(|f| f.eq_ignore_ascii_case(&self.gallery_face))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cube: CubeSettings,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "vitrine", "vitrine").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("VITRINE").separator("__"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using built-in configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_matches_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let defaults = Config::default();
        assert_eq!(parsed.cube.faces, defaults.cube.faces);
        assert_eq!(parsed.cube.gallery_index(), Some(3));
        assert_eq!(parsed.cube.cube_config(), defaults.cube.cube_config());
        assert_eq!(
            parsed.gallery.carousel_config(),
            CarouselConfig::circular()
        );
    }

    #[test]
    fn test_partial_gallery_section() {
        let json = r#"{ "photos": ["a.jpg", "b.jpg"], "wrap": "Clamp", "clones": false }"#;
        let gallery: GalleryConfig = serde_json::from_str(json).unwrap();

        assert_eq!(gallery.photos.len(), 2);
        let carousel = gallery.carousel_config();
        assert_eq!(carousel.wrap, WrapMode::Clamp);
        assert!(!carousel.clones);
        assert_eq!(carousel.quiet_period, Duration::from_millis(120));
    }

    #[test]
    fn test_gallery_face_lookup_ignores_case() {
        let cube = CubeSettings {
            faces: vec!["Home".into(), "photos".into()],
            gallery_face: "PHOTOS".into(),
            ..CubeSettings::default()
        };
        assert_eq!(cube.gallery_index(), Some(1));

        let none = CubeSettings {
            gallery_face: "missing".into(),
            ..CubeSettings::default()
        };
        assert_eq!(none.gallery_index(), None);
    }
}
