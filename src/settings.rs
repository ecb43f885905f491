use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::{CameraSettings, CameraSettingsUpdate};
use crate::utils::validate_camera_settings;

/// 设置文件名
pub const SETTINGS_FILE_NAME: &str = "camera-settings.json";

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<CameraSettings>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice::<CameraSettings>(&bytes)
                .unwrap_or_else(|e| {
                    warn!("设置文件解析失败，使用默认设置: {}", e);
                    CameraSettings::default()
                }),
            _ => {
                let default = CameraSettings::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn get(&self) -> CameraSettings {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: CameraSettingsUpdate) -> Result<CameraSettings> {
        let mut settings = self.data.write().await;
        let mut next = settings.clone();

        if let Some(value) = update.max_video_duration {
            next.max_video_duration = value;
        }
        if let Some(value) = update.audio_enabled {
            next.audio_enabled = value;
        }
        if let Some(value) = update.flash_mode {
            next.flash_mode = value;
        }
        if let Some(value) = update.default_camera {
            next.default_camera = value;
        }
        if let Some(value) = update.use_device_orientation {
            next.use_device_orientation = value;
        }
        if let Some(value) = update.allow_auto_rotate {
            next.allow_auto_rotate = value;
        }
        if let Some(value) = update.prompt_to_app_settings {
            next.prompt_to_app_settings = value;
        }
        if let Some(value) = update.max_zoom {
            next.max_zoom = value;
        }
        if let Some(value) = update.video_quality {
            next.video_quality = value;
        }
        if let Some(value) = update.capture_mode {
            next.capture_mode = value;
        }
        if let Some(dir) = update.output_dir {
            next.output_dir = Some(dir);
        }

        validate_camera_settings(&next).map_err(|e| anyhow!(e))?;

        self.save(&next).await?;
        *settings = next;
        info!("摄像头设置已更新");
        Ok(settings.clone())
    }

    async fn save(&self, settings: &CameraSettings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
