// 数据模型模块 - 定义拍摄相关的数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 拍摄模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// 拍照（点按）
    #[default]
    Photo,
    /// 录像（长按）
    Video,
}

/// 摄像头选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSelection {
    /// 后置摄像头
    #[default]
    Rear,
    /// 前置摄像头
    Front,
}

impl CameraSelection {
    /// 切换到另一侧摄像头
    pub fn flipped(self) -> Self {
        match self {
            Self::Rear => Self::Front,
            Self::Front => Self::Rear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rear => "rear",
            Self::Front => "front",
        }
    }
}

/// 闪光灯模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Auto,
    On,
    Off,
}

impl FlashMode {
    /// 闪光灯按钮的循环顺序: 自动 -> 开 -> 关 -> 自动
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::On,
            Self::On => Self::Off,
            Self::Off => Self::Auto,
        }
    }
}

/// 录像质量预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    #[default]
    High,
    Medium,
    Low,
    #[serde(rename = "352x288")]
    Resolution352x288,
    #[serde(rename = "640x480")]
    Resolution640x480,
    #[serde(rename = "1280x720")]
    Resolution1280x720,
    #[serde(rename = "1920x1080")]
    Resolution1920x1080,
    #[serde(rename = "3840x2160")]
    Resolution3840x2160,
    #[serde(rename = "iframe_960x540")]
    Iframe960x540,
    #[serde(rename = "iframe_1280x720")]
    Iframe1280x720,
}

impl VideoQuality {
    /// 固定分辨率预设返回宽高，画质档位由平台决定
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Resolution352x288 => Some((352, 288)),
            Self::Resolution640x480 => Some((640, 480)),
            Self::Resolution1280x720 | Self::Iframe1280x720 => Some((1280, 720)),
            Self::Resolution1920x1080 => Some((1920, 1080)),
            Self::Resolution3840x2160 => Some((3840, 2160)),
            Self::Iframe960x540 => Some((960, 540)),
            Self::High | Self::Medium | Self::Low => None,
        }
    }
}

/// 对焦点（视图坐标）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: f64,
    pub y: f64,
}

impl FocusPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 拍摄得到的照片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
    /// 编码后的图片数据（JPEG/HEIC，由平台决定）
    #[serde(skip)]
    pub data: Vec<u8>,
    /// 拍摄时间
    pub captured_at: DateTime<Utc>,
}

/// 录像状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording {
        camera: CameraSelection,
        started_at: DateTime<Utc>,
    },
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }
}

/// 摄像头设置（持久化到 camera-settings.json）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// 最长录像时长（秒），0 或负数表示不限制
    pub max_video_duration: f64,
    /// 录像时是否录制音频
    pub audio_enabled: bool,
    /// 闪光灯模式
    pub flash_mode: FlashMode,
    /// 启动时使用的摄像头
    pub default_camera: CameraSelection,
    /// 是否按设备方向输出照片/视频
    pub use_device_orientation: bool,
    /// 是否允许界面自动旋转
    pub allow_auto_rotate: bool,
    /// 未授权时是否提示跳转到系统设置
    pub prompt_to_app_settings: bool,
    /// 最大缩放倍数
    pub max_zoom: f64,
    /// 录像质量
    pub video_quality: VideoQuality,
    /// 启动时的拍摄模式,运行中保存不会切换当前模式
    pub capture_mode: CaptureMode,
    /// 录像输出目录，为空时使用系统临时目录
    pub output_dir: Option<PathBuf>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            max_video_duration: 10.0,
            audio_enabled: true,
            flash_mode: FlashMode::Auto,
            default_camera: CameraSelection::Rear,
            use_device_orientation: true,
            allow_auto_rotate: true,
            prompt_to_app_settings: true,
            max_zoom: 4.0,
            video_quality: VideoQuality::High,
            capture_mode: CaptureMode::Photo,
            output_dir: None,
        }
    }
}

/// 摄像头设置的部分更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraSettingsUpdate {
    pub max_video_duration: Option<f64>,
    pub audio_enabled: Option<bool>,
    pub flash_mode: Option<FlashMode>,
    pub default_camera: Option<CameraSelection>,
    pub use_device_orientation: Option<bool>,
    pub allow_auto_rotate: Option<bool>,
    pub prompt_to_app_settings: Option<bool>,
    pub max_zoom: Option<f64>,
    pub video_quality: Option<VideoQuality>,
    pub capture_mode: Option<CaptureMode>,
    pub output_dir: Option<PathBuf>,
}

/// 会话状态快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    /// 会话是否在运行
    pub is_running: bool,
    /// 是否已获得摄像头/麦克风授权
    pub is_authorized: bool,
    /// 是否正在录像
    pub is_recording: bool,
    /// 当前摄像头
    pub camera: CameraSelection,
    /// 当前缩放倍数
    pub zoom_level: f64,
    /// 已拍摄照片数
    pub photos_taken: usize,
    /// 已完成录像数
    pub videos_recorded: usize,
    /// 最后拍照时间
    pub last_photo_time: Option<DateTime<Utc>>,
    /// 最后录像完成时间
    pub last_video_time: Option<DateTime<Utc>>,
    /// 最后一个录像文件
    pub last_video_path: Option<PathBuf>,
    /// 最后的错误信息
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_mode_cycle() {
        assert_eq!(FlashMode::Auto.next(), FlashMode::On);
        assert_eq!(FlashMode::On.next(), FlashMode::Off);
        assert_eq!(FlashMode::Off.next(), FlashMode::Auto);
    }

    #[test]
    fn test_camera_flip() {
        assert_eq!(CameraSelection::Rear.flipped(), CameraSelection::Front);
        assert_eq!(CameraSelection::Front.flipped(), CameraSelection::Rear);
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.max_video_duration, 10.0);
        assert!(settings.audio_enabled);
        assert_eq!(settings.flash_mode, FlashMode::Auto);
        assert_eq!(settings.capture_mode, CaptureMode::Photo);
        assert_eq!(settings.max_zoom, 4.0);
    }

    #[test]
    fn test_camera_settings_partial_json() {
        let settings: CameraSettings =
            serde_json::from_str(r#"{"max_video_duration": 30.0, "capture_mode": "video"}"#)
                .unwrap();
        assert_eq!(settings.max_video_duration, 30.0);
        assert_eq!(settings.capture_mode, CaptureMode::Video);
        assert_eq!(settings.default_camera, CameraSelection::Rear);
    }

    #[test]
    fn test_video_quality_dimensions() {
        assert_eq!(VideoQuality::Resolution1920x1080.dimensions(), Some((1920, 1080)));
        assert_eq!(VideoQuality::Iframe960x540.dimensions(), Some((960, 540)));
        assert_eq!(VideoQuality::High.dimensions(), None);
    }
}
