//! 文件系统路径工具
//!
//! 录像输出目录、录像文件名和日志目录

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::models::CameraSettings;

/// 录像输出目录
///
/// 未配置时使用系统临时目录,录像在交给上层处理前只是临时文件
pub fn video_output_dir(settings: &CameraSettings) -> PathBuf {
    settings
        .output_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("sk-camera"))
}

/// 在目录下生成一个新的录像文件路径: `<uuid>.mov`
pub fn new_video_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}.mov", Uuid::new_v4()))
}

/// 获取日志目录路径（跨平台）
///
/// - macOS/iOS: ~/Library/Logs/sk-camera
/// - Windows: %APPDATA%/sk-camera/logs
/// - 其他: ~/.local/share/sk-camera/logs
pub fn get_log_dir() -> PathBuf {
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Library/Logs/sk-camera")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("sk-camera").join("logs")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share/sk-camera/logs")
    }
}
