//! 设置参数验证
//!
//! 保存设置前检查取值范围,错误信息直接展示给用户

use crate::models::CameraSettings;

/// 验证最长录像时长
///
/// 0 和负数表示不限制,只拒绝 NaN 和无穷大
pub fn validate_max_video_duration(seconds: f64) -> Result<(), String> {
    if !seconds.is_finite() {
        return Err(format!("无效的最长录像时长: {}", seconds));
    }
    Ok(())
}

/// 验证最大缩放倍数（至少 1 倍）
pub fn validate_max_zoom(zoom: f64) -> Result<(), String> {
    if !zoom.is_finite() || zoom < 1.0 {
        return Err(format!("无效的最大缩放倍数: {}", zoom));
    }
    Ok(())
}

/// 验证完整的摄像头设置
pub fn validate_camera_settings(settings: &CameraSettings) -> Result<(), String> {
    validate_max_video_duration(settings.max_video_duration)?;
    validate_max_zoom(settings.max_zoom)?;
    Ok(())
}
