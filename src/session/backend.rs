// 拍摄后端接口 - 由宿主平台实现（摄像头/麦克风硬件、编码）

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CameraSelection, CameraSettings, CapturedPhoto, FlashMode, FocusPoint};

/// 摄像头/麦克风授权状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
}

/// 拍摄后端
///
/// 所有方法都在会话 Worker 任务上调用,可以耗时,但不要占住事件循环线程
#[async_trait]
pub trait CaptureBackend: Send {
    /// 请求/检查摄像头和麦克风权限
    async fn authorize(&mut self) -> AuthorizationStatus;

    /// 按设置配置采集会话（输入设备、输出、画质）
    async fn configure(&mut self, settings: &CameraSettings) -> Result<()>;

    /// 开始运行采集会话
    async fn start_running(&mut self) -> Result<()>;

    /// 停止运行采集会话
    async fn stop_running(&mut self) -> Result<()>;

    /// 拍一张照片
    async fn capture_photo(&mut self, flash: FlashMode) -> Result<CapturedPhoto>;

    /// 开始录像,写入 `output`
    async fn start_recording(&mut self, camera: CameraSelection, output: &Path) -> Result<()>;

    /// 结束录像,返回处理完成的视频文件
    async fn finish_recording(&mut self) -> Result<PathBuf>;

    /// 切换摄像头
    async fn switch_camera(&mut self, camera: CameraSelection) -> Result<()>;

    /// 在指定点对焦和测光
    async fn focus(&mut self, point: FocusPoint) -> Result<()>;

    /// 设置缩放倍数
    async fn set_zoom(&mut self, level: f64) -> Result<()>;
}
