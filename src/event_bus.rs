// 事件总线 - 拍摄会话生命周期事件的发布/订阅
//
// 会话所有者只负责发布事件,不关心谁在监听
// 使用 tokio::sync::broadcast 实现事件分发,发布方永远不会被订阅者阻塞

use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::models::{CameraSelection, CapturedPhoto, FocusPoint};

/// 拍摄生命周期事件 - 每个事件都是一次性通知,不做持久化
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    // --- 会话事件 ---

    /// 会话开始运行,可以拍照/录像
    SessionStarted,

    /// 会话停止运行,拍照/录像不可用
    SessionStopped,

    // --- 拍摄事件 ---

    /// 拍照完成
    PhotoCaptured {
        photo: CapturedPhoto,
    },

    /// 开始录像
    VideoRecordingBegan {
        camera: CameraSelection,
    },

    /// 录像结束（文件仍在处理中）
    VideoRecordingFinished {
        camera: CameraSelection,
    },

    /// 录像文件处理完成
    VideoProcessed {
        path: PathBuf,
    },

    /// 录像失败
    VideoFailed {
        reason: String,
    },

    // --- 设备事件 ---

    /// 切换了前后摄像头
    CameraSwitched {
        camera: CameraSelection,
    },

    /// 对焦点变化
    FocusChanged {
        point: FocusPoint,
    },

    /// 缩放倍数变化
    ZoomChanged {
        level: f64,
    },

    // --- 失败事件 ---

    /// 会话配置失败,本次会话无法拍摄
    ConfigurationFailed,

    /// 没有摄像头或麦克风权限
    NotAuthorized,
}

impl CaptureEvent {
    /// 事件名称,用于日志
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::SessionStopped => "session_stopped",
            Self::PhotoCaptured { .. } => "photo_captured",
            Self::VideoRecordingBegan { .. } => "video_recording_began",
            Self::VideoRecordingFinished { .. } => "video_recording_finished",
            Self::VideoProcessed { .. } => "video_processed",
            Self::VideoFailed { .. } => "video_failed",
            Self::CameraSwitched { .. } => "camera_switched",
            Self::FocusChanged { .. } => "focus_changed",
            Self::ZoomChanged { .. } => "zoom_changed",
            Self::ConfigurationFailed => "configuration_failed",
            Self::NotAuthorized => "not_authorized",
        }
    }
}

/// 事件总线
///
/// 使用 broadcast channel 实现发布/订阅模式
/// 支持多个订阅者同时接收事件
pub struct EventBus {
    sender: broadcast::Sender<CaptureEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小,建议 64-256
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 如果没有订阅者,事件会被丢弃(这是正常的)
    pub fn publish(&self, event: CaptureEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件 {} 已发布，订阅者数量: {}", name, receiver_count);
            }
            Err(_) => {
                tracing::trace!("事件 {} 已发布但无订阅者", name);
            }
        }
    }

    /// 订阅事件
    ///
    /// 返回一个接收器,可以用 `.recv().await` 接收事件
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.sender.subscribe()
    }

    /// 获取当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
