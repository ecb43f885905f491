// 拍摄会话 - 按钮代理的参考实现（会话所有者）
//
// CameraSession 实现按钮代理,把意图转成命令投递给后台 Worker
// SessionWorker 独占拍摄后端,维护录像状态机,并通过事件总线发布生命周期事件

pub mod backend;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::button::ButtonDelegate;
use crate::event_bus::{CaptureEvent, EventBus};
use crate::models::{
    CameraSelection, CameraSettings, CaptureMode, FlashMode, FocusPoint, RecordingState,
};
use crate::utils::{new_video_path, video_output_dir};
use backend::{AuthorizationStatus, CaptureBackend};

/// 停止录像的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 用户松开按钮
    Released,
    /// 达到最长录像时长
    MaxDuration,
    /// 会话停止
    SessionStopping,
}

/// 会话命令
pub enum SessionCommand {
    Start,
    Stop,
    TakePhoto {
        flash: FlashMode,
    },
    StartRecording,
    StopRecording {
        reason: StopReason,
    },
    SwitchCamera,
    Focus {
        point: FocusPoint,
    },
    Zoom {
        level: f64,
    },
    UpdateSettings {
        settings: CameraSettings,
    },
    GetRecordingState {
        reply: oneshot::Sender<RecordingState>,
    },
}

/// 代理查询需要同步返回的配置
struct SessionConfig {
    mode: CaptureMode,
    settings: CameraSettings,
}

/// 拍摄会话（按钮代理）
pub struct CameraSession {
    sender: mpsc::UnboundedSender<SessionCommand>,
    config: RwLock<SessionConfig>,
}

impl CameraSession {
    /// 创建会话,返回的 Worker 需要由调用方 spawn
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        event_bus: Arc<EventBus>,
        settings: CameraSettings,
    ) -> (Arc<Self>, SessionWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = SessionWorker {
            receiver,
            backend,
            event_bus,
            camera: settings.default_camera,
            zoom_level: 1.0,
            running: false,
            recording: RecordingState::Idle,
            settings: settings.clone(),
        };
        let session = Arc::new(Self {
            sender,
            config: RwLock::new(SessionConfig {
                mode: settings.capture_mode,
                settings,
            }),
        });
        (session, worker)
    }

    /// 启动采集会话
    pub fn start(&self) {
        self.send(SessionCommand::Start);
    }

    /// 停止采集会话,进行中的录像会先结束
    pub fn stop(&self) {
        self.send(SessionCommand::Stop);
    }

    /// 切换前后摄像头
    pub fn switch_camera(&self) {
        self.send(SessionCommand::SwitchCamera);
    }

    /// 在指定点对焦
    pub fn focus_at(&self, point: FocusPoint) {
        self.send(SessionCommand::Focus { point });
    }

    /// 设置缩放倍数,超出范围时截断
    pub fn set_zoom(&self, level: f64) {
        self.send(SessionCommand::Zoom { level });
    }

    /// 切换闪光灯模式: 自动 -> 开 -> 关 -> 自动
    pub fn toggle_flash(&self) -> FlashMode {
        match self.config.write() {
            Ok(mut config) => {
                config.settings.flash_mode = config.settings.flash_mode.next();
                info!("闪光灯模式: {:?}", config.settings.flash_mode);
                config.settings.flash_mode
            }
            Err(_) => FlashMode::default(),
        }
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.config
            .read()
            .map(|c| c.settings.flash_mode)
            .unwrap_or_default()
    }

    /// 应用新的设置（最长时长、缩放上限等）
    ///
    /// 当前拍摄模式由按钮切换,不随设置里的 capture_mode 变化
    pub fn update_settings(&self, settings: CameraSettings) {
        if let Ok(mut config) = self.config.write() {
            config.settings = settings.clone();
        }
        self.send(SessionCommand::UpdateSettings { settings });
    }

    /// 当前录像状态
    pub async fn recording_state(&self) -> RecordingState {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::GetRecordingState { reply });
        rx.await.unwrap_or_default()
    }

    fn send(&self, command: SessionCommand) {
        if self.sender.send(command).is_err() {
            warn!("拍摄会话 Worker 已停止，命令被丢弃");
        }
    }
}

impl ButtonDelegate for CameraSession {
    fn current_capture_mode(&self) -> CaptureMode {
        self.config.read().map(|c| c.mode).unwrap_or_default()
    }

    fn maximum_recording_duration(&self) -> f64 {
        self.config
            .read()
            .map(|c| c.settings.max_video_duration)
            .unwrap_or(0.0)
    }

    fn notify_tapped(&self) {
        let flash = self.flash_mode();
        self.send(SessionCommand::TakePhoto { flash });
    }

    fn notify_long_press_began(&self) {
        if self.current_capture_mode() != CaptureMode::Video {
            debug!("拍照模式下忽略长按");
            return;
        }
        self.send(SessionCommand::StartRecording);
    }

    fn notify_long_press_ended(&self) {
        self.send(SessionCommand::StopRecording {
            reason: StopReason::Released,
        });
    }

    fn notify_max_duration_reached(&self) {
        self.send(SessionCommand::StopRecording {
            reason: StopReason::MaxDuration,
        });
    }

    fn notify_mode_changed(&self, mode: CaptureMode) {
        if let Ok(mut config) = self.config.write() {
            config.mode = mode;
        }
        info!("拍摄模式切换为: {:?}", mode);
    }
}

/// 会话 Worker - 独占拍摄后端,按顺序执行命令
pub struct SessionWorker {
    receiver: mpsc::UnboundedReceiver<SessionCommand>,
    backend: Box<dyn CaptureBackend>,
    event_bus: Arc<EventBus>,
    settings: CameraSettings,
    camera: CameraSelection,
    zoom_level: f64,
    running: bool,
    recording: RecordingState,
}

impl SessionWorker {
    /// 运行 Worker
    pub async fn run(mut self) {
        info!("拍摄会话 Worker 已启动");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Start => self.start().await,
                SessionCommand::Stop => self.stop().await,
                SessionCommand::TakePhoto { flash } => self.take_photo(flash).await,
                SessionCommand::StartRecording => self.start_recording().await,
                SessionCommand::StopRecording { reason } => self.stop_recording(reason).await,
                SessionCommand::SwitchCamera => self.switch_camera().await,
                SessionCommand::Focus { point } => self.focus(point).await,
                SessionCommand::Zoom { level } => self.zoom(level).await,
                SessionCommand::UpdateSettings { settings } => {
                    self.settings = settings;
                    debug!("会话设置已更新");
                }
                SessionCommand::GetRecordingState { reply } => {
                    let _ = reply.send(self.recording);
                }
            }
        }

        // 所有句柄都已释放,收尾进行中的录像
        if self.recording.is_recording() {
            self.stop_recording(StopReason::SessionStopping).await;
        }
        info!("拍摄会话 Worker 已停止");
    }

    async fn start(&mut self) {
        if self.running {
            debug!("会话已在运行");
            return;
        }

        if self.backend.authorize().await != AuthorizationStatus::Authorized {
            warn!("没有摄像头或麦克风权限");
            self.event_bus.publish(CaptureEvent::NotAuthorized);
            return;
        }

        if let Err(e) = self.backend.configure(&self.settings).await {
            error!("会话配置失败: {}", e);
            self.event_bus.publish(CaptureEvent::ConfigurationFailed);
            return;
        }

        if let Err(e) = self.backend.start_running().await {
            error!("会话启动失败: {}", e);
            self.event_bus.publish(CaptureEvent::ConfigurationFailed);
            return;
        }

        self.running = true;
        info!("会话已开始运行，摄像头: {}", self.camera.as_str());
        self.event_bus.publish(CaptureEvent::SessionStarted);
    }

    async fn stop(&mut self) {
        if self.recording.is_recording() {
            self.stop_recording(StopReason::SessionStopping).await;
        }
        if !self.running {
            return;
        }

        if let Err(e) = self.backend.stop_running().await {
            warn!("停止会话出错: {}", e);
        }
        self.running = false;
        info!("会话已停止运行");
        self.event_bus.publish(CaptureEvent::SessionStopped);
    }

    async fn take_photo(&mut self, flash: FlashMode) {
        if !self.running {
            warn!("会话未运行，无法拍照");
            return;
        }

        match self.backend.capture_photo(flash).await {
            Ok(photo) => {
                info!("拍照完成: {}x{}", photo.width, photo.height);
                self.event_bus.publish(CaptureEvent::PhotoCaptured { photo });
            }
            Err(e) => {
                warn!("拍照失败: {}", e);
            }
        }
    }

    async fn start_recording(&mut self) {
        if !self.running {
            warn!("会话未运行，无法录像");
            return;
        }
        if self.recording.is_recording() {
            debug!("已在录像中");
            return;
        }

        // 输出目录在启动时已创建
        let output = default_video_path(&self.settings);
        match self.backend.start_recording(self.camera, &output).await {
            Ok(()) => {
                self.recording = RecordingState::Recording {
                    camera: self.camera,
                    started_at: Utc::now(),
                };
                info!("开始录像: {:?}", output);
                self.event_bus.publish(CaptureEvent::VideoRecordingBegan {
                    camera: self.camera,
                });
            }
            Err(e) => {
                error!("开始录像失败: {}", e);
                self.event_bus.publish(CaptureEvent::VideoFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn stop_recording(&mut self, reason: StopReason) {
        let RecordingState::Recording { camera, started_at } = self.recording else {
            debug!("没有进行中的录像，忽略停止请求 ({:?})", reason);
            return;
        };

        // 无论处理成功与否,状态都回到空闲
        self.recording = RecordingState::Idle;
        let elapsed = Utc::now() - started_at;
        info!(
            "录像结束 ({:?})，时长 {:.1} 秒",
            reason,
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        self.event_bus
            .publish(CaptureEvent::VideoRecordingFinished { camera });

        match self.backend.finish_recording().await {
            Ok(path) => {
                self.event_bus.publish(CaptureEvent::VideoProcessed { path });
            }
            Err(e) => {
                error!("录像处理失败: {}", e);
                self.event_bus.publish(CaptureEvent::VideoFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn switch_camera(&mut self) {
        let next = self.camera.flipped();
        match self.backend.switch_camera(next).await {
            Ok(()) => {
                self.camera = next;
                info!("已切换到{}摄像头", next.as_str());
                self.event_bus
                    .publish(CaptureEvent::CameraSwitched { camera: next });
            }
            Err(e) => warn!("切换摄像头失败: {}", e),
        }
    }

    async fn focus(&mut self, point: FocusPoint) {
        match self.backend.focus(point).await {
            Ok(()) => self.event_bus.publish(CaptureEvent::FocusChanged { point }),
            Err(e) => warn!("对焦失败: {}", e),
        }
    }

    async fn zoom(&mut self, level: f64) {
        if level.is_nan() {
            return;
        }
        let level = level.clamp(1.0, self.settings.max_zoom.max(1.0));
        if (level - self.zoom_level).abs() < f64::EPSILON {
            return;
        }

        match self.backend.set_zoom(level).await {
            Ok(()) => {
                self.zoom_level = level;
                self.event_bus.publish(CaptureEvent::ZoomChanged { level });
            }
            Err(e) => warn!("设置缩放失败: {}", e),
        }
    }
}

/// 录像文件默认输出目录下的一个新文件名
pub fn default_video_path(settings: &CameraSettings) -> PathBuf {
    new_video_path(&video_output_dir(settings))
}
