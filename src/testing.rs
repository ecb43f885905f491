// 测试辅助 - 记录意图的代理、记录事件的观察者和假的拍摄后端

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::button::ButtonDelegate;
use crate::models::{
    CameraSelection, CameraSettings, CaptureMode, CapturedPhoto, FlashMode, FocusPoint,
};
use crate::observer::CaptureObserver;
use crate::session::backend::{AuthorizationStatus, CaptureBackend};

/// 让其他任务跑完当前能跑的部分
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// 按钮发出的意图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Tapped,
    LongPressBegan,
    LongPressEnded,
    MaxDurationReached,
    ModeChanged(CaptureMode),
}

/// 记录所有意图的代理
pub struct RecordingDelegate {
    mode: Mutex<CaptureMode>,
    max_duration: f64,
    intents: Mutex<Vec<Intent>>,
}

impl RecordingDelegate {
    pub fn new(mode: CaptureMode, max_duration: f64) -> Self {
        Self {
            mode: Mutex::new(mode),
            max_duration,
            intents: Mutex::new(Vec::new()),
        }
    }

    pub fn intents(&self) -> Vec<Intent> {
        self.intents.lock().unwrap().clone()
    }

    pub fn count(&self, intent: Intent) -> usize {
        self.intents().iter().filter(|i| **i == intent).count()
    }

    pub fn mode(&self) -> CaptureMode {
        *self.mode.lock().unwrap()
    }

    fn record(&self, intent: Intent) {
        self.intents.lock().unwrap().push(intent);
    }
}

impl ButtonDelegate for RecordingDelegate {
    fn current_capture_mode(&self) -> CaptureMode {
        self.mode()
    }

    fn maximum_recording_duration(&self) -> f64 {
        self.max_duration
    }

    fn notify_tapped(&self) {
        self.record(Intent::Tapped);
    }

    fn notify_long_press_began(&self) {
        self.record(Intent::LongPressBegan);
    }

    fn notify_long_press_ended(&self) {
        self.record(Intent::LongPressEnded);
    }

    fn notify_max_duration_reached(&self) {
        self.record(Intent::MaxDurationReached);
    }

    fn notify_mode_changed(&self, mode: CaptureMode) {
        *self.mode.lock().unwrap() = mode;
        self.record(Intent::ModeChanged(mode));
    }
}

/// 按顺序记录收到的事件名称
#[derive(Default)]
pub struct RecordingObserver {
    names: Mutex<Vec<&'static str>>,
}

impl RecordingObserver {
    pub fn names(&self) -> Vec<&'static str> {
        self.names.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.names.lock().unwrap().push(name);
    }
}

impl CaptureObserver for RecordingObserver {
    fn session_did_start(&self) {
        self.record("session_started");
    }

    fn session_did_stop(&self) {
        self.record("session_stopped");
    }

    fn did_take_photo(&self, _photo: &CapturedPhoto) {
        self.record("photo_captured");
    }

    fn did_begin_recording(&self, _camera: CameraSelection) {
        self.record("video_recording_began");
    }

    fn did_finish_recording(&self, _camera: CameraSelection) {
        self.record("video_recording_finished");
    }

    fn did_finish_processing_video(&self, _path: &Path) {
        self.record("video_processed");
    }

    fn did_fail_to_record(&self, _reason: &str) {
        self.record("video_failed");
    }

    fn did_switch_camera(&self, _camera: CameraSelection) {
        self.record("camera_switched");
    }

    fn did_focus_at(&self, _point: FocusPoint) {
        self.record("focus_changed");
    }

    fn did_change_zoom(&self, _level: f64) {
        self.record("zoom_changed");
    }

    fn did_fail_to_configure(&self) {
        self.record("configuration_failed");
    }

    fn not_authorized(&self) {
        self.record("not_authorized");
    }
}

/// 后端调用记录
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Authorize,
    Configure,
    StartRunning,
    StopRunning,
    CapturePhoto(FlashMode),
    StartRecording(CameraSelection),
    FinishRecording,
    SwitchCamera(CameraSelection),
    Focus(FocusPoint),
    Zoom(f64),
}

/// 假的拍摄后端,可以按需注入失败
#[derive(Default)]
pub struct FakeBackend {
    pub deny_authorization: bool,
    pub fail_configure: bool,
    pub fail_start_recording: bool,
    pub fail_finish_recording: bool,
    pub fail_photo: bool,
    pub(crate) calls: std::sync::Arc<Mutex<VecDeque<BackendCall>>>,
    pub(crate) recording_path: Option<PathBuf>,
}

impl FakeBackend {
    /// 调用记录,后端被移交给会话后仍可读取
    pub fn calls(&self) -> std::sync::Arc<Mutex<VecDeque<BackendCall>>> {
        self.calls.clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push_back(call);
    }
}

#[async_trait]
impl CaptureBackend for FakeBackend {
    async fn authorize(&mut self) -> AuthorizationStatus {
        self.record(BackendCall::Authorize);
        if self.deny_authorization {
            AuthorizationStatus::Denied
        } else {
            AuthorizationStatus::Authorized
        }
    }

    async fn configure(&mut self, _settings: &CameraSettings) -> Result<()> {
        self.record(BackendCall::Configure);
        if self.fail_configure {
            return Err(anyhow!("没有可用的摄像头"));
        }
        Ok(())
    }

    async fn start_running(&mut self) -> Result<()> {
        self.record(BackendCall::StartRunning);
        Ok(())
    }

    async fn stop_running(&mut self) -> Result<()> {
        self.record(BackendCall::StopRunning);
        Ok(())
    }

    async fn capture_photo(&mut self, flash: FlashMode) -> Result<CapturedPhoto> {
        self.record(BackendCall::CapturePhoto(flash));
        if self.fail_photo {
            return Err(anyhow!("拍照失败"));
        }
        Ok(CapturedPhoto {
            width: 4032,
            height: 3024,
            data: vec![0xff, 0xd8, 0xff],
            captured_at: Utc::now(),
        })
    }

    async fn start_recording(&mut self, camera: CameraSelection, output: &Path) -> Result<()> {
        self.record(BackendCall::StartRecording(camera));
        if self.fail_start_recording {
            return Err(anyhow!("无法开始录像"));
        }
        self.recording_path = Some(output.to_path_buf());
        Ok(())
    }

    async fn finish_recording(&mut self) -> Result<PathBuf> {
        self.record(BackendCall::FinishRecording);
        let path = self
            .recording_path
            .take()
            .ok_or_else(|| anyhow!("没有正在进行的录像"))?;
        if self.fail_finish_recording {
            return Err(anyhow!("录像文件写入失败"));
        }
        Ok(path)
    }

    async fn switch_camera(&mut self, camera: CameraSelection) -> Result<()> {
        self.record(BackendCall::SwitchCamera(camera));
        Ok(())
    }

    async fn focus(&mut self, point: FocusPoint) -> Result<()> {
        self.record(BackendCall::Focus(point));
        Ok(())
    }

    async fn set_zoom(&mut self, level: f64) -> Result<()> {
        self.record(BackendCall::Zoom(level));
        Ok(())
    }
}
