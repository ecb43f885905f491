// 拍摄界面状态 - 生命周期事件的观察者
//
// 只维护界面状态（按钮可用、录像计时、缩略图、预览页面、提示信息）,不负责绘制
// 宿主界面读取 ViewState 渲染,用户操作通过这里转发给按钮

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::actors::ButtonHandle;
use crate::models::{CameraSelection, CameraSettings, CaptureMode, CapturedPhoto, FocusPoint};
use crate::observer::CaptureObserver;

/// 拍摄完成后弹出的预览页面
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewScreen {
    /// 照片预览
    Photo(CapturedPhoto),
    /// 视频预览（播放录好的文件）
    Video(PathBuf),
}

/// 需要提示用户的信息
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// 会话配置失败
    CaptureUnavailable { message: String },
    /// 没有权限,`open_settings` 为真时提供跳转系统设置的入口
    PermissionRequired { message: String, open_settings: bool },
    /// 录像失败
    RecordingFailed { reason: String },
}

/// 界面状态
#[derive(Debug, Clone)]
pub struct ViewState {
    /// 拍摄按钮是否可用
    pub capture_enabled: bool,
    /// 当前拍摄模式
    pub mode: CaptureMode,
    /// 是否正在录像
    pub recording: bool,
    /// 闪光灯、翻转等辅助按钮是否显示（录像时隐藏）
    pub controls_visible: bool,
    /// 录像开始时间
    pub recording_started: Option<Instant>,
    /// 最近一张照片的缩略图
    pub thumbnail: Option<CapturedPhoto>,
    /// 对焦指示框位置
    pub focus_indicator: Option<FocusPoint>,
    pub camera: CameraSelection,
    pub zoom_level: f64,
    /// 当前弹出的预览页面
    pub review: Option<ReviewScreen>,
    /// 当前提示
    pub notice: Option<Notice>,
}

impl ViewState {
    fn new(settings: &CameraSettings) -> Self {
        Self {
            capture_enabled: false,
            mode: settings.capture_mode,
            recording: false,
            controls_visible: true,
            recording_started: None,
            thumbnail: None,
            focus_indicator: None,
            camera: settings.default_camera,
            zoom_level: 1.0,
            review: None,
            notice: None,
        }
    }
}

/// 录像计时显示: `MM:SS`
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// 拍摄界面状态
pub struct CapturePresenter {
    button: ButtonHandle,
    prompt_to_app_settings: bool,
    state: RwLock<ViewState>,
}

impl CapturePresenter {
    pub fn new(button: ButtonHandle, settings: &CameraSettings) -> Self {
        Self {
            button,
            prompt_to_app_settings: settings.prompt_to_app_settings,
            state: RwLock::new(ViewState::new(settings)),
        }
    }

    /// 当前界面状态
    pub fn state(&self) -> Option<ViewState> {
        self.state.read().ok().map(|s| s.clone())
    }

    /// 模式切换控件
    pub fn select_mode(&self, mode: CaptureMode) {
        self.update(|s| s.mode = mode);
        self.button.set_mode(mode);
    }

    /// 点击缩略图,打开照片预览
    ///
    /// 还没有拍过照片时返回 false
    pub fn open_photo_review(&self) -> bool {
        let mut opened = false;
        self.update(|s| {
            if let Some(photo) = &s.thumbnail {
                s.review = Some(ReviewScreen::Photo(photo.clone()));
                opened = true;
            }
        });
        opened
    }

    /// 关闭预览页面
    pub fn dismiss_review(&self) {
        self.update(|s| s.review = None);
    }

    /// 关闭提示
    pub fn dismiss_notice(&self) {
        self.update(|s| s.notice = None);
    }

    /// 录像计时显示,未录像时为空
    pub fn recording_clock(&self) -> Option<String> {
        let started = self.state.read().ok()?.recording_started?;
        Some(format_clock(started.elapsed().as_secs()))
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        if let Ok(mut state) = self.state.write() {
            f(&mut state);
        }
    }
}

impl CaptureObserver for CapturePresenter {
    fn session_did_start(&self) {
        info!("会话已开始运行，启用拍摄按钮");
        self.update(|s| s.capture_enabled = true);
        self.button.set_enabled(true);
    }

    fn session_did_stop(&self) {
        info!("会话已停止运行，禁用拍摄按钮");
        self.update(|s| s.capture_enabled = false);
        self.button.set_enabled(false);
    }

    fn did_take_photo(&self, photo: &CapturedPhoto) {
        self.update(|s| s.thumbnail = Some(photo.clone()));
    }

    fn did_begin_recording(&self, _camera: CameraSelection) {
        self.update(|s| {
            s.recording = true;
            s.controls_visible = false;
            s.recording_started = Some(Instant::now());
        });
    }

    fn did_finish_recording(&self, _camera: CameraSelection) {
        self.update(|s| {
            s.recording = false;
            s.controls_visible = true;
            s.recording_started = None;
        });
    }

    fn did_finish_processing_video(&self, path: &Path) {
        debug!("打开视频预览: {:?}", path);
        self.update(|s| s.review = Some(ReviewScreen::Video(path.to_path_buf())));
    }

    fn did_fail_to_record(&self, reason: &str) {
        warn!("录像失败: {}", reason);
        self.update(|s| {
            s.recording = false;
            s.controls_visible = true;
            s.recording_started = None;
            s.notice = Some(Notice::RecordingFailed {
                reason: reason.to_string(),
            });
        });
    }

    fn did_switch_camera(&self, camera: CameraSelection) {
        debug!("摄像头切换为: {}", camera.as_str());
        self.update(|s| s.camera = camera);
    }

    fn did_focus_at(&self, point: FocusPoint) {
        debug!("对焦点: ({:.1}, {:.1})", point.x, point.y);
        self.update(|s| s.focus_indicator = Some(point));
    }

    fn did_change_zoom(&self, level: f64) {
        debug!("缩放倍数: {:.2}", level);
        self.update(|s| s.zoom_level = level);
    }

    fn did_fail_to_configure(&self) {
        self.update(|s| {
            s.capture_enabled = false;
            s.notice = Some(Notice::CaptureUnavailable {
                message: "无法使用摄像头拍摄".to_string(),
            });
        });
        self.button.set_enabled(false);
    }

    fn not_authorized(&self) {
        let open_settings = self.prompt_to_app_settings;
        self.update(|s| {
            s.capture_enabled = false;
            s.notice = Some(Notice::PermissionRequired {
                message: "需要摄像头和麦克风权限才能拍摄".to_string(),
                open_settings,
            });
        });
        self.button.set_enabled(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::ButtonActor;
    use crate::button::ButtonDelegate;
    use crate::event_bus::CaptureEvent;
    use crate::testing::{settle, Intent, RecordingDelegate};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn presenter_with(delegate: &Arc<RecordingDelegate>) -> (CapturePresenter, ButtonHandle) {
        let delegate: Arc<dyn ButtonDelegate> = delegate.clone();
        let (actor, handle) = ButtonActor::new(Arc::downgrade(&delegate));
        tokio::spawn(actor.run());
        handle.set_enabled(false);
        let presenter = CapturePresenter::new(handle.clone(), &CameraSettings::default());
        (presenter, handle)
    }

    fn photo() -> CapturedPhoto {
        CapturedPhoto {
            width: 640,
            height: 480,
            data: Vec::new(),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(7), "00:07");
        assert_eq!(format_clock(10), "00:10");
        assert_eq!(format_clock(75), "01:15");
    }

    #[tokio::test]
    async fn test_session_start_enables_button() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Photo, 10.0));
        let (presenter, button) = presenter_with(&delegate);

        button.tap();
        settle().await;
        assert!(delegate.intents().is_empty());

        CaptureEvent::SessionStarted.dispatch(&presenter);
        button.tap();
        settle().await;
        assert_eq!(delegate.intents(), vec![Intent::Tapped]);
        assert!(presenter.state().unwrap().capture_enabled);

        CaptureEvent::SessionStopped.dispatch(&presenter);
        let state = button.get().await.unwrap();
        assert!(!state.enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_clock() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Video, 10.0));
        let (presenter, _button) = presenter_with(&delegate);
        assert_eq!(presenter.recording_clock(), None);

        CaptureEvent::VideoRecordingBegan {
            camera: CameraSelection::Rear,
        }
        .dispatch(&presenter);
        assert!(!presenter.state().unwrap().controls_visible);

        tokio::time::advance(Duration::from_secs(7)).await;
        assert_eq!(presenter.recording_clock().as_deref(), Some("00:07"));

        CaptureEvent::VideoRecordingFinished {
            camera: CameraSelection::Rear,
        }
        .dispatch(&presenter);
        let state = presenter.state().unwrap();
        assert!(state.controls_visible);
        assert!(!state.recording);
        assert_eq!(presenter.recording_clock(), None);
    }

    #[tokio::test]
    async fn test_review_screens() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Photo, 10.0));
        let (presenter, _button) = presenter_with(&delegate);

        assert!(!presenter.open_photo_review());

        CaptureEvent::PhotoCaptured { photo: photo() }.dispatch(&presenter);
        assert!(presenter.open_photo_review());
        assert!(matches!(
            presenter.state().unwrap().review,
            Some(ReviewScreen::Photo(_))
        ));
        presenter.dismiss_review();

        CaptureEvent::VideoProcessed {
            path: PathBuf::from("/tmp/clip.mov"),
        }
        .dispatch(&presenter);
        assert_eq!(
            presenter.state().unwrap().review,
            Some(ReviewScreen::Video(PathBuf::from("/tmp/clip.mov")))
        );
    }

    #[tokio::test]
    async fn test_failure_notices() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Photo, 10.0));
        let (presenter, _button) = presenter_with(&delegate);

        CaptureEvent::ConfigurationFailed.dispatch(&presenter);
        assert_eq!(
            presenter.state().unwrap().notice,
            Some(Notice::CaptureUnavailable {
                message: "无法使用摄像头拍摄".to_string()
            })
        );

        CaptureEvent::NotAuthorized.dispatch(&presenter);
        assert_eq!(
            presenter.state().unwrap().notice,
            Some(Notice::PermissionRequired {
                message: "需要摄像头和麦克风权限才能拍摄".to_string(),
                open_settings: true,
            })
        );

        CaptureEvent::VideoFailed {
            reason: "磁盘已满".to_string(),
        }
        .dispatch(&presenter);
        let state = presenter.state().unwrap();
        assert_eq!(
            state.notice,
            Some(Notice::RecordingFailed {
                reason: "磁盘已满".to_string()
            })
        );
        assert!(!state.recording);

        presenter.dismiss_notice();
        assert!(presenter.state().unwrap().notice.is_none());
    }

    #[tokio::test]
    async fn test_select_mode_reaches_delegate() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Photo, 10.0));
        let (presenter, _button) = presenter_with(&delegate);

        presenter.select_mode(CaptureMode::Video);
        settle().await;

        assert_eq!(presenter.state().unwrap().mode, CaptureMode::Video);
        assert_eq!(delegate.mode(), CaptureMode::Video);
    }

    #[tokio::test]
    async fn test_focus_zoom_camera_mirrored() {
        let delegate = Arc::new(RecordingDelegate::new(CaptureMode::Photo, 10.0));
        let (presenter, _button) = presenter_with(&delegate);

        CaptureEvent::FocusChanged {
            point: FocusPoint::new(10.0, 20.0),
        }
        .dispatch(&presenter);
        CaptureEvent::ZoomChanged { level: 3.0 }.dispatch(&presenter);
        CaptureEvent::CameraSwitched {
            camera: CameraSelection::Front,
        }
        .dispatch(&presenter);

        let state = presenter.state().unwrap();
        assert_eq!(state.focus_indicator, Some(FocusPoint::new(10.0, 20.0)));
        assert_eq!(state.zoom_level, 3.0);
        assert_eq!(state.camera, CameraSelection::Front);
    }
}
