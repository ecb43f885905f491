// 拍摄控制核心 - 宿主 App 链接的主库

// 声明模块
pub mod actors;
pub mod button;
pub mod event_bus;
pub mod logger;
pub mod models;
pub mod observer;
pub mod presenter;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::info;

use actors::{ButtonActor, ButtonHandle, SessionStatusActor, SessionStatusHandle};
use button::ButtonDelegate;
use event_bus::EventBus;
use models::{CameraSettings, CameraSettingsUpdate, FocusPoint};
use observer::CaptureObserver;
use presenter::CapturePresenter;
use session::backend::CaptureBackend;
use session::CameraSession;
use settings::{SettingsManager, SETTINGS_FILE_NAME};

/// 事件总线容量
const EVENT_BUS_CAPACITY: usize = 128;

/// 应用状态
///
/// - 拍摄按钮：手势 -> 意图,运行在 Button Actor 上
/// - 拍摄会话：按钮代理,驱动宿主提供的拍摄后端
/// - 界面状态：观察会话事件,维护按钮可用状态和预览页面
/// - 会话状态：汇总事件得到的状态快照
/// - 事件总线：会话向外发布生命周期事件
#[derive(Clone)]
pub struct CameraApp {
    /// 拍摄按钮
    pub button: ButtonHandle,
    /// 拍摄会话
    pub session: Arc<CameraSession>,
    /// 界面状态
    pub presenter: Arc<CapturePresenter>,
    /// 会话状态
    pub status: SessionStatusHandle,
    /// 设置管理
    pub settings: Arc<SettingsManager>,
    /// 事件总线
    pub event_bus: Arc<EventBus>,
    /// 后台任务,App 释放时一并中止（会话 Worker 除外）
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl CameraApp {
    /// 启动拍摄核心
    ///
    /// `config_dir` 下保存 camera-settings.json;需要在 tokio 运行时中调用
    pub async fn launch(config_dir: PathBuf, backend: Box<dyn CaptureBackend>) -> Result<Self> {
        let settings = Arc::new(
            SettingsManager::new(config_dir.join(SETTINGS_FILE_NAME))
                .await
                .context("加载摄像头设置失败")?,
        );
        let camera_settings = settings.get().await;

        let output_dir = utils::video_output_dir(&camera_settings);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("创建录像目录失败: {:?}", output_dir))?;

        let event_bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
        let mut tasks = Vec::new();

        // 拍摄会话,Worker 在会话释放后自行收尾退出
        let (session, worker) =
            CameraSession::new(backend, event_bus.clone(), camera_settings.clone());
        tokio::spawn(worker.run());

        // 拍摄按钮,会话开始运行前保持禁用
        let delegate: Arc<dyn ButtonDelegate> = session.clone();
        let (button_actor, button) = ButtonActor::new(Arc::downgrade(&delegate));
        tasks.push(tokio::spawn(button_actor.run()));
        button.set_enabled(false);

        // 会话状态
        let (status_actor, status) = SessionStatusActor::new(event_bus.subscribe());
        tasks.push(tokio::spawn(status_actor.run()));

        // 界面状态
        let presenter = Arc::new(CapturePresenter::new(button.clone(), &camera_settings));
        let presenter_observer: Arc<dyn CaptureObserver> = presenter.clone();
        tasks.push(observer::observe(&event_bus, &presenter_observer));

        info!(
            "拍摄核心已启动，最长录像时长: {:.1}秒",
            camera_settings.max_video_duration
        );

        Ok(Self {
            button,
            session,
            presenter,
            status,
            settings,
            event_bus,
            tasks: Arc::new(Mutex::new(tasks)),
        })
    }

    /// 注册额外的观察者（不持有所有权）,App 释放时转发任务随之中止
    pub fn observe(&self, observer: &Arc<dyn CaptureObserver>) -> AbortHandle {
        let task = observer::observe(&self.event_bus, observer);
        let abort = task.abort_handle();
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
        abort
    }

    /// 开始运行采集会话
    pub fn start(&self) {
        self.session.start();
    }

    /// 停止采集会话
    pub fn stop(&self) {
        self.session.stop();
    }

    /// 点击预览画面对焦
    pub fn focus_at(&self, x: f64, y: f64) {
        self.session.focus_at(FocusPoint::new(x, y));
    }

    /// 更新并保存设置,立即应用到会话
    pub async fn update_settings(&self, update: CameraSettingsUpdate) -> Result<CameraSettings> {
        let settings = self.settings.update(update).await?;
        let output_dir = utils::video_output_dir(&settings);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("创建录像目录失败: {:?}", output_dir))?;
        self.session.update_settings(settings.clone());
        Ok(settings)
    }

    /// 检查所有 Actor 是否在运行
    pub async fn health_check(&self) -> bool {
        self.button.health_check().await && self.status.health_check().await
    }
}

impl Drop for CameraApp {
    fn drop(&mut self) {
        // 最后一个克隆释放时先停止会话,进行中的录像由 Worker 收尾
        if Arc::strong_count(&self.tasks) == 1 {
            self.session.stop();
            if let Ok(tasks) = self.tasks.lock() {
                for task in tasks.iter() {
                    task.abort();
                }
            }
        }
    }
}
