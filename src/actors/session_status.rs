// Session Status Actor - 使用Actor模式汇总会话状态
//
// 订阅事件总线,用消息传递替代Arc<RwLock<SessionStatus>>

use chrono::Utc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot};

use crate::event_bus::CaptureEvent;
use crate::models::SessionStatus;

/// 会话状态命令
pub enum SessionStatusCommand {
    /// 清除错误信息
    ClearError,

    /// 获取状态
    Get {
        reply: oneshot::Sender<SessionStatus>,
    },

    /// 健康检查
    HealthCheck {
        reply: oneshot::Sender<()>,
    },
}

/// 会话状态Actor
pub struct SessionStatusActor {
    receiver: mpsc::Receiver<SessionStatusCommand>,
    events: broadcast::Receiver<CaptureEvent>,
    status: SessionStatus, // 无需RwLock
}

impl SessionStatusActor {
    /// 创建新的Actor
    pub fn new(events: broadcast::Receiver<CaptureEvent>) -> (Self, SessionStatusHandle) {
        let (sender, receiver) = mpsc::channel(50);
        let actor = Self {
            receiver,
            events,
            status: SessionStatus {
                zoom_level: 1.0,
                ..SessionStatus::default()
            },
        };
        let handle = SessionStatusHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!("Session Status Actor 已启动");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        SessionStatusCommand::ClearError => {
                            self.status.last_error = None;
                        }
                        SessionStatusCommand::Get { reply } => {
                            let _ = reply.send(self.status.clone());
                        }
                        SessionStatusCommand::HealthCheck { reply } => {
                            let _ = reply.send(());
                        }
                    }
                }

                event = self.events.recv() => match event {
                    Ok(event) => self.apply(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("状态汇总丢失了 {} 个事件", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::info!("Session Status Actor 已停止");
    }

    fn apply(&mut self, event: &CaptureEvent) {
        let status = &mut self.status;
        match event {
            CaptureEvent::SessionStarted => {
                status.is_running = true;
                status.is_authorized = true;
                status.last_error = None;
            }
            CaptureEvent::SessionStopped => {
                status.is_running = false;
                status.is_recording = false;
            }
            CaptureEvent::PhotoCaptured { photo } => {
                status.photos_taken += 1;
                status.last_photo_time = Some(photo.captured_at);
            }
            CaptureEvent::VideoRecordingBegan { camera } => {
                status.is_recording = true;
                status.camera = *camera;
            }
            CaptureEvent::VideoRecordingFinished { .. } => {
                status.is_recording = false;
            }
            CaptureEvent::VideoProcessed { path } => {
                status.videos_recorded += 1;
                status.last_video_time = Some(Utc::now());
                status.last_video_path = Some(path.clone());
            }
            CaptureEvent::VideoFailed { reason } => {
                status.is_recording = false;
                status.last_error = Some(format!("录像失败: {}", reason));
            }
            CaptureEvent::CameraSwitched { camera } => {
                status.camera = *camera;
            }
            CaptureEvent::FocusChanged { .. } => {}
            CaptureEvent::ZoomChanged { level } => {
                status.zoom_level = *level;
            }
            CaptureEvent::ConfigurationFailed => {
                status.is_running = false;
                status.last_error = Some("会话配置失败".to_string());
            }
            CaptureEvent::NotAuthorized => {
                status.is_authorized = false;
                status.is_running = false;
                status.last_error = Some("没有摄像头或麦克风权限".to_string());
            }
        }
    }
}

/// 会话状态Handle
#[derive(Clone)]
pub struct SessionStatusHandle {
    sender: mpsc::Sender<SessionStatusCommand>,
}

impl SessionStatusHandle {
    /// 清除错误信息
    pub async fn clear_error(&self) {
        let _ = self.sender.send(SessionStatusCommand::ClearError).await;
    }

    /// 获取会话状态
    pub async fn get(&self) -> SessionStatus {
        let (reply, rx) = oneshot::channel();
        self.sender.send(SessionStatusCommand::Get { reply }).await.ok();
        rx.await.unwrap_or_default()
    }

    /// 健康检查
    /// 返回true表示Actor正常运行,false表示Actor无响应或已停止
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self
            .sender
            .send(SessionStatusCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            tracing::warn!("Session Status Actor 健康检查失败: 通道已关闭");
            return false;
        }

        match tokio::time::timeout(std::time::Duration::from_secs(5), rx).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                tracing::warn!("Session Status Actor 健康检查失败: Actor已停止");
                false
            }
            Err(_) => {
                tracing::warn!("Session Status Actor 健康检查失败: 超时(5秒)");
                false
            }
        }
    }
}
