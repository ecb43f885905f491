// Button Actor - 在单一事件循环上运行手势控制器
//
// 手势入口和倒计时到期都变成消息,按顺序交给同一个控制器处理,无需加锁

use std::sync::Weak;

use tokio::sync::{mpsc, oneshot};

use crate::button::countdown::CountdownExpired;
use crate::button::{ButtonDelegate, ButtonState, LongPressPhase, PressController};
use crate::models::CaptureMode;

/// 按钮命令
pub enum ButtonCommand {
    /// 点按
    Tap,

    /// 长按手势阶段变化
    LongPress {
        phase: LongPressPhase,
    },

    /// 启用/禁用
    SetEnabled {
        enabled: bool,
    },

    /// 切换拍摄模式
    SetMode {
        mode: CaptureMode,
    },

    /// 更换代理
    SetDelegate {
        delegate: Weak<dyn ButtonDelegate>,
    },

    /// 获取状态
    Get {
        reply: oneshot::Sender<ButtonState>,
    },

    /// 健康检查
    HealthCheck {
        reply: oneshot::Sender<()>,
    },
}

/// 按钮Actor
pub struct ButtonActor {
    receiver: mpsc::UnboundedReceiver<ButtonCommand>,
    expired: mpsc::UnboundedReceiver<CountdownExpired>,
    controller: PressController, // 无需Mutex
}

impl ButtonActor {
    /// 创建新的Actor
    pub fn new(delegate: Weak<dyn ButtonDelegate>) -> (Self, ButtonHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (controller, expired) = PressController::new(delegate);
        let actor = Self {
            receiver,
            expired,
            controller,
        };
        let handle = ButtonHandle { sender };
        (actor, handle)
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!("Button Actor 已启动");

        loop {
            tokio::select! {
                biased;

                Some(expired) = self.expired.recv() => {
                    self.controller.on_countdown_expired(expired);
                }

                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle(cmd);
                }
            }
        }

        tracing::info!("Button Actor 已停止");
    }

    fn handle(&mut self, cmd: ButtonCommand) {
        match cmd {
            ButtonCommand::Tap => self.controller.on_tap(),

            ButtonCommand::LongPress { phase } => self.controller.on_long_press(phase),

            ButtonCommand::SetEnabled { enabled } => self.controller.set_enabled(enabled),

            ButtonCommand::SetMode { mode } => self.controller.set_mode(mode),

            ButtonCommand::SetDelegate { delegate } => self.controller.set_delegate(delegate),

            ButtonCommand::Get { reply } => {
                let _ = reply.send(self.controller.state());
            }

            ButtonCommand::HealthCheck { reply } => {
                let _ = reply.send(());
            }
        }
    }
}

/// 按钮Handle
///
/// 手势入口都是同步的,只投递消息,立即返回
#[derive(Clone)]
pub struct ButtonHandle {
    sender: mpsc::UnboundedSender<ButtonCommand>,
}

impl ButtonHandle {
    /// 点按
    pub fn tap(&self) {
        self.send(ButtonCommand::Tap);
    }

    /// 长按开始
    pub fn long_press_begin(&self) {
        self.long_press(LongPressPhase::Began);
    }

    /// 长按结束
    pub fn long_press_end(&self) {
        self.long_press(LongPressPhase::Ended);
    }

    /// 长按手势阶段变化
    pub fn long_press(&self, phase: LongPressPhase) {
        self.send(ButtonCommand::LongPress { phase });
    }

    /// 启用/禁用按钮
    pub fn set_enabled(&self, enabled: bool) {
        self.send(ButtonCommand::SetEnabled { enabled });
    }

    /// 切换拍摄模式
    pub fn set_mode(&self, mode: CaptureMode) {
        self.send(ButtonCommand::SetMode { mode });
    }

    /// 更换代理
    pub fn set_delegate(&self, delegate: Weak<dyn ButtonDelegate>) {
        self.send(ButtonCommand::SetDelegate { delegate });
    }

    /// 获取按钮状态
    pub async fn get(&self) -> Option<ButtonState> {
        let (reply, rx) = oneshot::channel();
        self.send(ButtonCommand::Get { reply });
        rx.await.ok()
    }

    /// 健康检查
    /// 返回true表示Actor正常运行,false表示Actor无响应或已停止
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();

        if self.sender.send(ButtonCommand::HealthCheck { reply }).is_err() {
            tracing::warn!("Button Actor 健康检查失败: 通道已关闭");
            return false;
        }

        match tokio::time::timeout(std::time::Duration::from_secs(5), rx).await {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                tracing::warn!("Button Actor 健康检查失败: Actor已停止");
                false
            }
            Err(_) => {
                tracing::warn!("Button Actor 健康检查失败: 超时(5秒)");
                false
            }
        }
    }

    fn send(&self, cmd: ButtonCommand) {
        if self.sender.send(cmd).is_err() {
            tracing::warn!("Button Actor 已停止，手势被丢弃");
        }
    }
}
