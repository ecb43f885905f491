// 拍摄按钮 - 点按拍照、长按录像的手势控制器
//
// 控制器只负责把手势翻译成意图,真正的拍摄由代理（会话所有者）完成
// 长按期间按代理给出的最长时长启动倒计时,到期后通知代理

pub mod countdown;

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::models::CaptureMode;
use countdown::{duration_limit, Countdown, CountdownExpired};

/// 拍摄按钮代理（会话所有者）
///
/// 查询接口在手势处理时同步调用,通知接口必须立即返回
pub trait ButtonDelegate: Send + Sync {
    /// 当前拍摄模式
    fn current_capture_mode(&self) -> CaptureMode;

    /// 最长录像时长（秒），0 或负数表示不限制
    fn maximum_recording_duration(&self) -> f64;

    /// 点按: 拍照
    fn notify_tapped(&self);

    /// 长按开始: 开始录像
    fn notify_long_press_began(&self);

    /// 长按结束: 停止录像
    fn notify_long_press_ended(&self);

    /// 录像达到最长时长
    fn notify_max_duration_reached(&self);

    /// 拍摄模式变化
    fn notify_mode_changed(&self, mode: CaptureMode);
}

/// 长按手势识别器的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongPressPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

/// 按钮状态快照
#[derive(Debug, Clone, Serialize)]
pub struct ButtonState {
    pub enabled: bool,
    pub mode: CaptureMode,
    pub long_press_active: bool,
    /// 倒计时剩余时间,未启动时为空
    pub countdown_remaining: Option<Duration>,
}

impl ButtonState {
    pub fn countdown_armed(&self) -> bool {
        self.countdown_remaining.is_some()
    }
}

/// 手势控制器
pub struct PressController {
    /// 代理,不持有所有权
    delegate: Weak<dyn ButtonDelegate>,
    /// 是否处理手势
    enabled: bool,
    /// 当前拍摄模式（与代理保持一致）
    mode: CaptureMode,
    /// 是否处于长按中
    long_press_active: bool,
    /// 最长时长倒计时,只在长按录像期间存在
    countdown: Option<Countdown>,
    next_generation: u64,
    expiry_sender: mpsc::UnboundedSender<CountdownExpired>,
}

impl PressController {
    /// 创建控制器
    ///
    /// 返回的接收器会收到倒计时到期通知,调用方需要在同一个事件循环里
    /// 把它交回 [`PressController::on_countdown_expired`]
    pub fn new(
        delegate: Weak<dyn ButtonDelegate>,
    ) -> (Self, mpsc::UnboundedReceiver<CountdownExpired>) {
        let (expiry_sender, expiry_receiver) = mpsc::unbounded_channel();
        let mode = delegate
            .upgrade()
            .map(|d| d.current_capture_mode())
            .unwrap_or_default();

        let controller = Self {
            delegate,
            enabled: true,
            mode,
            long_press_active: false,
            countdown: None,
            next_generation: 0,
            expiry_sender,
        };
        (controller, expiry_receiver)
    }

    /// 更换代理
    pub fn set_delegate(&mut self, delegate: Weak<dyn ButtonDelegate>) {
        self.delegate = delegate;
    }

    /// 启用/禁用手势处理
    ///
    /// 只影响之后的手势,不会取消正在进行的倒计时
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!("拍摄按钮{}", if enabled { "已启用" } else { "已禁用" });
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn is_long_press_active(&self) -> bool {
        self.long_press_active
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            enabled: self.enabled,
            mode: self.mode,
            long_press_active: self.long_press_active,
            countdown_remaining: self.countdown.as_ref().map(Countdown::remaining),
        }
    }

    /// 切换拍摄模式并通知代理
    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
        if let Some(delegate) = self.delegate() {
            delegate.notify_mode_changed(mode);
        }
    }

    /// 点按
    pub fn on_tap(&mut self) {
        if !self.enabled {
            trace!("按钮已禁用，忽略点按");
            return;
        }
        if let Some(delegate) = self.delegate() {
            debug!("点按 -> 拍照");
            delegate.notify_tapped();
        }
    }

    /// 按长按识别器的阶段分发
    pub fn on_long_press(&mut self, phase: LongPressPhase) {
        match phase {
            LongPressPhase::Began => self.on_long_press_begin(),
            LongPressPhase::Ended | LongPressPhase::Cancelled | LongPressPhase::Failed => {
                self.on_long_press_end()
            }
            LongPressPhase::Changed => {}
        }
    }

    /// 长按开始
    pub fn on_long_press_begin(&mut self) {
        if !self.enabled {
            trace!("按钮已禁用，忽略长按");
            return;
        }

        // 上一次的倒计时不应该还在,保险起见先取消
        self.cancel_countdown();
        self.long_press_active = true;

        let Some(delegate) = self.delegate() else {
            return;
        };
        debug!("长按开始 -> 开始录像");
        delegate.notify_long_press_began();

        self.mode = delegate.current_capture_mode();
        if self.mode != CaptureMode::Video {
            return;
        }

        let seconds = delegate.maximum_recording_duration();
        if let Some(limit) = duration_limit(seconds) {
            self.next_generation += 1;
            self.countdown = Some(Countdown::arm(
                limit,
                self.next_generation,
                self.expiry_sender.clone(),
            ));
            debug!("最长录像倒计时已启动: {:.1}秒", seconds);
        }
    }

    /// 长按结束（松开、取消或识别失败）
    pub fn on_long_press_end(&mut self) {
        if !self.enabled {
            trace!("按钮已禁用，忽略长按结束");
            return;
        }
        if !self.long_press_active {
            trace!("没有进行中的长按，忽略");
            return;
        }

        self.long_press_active = false;
        self.cancel_countdown();

        if let Some(delegate) = self.delegate() {
            debug!("长按结束 -> 停止录像");
            delegate.notify_long_press_ended();
        }
    }

    /// 倒计时到期
    ///
    /// 只处理当前倒计时的通知,已取消的倒计时留下的通知直接丢弃。
    /// 长按状态保持不变,用户松开时仍会发出长按结束
    pub fn on_countdown_expired(&mut self, expired: CountdownExpired) {
        let current = self.countdown.as_ref().map(Countdown::generation);
        if current != Some(expired.generation) {
            trace!("丢弃过期的倒计时通知: #{}", expired.generation);
            return;
        }

        self.countdown = None;
        info!("录像达到最长时长");
        if let Some(delegate) = self.delegate() {
            delegate.notify_max_duration_reached();
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            trace!("取消倒计时 #{}", countdown.generation());
            countdown.cancel();
        }
    }

    fn delegate(&self) -> Option<Arc<dyn ButtonDelegate>> {
        let delegate = self.delegate.upgrade();
        if delegate.is_none() {
            trace!("按钮代理已释放");
        }
        delegate
    }
}
