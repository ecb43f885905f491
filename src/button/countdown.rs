// 最长录像时长倒计时 - 可取消的一次性定时任务

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// 倒计时到期通知
///
/// 带上代号,控制器据此丢弃已取消倒计时的过期通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownExpired {
    pub generation: u64,
}

/// 把代理返回的秒数换算成倒计时时长
///
/// 0、负数、NaN 和无法表示的值都视为不限时长
pub fn duration_limit(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}

/// 一次性倒计时
///
/// 被丢弃时后台任务同步中止
pub struct Countdown {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl Countdown {
    /// 启动倒计时,到期后通过 `notify` 发送一次到期通知
    pub fn arm(
        duration: Duration,
        generation: u64,
        notify: mpsc::UnboundedSender<CountdownExpired>,
    ) -> Self {
        // 截止时间在这里确定,不依赖后台任务何时第一次被调度
        let deadline = Instant::now() + duration;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = notify.send(CountdownExpired { generation });
        });

        Self {
            generation,
            deadline,
            task,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 剩余时间
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// 取消倒计时
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
