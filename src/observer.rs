// 生命周期观察者 - 会话事件的订阅接口
//
// 所有回调都有空的默认实现,观察者只需要实现关心的部分
// 观察者以 Weak 方式注册,会话所有者的生命周期不依赖观察者

use std::path::Path;
use std::sync::{Arc, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::event_bus::{CaptureEvent, EventBus};
use crate::models::{CameraSelection, CapturedPhoto, FocusPoint};

/// 拍摄会话观察者
///
/// 回调在事件循环上执行,不得阻塞;耗时的副作用应自行转交到其他任务
pub trait CaptureObserver: Send + Sync {
    fn session_did_start(&self) {}

    fn session_did_stop(&self) {}

    fn did_take_photo(&self, _photo: &CapturedPhoto) {}

    fn did_begin_recording(&self, _camera: CameraSelection) {}

    fn did_finish_recording(&self, _camera: CameraSelection) {}

    fn did_finish_processing_video(&self, _path: &Path) {}

    fn did_fail_to_record(&self, _reason: &str) {}

    fn did_switch_camera(&self, _camera: CameraSelection) {}

    fn did_focus_at(&self, _point: FocusPoint) {}

    fn did_change_zoom(&self, _level: f64) {}

    fn did_fail_to_configure(&self) {}

    fn not_authorized(&self) {}
}

impl CaptureEvent {
    /// 把事件分发到观察者对应的回调
    pub fn dispatch(&self, observer: &dyn CaptureObserver) {
        match self {
            Self::SessionStarted => observer.session_did_start(),
            Self::SessionStopped => observer.session_did_stop(),
            Self::PhotoCaptured { photo } => observer.did_take_photo(photo),
            Self::VideoRecordingBegan { camera } => observer.did_begin_recording(*camera),
            Self::VideoRecordingFinished { camera } => observer.did_finish_recording(*camera),
            Self::VideoProcessed { path } => observer.did_finish_processing_video(path),
            Self::VideoFailed { reason } => observer.did_fail_to_record(reason),
            Self::CameraSwitched { camera } => observer.did_switch_camera(*camera),
            Self::FocusChanged { point } => observer.did_focus_at(*point),
            Self::ZoomChanged { level } => observer.did_change_zoom(*level),
            Self::ConfigurationFailed => observer.did_fail_to_configure(),
            Self::NotAuthorized => observer.not_authorized(),
        }
    }
}

/// 注册观察者
///
/// 启动一个转发任务: 从事件总线接收事件并分发给观察者
/// 事件总线关闭或观察者被释放后任务自动结束
pub fn observe(bus: &EventBus, observer: &Arc<dyn CaptureObserver>) -> JoinHandle<()> {
    let mut receiver = bus.subscribe();
    let observer: Weak<dyn CaptureObserver> = Arc::downgrade(observer);

    tokio::spawn(async move {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("观察者处理过慢，丢弃了 {} 个事件", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    debug!("事件总线已关闭，观察者任务退出");
                    break;
                }
            };

            let Some(observer) = observer.upgrade() else {
                debug!("观察者已释放，停止转发事件");
                break;
            };
            event.dispatch(observer.as_ref());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{settle, RecordingObserver};
    use std::path::PathBuf;

    /// 只关心部分事件的观察者
    struct ZoomOnly {
        levels: std::sync::Mutex<Vec<f64>>,
    }

    impl CaptureObserver for ZoomOnly {
        fn did_change_zoom(&self, level: f64) {
            self.levels.lock().unwrap().push(level);
        }
    }

    #[tokio::test]
    async fn test_dispatch_to_partial_observer() {
        let observer = ZoomOnly {
            levels: std::sync::Mutex::new(Vec::new()),
        };

        CaptureEvent::SessionStarted.dispatch(&observer);
        CaptureEvent::ZoomChanged { level: 2.5 }.dispatch(&observer);
        CaptureEvent::NotAuthorized.dispatch(&observer);

        assert_eq!(*observer.levels.lock().unwrap(), vec![2.5]);
    }

    #[tokio::test]
    async fn test_observe_forwards_events_in_order() {
        let bus = EventBus::new(16);
        let recorder = Arc::new(RecordingObserver::default());
        let observer: Arc<dyn CaptureObserver> = recorder.clone();
        let _task = observe(&bus, &observer);

        bus.publish(CaptureEvent::VideoRecordingBegan {
            camera: CameraSelection::Rear,
        });
        bus.publish(CaptureEvent::VideoRecordingFinished {
            camera: CameraSelection::Rear,
        });
        bus.publish(CaptureEvent::VideoProcessed {
            path: PathBuf::from("/tmp/clip.mov"),
        });
        settle().await;

        assert_eq!(
            recorder.names(),
            vec![
                "video_recording_began",
                "video_recording_finished",
                "video_processed"
            ]
        );
    }

    #[tokio::test]
    async fn test_observe_stops_when_observer_dropped() {
        let bus = EventBus::new(16);
        let observer: Arc<dyn CaptureObserver> = Arc::new(RecordingObserver::default());
        let task = observe(&bus, &observer);

        drop(observer);
        bus.publish(CaptureEvent::SessionStopped);

        assert!(task.await.is_ok());
    }
}
