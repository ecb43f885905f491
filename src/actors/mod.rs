// Actor模块 - 使用Actor模式管理并发状态
//
// 用Actor模式替代Arc<Mutex<T>>，通过消息传递实现并发控制
// 手势、倒计时和状态汇总都在各自的Actor里顺序处理

pub mod button;
pub mod session_status;

pub use button::{ButtonActor, ButtonCommand, ButtonHandle};
pub use session_status::{SessionStatusActor, SessionStatusCommand, SessionStatusHandle};
