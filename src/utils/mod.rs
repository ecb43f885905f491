//! 工具函数模块
//!
//! 提供各类通用工具函数，包括：
//! - 设置参数验证
//! - 录像/日志目录与文件名

pub mod file_system;
pub mod validation;

// 重新导出常用函数
pub use file_system::*;
pub use validation::*;
