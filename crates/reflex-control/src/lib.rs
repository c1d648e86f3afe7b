//! Reflex Control - 安全边界检查与分解速率控制律
//!
//! 每个控制周期：
//!
//! 1. 调用者把反馈（`q`, `x`, `r`, 力/力矩）和参考量写入 [`ControlState`]，
//!    参考量可以直接从轨迹采样
//!    （[`ControlState::sample_joint_reference`] /
//!    [`ControlState::sample_workspace_reference`]）
//! 2. [`check_limits`] 按固定顺序检查安全边界
//! 3. [`compute_command`] 通过阻尼最小二乘把期望笛卡尔速度分解为关节速度
//!
//! 安全边界被触发时不返回错误：输出零速度命令和对应的 [`LimitStatus`]，
//! 由上层决定停止、回退还是重新规划。
//!
//! # 示例
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use reflex_control::{ControlGain, ControlState, LimitStatus, ResolvedRateController};
//!
//! let controller = ResolvedRateController::new(ControlGain::new(6).with_position_gain(1.0), 6)?;
//!
//! let mut state = ControlState::new(6);
//! state.limits.force_max = 50.0;
//! state.x[2] = 0.01;
//!
//! let cmd = controller.compute_command(&state, &DMatrix::identity(6, 6));
//! assert_eq!(cmd.status, LimitStatus::Ok);
//! assert!(cmd.velocity[2] < 0.0);
//! # Ok::<(), reflex_control::ControlError>(())
//! ```

pub mod config;
pub mod error;
pub mod gains;
pub mod law;
pub mod limits;
pub mod state;
pub mod status;

pub use config::ControlConfig;
pub use error::{ConfigError, ControlError};
pub use gains::ControlGain;
pub use law::{JointCommand, ResolvedRateController, compute_command, compute_command_into};
pub use limits::check_limits;
pub use state::{ControlState, SafetyLimits};
pub use status::LimitStatus;
