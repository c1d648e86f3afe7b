//! Reflex SDK - 机械臂运动控制核心
//!
//! 把稀疏的目标路点转换为平滑的时间参数化参考轨迹，再结合实时反馈把参考量
//! 转换为安全的关节速度命令。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **轨迹层** (`trajectory`): Scratch Arena、梯形速度规划、笛卡尔轨迹
//! - **控制层** (`control`): 安全边界检查、分解速率控制律、TOML 配置
//! - **日志** (`logging`): tracing 订阅器初始化
//!
//! # 快速开始
//!
//! ```rust
//! use reflex_sdk::prelude::*;
//!
//! // 1. 规划
//! let mut arena = ScratchArena::with_capacity(TrapezoidalProfile::required_capacity(6));
//! let mut region = arena.region();
//! let mut profile = TrapezoidalProfile::new(&mut region, 6)?;
//! profile.set_limits(&[1.0; 6], &[2.0; 6])?;
//! profile.add_waypoint(0, 0.0, &[0.0; 6])?;
//! profile.add_waypoint(1, 2.0, &[0.5; 6])?;
//! profile.generate()?;
//!
//! // 2. 每个控制周期：采样参考量，计算命令
//! let controller = ResolvedRateController::new(ControlGain::new(6), 6)?;
//! let mut state = ControlState::new(6);
//! state.sample_joint_reference(&profile, 0.5)?;
//!
//! let jacobian = nalgebra::DMatrix::identity(6, 6);
//! let cmd = controller.compute_command(&state, &jacobian);
//! assert_eq!(cmd.status, LimitStatus::Ok);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod logging;
pub mod prelude;

/// 线性代数（与本 crate 使用的版本一致）
pub use nalgebra;

/// 轨迹层
pub use reflex_trajectory as trajectory;

/// 控制层
pub use reflex_control as control;

// --- 常用类型 ---

pub use reflex_trajectory::{
    RotationVectorTrajectory, ScratchArena, SlerpTrajectory, Trajectory, TrajectoryError,
    TrapezoidalProfile, WorkspacePose, WorkspaceTrajectory,
};

pub use reflex_control::{
    ConfigError, ControlConfig, ControlError, ControlGain, ControlState, JointCommand,
    LimitStatus, ResolvedRateController, SafetyLimits, check_limits, compute_command,
};
