//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use reflex_sdk::prelude::*;
//! ```

// 轨迹层
pub use reflex_trajectory::{
    Region, RotationVectorTrajectory, ScratchArena, SlerpTrajectory, Trajectory,
    TrapezoidalProfile, WorkspacePose, WorkspaceTrajectory,
};

// 控制层
pub use reflex_control::{
    ControlConfig, ControlGain, ControlState, JointCommand, LimitStatus, ResolvedRateController,
    SafetyLimits, check_limits, compute_command,
};

// 错误类型
pub use reflex_control::{ConfigError, ControlError};
pub use reflex_trajectory::TrajectoryError;
