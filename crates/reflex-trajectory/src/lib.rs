//! Reflex Trajectory - 机械臂轨迹生成
//!
//! 在实时控制循环之外预先分配全部内存，在控制循环内零分配地查询
//! 位置、速度、加速度。
//!
//! # 模块
//!
//! - **Scratch Arena** (`arena`): 一次性分配的 f64 缓冲区，按作用域分区
//! - **梯形曲线** (`trapezoidal`): 两路点、每轴同步的梯形速度规划
//! - **轨迹接口** (`trajectory`): 关节空间轨迹通用 trait
//! - **笛卡尔轨迹** (`workspace`): 旋转向量、SLERP 两种姿态表示
//! - **姿态运算** (`rotation`): 旋转向量、SLERP 及其导数
//!
//! # 快速开始
//!
//! ```rust
//! use reflex_trajectory::{ScratchArena, Trajectory, TrapezoidalProfile};
//!
//! let mut arena = ScratchArena::with_capacity(TrapezoidalProfile::required_capacity(3));
//! let mut region = arena.region();
//! let mut profile = TrapezoidalProfile::new(&mut region, 3)?;
//!
//! profile.set_limits(&[10.0; 3], &[10.0; 3])?;
//! profile.add_waypoint(0, 0.0, &[0.0, 0.0, 0.0])?;
//! profile.add_waypoint(1, 2.0, &[1.0, 2.0, 3.0])?;
//! profile.generate()?;
//!
//! let mut q = [0.0; 3];
//! profile.position(1.0, &mut q)?;
//! assert_eq!(q, [0.5, 1.0, 1.5]);
//! # Ok::<(), reflex_trajectory::TrajectoryError>(())
//! ```

pub mod arena;
pub mod error;
pub mod rotation;
pub mod trajectory;
pub mod trapezoidal;
pub mod workspace;

pub use arena::{Region, ScratchArena};
pub use error::{Result, TrajectoryError};
pub use trajectory::{Trajectory, Waypoints};
pub use trapezoidal::{BlendSolution, ProfileShape, Segment, TrapezoidalProfile};
pub use workspace::{
    RotationVectorTrajectory, SlerpTrajectory, WorkspacePose, WorkspaceTrajectory,
};
