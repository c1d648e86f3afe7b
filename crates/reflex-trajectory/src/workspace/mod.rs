//! Workspace Trajectory Adapters - 笛卡尔空间轨迹
//!
//! 把笛卡尔路点（位置 + 四元数姿态）转换为关节空间梯形曲线能够处理的
//! 向量表示，再把查询结果转换回位置/姿态/速度旋量。
//!
//! 两种姿态表示：
//!
//! - [`RotationVectorTrajectory`]: 位置(3) + 旋转向量(3)，6 维梯形曲线
//! - [`SlerpTrajectory`]: 位置(3) + 插值参数 τ(1)，4 维梯形曲线，
//!   姿态通过球面线性插值重建
//!
//! 两者都只支持 2 个路点（起点、终点），内部独占一个
//! [`TrapezoidalProfile`](crate::TrapezoidalProfile)。

pub mod rotvec;
pub mod slerp;

pub use rotvec::RotationVectorTrajectory;
pub use slerp::SlerpTrajectory;

use nalgebra::{UnitQuaternion, Vector3, Vector6};
use std::fmt;

use crate::error::Result;

/// 笛卡尔空间位姿（位置 + 姿态）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspacePose {
    /// 位置（米）
    pub position: Vector3<f64>,
    /// 姿态（单位四元数）
    pub orientation: UnitQuaternion<f64>,
}

impl WorkspacePose {
    /// 从位置和姿态创建
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// 原点，无旋转
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }
}

impl fmt::Display for WorkspacePose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.orientation.quaternion();
        write!(
            f,
            "Pose(pos: ({:.3}, {:.3}, {:.3}), quat: Q({:.3}, {:.3}, {:.3}, {:.3}))",
            self.position.x, self.position.y, self.position.z, q.w, q.i, q.j, q.k
        )
    }
}

/// 笛卡尔空间轨迹
///
/// 速度旋量布局为 `[vx, vy, vz, ωx, ωy, ωz]`。
pub trait WorkspaceTrajectory {
    /// 设置第 `index` 个路点（0 = 起点，1 = 终点）
    fn add_waypoint(&mut self, index: usize, t: f64, pose: &WorkspacePose) -> Result<()>;

    /// 求解轨迹
    fn generate(&mut self) -> Result<()>;

    /// 是否已有成功生成的轨迹
    fn is_generated(&self) -> bool;

    /// 已提交轨迹的时间区间 `(t_i, t_f)`
    fn time_span(&self) -> Option<(f64, f64)>;

    /// 查询 `t` 时刻的位姿
    fn pose(&self, t: f64) -> Result<WorkspacePose>;

    /// 查询 `t` 时刻的速度旋量
    fn twist(&self, t: f64) -> Result<Vector6<f64>>;

    /// 查询 `t` 时刻的速度旋量变化率
    fn twist_rate(&self, t: f64) -> Result<Vector6<f64>>;
}
