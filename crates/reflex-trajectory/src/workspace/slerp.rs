//! 球面线性插值（SLERP）表示的笛卡尔轨迹
//!
//! 内部曲线为 `[x, y, z, τ]`，起点 `τ = 0`，终点 `τ = 1`。姿态由
//! `slerp(r0, r1, τ(t))` 重建，角速度由链式法则得到：
//!
//! ```text
//! ṙ = d slerp / dτ · dτ/dt
//! ω = 2·vec(ṙ ⊗ r*)
//! ```
//!
//! ⚠️ 角加速度查询未实现，`twist_rate()` 返回
//! [`TrajectoryError::Unsupported`]。

use nalgebra::{UnitQuaternion, Vector3, Vector6};

use super::{WorkspacePose, WorkspaceTrajectory};
use crate::arena::Region;
use crate::error::{Result, TrajectoryError};
use crate::rotation::{align_hemisphere, angular_velocity, slerp, slerp_derivative};
use crate::trajectory::Trajectory;
use crate::trapezoidal::{TrapezoidalProfile, WAYPOINT_COUNT};

/// 内部曲线维度：位置(3) + 插值参数(1)
const DOF: usize = 4;

/// 位置轴默认速度限值（m/s）
pub const DEFAULT_LINEAR_VELOCITY_LIMIT: f64 = 1.0;

/// 位置轴默认加速度限值（m/s²）
pub const DEFAULT_LINEAR_ACCELERATION_LIMIT: f64 = 1.0;

/// 插值参数默认速度限值
///
/// τ 在整段轨迹上只从 0 变到 1，限值取得远大于位置轴。
pub const DEFAULT_PARAMETER_VELOCITY_LIMIT: f64 = 50.0;

/// 插值参数默认加速度限值
pub const DEFAULT_PARAMETER_ACCELERATION_LIMIT: f64 = 50.0;

/// SLERP 笛卡尔轨迹
#[derive(Debug)]
pub struct SlerpTrajectory<'a> {
    profile: TrapezoidalProfile<'a>,
    /// 已添加、尚未提交的路点姿态
    staged: [Option<UnitQuaternion<f64>>; WAYPOINT_COUNT],
    /// 已提交的起止姿态（终点已与起点对齐到同一半球）
    committed: [UnitQuaternion<f64>; WAYPOINT_COUNT],
}

impl<'a> SlerpTrajectory<'a> {
    /// 从 arena 区域构造，使用默认限值
    pub fn new(region: &mut Region<'a>) -> Result<Self> {
        let mut profile = TrapezoidalProfile::new(region, DOF)?;
        profile.set_limits(
            &[
                DEFAULT_LINEAR_VELOCITY_LIMIT,
                DEFAULT_LINEAR_VELOCITY_LIMIT,
                DEFAULT_LINEAR_VELOCITY_LIMIT,
                DEFAULT_PARAMETER_VELOCITY_LIMIT,
            ],
            &[
                DEFAULT_LINEAR_ACCELERATION_LIMIT,
                DEFAULT_LINEAR_ACCELERATION_LIMIT,
                DEFAULT_LINEAR_ACCELERATION_LIMIT,
                DEFAULT_PARAMETER_ACCELERATION_LIMIT,
            ],
        )?;

        Ok(Self {
            profile,
            staged: [None; WAYPOINT_COUNT],
            committed: [UnitQuaternion::identity(); WAYPOINT_COUNT],
        })
    }

    /// 所需的 arena 容量（f64 个数）
    pub const fn required_capacity() -> usize {
        TrapezoidalProfile::required_capacity(DOF)
    }

    /// 覆盖默认限值（4 维：位置 3 + 插值参数 1）
    pub fn set_limits(&mut self, dx_max: &[f64], ddx_max: &[f64]) -> Result<()> {
        self.profile.set_limits(dx_max, ddx_max)
    }

    /// 内部关节空间曲线
    pub fn profile(&self) -> &TrapezoidalProfile<'a> {
        &self.profile
    }

    /// `t` 时刻的插值参数及其时间导数
    fn parameter(&self, t: f64) -> Result<([f64; DOF], [f64; DOF])> {
        let (mut xp, mut dxp) = ([0.0; DOF], [0.0; DOF]);
        self.profile.position(t, &mut xp)?;
        self.profile.velocity(t, &mut dxp)?;
        Ok((xp, dxp))
    }
}

impl WorkspaceTrajectory for SlerpTrajectory<'_> {
    fn add_waypoint(&mut self, index: usize, t: f64, pose: &WorkspacePose) -> Result<()> {
        let tau = match index {
            0 => 0.0,
            1 => 1.0,
            _ => {
                return Err(TrajectoryError::WaypointIndexOutOfRange {
                    index,
                    count: WAYPOINT_COUNT,
                });
            }
        };

        let p = &pose.position;
        self.profile.add_waypoint(index, t, &[p.x, p.y, p.z, tau])?;
        self.staged[index] = Some(pose.orientation);
        Ok(())
    }

    fn generate(&mut self) -> Result<()> {
        let [Some(r0), Some(r1)] = self.staged else {
            let index = self.staged.iter().position(Option::is_none).unwrap_or(0);
            return Err(TrajectoryError::MissingWaypoint { index });
        };

        self.profile.generate()?;
        self.committed = [r0, align_hemisphere(&r1, &r0)];
        Ok(())
    }

    fn is_generated(&self) -> bool {
        self.profile.is_generated()
    }

    fn time_span(&self) -> Option<(f64, f64)> {
        self.profile.time_span()
    }

    fn pose(&self, t: f64) -> Result<WorkspacePose> {
        let mut xp = [0.0; DOF];
        self.profile.position(t, &mut xp)?;

        let [r0, r1] = &self.committed;
        Ok(WorkspacePose::new(
            Vector3::new(xp[0], xp[1], xp[2]),
            slerp(r0, r1, xp[3]),
        ))
    }

    fn twist(&self, t: f64) -> Result<Vector6<f64>> {
        let (xp, dxp) = self.parameter(t)?;
        let (tau, dtau_dt) = (xp[3], dxp[3]);

        let [r0, r1] = &self.committed;
        let r = slerp(r0, r1, tau);
        let dr_dt = slerp_derivative(r0, r1, tau) * dtau_dt;
        let w = angular_velocity(&r, &dr_dt);

        Ok(Vector6::new(dxp[0], dxp[1], dxp[2], w.x, w.y, w.z))
    }

    fn twist_rate(&self, _t: f64) -> Result<Vector6<f64>> {
        Err(TrajectoryError::Unsupported(
            "angular acceleration of a SLERP trajectory",
        ))
    }
}
