//! 旋转向量表示的笛卡尔轨迹

use nalgebra::{UnitQuaternion, Vector3, Vector6};

use super::{WorkspacePose, WorkspaceTrajectory};
use crate::arena::Region;
use crate::error::{Result, TrajectoryError};
use crate::rotation::{quaternion_from_rotation_vector, rotation_vector, rotation_vector_near};
use crate::trajectory::Trajectory;
use crate::trapezoidal::{TrapezoidalProfile, WAYPOINT_COUNT};

/// 内部曲线维度：位置(3) + 旋转向量(3)
const DOF: usize = 6;

/// 默认速度限值（m/s 与 rad/s 同量级）
pub const DEFAULT_VELOCITY_LIMIT: f64 = 1.0;

/// 默认加速度限值
pub const DEFAULT_ACCELERATION_LIMIT: f64 = 1.0;

/// 旋转向量笛卡尔轨迹
///
/// 每个路点存储为 `[x, y, z, rx, ry, rz]`。旋转向量分支在 `generate()` 时
/// 选择：起点取主分支，终点取与起点最近的分支，避免 ±2π 歧义。替换任一路点
/// 后重新生成，分支会按当前路点重新选择。速度/加速度查询直接返回 6 维曲线的
/// 导数（旋转部分为旋转向量的时间导数）。
#[derive(Debug)]
pub struct RotationVectorTrajectory<'a> {
    profile: TrapezoidalProfile<'a>,
    /// 已添加的路点姿态
    staged: [Option<UnitQuaternion<f64>>; WAYPOINT_COUNT],
}

impl<'a> RotationVectorTrajectory<'a> {
    /// 从 arena 区域构造，使用默认限值
    pub fn new(region: &mut Region<'a>) -> Result<Self> {
        let mut profile = TrapezoidalProfile::new(region, DOF)?;
        profile.set_limits(
            &[DEFAULT_VELOCITY_LIMIT; DOF],
            &[DEFAULT_ACCELERATION_LIMIT; DOF],
        )?;
        Ok(Self {
            profile,
            staged: [None; WAYPOINT_COUNT],
        })
    }

    /// 所需的 arena 容量（f64 个数）
    pub const fn required_capacity() -> usize {
        TrapezoidalProfile::required_capacity(DOF)
    }

    /// 覆盖默认限值（6 维：位置 3 + 旋转向量 3）
    pub fn set_limits(&mut self, dx_max: &[f64], ddx_max: &[f64]) -> Result<()> {
        self.profile.set_limits(dx_max, ddx_max)
    }

    /// 内部关节空间曲线
    pub fn profile(&self) -> &TrapezoidalProfile<'a> {
        &self.profile
    }
}

impl WorkspaceTrajectory for RotationVectorTrajectory<'_> {
    fn add_waypoint(&mut self, index: usize, t: f64, pose: &WorkspacePose) -> Result<()> {
        if index >= WAYPOINT_COUNT {
            return Err(TrajectoryError::WaypointIndexOutOfRange {
                index,
                count: WAYPOINT_COUNT,
            });
        }

        // 先按主分支写入，generate() 时再选择最终分支
        let rv = rotation_vector(&pose.orientation);
        let p = &pose.position;
        self.profile.add_waypoint(index, t, &[p.x, p.y, p.z, rv.x, rv.y, rv.z])?;
        self.staged[index] = Some(pose.orientation);
        Ok(())
    }

    fn generate(&mut self) -> Result<()> {
        let [Some(r0), Some(r1)] = self.staged else {
            let index = self.staged.iter().position(Option::is_none).unwrap_or(0);
            return Err(TrajectoryError::MissingWaypoint { index });
        };

        let rv0 = rotation_vector(&r0);
        let rv1 = rotation_vector_near(&r1, &rv0);
        for (index, rv) in [(0, rv0), (1, rv1)] {
            let (t, x) = self.profile.waypoints().get(index)?;
            let waypoint = [x[0], x[1], x[2], rv.x, rv.y, rv.z];
            self.profile.add_waypoint(index, t, &waypoint)?;
        }

        self.profile.generate()
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
        Ok(WorkspacePose::new(
            Vector3::new(xp[0], xp[1], xp[2]),
            quaternion_from_rotation_vector(&Vector3::new(xp[3], xp[4], xp[5])),
        ))
    }

    fn twist(&self, t: f64) -> Result<Vector6<f64>> {
        let mut dx = Vector6::zeros();
        self.profile.velocity(t, dx.as_mut_slice())?;
        Ok(dx)
    }

    fn twist_rate(&self, t: f64) -> Result<Vector6<f64>> {
        let mut ddx = Vector6::zeros();
        self.profile.acceleration(t, ddx.as_mut_slice())?;
        Ok(ddx)
    }
}
