//! 控制状态：实时反馈、参考量和安全边界

use nalgebra::{DVector, UnitQuaternion, Vector3, Vector6};
use reflex_trajectory::{Trajectory, WorkspaceTrajectory};

use crate::error::{Result, check_dim, check_finite};

/// 安全边界
///
/// 标量边界 `<= 0`（或 NaN）表示不限制，对应的检查被跳过。
/// 区间边界用 ±∞ 表示不限制。
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyLimits {
    /// 关节位置下限（rad）
    pub q_min: DVector<f64>,
    /// 关节位置上限（rad）
    pub q_max: DVector<f64>,
    /// 笛卡尔位置下限（m）
    pub x_min: Vector3<f64>,
    /// 笛卡尔位置上限（m）
    pub x_max: Vector3<f64>,
    /// 最大力（N）
    pub force_max: f64,
    /// 最大力矩（N·m）
    pub moment_max: f64,
    /// 关节跟踪误差上限（欧氏范数）
    pub joint_error_max: f64,
    /// 笛卡尔位置跟踪误差上限
    pub position_error_max: f64,
    /// 力跟踪误差上限
    pub force_error_max: f64,
    /// 力矩跟踪误差上限
    pub moment_error_max: f64,
}

impl SafetyLimits {
    /// 全部不限制的边界
    pub fn unbounded(n_q: usize) -> Self {
        Self {
            q_min: DVector::from_element(n_q, f64::NEG_INFINITY),
            q_max: DVector::from_element(n_q, f64::INFINITY),
            x_min: Vector3::repeat(f64::NEG_INFINITY),
            x_max: Vector3::repeat(f64::INFINITY),
            force_max: 0.0,
            moment_max: 0.0,
            joint_error_max: 0.0,
            position_error_max: 0.0,
            force_error_max: 0.0,
            moment_error_max: 0.0,
        }
    }

    /// 关节数
    pub fn joint_count(&self) -> usize {
        self.q_min.len()
    }

    /// 校验维度
    pub fn validate(&self, n_q: usize) -> Result<()> {
        check_dim("q_min", n_q, self.q_min.len())?;
        check_dim("q_max", n_q, self.q_max.len())?;
        Ok(())
    }
}

/// 一个控制周期的完整输入
///
/// 字段全部公开：调用者每个周期就地写入反馈和参考量，不需要重新分配。
///
/// | 量 | 反馈 | 参考 |
/// |----|------|------|
/// | 关节位置 | `q` | `q_ref` |
/// | 关节速度 | `dq` | `dq_ref` |
/// | 笛卡尔位置 | `x` | `x_ref` |
/// | 姿态 | `r` | `r_ref` |
/// | 速度旋量 | - | `dx_ref` |
/// | 力/力矩 | `wrench` | `wrench_ref` |
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    /// 关节位置
    pub q: DVector<f64>,
    /// 关节速度
    pub dq: DVector<f64>,
    /// 末端位置
    pub x: Vector3<f64>,
    /// 末端姿态
    pub r: UnitQuaternion<f64>,
    /// 末端力/力矩 `[Fx, Fy, Fz, Mx, My, Mz]`
    pub wrench: Vector6<f64>,

    /// 参考关节位置
    pub q_ref: DVector<f64>,
    /// 参考关节速度
    pub dq_ref: DVector<f64>,
    /// 参考末端位置
    pub x_ref: Vector3<f64>,
    /// 参考末端姿态
    pub r_ref: UnitQuaternion<f64>,
    /// 参考速度旋量 `[vx, vy, vz, ωx, ωy, ωz]`
    pub dx_ref: Vector6<f64>,
    /// 参考力/力矩
    pub wrench_ref: Vector6<f64>,

    /// 安全边界
    pub limits: SafetyLimits,
}

impl ControlState {
    /// 创建 `n_q` 关节的状态：向量全零，姿态为单位四元数，边界不限制
    pub fn new(n_q: usize) -> Self {
        Self {
            q: DVector::zeros(n_q),
            dq: DVector::zeros(n_q),
            x: Vector3::zeros(),
            r: UnitQuaternion::identity(),
            wrench: Vector6::zeros(),
            q_ref: DVector::zeros(n_q),
            dq_ref: DVector::zeros(n_q),
            x_ref: Vector3::zeros(),
            r_ref: UnitQuaternion::identity(),
            dx_ref: Vector6::zeros(),
            wrench_ref: Vector6::zeros(),
            limits: SafetyLimits::unbounded(n_q),
        }
    }

    /// 关节数（由 `q` 的长度决定）
    pub fn joint_count(&self) -> usize {
        self.q.len()
    }

    /// 校验维度一致性和数值有限性
    pub fn validate(&self) -> Result<()> {
        let n_q = self.joint_count();
        check_dim("dq", n_q, self.dq.len())?;
        check_dim("q_ref", n_q, self.q_ref.len())?;
        check_dim("dq_ref", n_q, self.dq_ref.len())?;
        self.limits.validate(n_q)?;

        check_finite("q", self.q.iter())?;
        check_finite("x", self.x.iter())?;
        check_finite("r", self.r.coords.iter())?;
        check_finite("wrench", self.wrench.iter())?;
        check_finite("q_ref", self.q_ref.iter())?;
        check_finite("x_ref", self.x_ref.iter())?;
        check_finite("r_ref", self.r_ref.coords.iter())?;
        check_finite("dx_ref", self.dx_ref.iter())?;
        check_finite("wrench_ref", self.wrench_ref.iter())?;
        Ok(())
    }

    /// 从关节空间轨迹采样 `q_ref` 和 `dq_ref`
    pub fn sample_joint_reference<T>(&mut self, trajectory: &T, t: f64) -> Result<()>
    where
        T: Trajectory + ?Sized,
    {
        trajectory.position(t, self.q_ref.as_mut_slice())?;
        trajectory.velocity(t, self.dq_ref.as_mut_slice())?;
        Ok(())
    }

    /// 从笛卡尔轨迹采样 `x_ref`、`r_ref` 和 `dx_ref`
    pub fn sample_workspace_reference<T>(&mut self, trajectory: &T, t: f64) -> Result<()>
    where
        T: WorkspaceTrajectory + ?Sized,
    {
        let pose = trajectory.pose(t)?;
        let twist = trajectory.twist(t)?;
        self.x_ref = pose.position;
        self.r_ref = pose.orientation;
        self.dx_ref = twist;
        Ok(())
    }
}
