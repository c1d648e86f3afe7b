//! Resolved-Rate Workspace Control Law - 分解速率控制律
//!
//! # 算法
//!
//! ```text
//! x_e  = [x - x_ref, rotvec(r ⊗ r_ref⁻¹)]
//! dx_u = dx_ref - k_p ⊙ x_e - k_f ⊙ (F - F_ref)
//! dq_n = -k_q ⊙ (q - q_ref)
//! u    = dq_n + Jᵀ (J Jᵀ + λ² I)⁻¹ (dx_u - J dq_n)
//! ```
//!
//! `dq_n` 是零空间（次要目标）速度：把冗余关节拉回参考构型，不影响
//! 分解出的笛卡尔运动。`J Jᵀ + λ² I` 为 6×6 对称矩阵，用 Cholesky 分解
//! 求解，计算过程不分配堆内存。
//!
//! # 安全
//!
//! 先运行 [`check_limits`]。任何非 `Ok` 结果都会把输出清零并返回该结果：
//! 调用者同时得到可用的零命令和原因。

use nalgebra::{DMatrix, DVector, Matrix6, Vector3, Vector6};
use reflex_trajectory::rotation::{relative, rotation_vector_near};
use tracing::{debug, warn};

use crate::error::{Result, check_dim, check_finite};
use crate::gains::ControlGain;
use crate::limits::check_limits;
use crate::state::ControlState;
use crate::status::LimitStatus;

/// 笛卡尔空间维度（位置 3 + 姿态 3）
pub const WORKSPACE_DOF: usize = 6;

/// 关节速度命令
#[derive(Debug, Clone, PartialEq)]
pub struct JointCommand {
    /// 关节速度（长度始终为 n_q；非 `Ok` 时全零）
    pub velocity: DVector<f64>,
    /// 本周期结果
    pub status: LimitStatus,
}

impl JointCommand {
    /// 是否为可执行的非零命令
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// 笛卡尔误差 `[x - x_ref, rotvec(r ⊗ r_ref⁻¹)]`
///
/// 姿态误差取最接近零向量的旋转向量分支（旋转角不超过 π）。
pub fn workspace_error(state: &ControlState) -> Vector6<f64> {
    let e_x = state.x - state.x_ref;
    let e_r = rotation_vector_near(&relative(&state.r, &state.r_ref), &Vector3::zeros());
    Vector6::new(e_x.x, e_x.y, e_x.z, e_r.x, e_r.y, e_r.z)
}

/// 期望笛卡尔速度 `dx_ref - k_p ⊙ x_e - k_f ⊙ (F - F_ref)`
pub fn desired_twist(state: &ControlState, gains: &ControlGain) -> Vector6<f64> {
    let x_e = workspace_error(state);
    let f_e = state.wrench - state.wrench_ref;
    state.dx_ref - gains.position.component_mul(&x_e) - gains.force.component_mul(&f_e)
}

fn validate_inputs(
    state: &ControlState,
    gains: &ControlGain,
    jacobian: &DMatrix<f64>,
    u: &DVector<f64>,
) -> Result<()> {
    let n_q = state.joint_count();
    state.validate()?;
    gains.validate(n_q)?;
    check_dim("jacobian rows", WORKSPACE_DOF, jacobian.nrows())?;
    check_dim("jacobian columns", n_q, jacobian.ncols())?;
    check_dim("command", n_q, u.len())?;
    check_finite("jacobian", jacobian.iter())?;
    Ok(())
}

/// 计算关节速度命令，写入调用者提供的 `u`（长度必须为 n_q）
///
/// 不分配堆内存。输入无效或 `J Jᵀ + λ² I` 无法分解时清零 `u` 并返回
/// [`LimitStatus::InvalidInput`]。
pub fn compute_command_into(
    state: &ControlState,
    gains: &ControlGain,
    jacobian: &DMatrix<f64>,
    u: &mut DVector<f64>,
) -> LimitStatus {
    if let Err(e) = validate_inputs(state, gains, jacobian, u) {
        warn!("Rejected control input: {}", e);
        u.fill(0.0);
        return LimitStatus::InvalidInput;
    }

    let status = check_limits(state);
    if !status.is_ok() {
        u.fill(0.0);
        return status;
    }

    let dx_u = desired_twist(state, gains);

    // 零空间速度先写入 u
    for (j, u_j) in u.iter_mut().enumerate() {
        *u_j = -gains.joint[j] * (state.q[j] - state.q_ref[j]);
    }

    // J Jᵀ + λ² I
    let lambda_sq = gains.damping * gains.damping;
    let mut jjt = Matrix6::<f64>::zeros();
    for i in 0..WORKSPACE_DOF {
        for k in i..WORKSPACE_DOF {
            let v = jacobian.row(i).dot(&jacobian.row(k));
            jjt[(i, k)] = v;
            jjt[(k, i)] = v;
        }
        jjt[(i, i)] += lambda_sq;
    }

    let Some(chol) = jjt.cholesky() else {
        warn!(
            "Damped least-squares factorization failed (damping = {}), commanding zero velocity",
            gains.damping
        );
        u.fill(0.0);
        return LimitStatus::InvalidInput;
    };

    // dx_u - J dq_n
    let mut residual = dx_u;
    for i in 0..WORKSPACE_DOF {
        residual[i] -= jacobian.row(i).tr_dot(u);
    }

    // u = dq_n + Jᵀ y
    let y = chol.solve(&residual);
    for (j, u_j) in u.iter_mut().enumerate() {
        *u_j += jacobian.column(j).dot(&y);
    }

    debug!("Resolved-rate command: |u| = {:.6}", u.norm());
    LimitStatus::Ok
}

/// 计算关节速度命令
///
/// # 示例
///
/// ```rust
/// use nalgebra::DMatrix;
/// use reflex_control::{ControlGain, ControlState, LimitStatus, compute_command};
///
/// let mut state = ControlState::new(6);
/// state.dx_ref[0] = 0.1;
///
/// let gains = ControlGain::new(6).with_damping(0.0);
/// let cmd = compute_command(&state, &gains, &DMatrix::identity(6, 6));
///
/// assert_eq!(cmd.status, LimitStatus::Ok);
/// assert!((cmd.velocity[0] - 0.1).abs() < 1e-12);
/// ```
pub fn compute_command(
    state: &ControlState,
    gains: &ControlGain,
    jacobian: &DMatrix<f64>,
) -> JointCommand {
    let mut velocity = DVector::zeros(state.joint_count());
    let status = compute_command_into(state, gains, jacobian, &mut velocity);
    JointCommand { velocity, status }
}

/// 分解速率控制器
///
/// 持有已校验的增益，每个控制周期调用 [`compute_command`](Self::compute_command)。
#[derive(Debug, Clone)]
pub struct ResolvedRateController {
    gains: ControlGain,
}

impl ResolvedRateController {
    /// 创建控制器，校验增益维度
    pub fn new(gains: ControlGain, n_q: usize) -> Result<Self> {
        gains.validate(n_q)?;
        Ok(Self { gains })
    }

    /// 关节数
    pub fn joint_count(&self) -> usize {
        self.gains.joint_count()
    }

    /// 当前增益
    pub fn gains(&self) -> &ControlGain {
        &self.gains
    }

    /// 替换增益（维度必须与当前一致）
    pub fn set_gains(&mut self, gains: ControlGain) -> Result<()> {
        gains.validate(self.joint_count())?;
        self.gains = gains;
        Ok(())
    }

    /// 仅检查安全边界
    pub fn check_limits(&self, state: &ControlState) -> LimitStatus {
        check_limits(state)
    }

    /// 计算关节速度命令
    pub fn compute_command(&self, state: &ControlState, jacobian: &DMatrix<f64>) -> JointCommand {
        compute_command(state, &self.gains, jacobian)
    }

    /// 计算关节速度命令（写入 `u`，不分配）
    pub fn compute_command_into(
        &self,
        state: &ControlState,
        jacobian: &DMatrix<f64>,
        u: &mut DVector<f64>,
    ) -> LimitStatus {
        compute_command_into(state, &self.gains, jacobian, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn identity_jacobian() -> DMatrix<f64> {
        DMatrix::identity(6, 6)
    }

    #[test]
    fn test_feedforward_passes_through() {
        let mut state = ControlState::new(6);
        state.dx_ref = Vector6::new(0.1, -0.2, 0.0, 0.0, 0.05, 0.3);

        let gains = ControlGain::new(6).with_damping(0.0);
        let cmd = compute_command(&state, &gains, &identity_jacobian());

        assert!(cmd.is_ok());
        assert_relative_eq!(
            cmd.velocity,
            DVector::from_column_slice(state.dx_ref.as_slice()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_feedback_terms() {
        let mut state = ControlState::new(6);
        state.x = Vector3::new(0.1, 0.0, 0.0);
        state.r = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
        state.wrench[2] = 5.0;

        let mut gains = ControlGain::new(6).with_damping(0.0);
        gains.position = Vector6::new(1.0, 1.0, 1.0, 1.0, 1.0, 2.0);
        gains.force[2] = 0.01;

        let cmd = compute_command(&state, &gains, &identity_jacobian());
        assert_eq!(cmd.status, LimitStatus::Ok);
        assert_relative_eq!(cmd.velocity[0], -0.1, epsilon = 1e-12);
        assert_relative_eq!(cmd.velocity[2], -0.05, epsilon = 1e-12);
        assert_relative_eq!(cmd.velocity[5], -0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_orientation_error_uses_smallest_angle() {
        let mut state = ControlState::new(6);
        // 350° 等价于 -10°
        state.r = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 350f64.to_radians());

        let e = workspace_error(&state);
        assert_relative_eq!(e[5], (-10f64).to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_damping_shrinks_command() {
        let mut state = ControlState::new(6);
        state.dx_ref[1] = 1.0;

        // J = I, λ = 1：u = dx / (1 + λ²)
        let gains = ControlGain::new(6).with_damping(1.0);
        let cmd = compute_command(&state, &gains, &identity_jacobian());
        assert_relative_eq!(cmd.velocity[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_null_space_term_on_redundant_joint() {
        // 7 关节：第 7 列为零（不影响末端）
        let mut jacobian = DMatrix::zeros(6, 7);
        for i in 0..6 {
            jacobian[(i, i)] = 1.0;
        }

        let mut state = ControlState::new(7);
        state.q[6] = 0.3;
        state.dx_ref[0] = 0.2;

        let gains = ControlGain::new(7).with_joint_gain(1.0).with_damping(0.0);
        let cmd = compute_command(&state, &gains, &jacobian);

        assert_eq!(cmd.status, LimitStatus::Ok);
        assert_relative_eq!(cmd.velocity[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(cmd.velocity[6], -0.3, epsilon = 1e-12);
        for j in 1..6 {
            assert_relative_eq!(cmd.velocity[j], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_null_space_does_not_disturb_workspace_motion() {
        // 3 关节平面臂的线性部分：Jacobian 第 0 行依赖全部关节
        let mut jacobian = DMatrix::zeros(6, 3);
        jacobian[(0, 0)] = 1.0;
        jacobian[(0, 1)] = 1.0;
        jacobian[(0, 2)] = 1.0;
        jacobian[(1, 1)] = 1.0;

        let mut state = ControlState::new(3);
        state.q = DVector::from_vec(vec![0.2, -0.1, 0.4]);
        state.dx_ref[0] = 0.5;

        let gains = ControlGain::new(3).with_joint_gain(2.0).with_damping(1e-4);
        let cmd = compute_command(&state, &gains, &jacobian);
        assert_eq!(cmd.status, LimitStatus::Ok);

        let twist = &jacobian * &cmd.velocity;
        assert_relative_eq!(twist[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(twist[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tracking_error_zeroes_command() {
        let mut state = ControlState::new(2);
        state.q = DVector::from_vec(vec![0.5, 0.0]);
        state.limits.force_max = 10.0;
        state.limits.joint_error_max = 0.1;
        state.dx_ref[0] = 1.0;

        let mut jacobian = DMatrix::zeros(6, 2);
        jacobian[(0, 0)] = 1.0;
        jacobian[(1, 1)] = 1.0;

        let gains = ControlGain::new(2).with_position_gain(1.0);
        let cmd = compute_command(&state, &gains, &jacobian);

        assert_eq!(cmd.status, LimitStatus::ConfigurationError);
        assert_eq!(cmd.velocity, DVector::zeros(2));
    }

    #[test]
    fn test_singular_without_damping() {
        let mut state = ControlState::new(3);
        state.dx_ref[0] = 1.0;

        let gains = ControlGain::new(3).with_damping(0.0);
        let cmd = compute_command(&state, &gains, &DMatrix::zeros(6, 3));
        assert_eq!(cmd.status, LimitStatus::InvalidInput);
        assert_eq!(cmd.velocity, DVector::zeros(3));

        // 有阻尼时只剩零空间项
        state.q[1] = 0.5;
        let gains = ControlGain::new(3).with_joint_gain(1.0).with_damping(0.1);
        let cmd = compute_command(&state, &gains, &DMatrix::zeros(6, 3));
        assert_eq!(cmd.status, LimitStatus::Ok);
        assert_relative_eq!(cmd.velocity[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_dimensions() {
        let state = ControlState::new(6);
        let gains = ControlGain::new(6);

        let cmd = compute_command(&state, &gains, &DMatrix::identity(6, 5));
        assert_eq!(cmd.status, LimitStatus::InvalidInput);
        assert_eq!(cmd.velocity.len(), 6);

        let cmd = compute_command(&state, &ControlGain::new(5), &identity_jacobian());
        assert_eq!(cmd.status, LimitStatus::InvalidInput);

        let mut u = DVector::from_element(4, 9.0);
        let status = compute_command_into(&state, &gains, &identity_jacobian(), &mut u);
        assert_eq!(status, LimitStatus::InvalidInput);
        assert_eq!(u, DVector::zeros(4));
    }

    #[test]
    fn test_controller() {
        let gains = ControlGain::new(6).with_position_gain(1.0).with_damping(0.0);
        let mut controller = ResolvedRateController::new(gains, 6).unwrap();
        assert_eq!(controller.joint_count(), 6);
        assert!(ResolvedRateController::new(ControlGain::new(5), 6).is_err());
        assert!(controller.set_gains(ControlGain::new(7)).is_err());

        let mut state = ControlState::new(6);
        state.x[0] = 0.2;
        assert_eq!(controller.check_limits(&state), LimitStatus::Ok);

        let cmd = controller.compute_command(&state, &identity_jacobian());
        assert_relative_eq!(cmd.velocity[0], -0.2, epsilon = 1e-12);

        let mut u = DVector::zeros(6);
        let status =
            controller.compute_command_into(&ControlState::new(3), &identity_jacobian(), &mut u);
        assert_eq!(status, LimitStatus::InvalidInput);
    }
}
