//! Safety Limit Gate - 安全边界检查
//!
//! 按固定顺序检查，第一个被触发的边界立即返回：
//!
//! 1. 力：`|F|² > F_max²` **且** `F · dx_ref[0..3] > 0`
//! 2. 力矩：`|M|² > M_max²`
//! 3. 关节位置区间 `[q_min, q_max]`
//! 4. 笛卡尔位置区间 `[x_min, x_max]`
//! 5. 关节跟踪误差 `Σ(q - q_ref)² > e_q_max²`
//! 6. 笛卡尔位置跟踪误差 `Σ(x - x_ref)² > e_x_max²`
//! 7. 力跟踪误差
//! 8. 力矩跟踪误差
//!
//! 标量边界 `<= 0` 表示不限制。
//!
//! ⚠️ 力检查带方向：只有当力与参考平移速度同向时才触发，力很大但
//! 运动方向在远离接触时不会拦截。

use nalgebra::{Vector3, Vector6};
use tracing::{debug, warn};

use crate::state::ControlState;
use crate::status::LimitStatus;

/// 是否配置了该标量边界
fn bounded(limit: f64) -> bool {
    limit > 0.0
}

fn squared_distance<'a>(
    a: impl IntoIterator<Item = &'a f64>,
    b: impl IntoIterator<Item = &'a f64>,
) -> f64 {
    a.into_iter().zip(b).map(|(a, b)| (a - b) * (a - b)).sum()
}

fn force(w: &Vector6<f64>) -> Vector3<f64> {
    w.fixed_rows::<3>(0).into_owned()
}

fn moment(w: &Vector6<f64>) -> Vector3<f64> {
    w.fixed_rows::<3>(3).into_owned()
}

fn exceeds_squared(value_sq: f64, limit: f64) -> bool {
    bounded(limit) && value_sq > limit * limit
}

/// 检查安全边界
///
/// 纯函数，不修改状态。维度不一致或包含非有限值时返回
/// [`LimitStatus::InvalidInput`]。
///
/// # 示例
///
/// ```rust
/// use reflex_control::{ControlState, LimitStatus, check_limits};
///
/// let mut state = ControlState::new(2);
/// state.limits.joint_error_max = 0.1;
/// assert_eq!(check_limits(&state), LimitStatus::Ok);
///
/// state.q[0] = 0.5;
/// assert_eq!(check_limits(&state), LimitStatus::ConfigurationError);
/// ```
pub fn check_limits(state: &ControlState) -> LimitStatus {
    if let Err(e) = state.validate() {
        warn!("Invalid control state: {}", e);
        return LimitStatus::InvalidInput;
    }

    let status = evaluate(state);
    if !status.is_ok() {
        debug!("Safety limit tripped: {}", status);
    }
    status
}

fn evaluate(state: &ControlState) -> LimitStatus {
    let limits = &state.limits;
    let f = force(&state.wrench);
    let m = moment(&state.wrench);
    let f_ref = force(&state.wrench_ref);
    let m_ref = moment(&state.wrench_ref);
    let v_ref = state.dx_ref.fixed_rows::<3>(0);

    // 1. 力（带方向）
    if exceeds_squared(f.norm_squared(), limits.force_max) && f.dot(&v_ref) > 0.0 {
        return LimitStatus::ForceLimit;
    }

    // 2. 力矩
    if exceeds_squared(m.norm_squared(), limits.moment_max) {
        return LimitStatus::MomentLimit;
    }

    // 3. 关节位置区间
    let joint_out_of_range = state
        .q
        .iter()
        .zip(limits.q_min.iter().zip(limits.q_max.iter()))
        .any(|(q, (lo, hi))| q < lo || q > hi);
    if joint_out_of_range {
        return LimitStatus::ConfigurationLimit;
    }

    // 4. 笛卡尔位置区间
    let position_out_of_range =
        (0..3).any(|i| state.x[i] < limits.x_min[i] || state.x[i] > limits.x_max[i]);
    if position_out_of_range {
        return LimitStatus::PositionLimit;
    }

    // 5-8. 跟踪误差
    if exceeds_squared(
        squared_distance(state.q.iter(), state.q_ref.iter()),
        limits.joint_error_max,
    ) {
        return LimitStatus::ConfigurationError;
    }
    if exceeds_squared((state.x - state.x_ref).norm_squared(), limits.position_error_max) {
        return LimitStatus::PositionError;
    }
    if exceeds_squared((f - f_ref).norm_squared(), limits.force_error_max) {
        return LimitStatus::ForceError;
    }
    if exceeds_squared((m - m_ref).norm_squared(), limits.moment_error_max) {
        return LimitStatus::MomentError;
    }

    LimitStatus::Ok
}
