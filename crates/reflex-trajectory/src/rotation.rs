//! 姿态运算
//!
//! 旋转向量（轴角）、四元数球面线性插值及其导数、四元数导数到角速度的转换。
//!
//! # 约定
//!
//! - 旋转向量 `v = θ·u`，`u` 为单位旋转轴，`θ` 为旋转角（弧度）
//! - 角速度为世界坐标系下的角速度：`ω = 2·vec(q̇ ⊗ q*)`
//! - 相对旋转 `relative(q, p) = q ⊗ p⁻¹`

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use std::f64::consts::{PI, TAU};

/// 小角度阈值（弧度），低于此值按零旋转处理
const SMALL_ANGLE: f64 = 1e-12;

/// 四元数 → 旋转向量，选择距离 `near` 最近的分支
///
/// 同一旋转对应一族旋转向量 `(θ + 2πk)·u`（k 为整数）。连续路点之间
/// 选择最近分支，可以避免 ±2π 跳变导致轨迹绕远路。
///
/// # 示例
///
/// ```rust
/// use nalgebra::{UnitQuaternion, Vector3};
/// use reflex_trajectory::rotation::rotation_vector_near;
///
/// // 绕 z 轴转 -170°，上一个路点在 +170° 附近
/// let q = UnitQuaternion::from_scaled_axis(Vector3::z() * (-170f64).to_radians());
/// let near = Vector3::z() * 170f64.to_radians();
/// let v = rotation_vector_near(&q, &near);
/// assert!((v.z - 190f64.to_radians()).abs() < 1e-9);
/// ```
pub fn rotation_vector_near(q: &UnitQuaternion<f64>, near: &Vector3<f64>) -> Vector3<f64> {
    // scaled_axis() 的角度位于 [0, π]
    let v = q.scaled_axis();
    let angle = v.norm();

    if angle < SMALL_ANGLE {
        // 零旋转：候选为 2πk·u（u 任意），沿 near 方向选取
        let n = near.norm();
        if n <= PI {
            return Vector3::zeros();
        }
        let k = (n / TAU).round();
        return near * (k * TAU / n);
    }

    let axis = v / angle;
    // |(θ + 2πk)·u - near|² = |near⊥|² + (θ + 2πk - near·u)²
    let projected = near.dot(&axis);
    let k = ((projected - angle) / TAU).round();
    axis * (angle + k * TAU)
}

/// 四元数 → 旋转向量（角度位于 [0, π] 的主分支）
pub fn rotation_vector(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    q.scaled_axis()
}

/// 旋转向量 → 四元数
pub fn quaternion_from_rotation_vector(v: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_scaled_axis(*v)
}

/// 相对旋转 `q ⊗ p⁻¹`
pub fn relative(q: &UnitQuaternion<f64>, p: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    q * p.inverse()
}

/// 使 `q` 与 `reference` 位于同一半球（点积非负）
///
/// `q` 与 `-q` 表示同一旋转；对齐后 SLERP 沿最短路径插值。
pub fn align_hemisphere(
    q: &UnitQuaternion<f64>,
    reference: &UnitQuaternion<f64>,
) -> UnitQuaternion<f64> {
    if q.quaternion().dot(reference.quaternion()) < 0.0 {
        UnitQuaternion::new_unchecked(-q.into_inner())
    } else {
        *q
    }
}

/// 两个四元数之间的夹角参数 `θ = acos(q0·q1)`
fn slerp_angle(q0: &Quaternion<f64>, q1: &Quaternion<f64>) -> f64 {
    q0.dot(q1).clamp(-1.0, 1.0).acos()
}

/// 球面线性插值
///
/// `slerp(τ) = sin((1-τ)θ)/sin θ · q0 + sin(τθ)/sin θ · q1`
///
/// 不做半球对齐：调用者如需最短路径，应先调用 [`align_hemisphere`]。
/// `τ = 0` 返回 `q0`，`τ = 1` 返回 `q1`。
pub fn slerp(q0: &UnitQuaternion<f64>, q1: &UnitQuaternion<f64>, tau: f64) -> UnitQuaternion<f64> {
    let (a, b) = (q0.quaternion(), q1.quaternion());
    let theta = slerp_angle(a, b);
    let sin_theta = theta.sin();

    let q = if sin_theta.abs() < SMALL_ANGLE {
        // 几乎重合：退化为线性插值
        a * (1.0 - tau) + b * tau
    } else {
        a * (((1.0 - tau) * theta).sin() / sin_theta) + b * ((tau * theta).sin() / sin_theta)
    };
    UnitQuaternion::new_normalize(q)
}

/// 球面线性插值对 `τ` 的导数 `d slerp / dτ`
///
/// `θ/sin θ · (cos(τθ)·q1 - cos((1-τ)θ)·q0)`
pub fn slerp_derivative(
    q0: &UnitQuaternion<f64>,
    q1: &UnitQuaternion<f64>,
    tau: f64,
) -> Quaternion<f64> {
    let (a, b) = (q0.quaternion(), q1.quaternion());
    let theta = slerp_angle(a, b);
    let sin_theta = theta.sin();

    if sin_theta.abs() < SMALL_ANGLE {
        return b - a;
    }

    let scale = theta / sin_theta;
    (b * (tau * theta).cos() - a * ((1.0 - tau) * theta).cos()) * scale
}

/// 四元数导数 → 世界坐标系角速度
///
/// `ω = 2·vec(q̇ ⊗ q*)`
pub fn angular_velocity(q: &UnitQuaternion<f64>, dq: &Quaternion<f64>) -> Vector3<f64> {
    (dq * q.quaternion().conjugate()).imag() * 2.0
}
