//! 控制增益

use nalgebra::{DVector, Vector6};

use crate::error::{ControlError, Result, check_dim, check_finite};

/// 默认阻尼因子 λ
///
/// 阻尼最小二乘求解 `(J Jᵀ + λ² I)`，λ > 0 时矩阵总是正定。
pub const DEFAULT_DAMPING: f64 = 0.01;

/// 分解速率控制增益
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGain {
    /// 笛卡尔位置/姿态误差增益 `k_p`
    pub position: Vector6<f64>,
    /// 力/力矩误差增益 `k_f`
    pub force: Vector6<f64>,
    /// 关节空间正则化增益 `k_q`
    pub joint: DVector<f64>,
    /// 阻尼最小二乘的阻尼因子 λ
    pub damping: f64,
}

impl ControlGain {
    /// 全零增益，阻尼为 [`DEFAULT_DAMPING`]
    pub fn new(n_q: usize) -> Self {
        Self {
            position: Vector6::zeros(),
            force: Vector6::zeros(),
            joint: DVector::zeros(n_q),
            damping: DEFAULT_DAMPING,
        }
    }

    /// 设置统一的位置/姿态增益
    pub fn with_position_gain(mut self, k_p: f64) -> Self {
        self.position = Vector6::repeat(k_p);
        self
    }

    /// 设置统一的力增益
    pub fn with_force_gain(mut self, k_f: f64) -> Self {
        self.force = Vector6::repeat(k_f);
        self
    }

    /// 设置统一的关节正则化增益
    pub fn with_joint_gain(mut self, k_q: f64) -> Self {
        self.joint.fill(k_q);
        self
    }

    /// 设置阻尼因子
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// 关节数
    pub fn joint_count(&self) -> usize {
        self.joint.len()
    }

    /// 校验维度和数值
    pub fn validate(&self, n_q: usize) -> Result<()> {
        check_dim("k_q", n_q, self.joint.len())?;
        check_finite("k_p", self.position.iter())?;
        check_finite("k_f", self.force.iter())?;
        check_finite("k_q", self.joint.iter())?;
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(ControlError::InvalidGain {
                what: "damping",
                value: self.damping,
            });
        }
        Ok(())
    }
}
