//! 轨迹错误类型
//!
//! 区分三类错误：
//!
//! - **输入错误**: 维度不匹配、路点缺失、时间非单调、限值非法
//! - **运动学不可行**: 梯形速度规划无法满足速度/加速度限值
//! - **能力缺失**: 某些轨迹表示不支持的查询（如 SLERP 角加速度）
//!
//! 所有错误都同步返回给调用者，本 crate 内部不做任何重试。

use thiserror::Error;

/// 轨迹错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    // ==================== Resource ====================
    /// Arena 剩余空间不足
    #[error("Scratch arena exhausted: requested {requested} values, {available} available")]
    ArenaExhausted {
        /// 请求的 f64 个数
        requested: usize,
        /// 剩余的 f64 个数
        available: usize,
    },

    // ==================== Input Errors ====================
    /// 向量维度不匹配
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// 出错的量
        what: &'static str,
        /// 期望维度
        expected: usize,
        /// 实际维度
        actual: usize,
    },

    /// 路点索引越界
    #[error("Waypoint index {index} out of range (trajectory holds {count} waypoints)")]
    WaypointIndexOutOfRange {
        /// 路点索引
        index: usize,
        /// 路点容量
        count: usize,
    },

    /// 路点尚未设置
    #[error("Waypoint {index} has not been added")]
    MissingWaypoint {
        /// 路点索引
        index: usize,
    },

    /// 路点时间非单调
    #[error("Waypoint times must be strictly increasing: t_i = {t_i}, t_f = {t_f}")]
    NonMonotonicTime {
        /// 起始时间
        t_i: f64,
        /// 终止时间
        t_f: f64,
    },

    /// 时间不是有限值
    #[error("Non-finite time value: {0}")]
    NonFiniteTime(f64),

    /// 速度/加速度限值非法（必须为正的有限值）
    #[error("Invalid {kind} limit on axis {axis}: {value}")]
    InvalidLimit {
        /// 限值种类
        kind: &'static str,
        /// 轴索引
        axis: usize,
        /// 限值
        value: f64,
    },

    // ==================== Infeasible ====================
    /// 速度限值无法满足
    #[error("Velocity limit exceeded on axis {axis}: {velocity:.6} (limit: {limit:.6})")]
    VelocityLimitExceeded {
        /// 轴索引
        axis: usize,
        /// 需要的速度
        velocity: f64,
        /// 限值
        limit: f64,
    },

    /// 加速度限值无法满足
    #[error("Acceleration limit exceeded on axis {axis}: {acceleration:.6} (limit: {limit:.6})")]
    AccelerationLimitExceeded {
        /// 轴索引
        axis: usize,
        /// 需要的加速度
        acceleration: f64,
        /// 限值
        limit: f64,
    },

    /// 梯形回退后的过渡时间不在 (0, T/2] 内
    #[error("No feasible blend time: axis {axis} requires t_b = {t_b:.6} for a span of {span:.6}")]
    BlendTimeInfeasible {
        /// 决定过渡时间的轴
        axis: usize,
        /// 计算得到的过渡时间
        t_b: f64,
        /// 轨迹总时长
        span: f64,
    },

    // ==================== Capability ====================
    /// 该轨迹表示不支持此查询
    #[error("Unsupported trajectory query: {0}")]
    Unsupported(&'static str),
}

impl TrajectoryError {
    /// 是否为输入错误（调用者传入的数据有误）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::WaypointIndexOutOfRange { .. }
                | Self::MissingWaypoint { .. }
                | Self::NonMonotonicTime { .. }
                | Self::NonFiniteTime(_)
                | Self::InvalidLimit { .. }
        )
    }

    /// 是否为运动学不可行（调用者应重新规划）
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::VelocityLimitExceeded { .. }
                | Self::AccelerationLimitExceeded { .. }
                | Self::BlendTimeInfeasible { .. }
        )
    }
}

/// 轨迹操作结果
pub type Result<T> = std::result::Result<T, TrajectoryError>;

/// 检查向量维度
pub(crate) fn check_dim(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(TrajectoryError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = TrajectoryError::NonMonotonicTime { t_i: 1.0, t_f: 0.0 };
        assert!(err.is_input_error());
        assert!(!err.is_infeasible());

        let err = TrajectoryError::VelocityLimitExceeded {
            axis: 0,
            velocity: 2.0,
            limit: 1.0,
        };
        assert!(err.is_infeasible());
        assert!(!err.is_input_error());

        let err = TrajectoryError::Unsupported("angular acceleration");
        assert!(!err.is_infeasible());
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_error_display() {
        let err = TrajectoryError::ArenaExhausted {
            requested: 12,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "Scratch arena exhausted: requested 12 values, 4 available"
        );
    }

    #[test]
    fn test_check_dim() {
        assert!(check_dim("q", 3, 3).is_ok());
        assert_eq!(
            check_dim("q", 3, 4),
            Err(TrajectoryError::DimensionMismatch {
                what: "q",
                expected: 3,
                actual: 4,
            })
        );
    }
}
