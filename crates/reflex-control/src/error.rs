//! 控制层错误类型
//!
//! - [`ControlError`]: 状态、增益、雅可比矩阵的维度/数值校验失败。控制周期
//!   把它映射为 [`LimitStatus::InvalidInput`](crate::LimitStatus::InvalidInput)
//! - [`ConfigError`]: TOML 配置读取、解析和转换失败

use reflex_trajectory::TrajectoryError;
use thiserror::Error;

/// 控制输入校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// 向量或矩阵维度不匹配
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// 出错的量
        what: &'static str,
        /// 期望维度
        expected: usize,
        /// 实际维度
        actual: usize,
    },

    /// 包含 NaN 或无穷大
    #[error("Non-finite value in {what}")]
    NonFiniteValue {
        /// 出错的量
        what: &'static str,
    },

    /// 增益非法（必须为非负有限值）
    #[error("Invalid gain {what}: {value}")]
    InvalidGain {
        /// 出错的增益
        what: &'static str,
        /// 增益值
        value: f64,
    },

    /// 从轨迹采样参考量失败
    #[error("Reference sampling failed: {0}")]
    Trajectory(#[from] TrajectoryError),
}

impl ControlError {
    /// 是否为维度错误
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::Trajectory(TrajectoryError::DimensionMismatch { .. })
        )
    }
}

/// 控制层操作结果
pub type Result<T> = std::result::Result<T, ControlError>;

/// 检查维度
pub(crate) fn check_dim(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ControlError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// 检查所有元素为有限值
pub(crate) fn check_finite<'a>(
    what: &'static str,
    values: impl IntoIterator<Item = &'a f64>,
) -> Result<()> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ControlError::NonFiniteValue { what })
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 文件读写失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置项维度与关节数不符
    #[error("Config entry {what} has {actual} values, expected {expected}")]
    Dimension {
        /// 配置项
        what: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 配置项数值非法
    #[error("Invalid value for {what}: {value}")]
    InvalidValue {
        /// 配置项
        what: &'static str,
        /// 数值
        value: f64,
    },

    /// 缺少必需的配置项
    #[error("Missing config entry: {0}")]
    Missing(&'static str),

    /// 轨迹限值被拒绝
    #[error("Trajectory limits rejected: {0}")]
    Trajectory(#[from] TrajectoryError),
}
