//! LimitStatus - 控制周期的安全结果

use std::fmt;

/// 控制周期结果
///
/// 除 `Ok` 外的每个值都对应一个被触发的安全边界（或无效输入）。
/// 这些是运行时结果而不是错误：控制律在返回它们的同时输出零速度命令。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitStatus {
    /// 所有边界通过
    Ok,
    /// 输入维度或数值无效
    InvalidInput,
    /// 笛卡尔位置超出 `[x_min, x_max]`
    PositionLimit,
    /// 笛卡尔位置跟踪误差超限
    PositionError,
    /// 力的大小超限且方向与参考速度同向
    ForceLimit,
    /// 力矩大小超限
    MomentLimit,
    /// 力跟踪误差超限
    ForceError,
    /// 力矩跟踪误差超限
    MomentError,
    /// 关节位置超出 `[q_min, q_max]`
    ConfigurationLimit,
    /// 关节跟踪误差超限
    ConfigurationError,
}

impl LimitStatus {
    /// 稳定的诊断字符串（用于日志和遥测）
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidInput => "INVAL",
            Self::PositionLimit => "LIMIT_POSITION",
            Self::PositionError => "LIMIT_POSITION_ERROR",
            Self::ForceLimit => "LIMIT_FORCE",
            Self::MomentLimit => "LIMIT_MOMENT",
            Self::ForceError => "LIMIT_FORCE_ERROR",
            Self::MomentError => "LIMIT_MOMENT_ERROR",
            Self::ConfigurationLimit => "LIMIT_CONFIGURATION",
            Self::ConfigurationError => "LIMIT_CONFIGURATION_ERROR",
        }
    }

    /// 是否通过
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// 是否为跟踪误差类边界
    pub const fn is_tracking_error(&self) -> bool {
        matches!(
            self,
            Self::PositionError | Self::ForceError | Self::MomentError | Self::ConfigurationError
        )
    }
}

impl fmt::Display for LimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
