//! # 控制配置
//!
//! TOML 格式的增益、安全边界和轨迹限值。
//!
//! ```toml
//! [gains]
//! position = [1.0, 1.0, 1.0, 0.5, 0.5, 0.5]
//! force = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
//! joint = [0.1, 0.1, 0.1, 0.1, 0.1, 0.1]
//! damping = 0.01
//!
//! [limits]
//! q_min = [-3.14, -1.57, -3.14, -3.14, -3.14, -3.14]
//! q_max = [3.14, 1.57, 3.14, 3.14, 3.14, 3.14]
//! force_max = 50.0
//! joint_error_max = 0.2
//!
//! [trajectory]
//! joint_velocity_max = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
//! joint_acceleration_max = [2.0, 2.0, 2.0, 2.0, 2.0, 2.0]
//! ```
//!
//! 省略的边界表示不限制；省略的段使用默认值。

use nalgebra::{DVector, Vector3, Vector6};
use reflex_trajectory::TrapezoidalProfile;
use reflex_trajectory::workspace::{RotationVectorTrajectory, SlerpTrajectory, rotvec, slerp};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;
use crate::gains::{ControlGain, DEFAULT_DAMPING};
use crate::state::SafetyLimits;

/// 配置操作结果
pub type Result<T> = std::result::Result<T, ConfigError>;

/// 完整控制配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// 控制增益
    pub gains: GainsConfig,
    /// 安全边界
    pub limits: LimitsConfig,
    /// 轨迹限值
    pub trajectory: TrajectoryConfig,
}

/// `[gains]` 段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainsConfig {
    /// 位置/姿态增益 `k_p`
    pub position: [f64; 6],
    /// 力/力矩增益 `k_f`
    pub force: [f64; 6],
    /// 关节正则化增益 `k_q`（为空表示全零）
    pub joint: Vec<f64>,
    /// 阻尼因子
    pub damping: f64,
}

impl Default for GainsConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 6],
            force: [0.0; 6],
            joint: Vec::new(),
            damping: DEFAULT_DAMPING,
        }
    }
}

/// `[limits]` 段（所有项可选，省略表示不限制）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// 关节位置下限（rad）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_min: Option<Vec<f64>>,
    /// 关节位置上限（rad）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_max: Option<Vec<f64>>,
    /// 笛卡尔位置下限（m）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_min: Option<[f64; 3]>,
    /// 笛卡尔位置上限（m）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_max: Option<[f64; 3]>,
    /// 最大力（N）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_max: Option<f64>,
    /// 最大力矩（N·m）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_max: Option<f64>,
    /// 关节跟踪误差上限
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_error_max: Option<f64>,
    /// 位置跟踪误差上限
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_error_max: Option<f64>,
    /// 力跟踪误差上限
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_error_max: Option<f64>,
    /// 力矩跟踪误差上限
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moment_error_max: Option<f64>,
}

/// `[trajectory]` 段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// 关节速度限值（rad/s）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_velocity_max: Option<Vec<f64>>,
    /// 关节加速度限值（rad/s²）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_acceleration_max: Option<Vec<f64>>,
    /// 笛卡尔平移速度限值（m/s）
    pub linear_velocity_max: f64,
    /// 笛卡尔平移加速度限值（m/s²）
    pub linear_acceleration_max: f64,
    /// 旋转向量速度限值（rad/s）
    pub angular_velocity_max: f64,
    /// 旋转向量加速度限值（rad/s²）
    pub angular_acceleration_max: f64,
    /// SLERP 插值参数速度限值
    pub slerp_velocity_max: f64,
    /// SLERP 插值参数加速度限值
    pub slerp_acceleration_max: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            joint_velocity_max: None,
            joint_acceleration_max: None,
            linear_velocity_max: rotvec::DEFAULT_VELOCITY_LIMIT,
            linear_acceleration_max: rotvec::DEFAULT_ACCELERATION_LIMIT,
            angular_velocity_max: rotvec::DEFAULT_VELOCITY_LIMIT,
            angular_acceleration_max: rotvec::DEFAULT_ACCELERATION_LIMIT,
            slerp_velocity_max: slerp::DEFAULT_PARAMETER_VELOCITY_LIMIT,
            slerp_acceleration_max: slerp::DEFAULT_PARAMETER_ACCELERATION_LIMIT,
        }
    }
}

fn check_len(what: &'static str, expected: usize, values: &[f64]) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ConfigError::Dimension {
            what,
            expected,
            actual: values.len(),
        })
    }
}

fn check_finite(what: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(ConfigError::InvalidValue { what, value }),
        None => Ok(()),
    }
}

impl ControlConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded control config from {}", path.display());
        Ok(config)
    }

    /// 序列化为 TOML 字符串
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 转换为 `n_q` 关节的控制增益
    pub fn gains(&self, n_q: usize) -> Result<ControlGain> {
        let g = &self.gains;
        check_finite("gains.position", &g.position)?;
        check_finite("gains.force", &g.force)?;
        check_finite("gains.joint", &g.joint)?;
        if !(g.damping.is_finite() && g.damping >= 0.0) {
            return Err(ConfigError::InvalidValue {
                what: "gains.damping",
                value: g.damping,
            });
        }

        let joint = if g.joint.is_empty() {
            DVector::zeros(n_q)
        } else {
            check_len("gains.joint", n_q, &g.joint)?;
            DVector::from_column_slice(&g.joint)
        };

        Ok(ControlGain {
            position: Vector6::from_column_slice(&g.position),
            force: Vector6::from_column_slice(&g.force),
            joint,
            damping: g.damping,
        })
    }

    /// 转换为 `n_q` 关节的安全边界
    pub fn safety_limits(&self, n_q: usize) -> Result<SafetyLimits> {
        let l = &self.limits;
        let mut limits = SafetyLimits::unbounded(n_q);

        if let Some(q_min) = &l.q_min {
            check_len("limits.q_min", n_q, q_min)?;
            limits.q_min = DVector::from_column_slice(q_min);
        }
        if let Some(q_max) = &l.q_max {
            check_len("limits.q_max", n_q, q_max)?;
            limits.q_max = DVector::from_column_slice(q_max);
        }
        if let Some(x_min) = &l.x_min {
            limits.x_min = Vector3::from_column_slice(x_min);
        }
        if let Some(x_max) = &l.x_max {
            limits.x_max = Vector3::from_column_slice(x_max);
        }

        let scalars = [
            ("limits.force_max", l.force_max, &mut limits.force_max),
            ("limits.moment_max", l.moment_max, &mut limits.moment_max),
            ("limits.joint_error_max", l.joint_error_max, &mut limits.joint_error_max),
            ("limits.position_error_max", l.position_error_max, &mut limits.position_error_max),
            ("limits.force_error_max", l.force_error_max, &mut limits.force_error_max),
            ("limits.moment_error_max", l.moment_error_max, &mut limits.moment_error_max),
        ];
        for (what, value, slot) in scalars {
            if let Some(value) = value {
                if value.is_nan() {
                    return Err(ConfigError::InvalidValue { what, value });
                }
                *slot = value;
            }
        }

        if let Some(i) = (0..n_q).find(|&i| limits.q_min[i] > limits.q_max[i]) {
            return Err(ConfigError::InvalidValue {
                what: "limits.q_min",
                value: limits.q_min[i],
            });
        }
        Ok(limits)
    }

    /// 把关节速度/加速度限值应用到梯形曲线
    pub fn apply_joint_limits(&self, profile: &mut TrapezoidalProfile<'_>) -> Result<()> {
        let t = &self.trajectory;
        let dq_max = t
            .joint_velocity_max
            .as_deref()
            .ok_or(ConfigError::Missing("trajectory.joint_velocity_max"))?;
        let ddq_max = t
            .joint_acceleration_max
            .as_deref()
            .ok_or(ConfigError::Missing("trajectory.joint_acceleration_max"))?;
        profile.set_limits(dq_max, ddq_max)?;
        Ok(())
    }

    /// 把笛卡尔限值应用到旋转向量轨迹
    pub fn apply_rotation_vector_limits(
        &self,
        trajectory: &mut RotationVectorTrajectory<'_>,
    ) -> Result<()> {
        let t = &self.trajectory;
        let (v, w) = (t.linear_velocity_max, t.angular_velocity_max);
        let (a, alpha) = (t.linear_acceleration_max, t.angular_acceleration_max);
        trajectory.set_limits(&[v, v, v, w, w, w], &[a, a, a, alpha, alpha, alpha])?;
        Ok(())
    }

    /// 把笛卡尔限值应用到 SLERP 轨迹
    pub fn apply_slerp_limits(&self, trajectory: &mut SlerpTrajectory<'_>) -> Result<()> {
        let t = &self.trajectory;
        let (v, a) = (t.linear_velocity_max, t.linear_acceleration_max);
        trajectory.set_limits(
            &[v, v, v, t.slerp_velocity_max],
            &[a, a, a, t.slerp_acceleration_max],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_trajectory::{ScratchArena, TrajectoryError};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[gains]
position = [1.0, 1.0, 1.0, 0.5, 0.5, 0.5]
force = [0.0, 0.0, 0.01, 0.0, 0.0, 0.0]
joint = [0.1, 0.2, 0.3]
damping = 0.05

[limits]
q_min = [-1.0, -2.0, -3.0]
q_max = [1.0, 2.0, 3.0]
x_max = [0.5, 0.5, 1.0]
force_max = 40.0
joint_error_max = 0.2

[trajectory]
joint_velocity_max = [1.0, 1.0, 1.0]
joint_acceleration_max = [2.0, 2.0, 2.0]
angular_velocity_max = 0.5
"#;

    #[test]
    fn test_parse_sample() {
        let config = ControlConfig::from_toml_str(SAMPLE).unwrap();

        let gains = config.gains(3).unwrap();
        assert_eq!(gains.position[3], 0.5);
        assert_eq!(gains.force[2], 0.01);
        assert_eq!(gains.joint.as_slice(), &[0.1, 0.2, 0.3]);
        assert_eq!(gains.damping, 0.05);

        let limits = config.safety_limits(3).unwrap();
        assert_eq!(limits.q_max.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(limits.x_max, Vector3::new(0.5, 0.5, 1.0));
        assert_eq!(limits.x_min, Vector3::repeat(f64::NEG_INFINITY));
        assert_eq!(limits.force_max, 40.0);
        assert_eq!(limits.moment_max, 0.0);

        assert_eq!(config.trajectory.angular_velocity_max, 0.5);
        assert_eq!(config.trajectory.linear_velocity_max, 1.0);
        assert_eq!(config.trajectory.slerp_velocity_max, 50.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ControlConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControlConfig::default());

        let gains = config.gains(7).unwrap();
        assert_eq!(gains, ControlGain::new(7));
        assert_eq!(config.safety_limits(7).unwrap(), SafetyLimits::unbounded(7));
    }

    #[test]
    fn test_dimension_errors() {
        let config = ControlConfig::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            config.gains(6),
            Err(ConfigError::Dimension {
                what: "gains.joint",
                expected: 6,
                actual: 3,
            })
        ));
        assert!(matches!(
            config.safety_limits(6),
            Err(ConfigError::Dimension { what: "limits.q_min", .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ControlConfig::default();
        config.gains.damping = -0.1;
        assert!(matches!(
            config.gains(2),
            Err(ConfigError::InvalidValue { what: "gains.damping", .. })
        ));

        let mut config = ControlConfig::default();
        config.limits.q_min = Some(vec![1.0, 0.0]);
        config.limits.q_max = Some(vec![0.0, 1.0]);
        assert!(matches!(
            config.safety_limits(2),
            Err(ConfigError::InvalidValue { what: "limits.q_min", .. })
        ));

        assert!(matches!(
            ControlConfig::from_toml_str("[gains]\ndamping = \"high\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("control.toml");

        let config = ControlConfig::from_toml_str(SAMPLE).unwrap();
        config.save_to_file(&path).unwrap();
        let loaded = ControlConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        assert!(matches!(
            ControlConfig::load_from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_apply_trajectory_limits() {
        let config = ControlConfig::from_toml_str(SAMPLE).unwrap();

        let mut arena = ScratchArena::with_capacity(
            TrapezoidalProfile::required_capacity(3)
                + RotationVectorTrajectory::required_capacity()
                + SlerpTrajectory::required_capacity(),
        );
        let mut region = arena.region();

        let mut profile = TrapezoidalProfile::new(&mut region, 3).unwrap();
        config.apply_joint_limits(&mut profile).unwrap();
        assert_eq!(profile.acceleration_limits(), &[2.0, 2.0, 2.0]);

        let mut rv = RotationVectorTrajectory::new(&mut region).unwrap();
        config.apply_rotation_vector_limits(&mut rv).unwrap();
        assert_eq!(rv.profile().velocity_limits(), &[1.0, 1.0, 1.0, 0.5, 0.5, 0.5]);

        let mut sl = SlerpTrajectory::new(&mut region).unwrap();
        config.apply_slerp_limits(&mut sl).unwrap();
        assert_eq!(sl.profile().velocity_limits(), &[1.0, 1.0, 1.0, 50.0]);

        // 缺少关节限值 / 维度不符
        let empty = ControlConfig::default();
        assert!(matches!(
            empty.apply_joint_limits(&mut profile),
            Err(ConfigError::Missing("trajectory.joint_velocity_max"))
        ));
        let mut wrong = config.clone();
        wrong.trajectory.joint_velocity_max = Some(vec![1.0; 4]);
        assert!(matches!(
            wrong.apply_joint_limits(&mut profile),
            Err(ConfigError::Trajectory(TrajectoryError::DimensionMismatch { .. }))
        ));
    }
}
