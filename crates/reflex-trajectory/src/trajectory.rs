//! Trajectory trait - 关节空间轨迹通用接口
//!
//! 任何关节空间轨迹表示都实现 {generate, position, velocity, acceleration}
//! 这组能力。
//!
//! # 使用流程
//!
//! 1. 从 [`Region`](crate::Region) 构造（一次性分配全部缓冲区）
//! 2. `add_waypoint()` 设置路点
//! 3. `generate()` 求解轨迹
//! 4. 每个控制周期调用 `position()` / `velocity()` / `acceleration()`
//! 5. 丢弃轨迹并释放 arena 区域
//!
//! # 查询约定
//!
//! - 查询结果写入调用者提供的切片，查询路径上不分配内存
//! - 查询是时间和轨迹状态的纯函数：同一时间重复查询结果完全相同
//! - 在 `generate()` 成功之前查询属于调用者的编程错误，会直接 panic

use crate::arena::Region;
use crate::error::{Result, TrajectoryError, check_dim};

/// 关节空间轨迹
pub trait Trajectory {
    /// 轨迹维度（每个路点的向量长度）
    fn dof(&self) -> usize;

    /// 路点容量
    fn waypoint_count(&self) -> usize;

    /// 设置第 `index` 个路点
    ///
    /// # 错误
    ///
    /// - `index` 越界：[`TrajectoryError::WaypointIndexOutOfRange`]
    /// - `q` 维度不符：[`TrajectoryError::DimensionMismatch`]
    /// - `t` 非有限值：[`TrajectoryError::NonFiniteTime`]
    fn add_waypoint(&mut self, index: usize, t: f64, q: &[f64]) -> Result<()>;

    /// 根据当前路点求解轨迹
    ///
    /// 失败时不提交任何状态，之前成功生成的轨迹仍然有效。
    fn generate(&mut self) -> Result<()>;

    /// 是否已有成功生成的轨迹
    fn is_generated(&self) -> bool;

    /// 已提交轨迹的时间区间 `(t_i, t_f)`
    fn time_span(&self) -> Option<(f64, f64)>;

    /// 查询 `t` 时刻的位置
    fn position(&self, t: f64, q: &mut [f64]) -> Result<()>;

    /// 查询 `t` 时刻的速度
    fn velocity(&self, t: f64, dq: &mut [f64]) -> Result<()>;

    /// 查询 `t` 时刻的加速度
    fn acceleration(&self, t: f64, ddq: &mut [f64]) -> Result<()>;
}

/// 路点缓冲区（时间数组 + 配置数组）
///
/// 两个数组都从 arena 分配，大小在构造时确定。
/// 未设置的路点时间为 NaN。
#[derive(Debug)]
pub struct Waypoints<'a> {
    dof: usize,
    times: &'a mut [f64],
    configs: &'a mut [f64],
}

impl<'a> Waypoints<'a> {
    /// 从区域分配 `count` 个 `dof` 维路点
    pub fn new(region: &mut Region<'a>, dof: usize, count: usize) -> Result<Self> {
        let times = region.alloc_filled(count, f64::NAN)?;
        let configs = region.alloc(count * dof)?;
        Ok(Self {
            dof,
            times,
            configs,
        })
    }

    /// 所需的 arena 容量（f64 个数）
    pub const fn required_capacity(dof: usize, count: usize) -> usize {
        count + count * dof
    }

    /// 路点维度
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// 路点容量
    pub fn count(&self) -> usize {
        self.times.len()
    }

    /// 设置路点
    pub fn set(&mut self, index: usize, t: f64, q: &[f64]) -> Result<()> {
        if index >= self.count() {
            return Err(TrajectoryError::WaypointIndexOutOfRange {
                index,
                count: self.count(),
            });
        }
        check_dim("waypoint", self.dof, q.len())?;
        if !t.is_finite() {
            return Err(TrajectoryError::NonFiniteTime(t));
        }

        self.times[index] = t;
        self.configs[index * self.dof..(index + 1) * self.dof].copy_from_slice(q);
        Ok(())
    }

    /// 路点时间（未设置时返回 `None`）
    pub fn time(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied().filter(|t| !t.is_nan())
    }

    /// 路点配置（未设置时返回 `None`）
    pub fn config(&self, index: usize) -> Option<&[f64]> {
        self.time(index)?;
        Some(&self.configs[index * self.dof..(index + 1) * self.dof])
    }

    /// 路点时间和配置，未设置时返回 [`TrajectoryError::MissingWaypoint`]
    pub fn get(&self, index: usize) -> Result<(f64, &[f64])> {
        match (self.time(index), self.config(index)) {
            (Some(t), Some(q)) => Ok((t, q)),
            _ => Err(TrajectoryError::MissingWaypoint { index }),
        }
    }
}
