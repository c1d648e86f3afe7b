//! Trapezoidal Profile Solver - 梯形速度规划
//!
//! 在两个路点之间生成每轴同步的梯形速度曲线。
//!
//! # 算法
//!
//! ```text
//!  速度
//!   ^      t_i+t_b        t_f-t_b
//!   |        ____________________
//!   |       /                    \
//!   |      /                      \
//!   |_____/________________________\______> 时间
//!        t_i                       t_f
//! ```
//!
//! 1. 先尝试三角形曲线：`t_b = T/2`（无匀速段）
//! 2. 若某轴速度超限，回退到梯形：每轴按速度限值计算最长允许过渡时间，
//!    取最小值作为所有轴共享的 `t_b`
//! 3. 用共享的 `t_b` 重新计算每轴速度 `dx_r = Δx / (T - t_b)` 和加速度
//!    `ddx_r = dx_r / t_b`，逐轴校验限值
//!
//! 三角形曲线满足速度限值但超出加速度限值时直接失败：梯形曲线所需的
//! 加速度只会更大。
//!
//! # 查询分段
//!
//! | 区间 | 位置 | 速度 | 加速度 |
//! |------|------|------|--------|
//! | `t < t_i` | 起点 | 0 | 0 |
//! | `[t_i, t_i+t_b]` | 二次 | 线性 | `ddx_r` |
//! | `(t_i+t_b, t_f-t_b)` | 线性 | `dx_r` | 0 |
//! | `[t_f-t_b, t_f]` | 二次（镜像） | 线性 | `-ddx_r` |
//! | `t > t_f` | 终点 | 0 | 0 |

use tracing::{debug, warn};

use crate::arena::Region;
use crate::error::{Result, TrajectoryError, check_dim};
use crate::trajectory::{Trajectory, Waypoints};

/// 梯形曲线固定使用两个路点（起点、终点）
pub const WAYPOINT_COUNT: usize = 2;

/// 限值校验的相对容差
///
/// 梯形回退时决定 `t_b` 的那一轴恰好达到速度限值，浮点舍入可能超出 1 ulp。
const LIMIT_TOLERANCE: f64 = 1e-9;

/// 曲线形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileShape {
    /// 三角形（无匀速段，`t_b = T/2`）
    Triangular,
    /// 梯形（有匀速段，`t_b < T/2`）
    Trapezoidal,
}

/// 求解结果：共享过渡时间和曲线形状
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendSolution {
    /// 过渡时间（加速段/减速段时长）
    pub t_b: f64,
    /// 曲线形状
    pub shape: ProfileShape,
}

fn exceeds(value: f64, limit: f64) -> bool {
    value.abs() > limit * (1.0 + LIMIT_TOLERANCE)
}

fn validate_limits(kind: &'static str, limits: &[f64]) -> Result<()> {
    match limits.iter().position(|&l| !(l.is_finite() && l > 0.0)) {
        Some(axis) => Err(TrajectoryError::InvalidLimit {
            kind,
            axis,
            value: limits[axis],
        }),
        None => Ok(()),
    }
}

/// 求解梯形速度曲线
///
/// # 参数
///
/// - `span`: 轨迹时长 `t_f - t_i`（必须为正）
/// - `x_i`, `x_f`: 起点、终点
/// - `dx_max`, `ddx_max`: 每轴速度、加速度限值（必须为正）
/// - `dx_r`, `ddx_r`: 输出的匀速段速度和过渡段加速度
///
/// # 错误
///
/// 任一轴在梯形回退后仍超限时返回错误。此时 `dx_r`、`ddx_r` 的内容未定义，
/// 调用者应使用临时缓冲区。
///
/// # 示例
///
/// ```rust
/// use reflex_trajectory::trapezoidal::{solve, ProfileShape};
///
/// let (mut dx, mut ddx) = ([0.0; 3], [0.0; 3]);
/// let sol = solve(
///     2.0,
///     &[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0],
///     &[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0],
///     &mut dx, &mut ddx,
/// ).unwrap();
///
/// assert_eq!(sol.shape, ProfileShape::Triangular);
/// assert_eq!(sol.t_b, 1.0);
/// assert_eq!(dx, [1.0, 0.0, 0.0]);
/// ```
pub fn solve(
    span: f64,
    x_i: &[f64],
    x_f: &[f64],
    dx_max: &[f64],
    ddx_max: &[f64],
    dx_r: &mut [f64],
    ddx_r: &mut [f64],
) -> Result<BlendSolution> {
    let n = x_i.len();
    check_dim("final waypoint", n, x_f.len())?;
    check_dim("velocity limit", n, dx_max.len())?;
    check_dim("acceleration limit", n, ddx_max.len())?;
    check_dim("velocity output", n, dx_r.len())?;
    check_dim("acceleration output", n, ddx_r.len())?;
    if !(span.is_finite() && span > 0.0) {
        return Err(TrajectoryError::NonMonotonicTime {
            t_i: 0.0,
            t_f: span,
        });
    }
    validate_limits("velocity", dx_max)?;
    validate_limits("acceleration", ddx_max)?;

    // 1. 三角形曲线
    let t_tri = span / 2.0;
    let triangular = (0..n).all(|i| {
        dx_r[i] = (x_f[i] - x_i[i]) / t_tri;
        !exceeds(dx_r[i], dx_max[i])
    });

    if triangular {
        for i in 0..n {
            ddx_r[i] = dx_r[i] / t_tri;
            if exceeds(ddx_r[i], ddx_max[i]) {
                return Err(TrajectoryError::AccelerationLimitExceeded {
                    axis: i,
                    acceleration: ddx_r[i],
                    limit: ddx_max[i],
                });
            }
        }
        return Ok(BlendSolution {
            t_b: t_tri,
            shape: ProfileShape::Triangular,
        });
    }

    // 2. 梯形回退：最严格的轴决定共享的过渡时间
    let mut t_b = t_tri;
    let mut governing = 0;
    for i in 0..n {
        let candidate = span - (x_f[i] - x_i[i]).abs() / dx_max[i];
        if candidate < t_b {
            t_b = candidate;
            governing = i;
        }
    }
    if t_b <= 0.0 {
        return Err(TrajectoryError::BlendTimeInfeasible {
            axis: governing,
            t_b,
            span,
        });
    }

    // 3. 重新计算并校验
    let cruise = span - t_b;
    for i in 0..n {
        dx_r[i] = (x_f[i] - x_i[i]) / cruise;
        ddx_r[i] = dx_r[i] / t_b;
        if exceeds(dx_r[i], dx_max[i]) {
            return Err(TrajectoryError::VelocityLimitExceeded {
                axis: i,
                velocity: dx_r[i],
                limit: dx_max[i],
            });
        }
        if exceeds(ddx_r[i], ddx_max[i]) {
            return Err(TrajectoryError::AccelerationLimitExceeded {
                axis: i,
                acceleration: ddx_r[i],
                limit: ddx_max[i],
            });
        }
    }

    Ok(BlendSolution {
        t_b,
        shape: ProfileShape::Trapezoidal,
    })
}

/// 已提交的轨迹段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// 起始时间
    pub t_i: f64,
    /// 终止时间
    pub t_f: f64,
    /// 过渡时间
    pub t_b: f64,
    /// 曲线形状
    pub shape: ProfileShape,
}

/// 梯形速度曲线轨迹
///
/// 所有缓冲区都在构造时从 arena 分配：
///
/// - 路点（2 个时间 + 2×n 配置）
/// - 速度/加速度限值（2×n）
/// - 求解临时缓冲区（2×n）
/// - 已提交的起点/终点（2×n）和匀速速度/过渡加速度（2×n）
///
/// 限值初始为 NaN，`generate()` 前必须调用 [`set_limits`](Self::set_limits)。
#[derive(Debug)]
pub struct TrapezoidalProfile<'a> {
    waypoints: Waypoints<'a>,
    dq_max: &'a mut [f64],
    ddq_max: &'a mut [f64],
    scratch_dq: &'a mut [f64],
    scratch_ddq: &'a mut [f64],
    start: &'a mut [f64],
    end: &'a mut [f64],
    dq_r: &'a mut [f64],
    ddq_r: &'a mut [f64],
    segment: Option<Segment>,
}

impl<'a> TrapezoidalProfile<'a> {
    /// 从 arena 区域构造 `dof` 维梯形轨迹
    pub fn new(region: &mut Region<'a>, dof: usize) -> Result<Self> {
        let required = Self::required_capacity(dof);
        if region.remaining() < required {
            return Err(TrajectoryError::ArenaExhausted {
                requested: required,
                available: region.remaining(),
            });
        }

        Ok(Self {
            waypoints: Waypoints::new(region, dof, WAYPOINT_COUNT)?,
            dq_max: region.alloc_filled(dof, f64::NAN)?,
            ddq_max: region.alloc_filled(dof, f64::NAN)?,
            scratch_dq: region.alloc(dof)?,
            scratch_ddq: region.alloc(dof)?,
            start: region.alloc(dof)?,
            end: region.alloc(dof)?,
            dq_r: region.alloc(dof)?,
            ddq_r: region.alloc(dof)?,
            segment: None,
        })
    }

    /// 所需的 arena 容量（f64 个数）
    pub const fn required_capacity(dof: usize) -> usize {
        Waypoints::required_capacity(dof, WAYPOINT_COUNT) + 8 * dof
    }

    /// 设置每轴速度和加速度限值
    ///
    /// 限值必须为正的有限值。
    pub fn set_limits(&mut self, dq_max: &[f64], ddq_max: &[f64]) -> Result<()> {
        check_dim("velocity limit", self.dof(), dq_max.len())?;
        check_dim("acceleration limit", self.dof(), ddq_max.len())?;
        validate_limits("velocity", dq_max)?;
        validate_limits("acceleration", ddq_max)?;

        self.dq_max.copy_from_slice(dq_max);
        self.ddq_max.copy_from_slice(ddq_max);
        Ok(())
    }

    /// 速度限值
    pub fn velocity_limits(&self) -> &[f64] {
        self.dq_max
    }

    /// 加速度限值
    pub fn acceleration_limits(&self) -> &[f64] {
        self.ddq_max
    }

    /// 路点缓冲区
    pub fn waypoints(&self) -> &Waypoints<'a> {
        &self.waypoints
    }

    /// 已提交的轨迹段
    pub fn segment(&self) -> Option<Segment> {
        self.segment
    }

    /// 已提交的匀速段速度 `dq_r`
    pub fn velocity_reference(&self) -> &[f64] {
        self.dq_r
    }

    /// 已提交的过渡段加速度 `ddq_r`
    pub fn acceleration_reference(&self) -> &[f64] {
        self.ddq_r
    }

    fn committed(&self) -> Segment {
        match self.segment {
            Some(segment) => segment,
            None => panic!("trapezoidal profile queried before a successful generate()"),
        }
    }

    fn check_query(&self, what: &'static str, t: f64, out: &[f64]) -> Result<Segment> {
        check_dim(what, self.dof(), out.len())?;
        if !t.is_finite() {
            return Err(TrajectoryError::NonFiniteTime(t));
        }
        Ok(self.committed())
    }
}

impl Trajectory for TrapezoidalProfile<'_> {
    fn dof(&self) -> usize {
        self.waypoints.dof()
    }

    fn waypoint_count(&self) -> usize {
        WAYPOINT_COUNT
    }

    fn add_waypoint(&mut self, index: usize, t: f64, q: &[f64]) -> Result<()> {
        self.waypoints.set(index, t, q)
    }

    fn generate(&mut self) -> Result<()> {
        let (t_i, x_i) = self.waypoints.get(0)?;
        let (t_f, x_f) = self.waypoints.get(1)?;
        if t_f <= t_i {
            return Err(TrajectoryError::NonMonotonicTime { t_i, t_f });
        }

        let solution = solve(
            t_f - t_i,
            x_i,
            x_f,
            &self.dq_max[..],
            &self.ddq_max[..],
            &mut self.scratch_dq[..],
            &mut self.scratch_ddq[..],
        )
        .inspect_err(|e| warn!("Trapezoidal profile rejected: {}", e))?;

        // 求解成功才提交
        self.start.copy_from_slice(x_i);
        self.end.copy_from_slice(x_f);
        self.dq_r.copy_from_slice(self.scratch_dq);
        self.ddq_r.copy_from_slice(self.scratch_ddq);
        self.segment = Some(Segment {
            t_i,
            t_f,
            t_b: solution.t_b,
            shape: solution.shape,
        });

        debug!(
            "Generated {:?} profile: t = [{:.4}, {:.4}], t_b = {:.4}",
            solution.shape, t_i, t_f, solution.t_b
        );
        Ok(())
    }

    fn is_generated(&self) -> bool {
        self.segment.is_some()
    }

    fn time_span(&self) -> Option<(f64, f64)> {
        self.segment.map(|s| (s.t_i, s.t_f))
    }

    fn position(&self, t: f64, q: &mut [f64]) -> Result<()> {
        let s = self.check_query("position output", t, q)?;
        let (t1, t2) = (s.t_i + s.t_b, s.t_f - s.t_b);

        if t < s.t_i {
            q.copy_from_slice(self.start);
        } else if t > s.t_f {
            q.copy_from_slice(self.end);
        } else if t < t1 {
            // 加速段
            let tt = t - s.t_i;
            for (i, q) in q.iter_mut().enumerate() {
                *q = self.start[i] + 0.5 * self.ddq_r[i] * tt * tt;
            }
        } else if t < t2 {
            // 匀速段
            let tt = t - t1;
            for (i, q) in q.iter_mut().enumerate() {
                *q = self.start[i] + 0.5 * self.dq_r[i] * s.t_b + self.dq_r[i] * tt;
            }
        } else if t <= s.t_f {
            // 减速段
            let tt = s.t_f - t;
            for (i, q) in q.iter_mut().enumerate() {
                *q = self.end[i] - 0.5 * self.ddq_r[i] * tt * tt;
            }
        } else {
            unreachable!("time {t} falls outside every profile segment");
        }
        Ok(())
    }

    fn velocity(&self, t: f64, dq: &mut [f64]) -> Result<()> {
        let s = self.check_query("velocity output", t, dq)?;
        let (t1, t2) = (s.t_i + s.t_b, s.t_f - s.t_b);

        if t <= s.t_i || t >= s.t_f {
            dq.fill(0.0);
        } else if t <= t1 {
            for (i, v) in dq.iter_mut().enumerate() {
                *v = (t - s.t_i) * self.ddq_r[i];
            }
        } else if t <= t2 {
            dq.copy_from_slice(self.dq_r);
        } else if t < s.t_f {
            for (i, v) in dq.iter_mut().enumerate() {
                *v = self.dq_r[i] - (t - t2) * self.ddq_r[i];
            }
        } else {
            unreachable!("time {t} falls outside every profile segment");
        }
        Ok(())
    }

    fn acceleration(&self, t: f64, ddq: &mut [f64]) -> Result<()> {
        let s = self.check_query("acceleration output", t, ddq)?;
        let (t1, t2) = (s.t_i + s.t_b, s.t_f - s.t_b);

        if t <= s.t_i || t >= s.t_f {
            ddq.fill(0.0);
        } else if t <= t1 {
            ddq.copy_from_slice(self.ddq_r);
        } else if t <= t2 {
            ddq.fill(0.0);
        } else if t < s.t_f {
            for (i, a) in ddq.iter_mut().enumerate() {
                *a = -self.ddq_r[i];
            }
        } else {
            unreachable!("time {t} falls outside every profile segment");
        }
        Ok(())
    }
}
