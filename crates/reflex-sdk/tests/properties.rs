//! 轨迹属性测试
//!
//! 使用 proptest 验证梯形曲线和姿态转换的数学属性。

use nalgebra::{UnitQuaternion, Vector3};
use proptest::prelude::*;
use reflex_sdk::prelude::*;
use reflex_sdk::trajectory::rotation::{quaternion_from_rotation_vector, rotation_vector_near};

const DOF: usize = 3;

/// 三轴路点、时长和限值
fn profile_inputs() -> impl Strategy<Value = ([f64; DOF], [f64; DOF], f64, [f64; DOF], [f64; DOF])>
{
    (
        prop::array::uniform3(-2.0..2.0f64),
        prop::array::uniform3(-2.0..2.0f64),
        0.5..5.0f64,
        prop::array::uniform3(0.1..3.0f64),
        prop::array::uniform3(0.1..5.0f64),
    )
}

/// 用给定输入构造梯形曲线；不可行时返回 `None`
fn generate<'a>(
    region: &mut Region<'a>,
    (x_i, x_f, span, dx_max, ddx_max): &([f64; DOF], [f64; DOF], f64, [f64; DOF], [f64; DOF]),
) -> Option<TrapezoidalProfile<'a>> {
    let mut profile = TrapezoidalProfile::new(region, DOF).ok()?;
    profile.set_limits(dx_max, ddx_max).ok()?;
    profile.add_waypoint(0, 1.0, x_i).ok()?;
    profile.add_waypoint(1, 1.0 + span, x_f).ok()?;
    profile.generate().ok()?;
    Some(profile)
}

fn arena() -> ScratchArena {
    ScratchArena::with_capacity(TrapezoidalProfile::required_capacity(DOF))
}

proptest! {
    /// 生成成功的曲线满足每轴限值，过渡时间位于 (0, T/2]
    #[test]
    fn generated_profile_respects_limits(inputs in profile_inputs()) {
        let mut arena = arena();
        let mut region = arena.region();
        if let Some(profile) = generate(&mut region, &inputs) {
            let (_, _, span, dx_max, ddx_max) = inputs;
            let tol = 1e-9;
            for i in 0..DOF {
                prop_assert!(profile.velocity_reference()[i].abs() <= dx_max[i] * (1.0 + tol));
                prop_assert!(profile.acceleration_reference()[i].abs() <= ddx_max[i] * (1.0 + tol));
            }
            let t_b = profile.segment().unwrap().t_b;
            prop_assert!(t_b > 0.0);
            prop_assert!(t_b <= span / 2.0 + 1e-12);
        }
    }

    /// 位置和速度在分段边界处连续
    #[test]
    fn profile_is_continuous_at_seams(inputs in profile_inputs()) {
        let mut arena = arena();
        let mut region = arena.region();
        if let Some(profile) = generate(&mut region, &inputs) {
            let s = profile.segment().unwrap();
            let eps = 1e-9;
            for seam in [s.t_i, s.t_i + s.t_b, s.t_f - s.t_b, s.t_f] {
                let (mut a, mut b) = ([0.0; DOF], [0.0; DOF]);
                profile.position(seam - eps, &mut a).unwrap();
                profile.position(seam + eps, &mut b).unwrap();
                for i in 0..DOF {
                    prop_assert!((a[i] - b[i]).abs() < 1e-6);
                }

                profile.velocity(seam - eps, &mut a).unwrap();
                profile.velocity(seam + eps, &mut b).unwrap();
                for i in 0..DOF {
                    prop_assert!((a[i] - b[i]).abs() < 1e-6);
                }
            }
        }
    }

    /// 加速度分段为常数：跨度之外为 0，三个区间内部分别等于 `ddx_r`、0、`-ddx_r`
    #[test]
    fn acceleration_is_piecewise_constant(
        inputs in profile_inputs(),
        fracs in prop::array::uniform2(0.01..0.99f64),
        dt in 0.001..10.0f64,
    ) {
        let mut arena = arena();
        let mut region = arena.region();
        if let Some(profile) = generate(&mut region, &inputs) {
            let s = profile.segment().unwrap();
            let ddx_r = profile.acceleration_reference();
            let mut a = [0.0; DOF];

            // 起止时刻之外静止
            for t in [s.t_i - dt, s.t_i, s.t_f, s.t_f + dt] {
                profile.acceleration(t, &mut a).unwrap();
                prop_assert_eq!(a, [0.0; DOF]);
            }

            let (t1, t2) = (s.t_i + s.t_b, s.t_f - s.t_b);
            let regions = [(s.t_i, t1, 1.0), (t1, t2, 0.0), (t2, s.t_f, -1.0)];
            for (start, end, sign) in regions {
                // 三角形曲线没有匀速段
                if end - start < 1e-6 {
                    continue;
                }
                for frac in fracs {
                    let t = start + frac * (end - start);
                    profile.acceleration(t, &mut a).unwrap();
                    for i in 0..DOF {
                        prop_assert_eq!(a[i], sign * ddx_r[i]);
                    }
                }
            }
        }
    }

    /// 同一时间重复查询结果完全相同
    #[test]
    fn queries_are_idempotent(inputs in profile_inputs(), frac in -0.2..1.2f64) {
        let mut arena = arena();
        let mut region = arena.region();
        if let Some(profile) = generate(&mut region, &inputs) {
            let (t_i, t_f) = profile.time_span().unwrap();
            let t = t_i + frac * (t_f - t_i);

            let (mut a, mut b) = ([0.0; DOF], [0.0; DOF]);
            profile.position(t, &mut a).unwrap();
            profile.position(t, &mut b).unwrap();
            prop_assert_eq!(a, b);

            profile.velocity(t, &mut a).unwrap();
            profile.velocity(t, &mut b).unwrap();
            prop_assert_eq!(a, b);

            profile.acceleration(t, &mut a).unwrap();
            profile.acceleration(t, &mut b).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    /// 起止时间之外位置钳位到路点
    #[test]
    fn profile_clamps_outside_span(inputs in profile_inputs(), dt in 0.001..10.0f64) {
        let mut arena = arena();
        let mut region = arena.region();
        if let Some(profile) = generate(&mut region, &inputs) {
            let (x_i, x_f, ..) = inputs;
            let (t_i, t_f) = profile.time_span().unwrap();
            let mut q = [0.0; DOF];

            profile.position(t_i - dt, &mut q).unwrap();
            prop_assert_eq!(q, x_i);
            profile.position(t_f + dt, &mut q).unwrap();
            prop_assert_eq!(q, x_f);
        }
    }

    /// 两种笛卡尔轨迹在起止时间之外钳位到路点位姿
    #[test]
    fn workspace_trajectories_clamp(
        p in prop::array::uniform3(-0.5..0.5f64),
        rv in prop::array::uniform3(-1.0..1.0f64),
        dt in 0.001..10.0f64,
    ) {
        let goal = WorkspacePose::new(
            Vector3::from(p),
            UnitQuaternion::from_scaled_axis(Vector3::from(rv)),
        );

        let mut arena = ScratchArena::with_capacity(
            RotationVectorTrajectory::required_capacity() + SlerpTrajectory::required_capacity(),
        );
        let mut region = arena.region();
        let mut rotvec = RotationVectorTrajectory::new(&mut region).unwrap();
        let mut slerp = SlerpTrajectory::new(&mut region).unwrap();
        let trajectories: [&mut dyn WorkspaceTrajectory; 2] = [&mut rotvec, &mut slerp];

        for traj in trajectories {
            traj.add_waypoint(0, 0.0, &WorkspacePose::identity()).unwrap();
            traj.add_waypoint(1, 4.0, &goal).unwrap();
            traj.generate().unwrap();

            let before = traj.pose(-dt).unwrap();
            prop_assert_eq!(before.position, Vector3::zeros());
            prop_assert!(before.orientation.angle() < 1e-6);

            let after = traj.pose(4.0 + dt).unwrap();
            prop_assert!((after.position - goal.position).norm() < 1e-12);
            prop_assert!(after.orientation.angle_to(&goal.orientation) < 1e-6);
        }
    }

    /// 旋转向量 → 四元数 → 最近分支旋转向量，还原原始向量
    #[test]
    fn rotation_vector_round_trip(v in prop::array::uniform3(-9.0..9.0f64)) {
        let v = Vector3::from(v);
        let q = quaternion_from_rotation_vector(&v);
        let back = rotation_vector_near(&q, &v);
        prop_assert!((back - v).norm() < 1e-6, "v = {:?}, back = {:?}", v, back);
    }
}
