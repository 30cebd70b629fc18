use super::chain::AxisLimit;
use crate::math::{euler, ComposeOrder};
use glam::{Mat4, Quat, Vec3};

/// Rotations below this are not worth applying.
pub(crate) const ANGLE_EPSILON: f32 = 1e-5;
/// Cross products with squared length below this have no usable axis.
pub(crate) const AXIS_EPSILON: f32 = 1e-10;

/// Incremental rotation for one joint in one iteration.
///
/// Transforms the effector and target into the joint's local frame, rotates
/// the effector direction toward the target direction around their cross
/// product, and composes that increment with the joint's current rotation.
/// Returns `None` when the directions are already aligned or no rotation axis
/// exists. The antiparallel case also lands here: with the directions exactly
/// opposed the cross product vanishes and the step stays a no-op even though
/// a 180-degree rotation would geometrically help; inventing a fallback axis
/// is left to the caller's modelling, not done silently.
///
/// The returned value is the joint's new total rotation, clamped through
/// decomposition when the link is limited. Writing it back to the pose graph
/// is the controller's job.
pub fn evaluate(
    world: Mat4,
    current: Quat,
    effector_ws: Vec3,
    target_ws: Vec3,
    max_step_angle: f32,
    limit: &AxisLimit,
    order: ComposeOrder,
) -> Option<Quat> {
    let inverse = world.inverse();
    let effector_dir = inverse.transform_point3(effector_ws).normalize_or_zero();
    let target_dir = inverse.transform_point3(target_ws).normalize_or_zero();

    let axis = effector_dir.cross(target_dir);
    let dot = effector_dir.dot(target_dir).clamp(-1.0, 1.0);
    // The per-step cap bounds convergence speed and prevents one joint from
    // overshooting and oscillating across iterations.
    let angle = dot.acos().min(max_step_angle);

    if angle <= ANGLE_EPSILON || axis.length_squared() <= AXIS_EPSILON {
        return None;
    }

    let increment = Quat::from_axis_angle(axis.normalize(), angle);
    let candidate = order.compose(current, increment);

    let rotation = if limit.enabled {
        let decomposition = euler::decompose(candidate);
        euler::recompose(decomposition.order, limit.clamp(decomposition.angles))
    } else {
        candidate
    };
    Some(rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn free_step(effector: Vec3, target: Vec3, max_step: f32) -> Option<Quat> {
        evaluate(
            Mat4::IDENTITY,
            Quat::IDENTITY,
            effector,
            target,
            max_step,
            &AxisLimit::FREE,
            ComposeOrder::InnerFirst,
        )
    }

    #[test]
    fn quarter_turn_is_recovered_exactly() {
        let rotation = free_step(Vec3::X, Vec3::Y, PI).unwrap();
        assert!(rotation.angle_between(Quat::from_rotation_z(FRAC_PI_2)) < 1e-5);
        assert_abs_diff_eq!((rotation * Vec3::X).distance(Vec3::Y), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn aligned_directions_short_circuit() {
        assert!(free_step(Vec3::X, Vec3::X * 3.0, PI).is_none());
    }

    #[test]
    fn antiparallel_directions_are_a_no_op() {
        assert!(free_step(Vec3::X, Vec3::NEG_X, PI).is_none());
    }

    #[test]
    fn step_angle_cap_limits_the_increment() {
        let rotation = free_step(Vec3::X, Vec3::Y, 0.3).unwrap();
        assert!(rotation.angle_between(Quat::from_rotation_z(0.3)) < 1e-5);
    }

    #[test]
    fn limited_link_is_clamped_through_decomposition() {
        let limit = AxisLimit::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let rotation = evaluate(
            Mat4::IDENTITY,
            Quat::IDENTITY,
            Vec3::X,
            Vec3::Y,
            PI,
            &limit,
            ComposeOrder::InnerFirst,
        )
        .unwrap();
        // The unconstrained answer is a quarter turn; the limit caps it at
        // one radian about Z.
        assert!(rotation.angle_between(Quat::from_rotation_z(1.0)) < 1e-5);
    }

    #[test]
    fn increment_composes_with_current_rotation() {
        let current = Quat::from_rotation_z(0.4);
        // Joint already rotated; world matrix reflects it.
        let world = Mat4::from_quat(current);
        let effector_ws = current * Vec3::X;
        let rotation = evaluate(
            world,
            current,
            effector_ws,
            Vec3::Y,
            PI,
            &AxisLimit::FREE,
            ComposeOrder::InnerFirst,
        )
        .unwrap();
        assert!((rotation * Vec3::X).distance(Vec3::Y) < 1e-5);
    }
}
