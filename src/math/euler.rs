//! Factors a rotation into three independently clampable axis angles.
//!
//! A single axis order cannot represent every rotation without running into
//! gimbal lock, so extraction tries a fixed priority of orders and reports
//! whether the one it settled on was well-conditioned. Joint limits are
//! applied per axis on the extracted angles and the result is recomposed from
//! elementary rotations in the same order the entries were read.

use glam::{Mat3, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Sine entries this close to +/-1 are treated as gimbal-locked.
const LOCK_EPSILON: f32 = 1e-4;

/// Axis orders tried during extraction, in priority order.
///
/// Each order names (outer, middle, inner) axes; the rotation is read as
/// outer-first: `R = R_outer * R_middle * R_inner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EulerOrder {
    #[default]
    Xyz,
    Yzx,
    Zxy,
}

impl EulerOrder {
    /// (outer, middle, inner) axis indices for this order.
    pub fn axes(self) -> [usize; 3] {
        match self {
            Self::Xyz => [0, 1, 2],
            Self::Yzx => [1, 2, 0],
            Self::Zxy => [2, 0, 1],
        }
    }
}

/// Result of factoring a rotation into per-axis angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerDecomposition {
    /// The axis order the extraction settled on.
    pub order: EulerOrder,
    /// Extracted angles in radians, indexed by axis (x, y, z) regardless of
    /// order. The outer and inner angles lie in (-pi, pi], the middle angle
    /// in [-pi/2, pi/2].
    pub angles: Vec3,
    /// False when the extraction had to take the gimbal-lock branch.
    pub well_conditioned: bool,
}

impl EulerDecomposition {
    /// Rebuild the rotation this decomposition describes.
    pub fn recompose(&self) -> Quat {
        recompose(self.order, self.angles)
    }
}

/// Factor `rotation` into three axis angles.
///
/// Orders are tried in priority (X,Y,Z), (Y,Z,X), (Z,X,Y); the first
/// well-conditioned extraction wins. If every order is near a singular
/// configuration the last order's degenerate result is returned rather than
/// failing.
pub fn decompose(rotation: Quat) -> EulerDecomposition {
    let m = Mat3::from_quat(rotation.normalize());
    let mut result = extract(&m, EulerOrder::Xyz);
    for order in [EulerOrder::Yzx, EulerOrder::Zxy] {
        if result.well_conditioned {
            break;
        }
        result = extract(&m, order);
    }
    result
}

/// Rebuild a rotation from per-axis angles, composing elementary rotations
/// outer-first in the given order. Renormalized to cancel floating-point
/// drift.
pub fn recompose(order: EulerOrder, angles: Vec3) -> Quat {
    let [outer, middle, inner] = order.axes();
    (axis_rotation(outer, angles[outer])
        * axis_rotation(middle, angles[middle])
        * axis_rotation(inner, angles[inner]))
    .normalize()
}

pub(crate) fn axis_rotation(axis: usize, angle: f32) -> Quat {
    match axis {
        0 => Quat::from_rotation_x(angle),
        1 => Quat::from_rotation_y(angle),
        _ => Quat::from_rotation_z(angle),
    }
}

fn extract(m: &Mat3, order: EulerOrder) -> EulerDecomposition {
    let [outer, middle, inner] = order.axes();

    // With R = R_outer(a) * R_middle(b) * R_inner(c), this entry is sin(b).
    let sin_middle = entry(m, outer, inner);
    if sin_middle.abs() >= 1.0 - LOCK_EPSILON {
        return locked(m, order);
    }

    let middle_angle = sin_middle.asin();
    let cos_middle = middle_angle.cos();

    let outer_angle = (-entry(m, middle, inner) / cos_middle).asin();
    if outer_angle.is_nan() {
        return locked(m, order);
    }
    // asin only covers (-pi/2, pi/2); a negative diagonal means the outer
    // angle sits on the other branch.
    let outer_angle = if entry(m, inner, inner) < 0.0 {
        PI - outer_angle
    } else {
        outer_angle
    };

    let inner_angle = (-entry(m, outer, middle)).atan2(entry(m, outer, outer));

    let mut angles = Vec3::ZERO;
    angles[outer] = wrap_pi(outer_angle);
    angles[middle] = middle_angle;
    angles[inner] = wrap_pi(inner_angle);

    EulerDecomposition {
        order,
        angles,
        well_conditioned: true,
    }
}

/// Gimbal-lock branch: pin the outer angle to zero, set the middle angle to
/// +/-pi/2 and fold the remaining freedom into the inner angle.
fn locked(m: &Mat3, order: EulerOrder) -> EulerDecomposition {
    let [outer, middle, inner] = order.axes();
    let sin_middle = entry(m, outer, inner);

    let mut angles = Vec3::ZERO;
    angles[middle] = FRAC_PI_2.copysign(sin_middle);
    angles[inner] = entry(m, middle, outer).atan2(entry(m, middle, middle));

    EulerDecomposition {
        order,
        angles,
        well_conditioned: false,
    }
}

fn entry(m: &Mat3, row: usize, col: usize) -> f32 {
    m.col(col)[row]
}

fn wrap_pi(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}
