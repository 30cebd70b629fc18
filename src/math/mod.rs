//! Math utilities module
//!
//! Provides convenient re-exports from glam plus the rotation-decomposition
//! and transform utilities used by the skeleton and the solver.

pub mod euler;
mod transform;

pub use euler::{decompose, recompose, EulerDecomposition, EulerOrder};
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Multiplication convention for composing two rotations.
///
/// Selects, behind a single switch, how a newly produced rotation combines
/// with an existing one: the per-step increment against a joint's current
/// rotation, and the correction layer against the base layer. Both sites must
/// use the same convention or corrections written by the solver will not
/// reproduce the totals it computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeOrder {
    /// The applied factor acts first, in the local frame: `current * applied`
    /// in glam operator order. With a joint world matrix `W = P * T * R`,
    /// writing `R' = R * increment` yields `W' = W * increment`, so an
    /// increment built in the joint's local frame moves descendants exactly
    /// as computed.
    #[default]
    InnerFirst,
    /// The applied factor acts last: `applied * current`.
    OuterFirst,
}

impl ComposeOrder {
    /// Compose `applied` onto `current` under this convention.
    pub fn compose(self, current: Quat, applied: Quat) -> Quat {
        match self {
            Self::InnerFirst => current * applied,
            Self::OuterFirst => applied * current,
        }
    }

    /// The overlay rotation such that `compose(base, overlay)` equals `total`.
    pub fn overlay_for(self, base: Quat, total: Quat) -> Quat {
        match self {
            Self::InnerFirst => base.inverse() * total,
            Self::OuterFirst => total * base.inverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_round_trips_in_both_conventions() {
        let base = Quat::from_rotation_y(0.8);
        let total = Quat::from_rotation_z(1.1) * Quat::from_rotation_x(-0.4);

        for order in [ComposeOrder::InnerFirst, ComposeOrder::OuterFirst] {
            let overlay = order.overlay_for(base, total);
            let recombined = order.compose(base, overlay);
            assert!(recombined.angle_between(total) < 1e-5);
        }
    }
}
