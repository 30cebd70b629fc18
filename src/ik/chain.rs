use crate::skeleton::JointId;
use glam::Vec3;
use std::f32::consts::PI;

/// Per-joint rotation limits in radians, one `[min, max]` interval per local
/// axis. Immutable for the duration of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimit {
    pub enabled: bool,
    pub min: Vec3,
    pub max: Vec3,
}

impl AxisLimit {
    /// No limiting at all; extracted angles pass through untouched.
    pub const FREE: Self = Self {
        enabled: false,
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            enabled: true,
            min,
            max,
        }
    }

    /// Clamp per-axis angles into `[min, max]`. Angles already inside their
    /// interval come back unchanged.
    pub fn clamp(&self, angles: Vec3) -> Vec3 {
        if !self.enabled {
            return angles;
        }
        angles.clamp(self.min, self.max)
    }

    /// Allowed span per axis; zero everywhere when unlimited.
    pub fn range(&self) -> Vec3 {
        if self.enabled {
            self.max - self.min
        } else {
            Vec3::ZERO
        }
    }
}

/// One solvable joint of a chain, with its rotation limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainLink {
    pub joint: JointId,
    pub limit: AxisLimit,
}

/// Descriptor of one IK problem: which joint chases which target, through
/// which links.
///
/// Link order is caller-defined (conventionally effector-adjacent first,
/// root-adjacent last) and is never reordered by the solver.
#[derive(Debug, Clone)]
pub struct IkChain {
    pub(crate) target: JointId,
    pub(crate) effector: JointId,
    pub(crate) links: Vec<ChainLink>,
    pub(crate) max_iterations: u32,
    pub(crate) max_step_angle: f32,
}

impl IkChain {
    pub fn builder(target: JointId, effector: JointId) -> IkChainBuilder {
        IkChainBuilder::new(target, effector)
    }

    pub fn target(&self) -> JointId {
        self.target
    }

    pub fn effector(&self) -> JointId {
        self.effector
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Largest rotation one joint may take in one iteration, radians.
    pub fn max_step_angle(&self) -> f32 {
        self.max_step_angle
    }
}

pub struct IkChainBuilder {
    target: JointId,
    effector: JointId,
    links: Vec<ChainLink>,
    max_iterations: u32,
    max_step_angle: f32,
}

impl IkChainBuilder {
    pub fn new(target: JointId, effector: JointId) -> Self {
        Self {
            target,
            effector,
            links: Vec::new(),
            max_iterations: 10,
            max_step_angle: PI,
        }
    }

    pub fn add_link(mut self, joint: JointId) -> Self {
        self.links.push(ChainLink {
            joint,
            limit: AxisLimit::FREE,
        });
        self
    }

    pub fn add_limited_link(mut self, joint: JointId, limit: AxisLimit) -> Self {
        self.links.push(ChainLink { joint, limit });
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn max_step_angle(mut self, max_step_angle: f32) -> Self {
        self.max_step_angle = max_step_angle;
        self
    }

    pub fn build(self) -> IkChain {
        IkChain {
            target: self.target,
            effector: self.effector,
            links: self.links,
            max_iterations: self.max_iterations,
            max_step_angle: self.max_step_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Skeleton;
    use glam::Vec3;

    #[test]
    fn builder_preserves_link_order() {
        let mut skeleton = Skeleton::new();
        let a = skeleton.add_root(Vec3::ZERO);
        let b = skeleton.add_joint(a, Vec3::X);
        let c = skeleton.add_joint(b, Vec3::X);

        let chain = IkChain::builder(a, c)
            .add_link(b)
            .add_limited_link(a, AxisLimit::new(Vec3::ZERO, Vec3::splat(1.0)))
            .max_iterations(7)
            .build();

        assert_eq!(chain.links().len(), 2);
        assert_eq!(chain.links()[0].joint, b);
        assert_eq!(chain.links()[1].joint, a);
        assert_eq!(chain.max_iterations(), 7);
        assert!(!chain.links()[0].limit.enabled);
        assert!(chain.links()[1].limit.enabled);
    }

    #[test]
    fn clamp_is_identity_inside_the_interval() {
        let limit = AxisLimit::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let angles = Vec3::new(0.25, -0.9, 0.0);
        assert_eq!(limit.clamp(angles), angles);

        let clamped = limit.clamp(Vec3::new(2.0, -3.0, 0.5));
        assert_eq!(clamped, Vec3::new(1.0, -1.0, 0.5));
    }

    #[test]
    fn free_limit_passes_everything_through() {
        let angles = Vec3::new(3.0, -3.0, 0.1);
        assert_eq!(AxisLimit::FREE.clamp(angles), angles);
        assert_eq!(AxisLimit::FREE.range(), Vec3::ZERO);
    }
}
