use super::joint::{Joint, JointId, Layer, LayerSlot};
use crate::math::{ComposeOrder, Transform};
use glam::{Mat4, Quat, Vec3};

/// The pose-graph surface the solver consumes.
///
/// `rotation` is the joint's currently effective local rotation (base layer
/// composed with any prior correction); `set_correction_rotation` writes the
/// overlay such that the effective rotation becomes
/// `compose(base_rotation, correction)` under the graph's compose order.
/// Implementations must recompute cached world matrices on
/// `recompute_world_matrices`; the solver calls it after every mutation that
/// affects descendants.
pub trait PoseGraph {
    fn contains(&self, joint: JointId) -> bool;

    /// World matrix of `joint`. Orthonormal-with-translation; the inverse
    /// must be well-defined. Only valid for joints that pass [`contains`].
    ///
    /// [`contains`]: PoseGraph::contains
    fn world_matrix(&self, joint: JointId) -> Mat4;

    /// Effective local rotation, every enabled layer included.
    fn rotation(&self, joint: JointId) -> Quat;

    /// Effective local rotation with the correction layer left out.
    fn base_rotation(&self, joint: JointId) -> Quat;

    /// Current correction overlay value (identity if never written).
    fn correction_rotation(&self, joint: JointId) -> Quat;

    fn set_correction_rotation(&mut self, joint: JointId, rotation: Quat);

    fn recompute_world_matrices(&mut self);
}

/// Arena-backed skeleton.
///
/// Joints are stored parent-before-child (enforced at insertion), so world
/// matrices recompute in one top-down sweep over the arena with no pointer
/// chasing.
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
    compose_order: ComposeOrder,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::with_compose_order(ComposeOrder::default())
    }

    pub fn with_compose_order(compose_order: ComposeOrder) -> Self {
        Self {
            joints: Vec::new(),
            compose_order,
        }
    }

    pub fn compose_order(&self) -> ComposeOrder {
        self.compose_order
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn add_root(&mut self, position: Vec3) -> JointId {
        self.push(None, Transform::from_position(position))
    }

    pub fn add_joint(&mut self, parent: JointId, offset: Vec3) -> JointId {
        self.push(Some(parent), Transform::from_position(offset))
    }

    pub fn add_joint_with_rest(&mut self, parent: JointId, rest: Transform) -> JointId {
        self.push(Some(parent), rest)
    }

    fn push(&mut self, parent: Option<JointId>, rest: Transform) -> JointId {
        if let Some(parent) = parent {
            assert!(
                parent.0 < self.joints.len(),
                "parent joint must be added before its children"
            );
        }
        let id = JointId(self.joints.len());
        self.joints.push(Joint::new(parent, rest));
        id
    }

    /// Write the animated pose rotation into the base layer.
    pub fn set_base_rotation(&mut self, joint: JointId, rotation: Quat) {
        self.set_layer(joint, Layer::Base, LayerSlot::rotation(rotation));
    }

    pub fn set_layer(&mut self, joint: JointId, layer: Layer, slot: LayerSlot) {
        self.joints[joint.0].layers[layer as usize] = slot;
    }

    pub fn layer(&self, joint: JointId, layer: Layer) -> LayerSlot {
        self.joints[joint.0].layers[layer as usize]
    }

    pub fn parent(&self, joint: JointId) -> Option<JointId> {
        self.joints[joint.0].parent
    }

    pub fn world_position(&self, joint: JointId) -> Vec3 {
        self.joints[joint.0].world.w_axis.truncate()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseGraph for Skeleton {
    fn contains(&self, joint: JointId) -> bool {
        joint.0 < self.joints.len()
    }

    fn world_matrix(&self, joint: JointId) -> Mat4 {
        self.joints[joint.0].world
    }

    fn rotation(&self, joint: JointId) -> Quat {
        self.joints[joint.0].local_rotation(self.compose_order)
    }

    fn base_rotation(&self, joint: JointId) -> Quat {
        self.joints[joint.0].base_rotation(self.compose_order)
    }

    fn correction_rotation(&self, joint: JointId) -> Quat {
        self.joints[joint.0].layers[Layer::Correction as usize].rotation
    }

    fn set_correction_rotation(&mut self, joint: JointId, rotation: Quat) {
        let slot = &mut self.joints[joint.0].layers[Layer::Correction as usize];
        slot.enabled = true;
        slot.weight = 1.0;
        slot.rotation = rotation;
    }

    fn recompute_world_matrices(&mut self) {
        for index in 0..self.joints.len() {
            let local = self.joints[index].local_matrix(self.compose_order);
            let world = match self.joints[index].parent {
                Some(parent) => self.joints[parent.0].world * local,
                None => local,
            };
            self.joints[index].world = world;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn world_matrices_chain_through_parents() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_root(Vec3::new(1.0, 0.0, 0.0));
        let mid = skeleton.add_joint(root, Vec3::new(0.0, 2.0, 0.0));
        let tip = skeleton.add_joint(mid, Vec3::new(0.0, 0.0, 3.0));
        skeleton.recompute_world_matrices();

        assert_abs_diff_eq!(
            skeleton.world_position(tip).distance(Vec3::new(1.0, 2.0, 3.0)),
            0.0,
            epsilon = 1e-6
        );
        assert_eq!(skeleton.parent(mid), Some(root));
    }

    #[test]
    fn base_rotation_moves_descendants() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_root(Vec3::ZERO);
        let tip = skeleton.add_joint(root, Vec3::X);
        skeleton.set_base_rotation(root, Quat::from_rotation_z(FRAC_PI_2));
        skeleton.recompute_world_matrices();

        assert_abs_diff_eq!(
            skeleton.world_position(tip).distance(Vec3::Y),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn correction_written_via_overlay_reproduces_desired_total() {
        for order in [ComposeOrder::InnerFirst, ComposeOrder::OuterFirst] {
            let mut skeleton = Skeleton::with_compose_order(order);
            let root = skeleton.add_root(Vec3::ZERO);
            skeleton.set_base_rotation(root, Quat::from_rotation_y(0.6));

            let desired = Quat::from_rotation_z(1.2) * Quat::from_rotation_x(0.3);
            let correction = order.overlay_for(skeleton.base_rotation(root), desired);
            skeleton.set_correction_rotation(root, correction);

            assert!(skeleton.rotation(root).angle_between(desired) < 1e-5);
        }
    }

    #[test]
    fn layer_weight_scales_rotation() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_root(Vec3::ZERO);
        let tip = skeleton.add_joint(root, Vec3::X);
        skeleton.set_layer(
            root,
            Layer::Base,
            LayerSlot {
                weight: 0.5,
                ..LayerSlot::rotation(Quat::from_rotation_z(FRAC_PI_2))
            },
        );
        skeleton.recompute_world_matrices();

        // Half weight on a quarter turn leaves the tip at 45 degrees.
        let expected = Quat::from_rotation_z(FRAC_PI_2 / 2.0) * Vec3::X;
        assert_abs_diff_eq!(
            skeleton.world_position(tip).distance(expected),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn rest_rotation_participates_in_base() {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_root(Vec3::ZERO);
        let child = skeleton.add_joint_with_rest(
            root,
            Transform::from_position_rotation(Vec3::X, Quat::from_rotation_z(FRAC_PI_2)),
        );
        skeleton.recompute_world_matrices();
        assert!(skeleton
            .base_rotation(child)
            .angle_between(Quat::from_rotation_z(FRAC_PI_2))
            < 1e-6);
    }
}
