use crate::math::{ComposeOrder, Transform};
use glam::{Mat4, Quat, Vec3};

/// Stable handle into the skeleton arena. Never invalidated by later
/// insertions; the solver holds these without owning the joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub(crate) usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Named overlay slots composed into a joint's local transform.
///
/// A fixed set of slots accessed by enum rather than a keyed lookup: `Base`
/// carries the animated pose, `Correction` the IK overlay written during a
/// solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Base = 0,
    Correction = 1,
}

pub(crate) const LAYER_COUNT: usize = 2;

/// One overlay layer: a delta rotation and translation, scaled by `weight`
/// when enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSlot {
    pub enabled: bool,
    pub rotation: Quat,
    pub translation: Vec3,
    pub weight: f32,
}

impl LayerSlot {
    pub const DISABLED: Self = Self {
        enabled: false,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        weight: 1.0,
    };

    pub fn rotation(rotation: Quat) -> Self {
        Self {
            enabled: true,
            rotation,
            translation: Vec3::ZERO,
            weight: 1.0,
        }
    }

    pub(crate) fn effective_rotation(&self) -> Quat {
        if !self.enabled {
            return Quat::IDENTITY;
        }
        if self.weight >= 1.0 {
            self.rotation
        } else {
            Quat::IDENTITY.slerp(self.rotation, self.weight.max(0.0))
        }
    }

    pub(crate) fn effective_translation(&self) -> Vec3 {
        if self.enabled {
            self.translation * self.weight
        } else {
            Vec3::ZERO
        }
    }
}

/// One arena node: parent handle, rest transform, overlay slots and the
/// cached world matrix maintained by [`super::Skeleton`].
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) parent: Option<JointId>,
    pub(crate) rest: Transform,
    pub(crate) layers: [LayerSlot; LAYER_COUNT],
    pub(crate) world: Mat4,
}

impl Joint {
    pub(crate) fn new(parent: Option<JointId>, rest: Transform) -> Self {
        Self {
            parent,
            rest,
            layers: [LayerSlot::DISABLED; LAYER_COUNT],
            world: Mat4::IDENTITY,
        }
    }

    /// Effective local rotation: rest, then every enabled layer in slot
    /// order, combined under `order`.
    pub(crate) fn local_rotation(&self, order: ComposeOrder) -> Quat {
        let mut rotation = self.rest.rotation;
        for slot in &self.layers {
            if slot.enabled {
                rotation = order.compose(rotation, slot.effective_rotation());
            }
        }
        rotation
    }

    /// Local rotation with the correction slot left out.
    pub(crate) fn base_rotation(&self, order: ComposeOrder) -> Quat {
        let base = &self.layers[Layer::Base as usize];
        if base.enabled {
            order.compose(self.rest.rotation, base.effective_rotation())
        } else {
            self.rest.rotation
        }
    }

    pub(crate) fn local_matrix(&self, order: ComposeOrder) -> Mat4 {
        let mut translation = self.rest.position;
        for slot in &self.layers {
            translation += slot.effective_translation();
        }
        Transform::new(translation, self.local_rotation(order), self.rest.scale).to_matrix()
    }
}
