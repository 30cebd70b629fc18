//! Skeletal pose graph
//!
//! An arena of joints addressed by stable integer handles, with named overlay
//! layers composed into each joint's effective local rotation at evaluation
//! time. The solver consumes this module only through the [`PoseGraph`]
//! trait.

pub mod graph;
pub mod joint;

pub use graph::{PoseGraph, Skeleton};
pub use joint::{Joint, JointId, Layer, LayerSlot};
