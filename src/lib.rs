//! # ik-ccd
//!
//! A skeletal inverse kinematics library based on cyclic coordinate descent,
//! with per-joint rotation limits and singularity-aware Euler decomposition.
//!
//! ## Features
//! - CCD (Cyclic Coordinate Descent) solver with best-iteration restore
//! - Per-joint axis limits enforced through ordered Euler decomposition
//! - Arena-backed pose graph with named overlay layers (base + correction)
//! - Optional pre-bend stage for singular (fully straight) chains
//! - Injectable per-solve trace observer
//!
//! ## Example
//! ```rust,ignore
//! use ik_ccd::ik::{AxisLimit, CcdSolver, IkChain};
//! use ik_ccd::skeleton::Skeleton;
//! use glam::Vec3;
//!
//! // Build a two-bone arm with a target joint to chase
//! let mut skeleton = Skeleton::new();
//! let shoulder = skeleton.add_root(Vec3::ZERO);
//! let elbow = skeleton.add_joint(shoulder, Vec3::X);
//! let wrist = skeleton.add_joint(elbow, Vec3::X);
//! let target = skeleton.add_root(Vec3::new(0.5, 1.2, 0.0));
//!
//! let chain = IkChain::builder(target, wrist)
//!     .add_limited_link(elbow, AxisLimit::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.6)))
//!     .add_link(shoulder)
//!     .max_iterations(10)
//!     .build();
//!
//! let result = CcdSolver::new().solve(&mut skeleton, &chain);
//! println!("distance: {} -> {}", result.initial_distance, result.final_distance);
//! ```

pub mod ik;
pub mod math;
pub mod skeleton;

pub use ik::{
    Axis, AxisLimit, CcdSolver, ChainLink, HingeAxisRule, IkChain, IkChainBuilder, NoopObserver,
    PreBend, SolveObserver, SolveResult,
};
pub use math::{decompose, recompose, ComposeOrder, EulerDecomposition, EulerOrder, Transform};
pub use skeleton::{Joint, JointId, Layer, LayerSlot, PoseGraph, Skeleton};
