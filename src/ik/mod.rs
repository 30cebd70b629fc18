//! Inverse Kinematics module
//!
//! This module contains the chain descriptor, the per-joint chain step and
//! the CCD solver that drives joints toward their targets.

pub mod chain;
pub mod observer;
pub mod solver;
pub mod step;

pub use chain::{AxisLimit, ChainLink, IkChain, IkChainBuilder};
pub use observer::{NoopObserver, SolveObserver};
pub use solver::{Axis, CcdSolver, HingeAxisRule, PreBend, SolveResult};
