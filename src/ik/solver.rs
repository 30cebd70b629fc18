use super::chain::{AxisLimit, IkChain};
use super::observer::{NoopObserver, SolveObserver};
use super::step;
use crate::math::{euler, ComposeOrder};
use crate::skeleton::{JointId, PoseGraph};
use glam::{Mat4, Quat, Vec3};

/// Rotations whose scalar part is this close to +/-1 count as identity for
/// the pre-bend pass.
const IDENTITY_EPSILON: f32 = 1e-3;
/// Slack allowed before the final configuration is considered worse than the
/// best snapshot.
const RESTORE_EPSILON: f32 = 1e-6;

/// A joint's local rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// How the pre-bend stage picks the hinge axis of a limited link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HingeAxisRule {
    /// Always bend about this local axis.
    Fixed(Axis),
    /// Bend about the axis with the widest allowed range.
    WidestRange,
}

impl HingeAxisRule {
    fn select(self, limit: &AxisLimit) -> usize {
        match self {
            Self::Fixed(axis) => axis.index(),
            Self::WidestRange => {
                let range = limit.range();
                let mut best = 0;
                for axis in 1..3 {
                    if range[axis] > range[best] {
                        best = axis;
                    }
                }
                best
            }
        }
    }
}

/// Optional pre-processing stage that nudges limited links sitting at
/// identity before iterating.
///
/// A perfectly straight chain gives the chain step a vanishing rotation axis
/// at the intermediate joints (the classic knee singularity); a small bend
/// breaks the tie. The bend direction follows the sign of the joint's minimum
/// limit on the hinge axis, so the nudge starts inside the allowed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreBend {
    /// Bend magnitude in radians.
    pub angle: f32,
    pub rule: HingeAxisRule,
}

impl Default for PreBend {
    fn default() -> Self {
        Self {
            angle: 0.01,
            rule: HingeAxisRule::Fixed(Axis::X),
        }
    }
}

/// Outcome of one `solve()` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    /// False when the chain was skipped (invalid joints or no links); the
    /// pose graph is untouched in that case.
    pub completed: bool,
    /// Iterations actually run.
    pub iterations: u32,
    pub initial_distance: f32,
    pub final_distance: f32,
    /// Iteration that produced the best distance, if any improved on the
    /// starting configuration.
    pub best_iteration: Option<u32>,
    /// True when the final configuration was worse than the best seen and the
    /// best snapshot was written back.
    pub restored_best: bool,
}

impl SolveResult {
    fn skipped() -> Self {
        Self {
            completed: false,
            iterations: 0,
            initial_distance: 0.0,
            final_distance: 0.0,
            best_iteration: None,
            restored_best: false,
        }
    }
}

/// Best-known configuration, tracked across iterations and discarded when the
/// solve returns.
struct SolveState {
    best_distance: f32,
    best_iteration: Option<u32>,
    corrections: Vec<Quat>,
}

impl SolveState {
    fn capture(graph: &impl PoseGraph, chain: &IkChain, distance: f32) -> Self {
        Self {
            best_distance: distance,
            best_iteration: None,
            corrections: chain
                .links
                .iter()
                .map(|link| graph.correction_rotation(link.joint))
                .collect(),
        }
    }

    fn record(&mut self, graph: &impl PoseGraph, chain: &IkChain, iteration: u32, distance: f32) {
        self.best_distance = distance;
        self.best_iteration = Some(iteration);
        for (slot, link) in self.corrections.iter_mut().zip(&chain.links) {
            *slot = graph.correction_rotation(link.joint);
        }
    }

    fn restore(&self, graph: &mut impl PoseGraph, chain: &IkChain) {
        for (slot, link) in self.corrections.iter().zip(&chain.links) {
            graph.set_correction_rotation(link.joint, *slot);
        }
    }
}

/// Cyclic-coordinate-descent solver.
///
/// Mutates joint corrections in the pose graph so the chain's effector chases
/// its target, one joint at a time, keeping whichever iteration got closest.
/// Nothing in the steady-state path fails: malformed chains are skipped,
/// degenerate steps are no-ops, and numeric edge cases are absorbed by the
/// decomposition module.
#[derive(Debug, Clone, Copy)]
pub struct CcdSolver {
    compose_order: ComposeOrder,
    pre_bend: Option<PreBend>,
}

impl CcdSolver {
    pub fn new() -> Self {
        Self {
            compose_order: ComposeOrder::default(),
            pre_bend: None,
        }
    }

    /// Use the other rotation-composition convention. Must match the pose
    /// graph's convention.
    pub fn compose_order(mut self, compose_order: ComposeOrder) -> Self {
        self.compose_order = compose_order;
        self
    }

    /// Enable the pre-bend stage.
    pub fn pre_bend(mut self, pre_bend: PreBend) -> Self {
        self.pre_bend = Some(pre_bend);
        self
    }

    pub fn solve(&self, graph: &mut impl PoseGraph, chain: &IkChain) -> SolveResult {
        self.solve_observed(graph, chain, &mut NoopObserver)
    }

    /// Solve several independent chains, sequentially. A skipped chain leaves
    /// the others unaffected.
    pub fn solve_all(&self, graph: &mut impl PoseGraph, chains: &[IkChain]) -> Vec<SolveResult> {
        let mut results = Vec::with_capacity(chains.len());
        for chain in chains {
            results.push(self.solve(graph, chain));
        }
        results
    }

    pub fn solve_observed(
        &self,
        graph: &mut impl PoseGraph,
        chain: &IkChain,
        observer: &mut dyn SolveObserver,
    ) -> SolveResult {
        if !chain_is_valid(graph, chain) {
            return SolveResult::skipped();
        }

        // Consistent starting state for the whole affected sub-hierarchy.
        graph.recompute_world_matrices();

        if let Some(pre_bend) = self.pre_bend {
            self.apply_pre_bend(graph, chain, pre_bend, observer);
        }

        let initial_distance = distance(graph, chain);
        let mut state = SolveState::capture(graph, chain, initial_distance);
        observer.solve_started(initial_distance);

        let mut iterations = 0;
        for iteration in 0..chain.max_iterations {
            iterations = iteration + 1;
            for (index, link) in chain.links.iter().enumerate() {
                // Both endpoints are re-read every step: earlier links in
                // this same iteration have already moved them.
                let effector_ws = position(graph.world_matrix(chain.effector));
                let target_ws = position(graph.world_matrix(chain.target));
                let applied = step::evaluate(
                    graph.world_matrix(link.joint),
                    graph.rotation(link.joint),
                    effector_ws,
                    target_ws,
                    chain.max_step_angle,
                    &link.limit,
                    self.compose_order,
                );
                if let Some(total) = applied {
                    self.write_total(graph, link.joint, total);
                    graph.recompute_world_matrices();
                }
                observer.step_evaluated(iteration, index, applied.is_some());
            }

            let iteration_distance = distance(graph, chain);
            observer.iteration_finished(iteration, iteration_distance);
            if iteration_distance < state.best_distance {
                state.record(graph, chain, iteration, iteration_distance);
            }
        }

        // CCD has no monotonic-convergence guarantee under per-step clamping
        // and axis limits; the best-seen state always wins.
        let mut final_distance = distance(graph, chain);
        let mut restored_best = false;
        if final_distance > state.best_distance + RESTORE_EPSILON {
            state.restore(graph, chain);
            graph.recompute_world_matrices();
            final_distance = distance(graph, chain);
            restored_best = true;
            observer.best_restored(state.best_iteration, state.best_distance);
        }

        SolveResult {
            completed: true,
            iterations,
            initial_distance,
            final_distance,
            best_iteration: state.best_iteration,
            restored_best,
        }
    }

    fn apply_pre_bend(
        &self,
        graph: &mut impl PoseGraph,
        chain: &IkChain,
        pre_bend: PreBend,
        observer: &mut dyn SolveObserver,
    ) {
        let mut bent = false;
        for (index, link) in chain.links.iter().enumerate() {
            if !link.limit.enabled {
                continue;
            }
            let current = graph.rotation(link.joint);
            if (1.0 - current.w.abs()).abs() >= IDENTITY_EPSILON {
                continue;
            }

            let axis = pre_bend.rule.select(&link.limit);
            let sign = if link.limit.min[axis] < 0.0 { -1.0 } else { 1.0 };
            let angle = sign * pre_bend.angle;
            let total = self
                .compose_order
                .compose(current, euler::axis_rotation(axis, angle));
            self.write_total(graph, link.joint, total);
            observer.pre_bend_applied(index, angle);
            bent = true;
        }
        if bent {
            graph.recompute_world_matrices();
        }
    }

    fn write_total(&self, graph: &mut impl PoseGraph, joint: JointId, total: Quat) {
        let base = graph.base_rotation(joint);
        graph.set_correction_rotation(joint, self.compose_order.overlay_for(base, total));
    }
}

impl Default for CcdSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn chain_is_valid(graph: &impl PoseGraph, chain: &IkChain) -> bool {
    if chain.links.is_empty() {
        log::debug!("skipping chain: no links");
        return false;
    }
    if !graph.contains(chain.target) || !graph.contains(chain.effector) {
        log::debug!("skipping chain: target or effector joint not in pose graph");
        return false;
    }
    if let Some(link) = chain.links.iter().find(|link| !graph.contains(link.joint)) {
        log::debug!("skipping chain: link joint {:?} not in pose graph", link.joint);
        return false;
    }
    true
}

fn position(world: Mat4) -> Vec3 {
    world.w_axis.truncate()
}

fn distance(graph: &impl PoseGraph, chain: &IkChain) -> f32 {
    position(graph.world_matrix(chain.effector)).distance(position(graph.world_matrix(chain.target)))
}
