//! The concurrent graph builder.
//!
//! A build seeds the run queue with one task per terminal requirement and
//! lets a fixed pool of workers drain it. Each task resolves a requirement
//! by trying candidate functions in preference order, recursing into their
//! inputs, backtracking to the next candidate on failure, and committing a
//! node into the shared graph on success.
//!
//! Workers synchronize at exactly two places: the memoization map of
//! in-flight and completed resolutions, and the graph's insert-if-absent
//! node map. Because candidate order, exclusion checks and availability are
//! pure functions of the injected collaborators, graph content is
//! deterministic regardless of the run-queue strategy or thread interleaving.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use lattice_core::{
    CandidateAttempt, FailureKind, FunctionId, Rejection, ResolutionFailure, Target, ValueName,
    ValueRequirement, ValueSpecification,
};
use lattice_traits::config::BuildOptions;
use lattice_traits::exclusion::ExclusionGroups;
use lattice_traits::function::CalculationFunction;
use lattice_traits::market_data::MarketDataAvailability;
use lattice_traits::output::FailureListener;
use lattice_traits::resolver::FunctionResolver;

use crate::compiled::CompiledGraph;
use crate::error::EngineError;
use crate::graph::DependencyGraph;
use crate::run_queue::{create_run_queue, RunQueue};

// ---------------------------------------------------------------------------
// Resolution path
// ---------------------------------------------------------------------------

/// One ancestor on the resolution path: a requirement under resolution and
/// the candidate tentatively selected for it.
struct PathFrame {
    value_name: ValueName,
    target: Target,
    function: FunctionId,
    parent: Option<Arc<PathFrame>>,
}

/// The chain of in-progress (requirement, candidate) pairs above the
/// requirement currently being resolved.
///
/// Cheap to clone and extend; frames are shared between sibling branches.
#[derive(Clone, Default)]
pub struct ResolutionPath {
    head: Option<Arc<PathFrame>>,
}

impl ResolutionPath {
    /// The empty path at a terminal requirement.
    pub fn root() -> Self {
        Self::default()
    }

    fn push(&self, value_name: ValueName, target: Target, function: FunctionId) -> Self {
        Self {
            head: Some(Arc::new(PathFrame {
                value_name,
                target,
                function,
                parent: self.head.clone(),
            })),
        }
    }

    /// Whether a (value name, target) pair is already being resolved on this
    /// path. Scheduling such a sub-requirement again would recurse forever.
    fn contains(&self, value_name: &ValueName, target: &Target) -> bool {
        let mut frame = self.head.as_deref();
        while let Some(f) = frame {
            if &f.value_name == value_name && &f.target == target {
                return true;
            }
            frame = f.parent.as_deref();
        }
        false
    }

    /// The exclusion groups committed on this path, paired with the target
    /// they were committed for.
    fn exclusion_context(&self, policy: &dyn ExclusionGroups) -> BTreeSet<(String, Target)> {
        let mut context = BTreeSet::new();
        let mut frame = self.head.as_deref();
        while let Some(f) = frame {
            if let Some(group) = policy.group_of(&f.function) {
                context.insert((group.to_string(), f.target.clone()));
            }
            frame = f.parent.as_deref();
        }
        context
    }
}

// ---------------------------------------------------------------------------
// Tasks and memoization
// ---------------------------------------------------------------------------

/// A pending resolution task on the run queue.
pub struct ResolveTask {
    requirement: ValueRequirement,
    path: ResolutionPath,
    terminal: bool,
}

impl ResolveTask {
    /// A task for a directly requested (terminal) requirement.
    pub fn terminal(requirement: ValueRequirement) -> Self {
        Self {
            requirement,
            path: ResolutionPath::root(),
            terminal: true,
        }
    }

    fn subtask(requirement: ValueRequirement, path: ResolutionPath) -> Self {
        Self {
            requirement,
            path,
            terminal: false,
        }
    }

    /// The requirement this task resolves.
    pub fn requirement(&self) -> &ValueRequirement {
        &self.requirement
    }

    /// Whether this task resolves a terminal requirement.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Memoization key: a requirement plus the exclusion context it is resolved
/// under. With no exclusion groups on the path the context is empty and
/// identical sub-requirements share one resolution globally.
#[derive(Clone, Hash, Eq, PartialEq)]
struct MemoKey {
    requirement: ValueRequirement,
    exclusion_context: BTreeSet<(String, Target)>,
}

/// The outcome of one requirement resolution together with the metadata that
/// decides whether another branch may reuse it.
///
/// A resolution is a pure function of the requirement, the exclusion context
/// and the ancestor path. The path only matters through cycle rejection, so
/// a result that saw no cyclic rejection (`tainted == false`) is valid on any
/// path that does not run through its `visited` set; everything else must be
/// recomputed under the local path.
#[derive(Clone)]
struct Resolution {
    result: Result<ValueSpecification, ResolutionFailure>,
    /// Every (value name, target) consulted, the requirement itself included.
    visited: Arc<BTreeSet<(ValueName, Target)>>,
    /// Whether any cyclic rejection occurred anywhere in the computation.
    tainted: bool,
}

impl Resolution {
    /// A resolution that consulted nothing beyond the requirement itself.
    fn leaf(
        requirement: &ValueRequirement,
        result: Result<ValueSpecification, ResolutionFailure>,
        tainted: bool,
    ) -> Self {
        let mut visited = BTreeSet::new();
        visited.insert((
            requirement.value_name().clone(),
            requirement.target().clone(),
        ));
        Self {
            result,
            visited: Arc::new(visited),
            tainted,
        }
    }
}

enum CellState {
    InProgress,
    Done(Resolution),
}

/// What a memo lookup handed this worker.
enum Claim {
    /// This worker claimed the cell and must compute and publish.
    Owner(Arc<ResolutionCell>),
    /// Another worker holds the cell; wait for its result.
    Waiter(Arc<ResolutionCell>),
}

/// Publication point for one in-flight resolution.
struct ResolutionCell {
    state: Mutex<CellState>,
    done: Condvar,
    owner: AtomicUsize,
}

impl ResolutionCell {
    fn in_progress(owner: usize) -> Self {
        Self {
            state: Mutex::new(CellState::InProgress),
            done: Condvar::new(),
            owner: AtomicUsize::new(owner),
        }
    }

    fn owner(&self) -> usize {
        self.owner.load(Ordering::Acquire)
    }

    /// Non-blocking done check; a cell whose lock is momentarily held is
    /// reported as still in progress. Used by the wait-for chain walk, which
    /// must never block on another cell's lock while a waited-on cell's lock
    /// is held.
    fn try_is_done(&self) -> bool {
        self.state
            .try_lock()
            .map(|state| matches!(&*state, CellState::Done(_)))
            .unwrap_or(false)
    }

    fn complete(&self, resolution: Resolution) {
        *self.state.lock() = CellState::Done(resolution);
        self.done.notify_all();
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Handle for cancelling a build from another thread.
///
/// A cancelled build drains its in-flight work and returns
/// [`EngineError::Cancelled`]; no partial graph is published.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Graph builder
// ---------------------------------------------------------------------------

/// Builds the dependency graph for one calculation configuration.
///
/// All collaborators are injected; the builder holds no global state and an
/// instance is consumed by [`build`](GraphBuilder::build).
pub struct GraphBuilder {
    config_name: String,
    resolver: Arc<dyn FunctionResolver>,
    availability: Arc<dyn MarketDataAvailability>,
    exclusions: Arc<dyn ExclusionGroups>,
    options: BuildOptions,
    run_queue: Option<Box<dyn RunQueue>>,
    listener: Option<Arc<dyn FailureListener>>,
    requirements: Vec<ValueRequirement>,
    cancel: CancelToken,
}

impl GraphBuilder {
    /// Create a builder for a named calculation configuration.
    pub fn new(
        config_name: impl Into<String>,
        resolver: Arc<dyn FunctionResolver>,
        availability: Arc<dyn MarketDataAvailability>,
        exclusions: Arc<dyn ExclusionGroups>,
    ) -> Self {
        Self {
            config_name: config_name.into(),
            resolver,
            availability,
            exclusions,
            options: BuildOptions::default(),
            run_queue: None,
            listener: None,
            requirements: Vec::new(),
            cancel: CancelToken::default(),
        }
    }

    /// Set the build options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the run queue with a custom implementation, overriding the
    /// strategy in the options.
    pub fn with_run_queue(mut self, run_queue: Box<dyn RunQueue>) -> Self {
        self.run_queue = Some(run_queue);
        self
    }

    /// Set the failure listener; invoked only when failure reporting is
    /// enabled in the options.
    pub fn with_failure_listener(mut self, listener: Arc<dyn FailureListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Add a terminal requirement.
    pub fn add_target(&mut self, requirement: ValueRequirement) {
        self.requirements.push(requirement);
    }

    /// Add terminal requirements.
    pub fn add_targets(&mut self, requirements: impl IntoIterator<Item = ValueRequirement>) {
        self.requirements.extend(requirements);
    }

    /// A handle for cancelling this build from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the build to completion and freeze the graph.
    ///
    /// Terminal failures are recorded in the compiled graph unless `strict`
    /// is set or every terminal failed, in which case the build errors.
    pub fn build(self) -> Result<CompiledGraph, EngineError> {
        if self.requirements.is_empty() {
            return Err(EngineError::NoRequirements);
        }
        let workers = if self.options.max_workers == 0 {
            num_cpus::get()
        } else {
            self.options.max_workers
        };
        let context = BuildContext {
            resolver: self.resolver,
            availability: self.availability,
            exclusions: self.exclusions,
            listener: self.listener,
            report_failures: self.options.enable_failure_reporting,
            graph: DependencyGraph::new(),
            queue: self
                .run_queue
                .unwrap_or_else(|| create_run_queue(self.options.queue)),
            memo: DashMap::new(),
            waiting: DashMap::new(),
            terminals: DashMap::new(),
            failures: DashMap::new(),
            pending_terminals: AtomicUsize::new(self.requirements.len()),
            scheduled: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            cancelled: self.cancel.flag,
        };

        info!(
            config = %self.config_name,
            terminals = self.requirements.len(),
            workers,
            "starting dependency graph build"
        );
        for requirement in self.requirements {
            context.scheduled.fetch_add(1, Ordering::Relaxed);
            context.queue.push(ResolveTask::terminal(requirement));
        }

        std::thread::scope(|scope| {
            for worker in 0..workers {
                let context = &context;
                scope.spawn(move || context.worker_loop(worker));
            }
        });

        if context.cancelled.load(Ordering::SeqCst) {
            return Err(EngineError::Cancelled);
        }

        let terminals: BTreeMap<ValueRequirement, ValueSpecification> = context
            .terminals
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let failures: BTreeMap<ValueRequirement, ResolutionFailure> = context
            .failures
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        info!(
            config = %self.config_name,
            resolved = terminals.len(),
            failed = failures.len(),
            nodes = context.graph.node_count(),
            scheduled = context.scheduled.load(Ordering::Relaxed),
            completed = context.completed.load(Ordering::Relaxed),
            "dependency graph build complete"
        );

        if !failures.is_empty() && (self.options.strict || terminals.is_empty()) {
            return Err(EngineError::UnsatisfiedTerminals {
                failed: failures.len(),
                total: terminals.len() + failures.len(),
            });
        }

        CompiledGraph::freeze(self.config_name, &context.graph, terminals, failures)
    }
}

// ---------------------------------------------------------------------------
// Shared build state and the worker algorithm
// ---------------------------------------------------------------------------

struct BuildContext {
    resolver: Arc<dyn FunctionResolver>,
    availability: Arc<dyn MarketDataAvailability>,
    exclusions: Arc<dyn ExclusionGroups>,
    listener: Option<Arc<dyn FailureListener>>,
    report_failures: bool,
    graph: DependencyGraph,
    queue: Box<dyn RunQueue>,
    memo: DashMap<MemoKey, Arc<ResolutionCell>>,
    waiting: DashMap<usize, MemoKey>,
    terminals: DashMap<ValueRequirement, ValueSpecification>,
    failures: DashMap<ValueRequirement, ResolutionFailure>,
    pending_terminals: AtomicUsize,
    scheduled: AtomicU64,
    completed: AtomicU64,
    cancelled: Arc<AtomicBool>,
}

/// How long a waiter sleeps between checks of a shared in-flight cell.
const WAIT_INTERVAL: Duration = Duration::from_millis(10);

/// Worker idle backoff when the queue is momentarily empty.
const IDLE_BACKOFF: Duration = Duration::from_micros(50);

impl BuildContext {
    fn worker_loop(&self, worker: usize) {
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                break;
            }
            match self.queue.pop() {
                Some(task) => self.run_task(task, worker),
                None => {
                    if self.pending_terminals.load(Ordering::SeqCst) == 0 {
                        break;
                    }
                    std::thread::sleep(IDLE_BACKOFF);
                }
            }
        }
    }

    fn run_task(&self, task: ResolveTask, worker: usize) {
        let ResolveTask {
            requirement,
            path,
            terminal,
        } = task;
        let result = self.resolve(&requirement, &path, worker).result;
        if terminal {
            match result {
                Ok(spec) => {
                    debug!(requirement = %requirement, spec = %spec, "terminal resolved");
                    self.terminals.insert(requirement, spec);
                }
                Err(failure) => {
                    debug!(requirement = %requirement, %failure, "terminal failed");
                    if self.report_failures {
                        if let Some(listener) = &self.listener {
                            listener.on_failure(&failure);
                        }
                    }
                    self.failures.insert(requirement, failure);
                }
            }
            self.pending_terminals.fetch_sub(1, Ordering::SeqCst);
        }
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Resolve one requirement under a path, sharing work through the memo.
    fn resolve(&self, requirement: &ValueRequirement, path: &ResolutionPath, worker: usize) -> Resolution {
        if self.cancelled.load(Ordering::SeqCst) {
            return Resolution::leaf(
                requirement,
                Err(ResolutionFailure::new(
                    requirement.clone(),
                    FailureKind::Cancelled,
                )),
                true,
            );
        }

        // A requirement already in progress on this path can never resolve
        // acyclically through this branch.
        if path.contains(requirement.value_name(), requirement.target()) {
            debug!(requirement = %requirement, "rejected: cyclic");
            return Resolution::leaf(
                requirement,
                Err(ResolutionFailure::new(
                    requirement.clone(),
                    FailureKind::Cyclic,
                )),
                true,
            );
        }

        // Raw market data beats any derived computation path.
        if self.availability.is_available(requirement) {
            let spec = ValueSpecification::market_data(
                requirement.value_name().clone(),
                requirement.target().clone(),
                requirement.constraints().clone(),
            );
            self.graph.add_market_data(spec.clone());
            debug!(requirement = %requirement, "satisfied from market data");
            return Resolution::leaf(requirement, Ok(spec), false);
        }

        let key = MemoKey {
            requirement: requirement.clone(),
            exclusion_context: path.exclusion_context(self.exclusions.as_ref()),
        };
        let claim = match self.memo.entry(key.clone()) {
            Entry::Occupied(entry) => Claim::Waiter(entry.get().clone()),
            Entry::Vacant(entry) => {
                let cell = Arc::new(ResolutionCell::in_progress(worker));
                entry.insert(cell.clone());
                Claim::Owner(cell)
            }
        };

        match claim {
            Claim::Waiter(cell) => match self.await_cell(&cell, &key, worker) {
                Some(shared) if self.reusable(&shared, path) => shared,
                // A shared result is declined when it is cycle-tainted or its
                // subtree runs through this branch's ancestors, and a would-be
                // deadlock means nobody can wait any longer. Recompute locally
                // without publishing: the recomputation is pure and node
                // insertion idempotent, so duplicated work cannot diverge.
                _ => self.resolve_candidates(requirement, path, worker),
            },
            Claim::Owner(cell) => {
                let resolution = self.resolve_candidates(requirement, path, worker);
                cell.complete(resolution.clone());
                resolution
            }
        }
    }

    /// Whether a shared resolution is valid on this branch.
    ///
    /// Successes transplant onto any path disjoint from their subtree; cycle
    /// rejections only ever prune candidates, so an untainted failure stays a
    /// failure on every path.
    fn reusable(&self, shared: &Resolution, path: &ResolutionPath) -> bool {
        if shared.tainted {
            return false;
        }
        match &shared.result {
            Err(_) => true,
            Ok(_) => {
                let mut frame = path.head.as_deref();
                while let Some(f) = frame {
                    if shared
                        .visited
                        .contains(&(f.value_name.clone(), f.target.clone()))
                    {
                        return false;
                    }
                    frame = f.parent.as_deref();
                }
                true
            }
        }
    }

    /// Block until another worker publishes the cell, or decide not to wait.
    ///
    /// Returns `None` when waiting is unsafe (a wait-for cycle back to this
    /// worker) or the build is cancelled.
    fn await_cell(
        &self,
        cell: &Arc<ResolutionCell>,
        key: &MemoKey,
        worker: usize,
    ) -> Option<Resolution> {
        // Register before checking so that two workers discovering each
        // other concurrently both see the cycle; at worst both compute.
        self.waiting.insert(worker, key.clone());
        let outcome = {
            let mut state = cell.state.lock();
            loop {
                if let CellState::Done(resolution) = &*state {
                    break Some(resolution.clone());
                }
                if self.cancelled.load(Ordering::SeqCst) {
                    break None;
                }
                if self.wait_would_deadlock(worker, cell) {
                    debug!(worker, "wait-for cycle detected, resolving inline");
                    break None;
                }
                self.done_wait(cell, &mut state);
            }
        };
        self.waiting.remove(&worker);
        outcome
    }

    fn done_wait(&self, cell: &ResolutionCell, state: &mut parking_lot::MutexGuard<'_, CellState>) {
        cell.done.wait_for(state, WAIT_INTERVAL);
    }

    /// Walk the owner → waiting-on chain from a cell; a chain returning to
    /// this worker means blocking would deadlock.
    fn wait_would_deadlock(&self, worker: usize, cell: &ResolutionCell) -> bool {
        let mut current = cell.owner();
        // Chain length is bounded by the worker count; the cap only guards
        // against racing updates.
        for _ in 0..64 {
            if current == worker {
                return true;
            }
            let Some(next_key) = self.waiting.get(&current).map(|k| k.value().clone()) else {
                return false;
            };
            let Some(next_cell) = self.memo.get(&next_key).map(|c| c.value().clone()) else {
                return false;
            };
            if next_cell.try_is_done() {
                return false;
            }
            current = next_cell.owner();
        }
        false
    }

    /// Try each candidate in preference order; the backtracking core.
    fn resolve_candidates(
        &self,
        requirement: &ValueRequirement,
        path: &ResolutionPath,
        worker: usize,
    ) -> Resolution {
        let candidates = self.resolver.resolve(requirement);
        if candidates.is_empty() {
            debug!(requirement = %requirement, "no candidate functions");
            return Resolution::leaf(
                requirement,
                Err(ResolutionFailure::new(
                    requirement.clone(),
                    FailureKind::NoCandidates,
                )),
                false,
            );
        }

        let mut visited = BTreeSet::new();
        visited.insert((
            requirement.value_name().clone(),
            requirement.target().clone(),
        ));
        let mut tainted = false;
        let mut attempts = Vec::new();
        'candidates: for candidate in candidates {
            if self.cancelled.load(Ordering::SeqCst) {
                return Resolution {
                    result: Err(ResolutionFailure::new(
                        requirement.clone(),
                        FailureKind::Cancelled,
                    )),
                    visited: Arc::new(visited),
                    tainted: true,
                };
            }

            let Some(declared) = candidate
                .outputs(requirement.target())
                .into_iter()
                .find(|spec| {
                    spec.value_name() == requirement.value_name()
                        && requirement.constraints().is_satisfied_by(spec.properties())
                })
            else {
                attempts.push(CandidateAttempt {
                    function: candidate.id().clone(),
                    rejection: Rejection::NoMatchingOutput,
                });
                continue;
            };
            let resolved = declared.compose(requirement.constraints());

            if let Some(conflicting) =
                self.excluded_on_path(candidate.id(), requirement.target(), path)
            {
                debug!(
                    requirement = %requirement,
                    function = %candidate.id(),
                    against = %conflicting,
                    "rejected: exclusion group conflict"
                );
                attempts.push(CandidateAttempt {
                    function: candidate.id().clone(),
                    rejection: Rejection::Excluded { conflicting },
                });
                continue;
            }

            let child_path = path.push(
                requirement.value_name().clone(),
                requirement.target().clone(),
                candidate.id().clone(),
            );
            let inputs = candidate.inputs(requirement.target(), &resolved);

            // Offer the sibling inputs to idle workers while this one
            // resolves them in order.
            for input in inputs.iter().skip(1) {
                self.schedule_subtask(input, &child_path);
            }

            let mut input_specs = Vec::with_capacity(inputs.len());
            for input in &inputs {
                let resolution = self.resolve(input, &child_path, worker);
                visited.extend(resolution.visited.iter().cloned());
                tainted |= resolution.tainted;
                match resolution.result {
                    Ok(spec) => input_specs.push(spec),
                    Err(cause) => {
                        debug!(
                            requirement = %requirement,
                            function = %candidate.id(),
                            input = %input,
                            "rejected: unresolved input"
                        );
                        attempts.push(CandidateAttempt {
                            function: candidate.id().clone(),
                            rejection: Rejection::UnresolvedInput {
                                input: input.clone(),
                                cause: Box::new(cause),
                            },
                        });
                        continue 'candidates;
                    }
                }
            }

            let outputs: Vec<ValueSpecification> = candidate
                .outputs(requirement.target())
                .into_iter()
                .map(|spec| if spec == declared { resolved.clone() } else { spec })
                .collect();
            let node = self.graph.add_node(
                candidate.id().clone(),
                requirement.target().clone(),
                input_specs,
                outputs,
            );
            self.graph.bind(resolved.clone(), node);
            debug!(
                requirement = %requirement,
                function = %candidate.id(),
                "node committed"
            );
            return Resolution {
                result: Ok(resolved),
                visited: Arc::new(visited),
                tainted,
            };
        }

        Resolution {
            result: Err(ResolutionFailure::new(
                requirement.clone(),
                FailureKind::Exhausted(attempts),
            )),
            visited: Arc::new(visited),
            tainted,
        }
    }

    /// The ancestor function this candidate conflicts with, if any.
    fn excluded_on_path(
        &self,
        function: &FunctionId,
        target: &Target,
        path: &ResolutionPath,
    ) -> Option<FunctionId> {
        let mut frame = path.head.as_deref();
        while let Some(f) = frame {
            if &f.target == target && self.exclusions.excludes(function, &f.function) {
                return Some(f.function.clone());
            }
            frame = f.parent.as_deref();
        }
        None
    }

    fn schedule_subtask(&self, requirement: &ValueRequirement, path: &ResolutionPath) {
        let key = MemoKey {
            requirement: requirement.clone(),
            exclusion_context: path.exclusion_context(self.exclusions.as_ref()),
        };
        if self.memo.contains_key(&key) {
            return;
        }
        self.scheduled.fetch_add(1, Ordering::Relaxed);
        self.queue
            .push(ResolveTask::subtask(requirement.clone(), path.clone()));
    }
}
