//! Pluggable work-lists feeding the graph-building workers.
//!
//! One contract, three strategies:
//!
//! - [`OrderedRunQueue`]: strict FIFO under a single lock, for debugging and
//!   reproducible construction order
//! - [`ConcurrentLinkedQueue`]: lock-free MPMC FIFO, the default
//! - [`ConcurrentStack`]: LIFO, completing a branch depth-first before
//!   starting siblings to reduce peak in-flight state
//!
//! The builder never depends on which strategy is plugged in; graph content
//! is identical across all three.

use std::collections::VecDeque;

use crossbeam::queue::SegQueue;
use parking_lot::Mutex;

use lattice_traits::config::QueueStrategy;

use crate::builder::ResolveTask;

/// A work-list of pending resolution tasks.
pub trait RunQueue: Send + Sync {
    /// Add a task.
    fn push(&self, task: ResolveTask);

    /// Take the next task, or `None` if the queue is currently empty.
    fn pop(&self) -> Option<ResolveTask>;

    /// Whether the queue is currently empty.
    fn is_empty(&self) -> bool;

    /// Number of tasks currently queued.
    fn len(&self) -> usize;
}

/// Create the run queue for a strategy.
pub fn create_run_queue(strategy: QueueStrategy) -> Box<dyn RunQueue> {
    match strategy {
        QueueStrategy::Ordered => Box::new(OrderedRunQueue::new()),
        QueueStrategy::ConcurrentQueue => Box::new(ConcurrentLinkedQueue::new()),
        QueueStrategy::ConcurrentStack => Box::new(ConcurrentStack::new()),
    }
}

/// Strict FIFO queue guarded by one lock.
pub struct OrderedRunQueue {
    queue: Mutex<VecDeque<ResolveTask>>,
}

impl OrderedRunQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for OrderedRunQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RunQueue for OrderedRunQueue {
    fn push(&self, task: ResolveTask) {
        self.queue.lock().push_back(task);
    }

    fn pop(&self) -> Option<ResolveTask> {
        self.queue.lock().pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

/// Lock-free multi-producer/multi-consumer FIFO.
pub struct ConcurrentLinkedQueue {
    queue: SegQueue<ResolveTask>,
}

impl ConcurrentLinkedQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }
}

impl Default for ConcurrentLinkedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RunQueue for ConcurrentLinkedQueue {
    fn push(&self, task: ResolveTask) {
        self.queue.push(task);
    }

    fn pop(&self) -> Option<ResolveTask> {
        self.queue.pop()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// LIFO stack; the most recently scheduled task runs first.
pub struct ConcurrentStack {
    stack: Mutex<Vec<ResolveTask>>,
}

impl ConcurrentStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            stack: Mutex::new(Vec::new()),
        }
    }
}

impl Default for ConcurrentStack {
    fn default() -> Self {
        Self::new()
    }
}

impl RunQueue for ConcurrentStack {
    fn push(&self, task: ResolveTask) {
        self.stack.lock().push(task);
    }

    fn pop(&self) -> Option<ResolveTask> {
        self.stack.lock().pop()
    }

    fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }

    fn len(&self) -> usize {
        self.stack.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Target, ValueRequirement};

    fn task(name: &str) -> ResolveTask {
        ResolveTask::terminal(ValueRequirement::new(name, Target::security("42")))
    }

    fn names(queue: &dyn RunQueue) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(task) = queue.pop() {
            out.push(task.requirement().value_name().as_str().to_string());
        }
        out
    }

    #[test]
    fn ordered_queue_is_fifo() {
        let queue = OrderedRunQueue::new();
        queue.push(task("a"));
        queue.push(task("b"));
        queue.push(task("c"));
        assert_eq!(queue.len(), 3);
        assert_eq!(names(&queue), ["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn concurrent_queue_is_fifo() {
        let queue = ConcurrentLinkedQueue::new();
        queue.push(task("a"));
        queue.push(task("b"));
        assert_eq!(names(&queue), ["a", "b"]);
    }

    #[test]
    fn concurrent_stack_is_lifo() {
        let queue = ConcurrentStack::new();
        queue.push(task("a"));
        queue.push(task("b"));
        queue.push(task("c"));
        assert_eq!(names(&queue), ["c", "b", "a"]);
    }

    #[test]
    fn factory_honours_strategy() {
        let queue = create_run_queue(QueueStrategy::ConcurrentStack);
        queue.push(task("a"));
        queue.push(task("b"));
        assert_eq!(names(queue.as_ref()), ["b", "a"]);
    }
}
