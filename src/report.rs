use crate::{
    config::Config,
    types::{Failure, IndexMap, Outcome, TaskName, Value},
};
use derive_more::Debug;
use std::time::Duration;

/// Timing of one task in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskExecution {
    /// Time spent blocked on dependencies.
    pub waited: Duration,
    /// Time spent in the callback, or `None` if it was skipped because a
    /// dependency failed.
    pub ran: Option<Duration>,
}

/// Outcome of every task of a finished run.
///
/// For each task exactly one of [`Report::result`] and [`Report::error`] is
/// `Some`. A task whose dependency failed reports that failure unchanged:
/// the handle is the very one returned by the failing ancestor.
#[derive(Debug)]
pub struct Report<C: Config> {
    outcomes: IndexMap<TaskName, Outcome<C>>,
    executions: IndexMap<TaskName, TaskExecution>,
    elapsed: Duration,
}

impl<C: Config> Report<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: IndexMap::with_capacity_and_hasher(capacity, Default::default()),
            executions: IndexMap::with_capacity_and_hasher(capacity, Default::default()),
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn insert(&mut self, name: TaskName, outcome: Outcome<C>, execution: TaskExecution) {
        self.executions.insert(name.clone(), execution);
        self.outcomes.insert(name, outcome);
    }

    pub(crate) fn finish(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Outcome of task `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&Outcome<C>> {
        self.outcomes.get(name)
    }

    /// Value produced by task `name`; `None` if it failed or is unknown.
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&Value<C>> {
        self.outcome(name).and_then(Outcome::value)
    }

    /// Failure of task `name`; `None` if it succeeded or is unknown.
    #[must_use]
    pub fn error(&self, name: &str) -> Option<&Failure<C>> {
        self.outcome(name).and_then(Outcome::failure)
    }

    /// Timing of task `name`.
    #[must_use]
    pub fn execution(&self, name: &str) -> Option<&TaskExecution> {
        self.executions.get(name)
    }

    /// Results mapping: every task with its value, `None` for failed ones.
    pub fn results(&self) -> impl ExactSizeIterator<Item = (&TaskName, Option<&Value<C>>)> {
        self.outcomes
            .iter()
            .map(|(name, outcome)| (name, outcome.value()))
    }

    /// Errors mapping: every task with its failure, `None` for successful ones.
    pub fn errors(&self) -> impl ExactSizeIterator<Item = (&TaskName, Option<&Failure<C>>)> {
        self.outcomes
            .iter()
            .map(|(name, outcome)| (name, outcome.failure()))
    }

    /// Iterates over `(name, outcome)` pairs in graph order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&TaskName, &Outcome<C>)> {
        self.outcomes.iter()
    }

    /// Number of tasks that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    /// Number of tasks that failed, directly or through a dependency.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failure()).count()
    }

    /// `true` if no task failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Number of tasks in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` for the report of an empty graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Wall-clock duration of the run, from the first spawn to the last
    /// collected outcome.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Consumes the report into its outcomes, in graph order.
    #[must_use]
    pub fn into_outcomes(self) -> IndexMap<TaskName, Outcome<C>> {
        self.outcomes
    }
}
