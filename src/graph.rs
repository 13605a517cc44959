use crate::{
    config::{Config, Settings},
    executor::{Executor, ExecutorError},
    report::Report,
    task::Task,
    types::{IndexMap, TaskName},
};
use derive_more::Debug;

/// Named collection of tasks, run as a whole.
///
/// The graph only holds definitions. Each call to [`Graph::run`] wires a
/// fresh set of channels, executes every task on its own thread, and tears
/// the wiring down again, so a graph can be run repeatedly and each run
/// yields an independent [`Report`].
#[derive(Debug)]
pub struct Graph<C: Config> {
    tasks: IndexMap<TaskName, Task<C>>,
    settings: Settings,
}

impl<C: Config> Default for Graph<C> {
    fn default() -> Self {
        Self {
            tasks: IndexMap::default(),
            settings: Settings::default(),
        }
    }
}

impl<C: Config> Graph<C> {
    /// Creates an empty graph with default [`Settings`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the settings used by subsequent runs.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds a task, builder style. A task already registered under `name`
    /// is replaced.
    #[must_use]
    pub fn task(mut self, name: impl Into<TaskName>, task: Task<C>) -> Self {
        self.insert(name, task);
        self
    }

    /// Adds a task and returns the one previously registered under `name`.
    pub fn insert(&mut self, name: impl Into<TaskName>, task: Task<C>) -> Option<Task<C>> {
        self.tasks.insert(name.into(), task)
    }

    /// Removes and returns the task registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Task<C>> {
        self.tasks.shift_remove(name)
    }

    /// Task registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Task<C>> {
        self.tasks.get(name)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.tasks.get_index_of(name)
    }

    /// Iterates over `(name, task)` pairs in insertion order.
    pub fn tasks(&self) -> impl ExactSizeIterator<Item = (&TaskName, &Task<C>)> {
        self.tasks.iter()
    }

    /// Settings applied to runs of this graph.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` if the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wires, executes and collects the whole graph, blocking until every
    /// task has reached a terminal state.
    ///
    /// # Errors
    /// - [`ExecutorError::Setup`] if a dependency names no task of this
    ///   graph or the dependencies form a cycle. Nothing is executed then.
    /// - [`ExecutorError::Spawn`] if a thread could not be spawned.
    ///
    /// # Panics
    /// If a task callback panics, its payload is resumed here once every
    /// thread of the run has been joined.
    pub fn run(&self) -> Result<Report<C>, ExecutorError> {
        Executor::setup(self)?.execute()
    }
}

impl<C, N> FromIterator<(N, Task<C>)> for Graph<C>
where
    C: Config,
    N: Into<TaskName>,
{
    fn from_iter<I: IntoIterator<Item = (N, Task<C>)>>(iter: I) -> Self {
        let mut graph = Self::default();
        graph.extend(iter);
        graph
    }
}

impl<C, N> Extend<(N, Task<C>)> for Graph<C>
where
    C: Config,
    N: Into<TaskName>,
{
    fn extend<I: IntoIterator<Item = (N, Task<C>)>>(&mut self, iter: I) {
        for (name, task) in iter {
            self.insert(name, task);
        }
    }
}
