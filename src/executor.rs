mod execute;
mod setup;

/// Error returned by `Executor::setup` when the provided task graph is invalid.
pub use crate::executor::setup::ExecutorSetupError;
use crate::{
    config::{Config, Settings},
    executor::{execute::Completion, setup::TaskWiring},
    graph::Graph,
    report::Report,
    task::Task,
    types::TaskName,
};
use crossbeam_channel::{Receiver, Sender};
use derive_more::Debug;
use std::{panic, thread, time::Instant};
use thiserror::Error;
use tracing::{Span, debug, info, info_span, warn};

/// Error returned by [`Graph::run`](crate::graph::Graph::run).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The graph was rejected before anything ran.
    #[error(transparent)]
    Setup(#[from] ExecutorSetupError),
    /// The operating system refused to spawn the thread of a task.
    #[error("failed to spawn the thread of task '{task}'")]
    Spawn {
        /// Task whose thread could not be spawned.
        task: TaskName,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Wiring of one run of a graph.
///
/// Produced by [`Executor::setup`], which validates the graph and derives a
/// dedicated single-slot channel for every dependency edge. The topology is
/// immutable from then on and is consumed by [`Executor::execute`]:
/// - one thread is spawned per task;
/// - each thread waits on its inbound channels, runs the task callback
///   unless a dependency failed, and broadcasts the outcome to every
///   dependent and to the coordinator;
/// - the calling thread drains one outcome per task into a [`Report`].
#[must_use]
#[derive(Debug)]
pub struct Executor<'g, C: Config> {
    units: Vec<Unit<'g, C>>,
    names: Vec<TaskName>,
    completions: Vec<Receiver<Completion<C>>>,
    settings: &'g Settings,
}

/// One task together with the channels it owns for a single run.
#[derive(Debug)]
pub(crate) struct Unit<'g, C: Config> {
    name: &'g TaskName,
    task: &'g Task<C>,
    wiring: TaskWiring<C>,
    completion: Sender<Completion<C>>,
}

impl<'g, C: Config> Executor<'g, C> {
    /// Validate `graph` and wire its channels.
    ///
    /// # Errors
    /// - [`ExecutorSetupError::UnknownDependency`] if a declared dependency
    ///   names no task of the graph;
    /// - [`ExecutorSetupError::Cycle`] if the dependencies form a cycle.
    ///
    /// Self-dependencies are ignored by both checks and never wired.
    pub fn setup(graph: &'g Graph<C>) -> Result<Self, ExecutorSetupError> {
        setup::validate(graph)?;
        let (units, names, completions) = setup::wire(graph)?;
        let result = Self {
            units,
            names,
            completions,
            settings: graph.settings(),
        };
        debug!(
            tasks = result.units.len(),
            edges = result.edges().count(),
            "graph wired"
        );
        Ok(result)
    }

    /// Wired dependency edges as `(producer, consumer)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&TaskName, &TaskName)> {
        self.units.iter().flat_map(|unit| {
            unit.wiring
                .outbound
                .keys()
                .map(move |consumer| (unit.name, consumer))
        })
    }

    /// Number of tasks to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// `true` if there is nothing to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Run every task on its own thread and block until all of them have
    /// reached a terminal state.
    ///
    /// # Errors
    /// [`ExecutorError::Spawn`] if a thread could not be spawned. Tasks
    /// already started still run to completion before this returns; their
    /// outcomes are discarded.
    ///
    /// # Panics
    /// If a task callback panics. Every thread of the run is joined first,
    /// then the payload of the first panicking task in graph order is
    /// resumed here. Dependents of that task terminate without an outcome.
    pub fn execute(self) -> Result<Report<C>, ExecutorError> {
        let Self {
            units,
            names,
            completions,
            settings,
        } = self;
        let span = info_span!("run", tasks = units.len());
        let _guard = span.enter();
        let started = Instant::now();

        let (report, spawn_error, panicked) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(units.len());
            let mut spawn_error = None;
            for unit in units {
                let name = unit.name;
                let mut builder = thread::Builder::new().name(thread_name(settings, name));
                if let Some(bytes) = settings.stack_size {
                    builder = builder.stack_size(bytes);
                }
                let parent = Span::current();
                match builder.spawn_scoped(scope, move || unit.run(&parent)) {
                    Ok(handle) => handles.push((name, handle)),
                    Err(source) => {
                        warn!(task = %name, %source, "failed to spawn task thread");
                        spawn_error = Some(ExecutorError::Spawn {
                            task: name.clone(),
                            source,
                        });
                        break;
                    }
                }
            }
            let report = execute::collect(names, completions);

            // Joined by hand so that the scope does not replace the payload.
            let mut panicked = None;
            for (name, handle) in handles {
                if let Err(payload) = handle.join() {
                    warn!(task = %name, "task panicked");
                    panicked.get_or_insert(payload);
                }
            }
            (report, spawn_error, panicked)
        });

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        if let Some(error) = spawn_error {
            return Err(error);
        }
        let report = report.finish(started.elapsed());
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed = ?report.elapsed(),
            "run complete"
        );
        Ok(report)
    }
}

/// Thread name of task `name`. Interior NUL bytes, which thread names cannot
/// hold, are escaped.
fn thread_name(settings: &Settings, name: &TaskName) -> String {
    format!("{}{name}", settings.thread_name_prefix).replace('\0', "\\0")
}
