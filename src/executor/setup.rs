use crate::{
    config::Config,
    executor::{Unit, execute::Completion},
    graph::Graph,
    types::{IndexMap, Outcome, TaskName},
};
use crossbeam_channel::{Receiver, Sender, bounded};
use derive_more::Debug;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, trace};
use unzip3::Unzip3;

/// Error kind for executor setup failures.
///
/// Setup refuses graphs that could never complete: a dependency on a task
/// that does not exist, or a cycle, would leave some thread waiting forever.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExecutorSetupError {
    /// A task declares a dependency that names no task of the graph.
    #[error("task '{task}' depends on '{dependency}', which is not a task of this graph")]
    UnknownDependency {
        /// Task declaring the dependency.
        task: TaskName,
        /// The unresolved dependency name.
        dependency: TaskName,
    },
    /// The provided dependency graph contains cycle(s).
    #[error("graph contains cycle(s) through tasks {tasks:?}")]
    Cycle {
        /// Tasks that are part of a cycle or depend on one.
        tasks: Vec<TaskName>,
    },
}

/// Channels of one task for one run.
#[derive(Debug)]
pub(crate) struct TaskWiring<C: Config> {
    /// Receiving ends of the edges from each dependency, keyed by the
    /// dependency name in declaration order.
    pub(super) inbound: IndexMap<TaskName, Receiver<Outcome<C>>>,
    /// Sending ends of the edges to each dependent, keyed by dependent name.
    pub(super) outbound: IndexMap<TaskName, Sender<Outcome<C>>>,
}

impl<C: Config> TaskWiring<C> {
    /// Empty channel sets.
    pub(super) fn new() -> Self {
        Self {
            inbound: IndexMap::default(),
            outbound: IndexMap::default(),
        }
    }
}

/// Reject graphs that cannot run to completion.
pub(super) fn validate<C: Config>(graph: &Graph<C>) -> Result<(), ExecutorSetupError> {
    // Phase 1: every declared dependency must resolve.
    for (name, task) in graph.tasks() {
        if let Some(dependency) = task
            .dependency_names()
            .find(|dependency| *dependency != name && graph.get(dependency).is_none())
        {
            return Err(ExecutorSetupError::UnknownDependency {
                task: name.clone(),
                dependency: dependency.clone(),
            });
        }
    }

    // Phase 2: Kahn's ordering. Every task left with unfinished parents once
    // the ready queue runs dry sits on a cycle or downstream of one.
    let mut parents_left: IndexMap<&TaskName, usize> = IndexMap::default();
    let mut children: IndexMap<&TaskName, Vec<&TaskName>> = IndexMap::default();
    for (name, task) in graph.tasks() {
        let mut parents = 0;
        for dependency in task.dependency_names().filter(|dependency| *dependency != name) {
            children.entry(dependency).or_default().push(name);
            parents += 1;
        }
        parents_left.insert(name, parents);
    }

    let mut ready: VecDeque<&TaskName> = parents_left
        .iter()
        .filter(|&(_, &left)| left == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut placed = 0usize;
    while let Some(name) = ready.pop_front() {
        placed += 1;
        for &child in children.get(name).into_iter().flatten() {
            if let Some(left) = parents_left.get_mut(child) {
                *left -= 1;
                if *left == 0 {
                    ready.push_back(child);
                }
            }
        }
    }

    if placed != graph.len() {
        let tasks = parents_left
            .into_iter()
            .filter(|&(_, left)| left > 0)
            .map(|(name, _)| name.clone())
            .collect();
        return Err(ExecutorSetupError::Cycle { tasks });
    }
    Ok(())
}

/// Build the channel topology of a validated graph.
///
/// Returns, aligned by graph order, the units to spawn, their names, and the
/// receiving ends of their completion channels.
#[allow(clippy::type_complexity)]
pub(super) fn wire<C: Config>(
    graph: &Graph<C>,
) -> Result<(Vec<Unit<'_, C>>, Vec<TaskName>, Vec<Receiver<Completion<C>>>), ExecutorSetupError> {
    // Phase 1: fresh, empty channel sets for every task.
    let mut wirings: Vec<TaskWiring<C>> = (0..graph.len()).map(|_| TaskWiring::new()).collect();

    // Phase 2: one single-slot channel per "consumer depends on producer"
    // edge, registered on both ends.
    for (consumer_idx, (consumer, task)) in graph.tasks().enumerate() {
        for producer in task.dependency_names() {
            if producer == consumer {
                debug!(task = %consumer, "ignoring self-dependency");
                continue;
            }
            let producer_idx =
                graph
                    .index_of(producer)
                    .ok_or_else(|| ExecutorSetupError::UnknownDependency {
                        task: consumer.clone(),
                        dependency: producer.clone(),
                    })?;
            let (sender, receiver) = bounded(1);
            wirings[producer_idx]
                .outbound
                .insert(consumer.clone(), sender);
            wirings[consumer_idx]
                .inbound
                .insert(producer.clone(), receiver);
            trace!(%producer, %consumer, "wired dependency channel");
        }
    }

    // Phase 3: a completion channel per task, drained by the coordinator.
    let wired = graph
        .tasks()
        .zip(wirings)
        .map(|((name, task), wiring)| {
            let (completion, receiver) = bounded(1);
            let unit = Unit {
                name,
                task,
                wiring,
                completion,
            };
            (unit, name.clone(), receiver)
        })
        .unzip3();
    Ok(wired)
}
