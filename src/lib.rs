//! Concurrent execution of named, interdependent tasks wired by channels.
//!
//! This crate runs a set of named tasks in parallel while respecting the
//! dependencies they declare. It:
//! - Validates the graph upfront: every dependency must name an existing
//!   task and the dependencies must be acyclic.
//! - Derives one single-slot channel per dependency edge, so a producer can
//!   publish its outcome and exit without waiting for the consumer.
//! - Spawns one thread per task. Each thread blocks on its inbound channels,
//!   runs its callback, and broadcasts the outcome to every dependent.
//! - Short-circuits on failure: a task whose dependency failed skips its
//!   callback and adopts that failure unchanged, all the way downstream.
//!
//! Key modules:
//! - `config`: binds output and failure types via the `Config` trait, and
//!   holds the runtime `Settings`.
//! - `task`: defines `Task` (callback plus dependency names) and the
//!   `Dependencies` handed to a callback.
//! - `graph`: the named task collection and its blocking `run`.
//! - `executor`: graph validation and wiring (`setup`), then threaded
//!   execution and outcome collection (`execute`).
//! - `report`: the per-task results and errors of a finished run.
//! - `types`: task names, the tagged `Outcome`, and map aliases.
//!
//! Quick start:
//! 1. Implement `Config` with your output and error types, or use
//!    `Dynamic` for heterogeneous outputs.
//! 2. Build a `Graph`, adding each `Task` under a unique name and declaring
//!    its dependencies with `Task::depends_on`.
//! 3. Call `Graph::run` and inspect the returned `Report`.
//!
//! ```
//! use channeler::{config::Config, graph::Graph, task::Task};
//!
//! struct Numbers;
//!
//! impl Config for Numbers {
//!     type Output = u32;
//!     type Error = String;
//! }
//!
//! let graph = Graph::<Numbers>::new()
//!     .task("a", Task::new(|_| Ok(1)))
//!     .task("b", Task::new(|_| Ok(2)))
//!     .task(
//!         "sum",
//!         Task::new(|deps| Ok(deps.iter().map(|(_, value)| *value).sum()))
//!             .depends_on_all(["a", "b"]),
//!     );
//!
//! let report = graph.run().expect("graph is valid");
//! assert_eq!(report.result("sum").map(|value| **value), Some(3));
//! assert!(report.error("sum").is_none());
//! ```

/// Public interface to configure a graph.
///
/// Exposes the `Config` trait which binds the output and failure types of
/// every task, the type-erased `Dynamic` config, and the runtime `Settings`.
pub mod config;
/// Validation, channel wiring and threaded execution of a graph.
///
/// `Executor::setup` produces an immutable channel topology; `execute`
/// consumes it, spawning one thread per task and collecting every outcome.
pub mod executor;
/// The task collection run as a whole.
pub mod graph;
/// Outcomes and timings of a finished run.
pub mod report;
/// Task definitions and the dependency values handed to callbacks.
pub mod task;
/// Task names, the tagged success/failure `Outcome`, and map aliases with a
/// fast hasher.
pub mod types;

pub use crate::{
    config::{Config, Dynamic, Settings},
    executor::{Executor, ExecutorError, ExecutorSetupError},
    graph::Graph,
    report::{Report, TaskExecution},
    task::{Dependencies, Task},
    types::{Outcome, TaskName},
};
