#![allow(missing_docs)]

mod common;

use channeler::{
    executor::{Executor, ExecutorError, ExecutorSetupError},
    graph::Graph,
    task::Task,
    types::TaskName,
};
use common::{Fruits, Numbers, init_tracing};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

fn names(names: &[&str]) -> Vec<TaskName> {
    names.iter().copied().map(TaskName::from).collect()
}

#[test]
fn unknown_dependency_is_rejected_before_anything_runs() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_task = Arc::clone(&calls);
    let graph = Graph::<Numbers>::new()
        .task(
            "a",
            Task::new(move |_| {
                calls_in_task.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }),
        )
        .task("b", Task::new(|_| Ok(2)).depends_on_all(["a", "missing"]));

    let error = graph.run().expect_err("dependency does not resolve");

    assert!(matches!(
        error,
        ExecutorError::Setup(ExecutorSetupError::UnknownDependency { ref task, ref dependency })
            if task.as_str() == "b" && dependency.as_str() == "missing"
    ));
    assert_eq!(
        error.to_string(),
        "task 'b' depends on 'missing', which is not a task of this graph"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cycle_is_rejected_with_the_tasks_involved() {
    // root -> a -> b -> a, and c hangs off the cycle.
    let graph = Graph::<Numbers>::new()
        .task("root", Task::new(|_| Ok(0)))
        .task("a", Task::new(|_| Ok(1)).depends_on_all(["root", "b"]))
        .task("b", Task::new(|_| Ok(2)).depends_on("a"))
        .task("c", Task::new(|_| Ok(3)).depends_on("b"));

    let error = Executor::setup(&graph).expect_err("graph is cyclic");

    assert_eq!(
        error,
        ExecutorSetupError::Cycle {
            tasks: names(&["a", "b", "c"])
        }
    );
}

#[test]
fn fully_cyclic_graph_is_rejected() {
    let graph = Graph::<Numbers>::new()
        .task("a", Task::new(|_| Ok(1)).depends_on("b"))
        .task("b", Task::new(|_| Ok(2)).depends_on("a"));

    let error = graph.run().expect_err("graph is cyclic");

    assert!(matches!(
        error,
        ExecutorError::Setup(ExecutorSetupError::Cycle { ref tasks }) if tasks.len() == 2
    ));
}

#[test]
fn wiring_has_one_channel_per_dependency_edge() {
    let graph = Graph::<Numbers>::new()
        .task("a", Task::new(|_| Ok(1)))
        .task("b", Task::new(|_| Ok(2)).depends_on_all(["a", "b", "a"]))
        .task("c", Task::new(|_| Ok(3)).depends_on_all(["a", "b"]))
        .task("d", Task::new(|_| Ok(4)));

    let executor = Executor::setup(&graph).expect("graph is valid");

    let mut edges: Vec<(String, String)> = executor
        .edges()
        .map(|(producer, consumer)| (producer.to_string(), consumer.to_string()))
        .collect();
    edges.sort();
    assert_eq!(
        edges,
        [("a", "b"), ("a", "c"), ("b", "c")]
            .map(|(p, c)| (p.to_owned(), c.to_owned()))
    );
    assert_eq!(executor.len(), 4);

    let report = executor.execute().expect("threads spawn");
    assert_eq!(report.succeeded(), 4);
}

#[test]
fn wiring_is_rebuilt_for_every_setup() {
    let graph = Graph::<Numbers>::new()
        .task("a", Task::new(|_| Ok(1)))
        .task("b", Task::new(|_| Ok(2)).depends_on("a"));

    let first = Executor::setup(&graph).expect("graph is valid");
    let second = Executor::setup(&graph).expect("graph is valid");

    assert_eq!(first.edges().count(), 1);
    assert_eq!(second.edges().count(), 1);
    // Running one topology leaves the other untouched.
    assert_eq!(second.execute().expect("threads spawn").result("b").map(|v| **v), Some(2));
    assert_eq!(first.execute().expect("threads spawn").result("b").map(|v| **v), Some(2));
}

#[test]
fn empty_graph_has_no_units() {
    let graph = Graph::<Numbers>::new();

    let executor = Executor::setup(&graph).expect("empty graph is valid");

    assert!(executor.is_empty());
    assert_eq!(executor.edges().count(), 0);
}

#[test]
fn task_names_with_nul_bytes_are_accepted() {
    let graph = Graph::<Fruits>::new()
        .task(
            "red\0apple",
            Task::new(|_| Ok(thread::current().name().unwrap_or_default().to_owned())),
        )
        .task(
            "cherry",
            Task::new(|deps| {
                let apple = deps.get("red\0apple").map_or("", String::as_str);
                Ok(format!("after {apple}"))
            })
            .depends_on("red\0apple"),
        );

    let report = graph.run().expect("any task name is valid");

    assert_eq!(
        report.result("red\0apple").map(|v| v.as_str()),
        Some("channeler:red\\0apple")
    );
    assert_eq!(
        report.result("cherry").map(|v| v.as_str()),
        Some("after channeler:red\\0apple")
    );
}
