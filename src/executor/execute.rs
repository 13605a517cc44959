use crate::{
    config::Config,
    executor::{Unit, setup::TaskWiring},
    report::{Report, TaskExecution},
    task::Dependencies,
    types::{Failure, Outcome, TaskName},
};
use crossbeam_channel::Receiver;
use std::time::Instant;
use tracing::{Span, debug, debug_span, trace, warn};

/// What a unit reports to the coordinator when it terminates.
pub(crate) struct Completion<C: Config> {
    pub(crate) outcome: Outcome<C>,
    pub(crate) execution: TaskExecution,
}

/// Result of waiting on all inbound channels of a task.
enum Received<C: Config> {
    /// Every dependency succeeded.
    Values(Dependencies<C>),
    /// `dependency` failed; the remaining inbound channels were not read.
    Failed {
        dependency: TaskName,
        failure: Failure<C>,
    },
    /// `dependency` terminated without publishing an outcome.
    Disconnected { dependency: TaskName },
}

impl<C: Config> TaskWiring<C> {
    /// Receive one outcome per inbound channel, in declaration order.
    ///
    /// Stops at the first failure, so with several failing dependencies the
    /// adopted failure is the one of the earliest declared.
    fn receive(&self) -> Received<C> {
        let mut dependencies = Dependencies::with_capacity(self.inbound.len());
        for (dependency, receiver) in &self.inbound {
            trace!(%dependency, "waiting on dependency");
            match receiver.recv() {
                Ok(Outcome::Success(value)) => dependencies.insert(dependency.clone(), value),
                Ok(Outcome::Failure(failure)) => {
                    return Received::Failed {
                        dependency: dependency.clone(),
                        failure,
                    };
                }
                Err(_) => {
                    return Received::Disconnected {
                        dependency: dependency.clone(),
                    };
                }
            }
        }
        Received::Values(dependencies)
    }

    /// Send `outcome` to every dependent. No-op without dependents.
    ///
    /// Never blocks: every outbound channel has a free slot and receives
    /// exactly this one value per run.
    fn propagate(&self, outcome: &Outcome<C>) {
        for (dependent, sender) in &self.outbound {
            if sender.send(outcome.clone()).is_err() {
                // The dependent stopped at an earlier failure and dropped its end.
                trace!(%dependent, "dependent no longer listening");
            } else {
                trace!(%dependent, success = outcome.is_success(), "outcome sent");
            }
        }
    }

    /// Close every channel of this task. Values already sent stay readable
    /// by their receivers.
    fn close(self) {
        let Self { inbound, outbound } = self;
        trace!(
            inbound = inbound.len(),
            outbound = outbound.len(),
            "closing channels"
        );
        drop(inbound);
        drop(outbound);
    }
}

impl<C: Config> Unit<'_, C> {
    /// Per-task protocol: wait on dependencies, run the callback unless one
    /// of them failed, publish the outcome to dependents and then to the
    /// coordinator.
    pub(super) fn run(self, parent: &Span) {
        let Self {
            name,
            task,
            wiring,
            completion,
        } = self;
        let span = debug_span!(parent: parent, "task", task = %name);
        let _guard = span.enter();

        let started = Instant::now();
        let received = wiring.receive();
        let waited = started.elapsed();

        let (outcome, ran) = match received {
            Received::Values(dependencies) => {
                debug!(dependencies = dependencies.len(), "running callback");
                let started = Instant::now();
                let outcome = task.call(&dependencies);
                (outcome, Some(started.elapsed()))
            }
            Received::Failed {
                dependency,
                failure,
            } => {
                debug!(%dependency, "dependency failed, skipping callback");
                (Outcome::Failure(failure), None)
            }
            Received::Disconnected { dependency } => {
                warn!(%dependency, "dependency terminated without an outcome");
                return;
            }
        };
        debug!(success = outcome.is_success(), "task completed");

        wiring.propagate(&outcome);
        let completion_sent = completion
            .send(Completion {
                outcome,
                execution: TaskExecution { waited, ran },
            })
            .is_ok();
        if !completion_sent {
            warn!("coordinator no longer listening");
        }
        wiring.close();
    }
}

/// Drain exactly one completion per task, in graph order.
///
/// Receivers are dropped on return, closing every completion channel.
pub(super) fn collect<C: Config>(
    names: Vec<TaskName>,
    completions: Vec<Receiver<Completion<C>>>,
) -> Report<C> {
    let mut report = Report::with_capacity(names.len());
    for (name, completion) in names.into_iter().zip(completions) {
        match completion.recv() {
            Ok(Completion { outcome, execution }) => {
                trace!(task = %name, success = outcome.is_success(), "outcome collected");
                report.insert(name, outcome, execution);
            }
            Err(_) => warn!(task = %name, "task terminated without an outcome"),
        }
    }
    report
}
