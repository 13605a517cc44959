use std::any::Any;

/// Configuration entry-point for instantiating a graph.
///
/// A concrete `Config` binds the value a task produces on success and the
/// failure it produces otherwise. Every task of one graph shares these types;
/// graphs of heterogeneous work can use [`Dynamic`].
pub trait Config: Sized + 'static {
    /// Value produced by a successful task callback.
    type Output: Send + Sync + 'static;
    /// Failure produced by a task callback and propagated to its dependents.
    type Error: Send + Sync + 'static;
}

/// Type-erased configuration: outputs are `Box<dyn Any>`, failures are
/// [`anyhow::Error`].
///
/// Callbacks recover concrete values with
/// [`Dependencies::downcast`](crate::task::Dependencies::downcast).
#[derive(Debug, Clone, Copy)]
pub struct Dynamic;

impl Config for Dynamic {
    type Output = Box<dyn Any + Send + Sync>;
    type Error = anyhow::Error;
}

/// Runtime knobs applied to the threads spawned for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Prefix of every spawned thread's name; the task name is appended.
    pub thread_name_prefix: String,
    /// Stack size of every spawned thread. `None` keeps the platform default.
    pub stack_size: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thread_name_prefix: "channeler:".to_owned(),
            stack_size: None,
        }
    }
}

impl Settings {
    /// Sets the thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Sets the stack size, in bytes, of every spawned thread.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}
