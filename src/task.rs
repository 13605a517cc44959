use crate::{
    config::{Config, Dynamic},
    types::{IndexMap, IndexSet, Outcome, TaskName, Value},
};
use anyhow::anyhow;
use derive_more::Debug;

/// Callback of a task: receives the values of its dependencies and returns
/// either its own value or a failure.
pub type Callback<C> = Box<
    dyn Fn(&Dependencies<C>) -> Result<<C as Config>::Output, <C as Config>::Error>
        + Send
        + Sync,
>;

/// A single unit of work in the graph.
///
/// A task is defined once by the caller and may be run any number of times.
/// It holds no per-run state: channels are derived from `dependency_names`
/// anew at the start of every run.
#[derive(Debug)]
pub struct Task<C: Config> {
    dependency_names: IndexSet<TaskName>,
    #[debug(skip)]
    callback: Callback<C>,
}

impl<C: Config> Task<C> {
    /// Creates an immediately runnable task.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Dependencies<C>) -> Result<C::Output, C::Error> + Send + Sync + 'static,
    {
        Self {
            dependency_names: IndexSet::default(),
            callback: Box::new(callback),
        }
    }

    /// Declares a dependency on the task called `name`.
    ///
    /// Declaring the same name twice has no further effect. A task naming
    /// itself is accepted and ignored at wiring time.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<TaskName>) -> Self {
        self.dependency_names.insert(name.into());
        self
    }

    /// Declares dependencies on every task in `names`.
    #[must_use]
    pub fn depends_on_all(mut self, names: impl IntoIterator<Item = impl Into<TaskName>>) -> Self {
        self.dependency_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Names this task waits on, in declaration order.
    pub fn dependency_names(&self) -> impl ExactSizeIterator<Item = &TaskName> {
        self.dependency_names.iter()
    }

    pub(crate) fn call(&self, dependencies: &Dependencies<C>) -> Outcome<C> {
        (self.callback)(dependencies).into()
    }
}

/// Values received from the dependencies of a task, keyed by dependency
/// name in declaration order.
///
/// Only ever handed to a callback when every dependency succeeded.
pub struct Dependencies<C: Config> {
    values: IndexMap<TaskName, Value<C>>,
}

impl<C: Config> Dependencies<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub(crate) fn insert(&mut self, name: TaskName, value: Value<C>) {
        self.values.insert(name, value);
    }

    /// Value produced by dependency `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&C::Output> {
        self.values.get(name).map(AsRef::as_ref)
    }

    /// Shared handle to the value produced by dependency `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value<C>> {
        self.values.get(name)
    }

    /// `true` if dependency `name` delivered a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over `(dependency name, value)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&TaskName, &C::Output)> {
        self.values.iter().map(|(name, value)| (name, value.as_ref()))
    }

    /// Number of received dependency values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` for a task without (wired) dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Dependencies<Dynamic> {
    /// Value of dependency `name`, downcast to `T`.
    ///
    /// # Errors
    /// If the dependency delivered no value or a value of another type.
    pub fn downcast<T: 'static>(&self, name: &str) -> anyhow::Result<&T> {
        self.get(name)
            .ok_or_else(|| anyhow!("dependency '{name}' delivered no value"))?
            .downcast_ref::<T>()
            .ok_or_else(|| {
                anyhow!(
                    "dependency '{name}' is not of type {}",
                    core::any::type_name::<T>()
                )
            })
    }
}

impl<C: Config> core::fmt::Debug for Dependencies<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
