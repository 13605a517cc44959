use crate::config::Config;
use core::{borrow::Borrow, fmt};
use derive_more::{Deref, Display};
use indexmap::{IndexMap as _IndexMap, IndexSet as _IndexSet};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Unique name of a task within one graph.
///
/// Cheap to clone; borrows as `str` so maps keyed by it can be queried with
/// plain string slices.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Deref)]
#[display("{_0}")]
pub struct TaskName(Arc<str>);

impl TaskName {
    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Borrow<str> for TaskName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for TaskName {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl From<&TaskName> for TaskName {
    fn from(name: &TaskName) -> Self {
        name.clone()
    }
}

/// Shared handle to a value produced by a successful task.
pub type Value<C> = Arc<<C as Config>::Output>;
/// Shared handle to a failure produced by a task.
///
/// Dependents receive a clone of the handle, so every task downstream of a
/// failure holds the very same allocation.
pub type Failure<C> = Arc<<C as Config>::Error>;

/// Terminal state of one task in one run.
pub enum Outcome<C: Config> {
    /// The callback ran and returned a value.
    Success(Value<C>),
    /// The callback returned a failure, or a dependency failed and the
    /// callback was skipped.
    Failure(Failure<C>),
}

impl<C: Config> Outcome<C> {
    /// `true` for [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` for [`Outcome::Failure`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The produced value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value<C>> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure<C>> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Converts into a standard `Result`.
    ///
    /// # Errors
    /// Returns the failure handle for [`Outcome::Failure`].
    pub fn into_result(self) -> Result<Value<C>, Failure<C>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<C: Config> From<Result<C::Output, C::Error>> for Outcome<C> {
    fn from(result: Result<C::Output, C::Error>) -> Self {
        match result {
            Ok(value) => Self::Success(Arc::new(value)),
            Err(failure) => Self::Failure(Arc::new(failure)),
        }
    }
}

impl<C: Config> Clone for Outcome<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Success(value) => Self::Success(Arc::clone(value)),
            Self::Failure(failure) => Self::Failure(Arc::clone(failure)),
        }
    }
}

impl<C: Config> fmt::Debug for Outcome<C>
where
    C::Output: fmt::Debug,
    C::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => f.debug_tuple("Success").field(value).finish(),
            Self::Failure(failure) => f.debug_tuple("Failure").field(failure).finish(),
        }
    }
}

/// `IndexMap` type with fast hasher.
pub type IndexMap<K, V> = _IndexMap<K, V, FxBuildHasher>;
/// `IndexSet` type with fast hasher.
pub type IndexSet<T> = _IndexSet<T, FxBuildHasher>;
