use crate::Error;

/// Where a computation stands at the moment it is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum State {
    Pending,
    Resolved,
    Rejected,
}

/// Tri-state result of polling a [`Future`](crate::Future).
///
/// `Pending` is a suspension signal, not an error: the caller is expected to
/// poll again on a later turn of the run loop. `Outcome<(), E>` is the
/// value-less form; `()` takes no space so nothing is stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E = Error> {
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    pub fn pending() -> Self {
        Outcome::Pending
    }

    pub fn resolve(value: T) -> Self {
        Outcome::Resolved(value)
    }

    pub fn reject(error: E) -> Self {
        Outcome::Rejected(error)
    }

    pub fn state(&self) -> State {
        match self {
            Outcome::Pending => State::Pending,
            Outcome::Resolved(_) => State::Resolved,
            Outcome::Rejected(_) => State::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Outcome::Resolved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// `true` once the outcome is either resolved or rejected.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// The resolved value, or `None` in any other state.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Resolved(value) => Some(value),
            _ => None,
        }
    }

    /// The rejection error, or `None` in any other state.
    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_error(self) -> Option<E> {
        match self {
            Outcome::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub fn map_err<G, F>(self, f: F) -> Outcome<T, G>
    where
        F: FnOnce(E) -> G,
    {
        match self {
            Outcome::Pending => Outcome::Pending,
            Outcome::Resolved(value) => Outcome::Resolved(value),
            Outcome::Rejected(error) => Outcome::Rejected(f(error)),
        }
    }
}

impl<T, E> Default for Outcome<T, E> {
    fn default() -> Self {
        Outcome::Pending
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Resolved(value),
            Err(error) => Outcome::Rejected(error),
        }
    }
}
