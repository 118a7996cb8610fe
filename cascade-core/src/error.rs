//! Errors returned by chains and chain builders.

use thiserror::Error;

/// No handler in the chain claimed the event.
///
/// The event is handed back unchanged so the caller can inspect it, retry it
/// against a different chain, or report exactly which variant is missing a
/// handler. The aggregate is never mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no handler claimed event `{kind}`")]
pub struct UnhandledEvent<E> {
    kind: &'static str,
    event: E,
}

impl<E> UnhandledEvent<E> {
    pub(crate) const fn new(kind: &'static str, event: E) -> Self {
        Self { kind, event }
    }

    /// Kind of the unclaimed event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub const fn event(&self) -> &E {
        &self.event
    }

    /// Take back ownership of the unclaimed event.
    #[must_use]
    pub fn into_event(self) -> E {
        self.event
    }
}

/// Replaying a history stopped at an event no handler claimed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("replay stopped at event {position}: {source}")]
pub struct ReplayError<E> {
    position: usize,
    #[source]
    source: UnhandledEvent<E>,
}

impl<E> ReplayError<E> {
    pub(crate) const fn new(position: usize, source: UnhandledEvent<E>) -> Self {
        Self { position, source }
    }

    /// Zero-based index of the unclaimed event within the replayed history.
    /// This is also the number of events applied before replay stopped.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn unhandled(&self) -> &UnhandledEvent<E> {
        &self.source
    }

    #[must_use]
    pub fn into_unhandled(self) -> UnhandledEvent<E> {
        self.source
    }
}

/// Chain assembly rejected the handler list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two handlers declare the same event kind on a chain built with
    /// [`ChainBuilder::exclusive`](crate::chain::ChainBuilder::exclusive).
    #[error(
        "event kind `{kind}` is claimed by both `{first}` (position {first_position}) and \
         `{second}` (position {second_position})"
    )]
    OverlappingClaim {
        kind: &'static str,
        first: String,
        first_position: usize,
        second: String,
        second_position: usize,
    },
    /// Required event kinds that no handler declares.
    #[error("no handler declares event kinds {kinds:?}")]
    Uncovered { kinds: Vec<&'static str> },
}
