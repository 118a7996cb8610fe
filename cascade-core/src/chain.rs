//! Ordered event dispatch.
//!
//! A [`Chain`] owns an ordered list of handlers for one aggregate type. Each
//! dispatch walks the list from the front and stops at the first handler
//! that claims the event, so at most one handler runs per event and earlier
//! handlers take priority when two could claim the same one. Running off the
//! end of the list is an error that hands the event back to the caller.
//!
//! Chains are assembled once with [`ChainBuilder`] and are immutable
//! afterwards. They hold no per-call state and are `Send + Sync`, so a
//! single chain can serve every instance of its aggregate from many threads.
//!
//! # Example
//!
//! ```
//! use cascade_core::{aggregate::Aggregate, chain::Chain, event::EventKind};
//!
//! #[derive(Debug, PartialEq)]
//! enum LampEvent {
//!     SwitchedOn,
//!     Unplugged,
//! }
//!
//! impl EventKind for LampEvent {
//!     fn kind(&self) -> &'static str {
//!         match self {
//!             Self::SwitchedOn => "lamp.switched-on",
//!             Self::Unplugged => "lamp.unplugged",
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Lamp {
//!     lit: bool,
//! }
//!
//! impl Aggregate for Lamp {
//!     const KIND: &'static str = "lamp";
//!     type Event = LampEvent;
//! }
//!
//! let chain = Chain::<Lamp>::builder()
//!     .from_fn("switch-on", |lamp: &mut Lamp, event: &LampEvent| {
//!         if *event != LampEvent::SwitchedOn {
//!             return false;
//!         }
//!         lamp.lit = true;
//!         true
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut lamp = Lamp::default();
//! chain.dispatch(&mut lamp, LampEvent::SwitchedOn).unwrap();
//! assert!(lamp.lit);
//!
//! let err = chain.dispatch(&mut lamp, LampEvent::Unplugged).unwrap_err();
//! assert_eq!(err.kind(), "lamp.unplugged");
//! ```

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::{
    aggregate::{Aggregate, Apply},
    error::{BuildError, ReplayError, UnhandledEvent},
    event::{DomainEvent, EventKind},
    handler::{self, TryApply},
};

type BoxedHandler<A> = Box<dyn TryApply<A>>;

/// Outcome of walking a chain by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Dispatch {
    /// The handler at `position` claimed and applied the event.
    Applied { position: usize },
    /// Every handler declined; the aggregate is unchanged.
    Unhandled,
}

impl Dispatch {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Which handler claimed a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied<'a> {
    /// Zero-based position of the handler in the chain.
    pub position: usize,
    /// The handler's [`TryApply::name`].
    pub handler: &'a str,
}

/// Ordered, immutable list of handlers for aggregate `A`.
pub struct Chain<A: Aggregate> {
    handlers: Vec<BoxedHandler<A>>,
}

impl<A: Aggregate + 'static> Chain<A> {
    #[must_use]
    pub fn builder() -> ChainBuilder<A> {
        ChainBuilder::new()
    }
}

impl<A: Aggregate> Chain<A> {
    /// Walk the chain and apply `event` with the first handler that claims
    /// it.
    ///
    /// This is the borrowing form of [`Chain::dispatch`] for callers that
    /// want to treat an unclaimed event as an ordinary outcome.
    pub fn apply(&self, aggregate: &mut A, event: &A::Event) -> Dispatch {
        for (position, handler) in self.handlers.iter().enumerate() {
            if handler.try_apply(aggregate, event) {
                tracing::trace!(
                    aggregate = A::KIND,
                    kind = event.kind(),
                    position,
                    handler = handler.name(),
                    "event applied"
                );
                return Dispatch::Applied { position };
            }
        }
        Dispatch::Unhandled
    }

    /// Apply `event` to `aggregate` through the first handler that claims it.
    ///
    /// No handler after the claiming one is invoked.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledEvent`] carrying `event` when every handler
    /// declines. The aggregate is unchanged in that case.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(aggregate = A::KIND, kind = event.kind())
    )]
    pub fn dispatch(
        &self,
        aggregate: &mut A,
        event: A::Event,
    ) -> Result<Applied<'_>, UnhandledEvent<A::Event>> {
        match self.apply(aggregate, &event) {
            Dispatch::Applied { position } => Ok(Applied {
                position,
                handler: self.handlers[position].name(),
            }),
            Dispatch::Unhandled => Err(UnhandledEvent::new(event.kind(), event)),
        }
    }

    /// Dispatch a history of events in order.
    ///
    /// Returns the number of events applied.
    ///
    /// # Errors
    ///
    /// Stops at the first event no handler claims. The returned
    /// [`ReplayError`] carries that event and its index; the events before
    /// it stay applied and the rest of the history is not consumed.
    #[tracing::instrument(level = "trace", skip_all, fields(aggregate = A::KIND))]
    pub fn replay<I>(&self, aggregate: &mut A, events: I) -> Result<usize, ReplayError<A::Event>>
    where
        I: IntoIterator<Item = A::Event>,
    {
        let mut applied = 0;
        for event in events {
            self.dispatch(aggregate, event)
                .map_err(|unhandled| ReplayError::new(applied, unhandled))?;
            applied += 1;
        }
        tracing::trace!(aggregate = A::KIND, applied, "replay complete");
        Ok(applied)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in dispatch order.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|handler| handler.name())
    }

    /// Whether some handler declares `kind`.
    ///
    /// Opaque handlers (see [`TryApply::kinds`]) are not counted.
    #[must_use]
    pub fn covers(&self, kind: &str) -> bool {
        self.handlers
            .iter()
            .filter_map(|handler| handler.kinds())
            .any(|kinds| kinds.iter().any(|declared| *declared == kind))
    }

    /// The subset of `kinds` that no handler declares, in input order.
    #[must_use]
    pub fn uncovered(&self, kinds: &[&'static str]) -> Vec<&'static str> {
        kinds
            .iter()
            .copied()
            .filter(|kind| !self.covers(kind))
            .collect()
    }

    /// Describe the chain's topology.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest {
            aggregate: A::KIND,
            handlers: self
                .handlers
                .iter()
                .enumerate()
                .map(|(position, handler)| HandlerEntry {
                    position,
                    name: handler.name().to_string(),
                    kinds: handler.kinds().map(<[_]>::to_vec),
                })
                .collect(),
        }
    }
}

impl<A: Aggregate> fmt::Debug for Chain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("aggregate", &A::KIND)
            .field("handlers", &self.handler_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Serializable description of a chain, for diagnostics and docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub aggregate: &'static str,
    pub handlers: Vec<HandlerEntry>,
}

/// One handler in a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerEntry {
    pub position: usize,
    pub name: String,
    /// Declared kinds; `None` for opaque handlers.
    pub kinds: Option<Vec<&'static str>>,
}

/// Assembles a [`Chain`] in a fixed order.
///
/// Handlers are tried in the order they are added. By default two handlers
/// may claim the same kind and the earlier one wins; call
/// [`exclusive`](Self::exclusive) to reject that at build time. Call
/// [`require`](Self::require) to check that every listed kind has a
/// declared handler.
pub struct ChainBuilder<A: Aggregate> {
    handlers: Vec<BoxedHandler<A>>,
    exclusive: bool,
    required: Vec<&'static str>,
}

impl<A: Aggregate + 'static> ChainBuilder<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            exclusive: false,
            required: Vec::new(),
        }
    }

    /// Append a handler.
    #[must_use]
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: TryApply<A> + 'static,
    {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append a [`Variant`](handler::Variant) handler for payload `V`.
    #[must_use]
    pub fn on<V>(self, extract: fn(&A::Event) -> Option<&V>) -> Self
    where
        A: Apply<V>,
        V: DomainEvent + 'static,
    {
        self.handler(handler::on::<A, V>(extract))
    }

    /// Append a closure handler. See [`handler::from_fn`].
    #[must_use]
    pub fn from_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut A, &A::Event) -> bool + Send + Sync + 'static,
    {
        self.handler(handler::from_fn::<A, F>(name, f))
    }

    /// Reject chains where two handlers declare the same event kind.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Require every kind in `kinds` to be declared by some handler.
    ///
    /// May be called more than once; the requirements accumulate and each
    /// kind is kept once, in first-seen order.
    #[must_use]
    pub fn require(mut self, kinds: &[&'static str]) -> Self {
        for &kind in kinds {
            if !self.required.contains(&kind) {
                self.required.push(kind);
            }
        }
        self
    }

    /// Validate and freeze the chain.
    ///
    /// # Errors
    ///
    /// - [`BuildError::OverlappingClaim`] if the builder is
    ///   [`exclusive`](Self::exclusive) and two handlers declare one kind.
    /// - [`BuildError::Uncovered`] if a [`require`](Self::require)d kind has
    ///   no declaring handler.
    pub fn build(self) -> Result<Chain<A>, BuildError> {
        if self.exclusive {
            self.check_exclusive()?;
        }

        let chain = Chain {
            handlers: self.handlers,
        };

        let missing = chain.uncovered(&self.required);
        if !missing.is_empty() {
            return Err(BuildError::Uncovered { kinds: missing });
        }

        tracing::debug!(
            aggregate = A::KIND,
            handlers = chain.len(),
            exclusive = self.exclusive,
            required = self.required.len(),
            "chain built"
        );
        Ok(chain)
    }

    fn check_exclusive(&self) -> Result<(), BuildError> {
        let mut claimed: HashMap<&'static str, usize> = HashMap::new();
        for (position, handler) in self.handlers.iter().enumerate() {
            for &kind in handler.kinds().unwrap_or_default() {
                if let Some(&first_position) = claimed.get(kind) {
                    if first_position == position {
                        continue;
                    }
                    return Err(BuildError::OverlappingClaim {
                        kind,
                        first: self.handlers[first_position].name().to_string(),
                        first_position,
                        second: handler.name().to_string(),
                        second_position: position,
                    });
                }
                claimed.insert(kind, position);
            }
        }
        Ok(())
    }
}

impl<A: Aggregate + 'static> Default for ChainBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
