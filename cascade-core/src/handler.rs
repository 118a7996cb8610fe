//! Handler nodes.
//!
//! A handler recognises some subset of an aggregate's events and applies
//! them. [`TryApply`] is the capability every node implements; the chain owns
//! the walk, so a handler only answers "did I take this one?".
//!
//! Two ready-made nodes cover most aggregates:
//!
//! - [`Variant`] extracts one payload type from the event and forwards it to
//!   the aggregate's [`Apply`] impl.
//! - [`FnHandler`] wraps a closure for anything that does not fit a single
//!   payload, such as a catch-all or a guard spanning several variants.

use std::{fmt, marker::PhantomData};

use crate::{
    aggregate::{Aggregate, Apply},
    event::DomainEvent,
};

/// One node in a dispatch chain.
///
/// # Contract
///
/// `try_apply` returns `true` only after it has applied the event. When it
/// returns `false` the aggregate must be exactly as it was on entry: later
/// handlers run against it assuming nothing happened. Recognise first, then
/// mutate.
// ANCHOR: try_apply_trait
pub trait TryApply<A: Aggregate>: Send + Sync {
    /// Apply `event` to `aggregate` if this handler recognises it.
    fn try_apply(&self, aggregate: &mut A, event: &A::Event) -> bool;

    /// Name used in logs, build errors and manifests.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Event kinds this handler declares it claims.
    ///
    /// `None` means the handler is opaque: it still runs, but chain coverage
    /// and overlap checks cannot see what it handles.
    fn kinds(&self) -> Option<&[&'static str]> {
        None
    }
}
// ANCHOR_END: try_apply_trait

/// Applies one payload type through the aggregate's [`Apply`] impl.
///
/// The extractor picks the payload out of the aggregate's event type. If it
/// returns `None` the handler declines without touching the aggregate.
pub struct Variant<A: Aggregate, V> {
    extract: fn(&A::Event) -> Option<&V>,
    kinds: [&'static str; 1],
    _phantom: PhantomData<fn() -> A>,
}

impl<A: Aggregate, V> Variant<A, V> {
    /// Build a handler for a payload under an explicit kind.
    ///
    /// Prefer [`on`] when the payload implements [`DomainEvent`].
    #[must_use]
    pub fn with_kind(kind: &'static str, extract: fn(&A::Event) -> Option<&V>) -> Self {
        Self {
            extract,
            kinds: [kind],
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kinds[0]
    }
}

impl<A, V> TryApply<A> for Variant<A, V>
where
    A: Aggregate + Apply<V>,
{
    fn try_apply(&self, aggregate: &mut A, event: &A::Event) -> bool {
        let Some(payload) = (self.extract)(event) else {
            return false;
        };
        aggregate.apply(payload);
        true
    }

    fn name(&self) -> &str {
        self.kinds[0]
    }

    fn kinds(&self) -> Option<&[&'static str]> {
        Some(&self.kinds)
    }
}

impl<A: Aggregate, V> fmt::Debug for Variant<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("aggregate", &A::KIND)
            .field("kind", &self.kinds[0])
            .finish_non_exhaustive()
    }
}

/// Handler for payload `V`, declared under `V::KIND`.
///
/// ```ignore
/// impl OrderEvent {
///     fn as_placed(&self) -> Option<&OrderPlaced> {
///         match self {
///             Self::Placed(e) => Some(e),
///             _ => None,
///         }
///     }
/// }
///
/// let placed = handler::on::<Order, OrderPlaced>(OrderEvent::as_placed);
/// ```
#[must_use]
pub fn on<A, V>(extract: fn(&A::Event) -> Option<&V>) -> Variant<A, V>
where
    A: Aggregate,
    V: DomainEvent,
{
    Variant::with_kind(V::KIND, extract)
}

/// Closure-backed handler.
///
/// The closure has the same contract as [`TryApply::try_apply`]: return
/// `false` without mutating when the event is not one it handles.
pub struct FnHandler<F> {
    name: String,
    kinds: Option<Vec<&'static str>>,
    f: F,
}

impl<F> FnHandler<F> {
    /// Declare the event kinds this closure claims so coverage and overlap
    /// checks can account for it.
    #[must_use]
    pub fn claiming(mut self, kinds: &[&'static str]) -> Self {
        self.kinds = Some(kinds.to_vec());
        self
    }
}

impl<A, F> TryApply<A> for FnHandler<F>
where
    A: Aggregate,
    F: Fn(&mut A, &A::Event) -> bool + Send + Sync,
{
    fn try_apply(&self, aggregate: &mut A, event: &A::Event) -> bool {
        (self.f)(aggregate, event)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kinds(&self) -> Option<&[&'static str]> {
        self.kinds.as_deref()
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a named handler.
#[must_use]
pub fn from_fn<A, F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    A: Aggregate,
    F: Fn(&mut A, &A::Event) -> bool + Send + Sync,
{
    FnHandler {
        name: name.into(),
        kinds: None,
        f,
    }
}

impl<A, H> TryApply<A> for Box<H>
where
    A: Aggregate,
    H: TryApply<A> + ?Sized,
{
    fn try_apply(&self, aggregate: &mut A, event: &A::Event) -> bool {
        (**self).try_apply(aggregate, event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn kinds(&self) -> Option<&[&'static str]> {
        (**self).kinds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Opened {
        owner: String,
    }

    impl DomainEvent for Opened {
        const KIND: &'static str = "ticket.opened";
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TicketEvent {
        Opened(Opened),
        Closed,
    }

    impl TicketEvent {
        fn as_opened(&self) -> Option<&Opened> {
            match self {
                Self::Opened(e) => Some(e),
                Self::Closed => None,
            }
        }
    }

    impl EventKind for TicketEvent {
        fn kind(&self) -> &'static str {
            match self {
                Self::Opened(_) => Opened::KIND,
                Self::Closed => "ticket.closed",
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Ticket {
        owner: Option<String>,
        open: bool,
    }

    impl Aggregate for Ticket {
        type Event = TicketEvent;

        const KIND: &'static str = "ticket";
    }

    impl Apply<Opened> for Ticket {
        fn apply(&mut self, event: &Opened) {
            self.owner = Some(event.owner.clone());
            self.open = true;
        }
    }

    fn opened() -> TicketEvent {
        TicketEvent::Opened(Opened {
            owner: "ada".to_string(),
        })
    }

    #[test]
    fn variant_applies_matching_payload() {
        let handler = on::<Ticket, Opened>(TicketEvent::as_opened);
        let mut ticket = Ticket::default();

        assert!(handler.try_apply(&mut ticket, &opened()));
        assert_eq!(ticket.owner.as_deref(), Some("ada"));
        assert!(ticket.open);
    }

    #[test]
    fn variant_declines_other_payloads_without_mutation() {
        let handler = on::<Ticket, Opened>(TicketEvent::as_opened);
        let mut ticket = Ticket::default();

        assert!(!handler.try_apply(&mut ticket, &TicketEvent::Closed));
        assert_eq!(ticket, Ticket::default());
    }

    #[test]
    fn variant_declares_payload_kind() {
        let handler = on::<Ticket, Opened>(TicketEvent::as_opened);
        assert_eq!(handler.kind(), "ticket.opened");
        assert_eq!(
            TryApply::<Ticket>::kinds(&handler),
            Some(&["ticket.opened"][..])
        );
    }

    #[test]
    fn variant_with_explicit_kind() {
        let handler =
            Variant::<Ticket, Opened>::with_kind("ticket.opened.v1", TicketEvent::as_opened);
        assert_eq!(handler.kind(), "ticket.opened.v1");
        assert_eq!(TryApply::<Ticket>::name(&handler), "ticket.opened.v1");
        assert_eq!(
            TryApply::<Ticket>::kinds(&handler),
            Some(&["ticket.opened.v1"][..])
        );

        let mut ticket = Ticket::default();
        assert!(!handler.try_apply(&mut ticket, &TicketEvent::Closed));
        assert_eq!(ticket, Ticket::default());
        assert!(handler.try_apply(&mut ticket, &opened()));
        assert_eq!(ticket.owner.as_deref(), Some("ada"));
    }

    #[test]
    fn fn_handler_is_opaque_until_claiming() {
        let handler = from_fn::<Ticket, _>("close", |ticket, event| {
            if *event != TicketEvent::Closed {
                return false;
            }
            ticket.open = false;
            true
        });
        assert_eq!(TryApply::<Ticket>::kinds(&handler), None);
        assert_eq!(TryApply::<Ticket>::name(&handler), "close");

        let handler = handler.claiming(&["ticket.closed"]);
        assert_eq!(
            TryApply::<Ticket>::kinds(&handler),
            Some(&["ticket.closed"][..])
        );

        let mut ticket = Ticket {
            owner: None,
            open: true,
        };
        assert!(handler.try_apply(&mut ticket, &TicketEvent::Closed));
        assert!(!ticket.open);
    }

    #[test]
    fn boxed_handler_delegates() {
        let handler: Box<dyn TryApply<Ticket>> =
            Box::new(on::<Ticket, Opened>(TicketEvent::as_opened));
        let mut ticket = Ticket::default();

        assert!(handler.try_apply(&mut ticket, &opened()));
        assert_eq!(handler.name(), "ticket.opened");
    }
}
