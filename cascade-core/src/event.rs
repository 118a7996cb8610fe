//! Domain event markers.
//!
//! `DomainEvent` is the lightweight trait every concrete event payload
//! implements. Event enums that group payloads for one aggregate implement
//! [`EventKind`] by hand so a chain can name whatever it was given, even an
//! event no handler recognised.

/// Marker trait for a single event payload.
///
/// Each payload carries a unique [`Self::KIND`] identifier. Chains use it to
/// check which kinds a handler claims and to describe unhandled events.
/// Use lowercase, dotted or kebab-case names: `"order.created"`,
/// `"account-closed"`.
pub trait DomainEvent {
    const KIND: &'static str;
}

/// Extension trait for getting the event kind from an event instance.
///
/// This trait has a blanket implementation for all types that implement
/// [`DomainEvent`], so `kind()` always returns the `KIND` constant for those.
///
/// Event enums implement it directly, usually with one match arm per variant
/// delegating to the payload's `KIND`:
///
/// ```
/// use cascade_core::event::{DomainEvent, EventKind};
///
/// struct Opened;
/// impl DomainEvent for Opened {
///     const KIND: &'static str = "door.opened";
/// }
///
/// enum DoorEvent {
///     Opened(Opened),
///     Slammed,
/// }
///
/// impl EventKind for DoorEvent {
///     fn kind(&self) -> &'static str {
///         match self {
///             Self::Opened(_) => Opened::KIND,
///             Self::Slammed => "door.slammed",
///         }
///     }
/// }
///
/// assert_eq!(DoorEvent::Opened(Opened).kind(), "door.opened");
/// ```
pub trait EventKind {
    fn kind(&self) -> &'static str;
}

impl<T: DomainEvent> EventKind for T {
    fn kind(&self) -> &'static str {
        T::KIND
    }
}
