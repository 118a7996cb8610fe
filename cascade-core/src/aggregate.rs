//! Aggregate-side primitives.
//!
//! This module defines what a chain mutates: the [`Aggregate`] itself, the
//! per-payload [`Apply`] hook used by [`Variant`](crate::handler::Variant)
//! handlers, and [`Chained`], which binds an aggregate type to the one chain
//! that applies its events.

use crate::{
    chain::Chain,
    error::{ReplayError, UnhandledEvent},
    event::EventKind,
};

/// In-memory entity whose state changes only through applied events.
///
/// A chain borrows the aggregate mutably for the duration of one dispatch and
/// holds nothing afterwards.
// ANCHOR: aggregate_trait
pub trait Aggregate: Sized {
    /// Aggregate type identifier used in diagnostics and chain manifests.
    ///
    /// Use lowercase, kebab-case for consistency: `"order"`,
    /// `"user-account"`, etc.
    const KIND: &'static str;

    /// The set of events this aggregate accepts, usually an enum.
    type Event: EventKind;
}
// ANCHOR_END: aggregate_trait

/// Mutate an aggregate with one event payload.
///
/// [`Variant`](crate::handler::Variant) handlers call this after they have
/// extracted the payload, so an implementation never sees an event it does
/// not understand.
///
/// ```ignore
/// #[derive(Default)]
/// struct Account {
///     balance: i64,
/// }
///
/// impl Apply<FundsDeposited> for Account {
///     fn apply(&mut self, event: &FundsDeposited) {
///         self.balance += event.amount;
///     }
/// }
/// ```
// ANCHOR: apply_trait
pub trait Apply<V> {
    fn apply(&mut self, event: &V);
}
// ANCHOR_END: apply_trait

/// Aggregates that route every event through a single shared chain.
///
/// Implementors only provide [`Chained::chain`], typically backed by a
/// `static` [`LazyLock`](std::sync::LazyLock). The provided methods are the
/// entry points command handlers and replay loops call.
///
/// ```ignore
/// static ORDER_CHAIN: LazyLock<Chain<Order>> = LazyLock::new(|| {
///     Chain::<Order>::builder()
///         .on(OrderEvent::as_placed)
///         .on(OrderEvent::as_shipped)
///         .build()
///         .expect("order chain is valid")
/// });
///
/// impl Chained for Order {
///     fn chain() -> &'static Chain<Self> {
///         &ORDER_CHAIN
///     }
/// }
/// ```
pub trait Chained: Aggregate + 'static {
    fn chain() -> &'static Chain<Self>;

    /// Apply a single event through the aggregate's chain.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledEvent`] carrying the event if no handler claimed it.
    /// The aggregate is left untouched in that case.
    fn apply_event(&mut self, event: Self::Event) -> Result<(), UnhandledEvent<Self::Event>> {
        Self::chain().dispatch(self, event).map(|_| ())
    }

    /// Apply a history of events in order, returning how many were applied.
    ///
    /// # Errors
    ///
    /// Stops at the first event no handler claims and returns a
    /// [`ReplayError`] recording its position in the history. Events before
    /// it remain applied.
    fn replay<I>(&mut self, events: I) -> Result<usize, ReplayError<Self::Event>>
    where
        I: IntoIterator<Item = Self::Event>,
    {
        Self::chain().replay(self, events)
    }
}
