use chrono::{DateTime, Utc};

/// Contract every domain event satisfies.
///
/// An event is a fact: it describes something that already happened and is
/// never mutated after construction. Consumers route on [`event_type`] and
/// use [`version`] to survive schema changes.
///
/// [`event_type`]: Event::event_type
/// [`version`]: Event::version
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name for routing/filtering, e.g. `cart.item.added`.
    fn event_type(&self) -> &'static str;

    /// Schema version of this event type, starting at 1.
    fn version(&self) -> u32;

    /// Business time: when the described change happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
