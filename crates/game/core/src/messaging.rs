//! World-scoped message bus and multicast signals.
//!
//! The bus maps a finite [`Signal`] set to subscriber callbacks and delivers
//! synchronously, in subscription order. [`Multicast`] is the same mechanism
//! for a single signal owned by a component.

use std::collections::HashMap;
use std::fmt;

use crate::state::EntityId;

/// Signals published on the message bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum Signal {
    /// The shield became active; the HUD shows its slot.
    #[strum(serialize = "HUD.Slot.ManaShield.Show")]
    ShieldShown,
    /// The shield ended; the HUD hides its slot.
    #[strum(serialize = "HUD.Slot.ManaShield.Hide")]
    ShieldHidden,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::ShieldShown, Signal::ShieldHidden];
}

/// Generic tagged message carried by every signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerbMessage {
    pub verb: Signal,
    pub instigator: Option<EntityId>,
    pub target: Option<EntityId>,
    pub magnitude: f64,
}

impl VerbMessage {
    pub fn new(verb: Signal) -> Self {
        Self {
            verb,
            instigator: None,
            target: None,
            magnitude: 1.0,
        }
    }

    pub fn with_instigator(mut self, instigator: Option<EntityId>) -> Self {
        self.instigator = instigator;
        self
    }
}

/// Identifies one listener of a [`Multicast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// Ordered list of callbacks invoked with the same payload.
pub struct Multicast<T> {
    next_id: u64,
    listeners: Vec<(ListenerHandle, Listener<T>)>,
}

impl<T> Multicast<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerHandle {
        self.next_id += 1;
        let handle = ListenerHandle(self.next_id);
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Returns false if the handle was not registered.
    pub fn remove(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != handle);
        before != self.listeners.len()
    }

    pub fn broadcast(&mut self, payload: &T) {
        for (_, listener) in &mut self.listeners {
            listener(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Multicast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Multicast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multicast")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Subscription returned by [`MessageBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub signal: Signal,
    handle: ListenerHandle,
}

/// World-scoped publish/subscribe registry.
#[derive(Debug)]
pub struct MessageBus {
    channels: HashMap<Signal, Multicast<VerbMessage>>,
}

impl MessageBus {
    /// Creates a bus with one channel per signal.
    pub fn new() -> Self {
        let channels = Signal::ALL
            .into_iter()
            .map(|signal| (signal, Multicast::new()))
            .collect();
        Self { channels }
    }

    pub fn subscribe(
        &mut self,
        signal: Signal,
        listener: impl FnMut(&VerbMessage) + 'static,
    ) -> Subscription {
        let handle = self.channels.entry(signal).or_default().add(listener);
        Subscription { signal, handle }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.channels
            .get_mut(&subscription.signal)
            .is_some_and(|channel| channel.remove(subscription.handle))
    }

    /// Delivers `message` to every subscriber of its verb, in order.
    pub fn broadcast(&mut self, message: VerbMessage) {
        match self.channels.get_mut(&message.verb) {
            Some(channel) if !channel.is_empty() => {
                tracing::debug!(verb = %message.verb, listeners = channel.len(), "broadcasting message");
                channel.broadcast(&message);
            }
            _ => tracing::trace!(verb = %message.verb, "no subscribers for message"),
        }
    }

    pub fn subscriber_count(&self, signal: Signal) -> usize {
        self.channels.get(&signal).map_or(0, Multicast::len)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn delivers_in_subscription_order_to_matching_signal_only() {
        let mut bus = MessageBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        bus.subscribe(Signal::ShieldShown, move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&log);
        bus.subscribe(Signal::ShieldShown, move |_| second.borrow_mut().push("second"));
        let hidden = Rc::clone(&log);
        bus.subscribe(Signal::ShieldHidden, move |_| hidden.borrow_mut().push("hidden"));

        bus.broadcast(VerbMessage::new(Signal::ShieldShown));

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut bus = MessageBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let subscription = bus.subscribe(Signal::ShieldHidden, move |_| *counter.borrow_mut() += 1);

        bus.broadcast(VerbMessage::new(Signal::ShieldHidden));
        assert!(bus.unsubscribe(subscription));
        assert!(!bus.unsubscribe(subscription));
        bus.broadcast(VerbMessage::new(Signal::ShieldHidden));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(Signal::ShieldHidden), 0);
    }

    #[test]
    fn signals_use_hud_slot_names() {
        assert_eq!(Signal::ShieldShown.to_string(), "HUD.Slot.ManaShield.Show");
        assert_eq!(Signal::ShieldHidden.as_ref(), "HUD.Slot.ManaShield.Hide");
    }
}
