use std::collections::VecDeque;

use crate::state::EntityId;

/// Identifies one registered observer of an attribute set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u32);

/// Events published by the mana set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManaEventKind {
    /// Mana changed through an effect execution or replication.
    ManaChanged,
    /// Max mana changed through an effect execution or replication.
    MaxManaChanged,
    /// Mana crossed from above zero to zero or below.
    OutOfMana,
}

/// Payload of a mana event. Instigator and causer are unknown on replicated changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManaEvent {
    pub kind: ManaEventKind,
    pub instigator: Option<EntityId>,
    pub causer: Option<EntityId>,
    pub magnitude: f32,
    pub old_value: f32,
    pub new_value: f32,
}

/// One event addressed to one observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManaNotification {
    pub observer: ObserverId,
    pub event: ManaEvent,
}

/// Explicit observer list of an attribute set.
///
/// Emitting does not call back into observers: one notification per
/// subscribed observer is queued in subscription order, and the host drains
/// the queue once the mutation has finished. Handlers are therefore free to
/// mutate the set again; their events are appended behind the current batch.
#[derive(Clone, Debug, Default)]
pub struct ObserverList {
    next_id: u32,
    subscriptions: Vec<(ObserverId, ManaEventKind)>,
    queue: VecDeque<ManaNotification>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an identity for a new observer.
    pub fn register(&mut self) -> ObserverId {
        self.next_id += 1;
        ObserverId(self.next_id)
    }

    /// Subscribes `observer` to `kind`. Duplicate subscriptions are ignored.
    pub fn subscribe(&mut self, observer: ObserverId, kind: ManaEventKind) {
        if !self.subscriptions.contains(&(observer, kind)) {
            self.subscriptions.push((observer, kind));
        }
    }

    /// Removes every subscription of `observer` and drops its queued notifications.
    ///
    /// Returns the number of subscriptions removed.
    pub fn unsubscribe_all(&mut self, observer: ObserverId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(id, _)| *id != observer);
        self.queue.retain(|note| note.observer != observer);
        before - self.subscriptions.len()
    }

    pub fn is_subscribed(&self, observer: ObserverId, kind: ManaEventKind) -> bool {
        self.subscriptions.contains(&(observer, kind))
    }

    pub(crate) fn emit(&mut self, event: ManaEvent) {
        for &(observer, kind) in &self.subscriptions {
            if kind == event.kind {
                self.queue.push_back(ManaNotification { observer, event });
            }
        }
    }

    /// Drains every queued notification in emission order.
    pub fn take(&mut self) -> Vec<ManaNotification> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: ManaEventKind) -> ManaEvent {
        ManaEvent {
            kind,
            instigator: None,
            causer: None,
            magnitude: 0.0,
            old_value: 0.0,
            new_value: 0.0,
        }
    }

    #[test]
    fn emit_queues_only_matching_subscriptions() {
        let mut list = ObserverList::new();
        let first = list.register();
        let second = list.register();
        list.subscribe(first, ManaEventKind::ManaChanged);
        list.subscribe(second, ManaEventKind::OutOfMana);
        list.subscribe(second, ManaEventKind::ManaChanged);

        list.emit(event(ManaEventKind::ManaChanged));

        let notes = list.take();
        let observers: Vec<_> = notes.iter().map(|n| n.observer).collect();
        assert_eq!(observers, vec![first, second]);
        assert_eq!(list.pending(), 0);
    }

    #[test]
    fn unsubscribe_all_drops_pending_notifications() {
        let mut list = ObserverList::new();
        let observer = list.register();
        list.subscribe(observer, ManaEventKind::ManaChanged);
        list.subscribe(observer, ManaEventKind::ManaChanged);
        list.emit(event(ManaEventKind::ManaChanged));

        assert_eq!(list.unsubscribe_all(observer), 1);
        assert_eq!(list.pending(), 0);
        assert!(!list.is_subscribed(observer, ManaEventKind::ManaChanged));
    }
}
