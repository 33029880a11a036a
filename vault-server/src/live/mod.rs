//! ChangeHub: per-user realtime fan-out
//!
//! ```text
//! API write handler
//!       │ ChangeEvent
//!       ▼
//! ChangeHub
//!   └── users: user_id → broadcast::Sender<ChangeEvent>
//!             │
//!             ▼
//!       realtime WS handlers (one receiver per socket)
//! ```
//!
//! Every event is scoped to the owning user; sockets never see other users'
//! rows.

use dashmap::DashMap;
use shared::realtime::ChangeEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Broadcast channel capacity per user
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct ChangeHub {
    users: Arc<DashMap<Uuid, broadcast::Sender<ChangeEvent>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan an event out to the user's sockets. Users without subscribers are
    /// dropped from the map.
    pub fn publish(&self, user_id: Uuid, event: ChangeEvent) {
        let Some(tx) = self.users.get(&user_id).map(|t| t.clone()) else {
            return;
        };
        if tx.send(event).is_err() {
            self.users
                .remove_if(&user_id, |_, tx| tx.receiver_count() == 0);
        }
    }

    pub fn publish_all(&self, user_id: Uuid, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            self.publish(user_id, event);
        }
    }

    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<ChangeEvent> {
        self.users
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Forget a user once their last socket has gone
    pub fn release(&self, user_id: Uuid) {
        self.users
            .remove_if(&user_id, |_, tx| tx.receiver_count() == 0);
    }

    #[cfg(test)]
    fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::realtime::{ChangeKind, ChangeTable};

    #[tokio::test]
    async fn subscriber_receives_own_events() {
        let hub = ChangeHub::new();
        let user = Uuid::new_v4();
        let mut rx = hub.subscribe(user);

        hub.publish(user, ChangeEvent::deleted(ChangeTable::Items, 9));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, ChangeTable::Items);
        assert_eq!(event.kind, ChangeKind::Delete { id: 9 });
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let hub = ChangeHub::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_rx = hub.subscribe(alice);
        let mut bob_rx = hub.subscribe(bob);

        hub.publish(alice, ChangeEvent::deleted(ChangeTable::Collections, 1));
        assert!(alice_rx.recv().await.is_ok());
        assert!(matches!(
            bob_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let hub = ChangeHub::new();
        hub.publish(Uuid::new_v4(), ChangeEvent::deleted(ChangeTable::Items, 1));
        assert_eq!(hub.user_count(), 0);
    }

    #[test]
    fn entry_released_after_last_receiver_drops() {
        let hub = ChangeHub::new();
        let user = Uuid::new_v4();
        let rx = hub.subscribe(user);
        assert_eq!(hub.user_count(), 1);

        drop(rx);
        hub.publish(user, ChangeEvent::deleted(ChangeTable::Items, 1));
        assert_eq!(hub.user_count(), 0);
    }

    #[test]
    fn release_keeps_live_entries() {
        let hub = ChangeHub::new();
        let user = Uuid::new_v4();
        let _rx = hub.subscribe(user);
        hub.release(user);
        assert_eq!(hub.user_count(), 1);
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let hub = ChangeHub::new();
        let user = Uuid::new_v4();
        let mut rx = hub.subscribe(user);
        for id in 0..(BROADCAST_CAPACITY as i64 + 10) {
            hub.publish(user, ChangeEvent::deleted(ChangeTable::Items, id));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
