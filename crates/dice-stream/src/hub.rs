use std::collections::HashMap;
use std::sync::Arc;

use dice_core::ID;
use dice_rooms::Room;
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

use crate::event::StreamEvent;

/// Default bounded buffer per subscriber before it is disconnected with
/// `EBackpressure`.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub room_id: ID<Room>,
    subscriber_id: Uuid,
}

struct RoomChannel {
    order: mpsc::UnboundedSender<StreamEvent>,
    subscribers: Arc<Mutex<HashMap<Uuid, mpsc::Sender<StreamEvent>>>>,
}

/// One ordered channel per room plus a dynamic set of bounded
/// per-subscriber fan-out senders: events land on the room's single
/// channel in commit order, then get pushed out to every subscriber.
pub struct StreamHub {
    rooms: RwLock<HashMap<ID<Room>, RoomChannel>>,
    subscriber_buffer: usize,
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl StreamHub {
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            subscriber_buffer,
        }
    }

    async fn channel_for(&self, room_id: ID<Room>) -> mpsc::UnboundedSender<StreamEvent> {
        if let Some(channel) = self.rooms.read().await.get(&room_id) {
            return channel.order.clone();
        }
        let mut rooms = self.rooms.write().await;
        if let Some(channel) = rooms.get(&room_id) {
            return channel.order.clone();
        }
        let (order, mut receiver) = mpsc::unbounded_channel::<StreamEvent>();
        let subscribers: Arc<Mutex<HashMap<Uuid, mpsc::Sender<StreamEvent>>>> = Arc::new(Mutex::new(HashMap::new()));
        let pump_subscribers = subscribers.clone();
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let mut subs = pump_subscribers.lock().await;
                let mut backpressured = Vec::new();
                for (id, sender) in subs.iter() {
                    if sender.try_send(event.clone()).is_err() {
                        backpressured.push(*id);
                    }
                }
                for id in backpressured {
                    subs.remove(&id);
                    log::warn!("[stream] subscriber {id} disconnected: EBackpressure");
                }
            }
            log::debug!("[stream] room {room_id} fan-out pump exiting");
        });
        rooms.insert(room_id, RoomChannel { order: order.clone(), subscribers });
        order
    }

    pub async fn subscribe(&self, room_id: ID<Room>) -> (SubscriptionHandle, mpsc::Receiver<StreamEvent>) {
        self.channel_for(room_id).await;
        let (tx, rx) = mpsc::channel(self.subscriber_buffer);
        let subscriber_id = Uuid::new_v4();
        if let Some(channel) = self.rooms.read().await.get(&room_id) {
            channel.subscribers.lock().await.insert(subscriber_id, tx);
        }
        (SubscriptionHandle { room_id, subscriber_id }, rx)
    }

    pub async fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Some(channel) = self.rooms.read().await.get(&handle.room_id) {
            channel.subscribers.lock().await.remove(&handle.subscriber_id);
        }
    }

    /// Publishes in the exact order the caller commits; the room's single
    /// queue preserves that order for every subscriber.
    pub async fn publish(&self, room_id: ID<Room>, event: StreamEvent) {
        let sender = self.channel_for(room_id).await;
        if sender.send(event).is_err() {
            log::warn!("[stream] room {room_id} has no active pump to publish to");
        }
    }

    pub async fn subscriber_count(&self, room_id: ID<Room>) -> usize {
        match self.rooms.read().await.get(&room_id) {
            Some(channel) => channel.subscribers.lock().await.len(),
            None => 0,
        }
    }

    /// Tears down a room's channel; subscribers' receivers end once the
    /// pump task observes the dropped sender and exits.
    pub async fn close_room(&self, room_id: ID<Room>) {
        self.rooms.write().await.remove(&room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[tokio::test]
    async fn subscriber_receives_published_events_in_order() {
        let hub = StreamHub::new(8);
        let room = ID::default();
        let (_handle, mut rx) = hub.subscribe(room).await;
        hub.publish(room, StreamEvent::new(EventKind::TurnStart, 1u32)).await;
        hub.publish(room, StreamEvent::new(EventKind::RollResult, 2u32)).await;
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::TurnStart);
        assert_eq!(second.kind, EventKind::RollResult);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let hub = StreamHub::new(8);
        let room = ID::default();
        let (handle, mut rx) = hub.subscribe(room).await;
        hub.unsubscribe(handle).await;
        hub.publish(room, StreamEvent::new(EventKind::ChatMessage, "hi")).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn overflowing_a_subscribers_buffer_drops_it() {
        let hub = StreamHub::new(1);
        let room = ID::default();
        let (_handle, _rx) = hub.subscribe(room).await;
        for _ in 0..5 {
            hub.publish(room, StreamEvent::new(EventKind::SystemNotification, "spam")).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(hub.subscriber_count(room).await, 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_get_every_event() {
        let hub = StreamHub::new(8);
        let room = ID::default();
        let (_h1, mut rx1) = hub.subscribe(room).await;
        let (_h2, mut rx2) = hub.subscribe(room).await;
        hub.publish(room, StreamEvent::new(EventKind::RoomClosed, "bye")).await;
        assert_eq!(rx1.recv().await.unwrap().kind, EventKind::RoomClosed);
        assert_eq!(rx2.recv().await.unwrap().kind, EventKind::RoomClosed);
    }
}
