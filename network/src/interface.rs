//! Bounded FIFO queues and the interfaces built from them.

use bytes::Bytes;
use netsim_codec::Address;
use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tokio::sync::Notify;

/// Returned by [Queue::try_put] when the queue is at capacity. Holds the rejected item.
#[derive(Debug, Error)]
#[error("queue full")]
pub struct Full(pub Bytes);

/// A FIFO queue of encoded units shared between one producer and one consumer.
///
/// Neither end ever blocks on the other: [Queue::get] and [Queue::try_put] return immediately,
/// and [Queue::readable] can be awaited to learn that an item arrived.
pub struct Queue {
    items: Mutex<VecDeque<Bytes>>,
    capacity: usize,
    readable: Notify,
    writable: Notify,
}

impl Queue {
    /// Create a queue holding at most `capacity` items (0 means unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
            readable: Notify::new(),
            writable: Notify::new(),
        }
    }

    /// Maximum number of queued items, or `None` if unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (self.capacity > 0).then_some(self.capacity)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return the oldest item, if any.
    pub fn get(&self) -> Option<Bytes> {
        let item = self.items.lock().unwrap().pop_front();
        if item.is_some() {
            self.writable.notify_one();
        }
        item
    }

    /// Append an item, handing it back if the queue is full.
    pub fn try_put(&self, item: Bytes) -> Result<(), Full> {
        {
            let mut items = self.items.lock().unwrap();
            if self.capacity > 0 && items.len() >= self.capacity {
                return Err(Full(item));
            }
            items.push_back(item);
        }
        self.readable.notify_one();
        Ok(())
    }

    /// Append an item, waiting for room if the queue is full.
    pub async fn put(&self, mut item: Bytes) {
        loop {
            match self.try_put(item) {
                Ok(()) => return,
                Err(Full(rejected)) => item = rejected,
            }
            self.writable.notified().await;
        }
    }

    /// Resolves when the queue may hold an item.
    ///
    /// Wakeups can be spurious: callers must still handle [Queue::get] returning `None`.
    pub async fn readable(&self) {
        if !self.is_empty() {
            return;
        }
        self.readable.notified().await;
    }
}

/// One attachment point of a node: an inbound queue filled by a link and an outbound queue
/// drained by it.
pub struct Interface {
    owner: Address,
    index: usize,
    inbound: Queue,
    outbound: Queue,
}

impl Interface {
    /// Create interface `index` of node `owner` with both queues bounded by `queue_size`
    /// (0 means unbounded).
    pub fn new(owner: Address, index: usize, queue_size: usize) -> Arc<Self> {
        Arc::new(Self {
            owner,
            index,
            inbound: Queue::new(queue_size),
            outbound: Queue::new(queue_size),
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Units waiting to be processed by the owning node.
    pub fn inbound(&self) -> &Queue {
        &self.inbound
    }

    /// Units waiting to be carried by the link.
    pub fn outbound(&self) -> &Queue {
        &self.outbound
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::time::Duration;

    #[test]
    fn test_fifo() {
        let queue = Queue::new(0);
        assert_eq!(queue.capacity(), None);
        for i in 0..10u8 {
            queue.try_put(Bytes::from(vec![i])).unwrap();
        }
        for i in 0..10u8 {
            assert_eq!(queue.get().unwrap()[..], [i]);
        }
        assert!(queue.get().is_none());
    }

    #[test]
    fn test_full_returns_item() {
        let queue = Queue::new(1);
        queue.try_put(Bytes::from_static(b"a")).unwrap();
        let Full(rejected) = queue.try_put(Bytes::from_static(b"b")).unwrap_err();
        assert_eq!(&rejected[..], b"b");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_bound_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(0);
        for capacity in 1..8 {
            let queue = Queue::new(capacity);
            let (mut accepted, mut taken) = (0, 0);
            for _ in 0..500 {
                if rng.gen_bool(0.6) {
                    // Each overflow is exactly one rejection
                    let full = queue.len() == capacity;
                    match queue.try_put(Bytes::from_static(b"x")) {
                        Ok(()) => accepted += 1,
                        Err(_) => assert!(full),
                    }
                } else if queue.get().is_some() {
                    taken += 1;
                }
                assert!(queue.len() <= capacity);
            }
            assert_eq!(accepted - taken, queue.len());
        }
    }

    #[tokio::test]
    async fn test_readable_wakes_on_put() {
        let queue = Arc::new(Queue::new(0));
        assert!(queue.readable().now_or_never().is_none());

        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move {
                queue.readable().await;
                queue.get()
            }
        });
        tokio::task::yield_now().await;
        queue.try_put(Bytes::from_static(b"ping")).unwrap();
        assert_eq!(&waiter.await.unwrap().unwrap()[..], b"ping");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_put_waits_for_room() {
        let queue = Arc::new(Queue::new(1));
        queue.try_put(Bytes::from_static(b"first")).unwrap();

        let producer = tokio::spawn({
            let queue = queue.clone();
            async move { queue.put(Bytes::from_static(b"second")).await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!producer.is_finished());

        assert_eq!(&queue.get().unwrap()[..], b"first");
        producer.await.unwrap();
        assert_eq!(&queue.get().unwrap()[..], b"second");
    }

    #[test]
    fn test_interface_display() {
        let interface = Interface::new(Address::new("RA").unwrap(), 2, 4);
        assert_eq!(interface.to_string(), "RA:2");
        assert_eq!(interface.inbound().capacity(), Some(4));
        assert_eq!(interface.outbound().capacity(), Some(4));
    }
}
