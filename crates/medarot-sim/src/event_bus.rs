//! Ordered one-way event queues between simulation and presentation.

use std::collections::VecDeque;

use tracing::warn;

/// Bounded FIFO. A push into a full queue is dropped with a warning, so only
/// presentation-facing traffic goes through here; game-affecting queues are
/// plain sequences on `BattleResources`.
#[derive(Debug, Clone)]
pub struct EventBus<T> {
    name: &'static str,
    queue: VecDeque<T>,
    capacity: usize,
    dropped: u64,
}

impl<T> EventBus<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            queue: VecDeque::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Enqueue an event. Returns false when the queue was full.
    pub fn push(&mut self, event: T) -> bool {
        if self.queue.len() >= self.capacity {
            self.dropped += 1;
            warn!(channel = self.name, dropped = self.dropped, "event channel full, dropping event");
            return false;
        }
        self.queue.push_back(event);
        true
    }

    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Take every queued event in order.
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;

    #[test]
    fn test_full_queue_drops_new_events() {
        let mut bus = EventBus::new("test", 2);
        assert!(bus.push(1));
        assert!(bus.push(2));
        assert!(!bus.push(3));
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.drain(), vec![1, 2]);
        assert!(bus.is_empty());
        assert!(bus.push(4));
        assert_eq!(bus.pop(), Some(4));
    }
}
