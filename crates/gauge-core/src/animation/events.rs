//! Lifecycle events for animated values.
//!
//! The interpolator queues an event whenever a run starts, is superseded,
//! settles, or is torn down. Owners poll them after driving frames:
//!
//! ```ignore
//! queue.run_frame(now_ms);
//! for event in interpolator.drain_events() {
//!     if let AnimationEvent::Ended { value, .. } = event {
//!         println!("settled at {value}");
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::types::Generation;

/// Event emitted when an animated value changes lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationEvent {
    /// A run started from an idle value.
    Started {
        generation: Generation,
        from: f64,
        to: f64,
    },
    /// A running transition was superseded by a new target.
    Retargeted {
        generation: Generation,
        superseded: Generation,
        /// Displayed value at the moment of retargeting.
        from: f64,
        to: f64,
    },
    /// The run reached its target.
    Ended { generation: Generation, value: f64 },
    /// The value was torn down.
    Cancelled { generation: Generation, value: f64 },
}

impl AnimationEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Started { generation, .. }
            | Self::Retargeted { generation, .. }
            | Self::Ended { generation, .. }
            | Self::Cancelled { generation, .. } => *generation,
        }
    }
}

/// Events kept when the owner never drains.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Bounded FIFO of pending animation events. When full, the oldest event is
/// dropped to make room.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<AnimationEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue holding at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: AnimationEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Remove and return all queued events in emission order.
    pub fn drain(&mut self) -> Vec<AnimationEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(AnimationEvent::Started {
            generation: Generation(1),
            from: 0.0,
            to: 80.0,
        });
        queue.push(AnimationEvent::Ended {
            generation: Generation(1),
            value: 80.0,
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert!(matches!(drained[0], AnimationEvent::Started { .. }));
        assert!(matches!(drained[1], AnimationEvent::Ended { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut queue = EventQueue::with_capacity(3);
        for n in 0..5 {
            queue.push(AnimationEvent::Ended {
                generation: Generation(n),
                value: n as f64,
            });
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 2);

        let generations: Vec<_> = queue.drain().iter().map(AnimationEvent::generation).collect();
        assert_eq!(generations, vec![Generation(2), Generation(3), Generation(4)]);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut queue = EventQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(AnimationEvent::Ended {
            generation: Generation(1),
            value: 1.0,
        });
        queue.push(AnimationEvent::Ended {
            generation: Generation(2),
            value: 2.0,
        });
        assert_eq!(queue.drain()[0].generation(), Generation(2));
    }

    #[test]
    fn test_event_generation() {
        let event = AnimationEvent::Retargeted {
            generation: Generation(3),
            superseded: Generation(2),
            from: 40.0,
            to: 20.0,
        };
        assert_eq!(event.generation(), Generation(3));
    }

    #[test]
    fn test_event_serialization() {
        let event = AnimationEvent::Cancelled {
            generation: Generation(7),
            value: 12.5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"cancelled","generation":7,"value":12.5}"#);
    }
}
