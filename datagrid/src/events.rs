//! Typed broadcast channels connecting the table to its consumers.
//!
//! Each event kind has its own [`Channel`]. Emitting never blocks and never
//! calls into subscribers: events are queued per subscriber and read when
//! the subscriber gets to them, so a consumer reacting to one event cannot
//! re-enter the table mid-update.

use std::ops::Range;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::error::TryRecvError;

use crate::dimensions::ResizeOutcome;
use crate::dimensions::ResizeState;
use crate::query::Direction;
use crate::selection::RowId;
use crate::table::FetchTicket;

/// Events buffered per subscriber before the oldest are dropped.
const DEFAULT_CAPACITY: usize = 64;

/// A broadcast channel for one event kind.
#[derive(Debug, Clone)]
pub struct Channel<E: Clone> {
    tx: broadcast::Sender<E>,
}

impl<E: Clone> Default for Channel<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<E: Clone> Channel<E> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Queues an event for every current subscriber.
    ///
    /// Returns the number of subscribers reached; emitting with none is
    /// not an error.
    pub fn emit(&self, event: E) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Registers a new subscriber. It sees events emitted from now on.
    pub fn subscribe(&self) -> Subscription<E> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A subscriber handle. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<E: Clone> {
    rx: broadcast::Receiver<E>,
}

impl<E: Clone> Subscription<E> {
    /// Waits for the next event. Returns `None` once the channel is gone.
    ///
    /// Events dropped because this subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<E> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Subscriber lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<E> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Subscriber lagged, skipped {skipped} events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Takes every queued event.
    pub fn drain(&mut self) -> Vec<E> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// The selection changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChanged {
    /// Full selection after the change, in insertion order.
    pub selection: Vec<RowId>,
    pub added: Vec<RowId>,
    pub removed: Vec<RowId>,
}

/// A column filter or the global search changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChanged {
    /// The column whose filter changed; `None` for the global search or a
    /// full reset.
    pub column: Option<String>,
    /// Rows matching after the change.
    pub total: usize,
}

/// The sort on a column changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SortChanged {
    pub column: String,
    /// New direction; `None` when the column is no longer sorted.
    pub direction: Option<Direction>,
}

/// The resize guide moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeMove {
    pub column: usize,
    pub x: i32,
}

/// The body was scrolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollEvent {
    pub offset: u64,
    /// Rows rendered after the scroll.
    pub range: Range<usize>,
}

/// The page or page size changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChanged {
    pub page: usize,
    pub per_page: i64,
}

/// Every channel the table emits on.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    pub selection: Channel<SelectionChanged>,
    pub filter: Channel<FilterChanged>,
    pub sort: Channel<SortChanged>,
    pub resize_begin: Channel<ResizeState>,
    pub resize_move: Channel<ResizeMove>,
    pub resize_end: Channel<ResizeOutcome>,
    pub scroll: Channel<ScrollEvent>,
    pub loading: Channel<bool>,
    pub page: Channel<PageChanged>,
    /// Server mode: rows are needed. Carries the ticket to complete.
    pub fetch: Channel<FetchTicket>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let channel: Channel<bool> = Channel::default();
        assert_eq!(channel.emit(true), 0);
    }

    #[test]
    fn test_subscribers_are_independent() {
        let channel = Channel::default();
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();
        channel.emit(1);
        channel.emit(2);

        assert_eq!(a.drain(), vec![1, 2]);
        assert_eq!(b.try_recv(), Some(1));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel: Channel<u8> = Channel::default();
        let sub = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        drop(sub);
        assert_eq!(channel.subscriber_count(), 0);
        assert_eq!(channel.emit(1), 0);
    }

    #[test]
    fn test_lagging_subscriber_skips_oldest() {
        let channel = Channel::new(2);
        let mut sub = channel.subscribe();
        for i in 0..5 {
            channel.emit(i);
        }
        assert_eq!(sub.drain(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_recv_waits_for_event() {
        let channel = Channel::default();
        let mut sub = channel.subscribe();
        channel.emit("loading");
        assert_eq!(sub.recv().await, Some("loading"));
    }
}
