// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! In-memory pub/sub for pipeline events.
//!
//! Backed by a tokio broadcast channel. Events are lost on restart and on
//! receiver lag; the bus is an observation surface, not a control path.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::PipelineEvent;

const DEFAULT_CAPACITY: usize = 1024;

/// Event bus for publishing and subscribing to [`PipelineEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<PipelineEvent>>,
}

impl EventBus {
    /// Create a bus with the given buffered-event capacity. Old events are
    /// dropped for lagging receivers once the buffer fills.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    pub fn publish(&self, event: PipelineEvent) {
        debug!(?event, "publishing pipeline event");
        // send() errors only when no receiver exists, which is fine here.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<PipelineEvent>,
}

impl EventReceiver {
    /// Receive the next event, waiting until one is available.
    pub async fn recv(&mut self) -> Result<PipelineEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!(skipped = n, "event receiver lagged");
                EventBusError::Lagged(n)
            }
        })
    }

    /// Receive without waiting.
    pub fn try_recv(&mut self) -> Result<PipelineEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => EventBusError::Lagged(n),
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventBusError {
    #[error("event bus closed")]
    Closed,
    #[error("no event available")]
    Empty,
    #[error("receiver lagged by {0} events")]
    Lagged(u64),
}
