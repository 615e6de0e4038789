//! Inbound/outbound message queues.
//!
//! Both lanes are unbounded [`tokio::sync::mpsc`] channels.  Producers push
//! through the sender half without locking, so a push never blocks and never
//! fails.  The receiver halves are owned by the queue itself and are only
//! touched by the draining side.
//!
//! | Lane | Producer | Drainer |
//! |---|---|---|
//! | inbound | transport context | tick context ([`DualQueue::drain_inbound`]) |
//! | outbound | tick context | transport context ([`DualQueue::flush_outbound`]) |
//!
//! Order is preserved within a lane.  The two lanes are independent; nothing
//! orders an inbound message relative to an outbound one.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use trackbridge_types::{BridgeError, Message};

use crate::lock;

struct OutboundLane {
    receiver: UnboundedReceiver<Message>,
    /// Messages handed back by a failed or interrupted send; offered first on
    /// the next flush, ahead of the channel.
    held: VecDeque<Message>,
}

/// Two independent FIFO lanes between the transport and tick contexts.
pub struct DualQueue {
    inbound_tx: UnboundedSender<Message>,
    inbound_rx: Mutex<UnboundedReceiver<Message>>,
    outbound_tx: UnboundedSender<Message>,
    outbound: Mutex<OutboundLane>,
}

impl DualQueue {
    /// Create a pair of empty lanes.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            outbound_tx,
            outbound: Mutex::new(OutboundLane {
                receiver: outbound_rx,
                held: VecDeque::new(),
            }),
        }
    }

    /// Push a message received from the remote side.
    pub fn enqueue_inbound(&self, message: Message) {
        // The receiver lives as long as `self`, so the send cannot fail.
        let _ = self.inbound_tx.send(message);
    }

    /// Remove and return every inbound message currently queued, oldest
    /// first.  Returns an empty vector when nothing is pending.
    pub fn drain_inbound(&self) -> Vec<Message> {
        let mut receiver = lock(&self.inbound_rx);
        let mut drained = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            drained.push(message);
        }
        drained
    }

    /// Push a message destined for the remote side.
    pub fn enqueue_outbound(&self, message: Message) {
        let _ = self.outbound_tx.send(message);
    }

    /// Remove and return every outbound message currently queued, oldest
    /// first, including any held back by a failed flush.
    pub fn drain_outbound(&self) -> Vec<Message> {
        let mut lane = lock(&self.outbound);
        let mut drained: Vec<Message> = lane.held.drain(..).collect();
        while let Ok(message) = lane.receiver.try_recv() {
            drained.push(message);
        }
        drained
    }

    /// Offer queued outbound messages to `send` in FIFO order.
    ///
    /// Stops at the first failure.  The failed message and everything behind
    /// it stay queued for the next flush.  Returns the number of messages
    /// sent.
    pub fn flush_outbound<F>(&self, mut send: F) -> usize
    where
        F: FnMut(&Message) -> Result<(), BridgeError>,
    {
        let mut lane = lock(&self.outbound);
        let mut sent = 0;
        loop {
            let message = match lane.held.pop_front() {
                Some(message) => message,
                None => match lane.receiver.try_recv() {
                    Ok(message) => message,
                    Err(_) => return sent,
                },
            };
            if send(&message).is_err() {
                lane.held.push_front(message);
                return sent;
            }
            sent += 1;
        }
    }

    /// Put messages that were flushed but never delivered back at the head of
    /// the outbound lane, keeping their order.
    ///
    /// They go ahead of everything still queued, so the next flush resends
    /// them first.
    pub fn requeue_outbound(&self, undelivered: Vec<Message>) {
        if undelivered.is_empty() {
            return;
        }
        let mut lane = lock(&self.outbound);
        for message in undelivered.into_iter().rev() {
            lane.held.push_front(message);
        }
    }
}

impl Default for DualQueue {
    fn default() -> Self {
        Self::new()
    }
}
