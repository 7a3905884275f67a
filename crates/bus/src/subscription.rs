// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subscriber channels grouped by topic

use pulse_core::Event;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Receiving end of one subscription.
///
/// Keep it to receive events and pass it back to `unsubscribe`. Dropping it
/// also ends the subscription; the bus prunes the channel on its next sweep.
#[derive(Debug)]
pub struct Subscription {
    key: u64,
    topic: String,
    receiver: mpsc::Receiver<Event>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next event. Returns None once the bus has closed the channel.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Take a queued event without waiting
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Number of events waiting in the buffer
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub(crate) fn key(&self) -> u64 {
        self.key
    }
}

/// Outcome of a non-blocking delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Sent,
    Full,
    Closed,
}

/// Sending half kept by the bus
#[derive(Clone)]
pub(crate) struct Subscriber {
    key: u64,
    sender: mpsc::Sender<Event>,
}

impl Subscriber {
    pub(crate) fn key(&self) -> u64 {
        self.key
    }

    pub(crate) fn try_deliver(&self, event: Event) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Full,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Open subscriber channels per topic
#[derive(Default)]
pub(crate) struct SubscriberTable {
    topics: HashMap<String, Vec<Subscriber>>,
    next_key: u64,
}

impl SubscriberTable {
    pub(crate) fn open(&mut self, topic: &str, capacity: usize) -> Subscription {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.next_key += 1;
        let key = self.next_key;
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { key, sender });
        Subscription {
            key,
            topic: topic.to_string(),
            receiver,
        }
    }

    /// Drop the sender for `key`, closing the channel. False if not found.
    pub(crate) fn close(&mut self, topic: &str, key: u64) -> bool {
        let Some(list) = self.topics.get_mut(topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|s| s.key != key);
        let removed = list.len() != before;
        if list.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }

    pub(crate) fn subscribers(&self, topic: &str) -> Vec<Subscriber> {
        self.topics.get(topic).cloned().unwrap_or_default()
    }

    /// Remove channels whose receiver is gone. Never touches queued events.
    pub(crate) fn prune_closed(&mut self) -> usize {
        let mut pruned = 0;
        self.topics.retain(|_, list| {
            let before = list.len();
            list.retain(|s| !s.sender.is_closed());
            pruned += before - list.len();
            !list.is_empty()
        });
        pruned
    }

    pub(crate) fn counts(&self) -> HashMap<String, usize> {
        self.topics
            .iter()
            .map(|(topic, list)| (topic.clone(), list.len()))
            .collect()
    }

    pub(crate) fn total(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// Close every channel
    pub(crate) fn clear(&mut self) {
        self.topics.clear();
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
