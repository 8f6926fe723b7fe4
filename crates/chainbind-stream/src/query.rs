//! Log filter queries.

use chainbind_core::RawLog;
use serde::{Deserialize, Serialize};

/// An immutable log filter: address scope, event signature topic,
/// per-indexed-field value constraints and a block range.
///
/// An empty `addresses` list matches any contract; an empty inner list in
/// `topic_filters` matches any value in that indexed position. An absent
/// `to_block` means "and keep following the live chain".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogQuery {
    /// Contract addresses to match (empty = any)
    #[serde(default)]
    pub addresses: Vec<String>,
    /// topics[0] — the event signature topic (None = any event)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_topic: Option<String>,
    /// Value sets for topics[1..], by indexed position (empty set = any)
    #[serde(default)]
    pub topic_filters: Vec<Vec<String>>,
    /// First block to include
    #[serde(default)]
    pub from_block: u64,
    /// Last block to include; None = open-ended (live tail)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

impl LogQuery {
    /// Query for a single event signature on a single contract.
    pub fn event(address: impl Into<String>, event_topic: impl Into<String>) -> Self {
        Self {
            addresses: vec![address.into()],
            event_topic: Some(event_topic.into()),
            ..Self::default()
        }
    }

    /// Constrain an indexed position (0 = the first indexed parameter,
    /// i.e. topics[1]) to a set of acceptable values.
    pub fn with_topic_filter(mut self, position: usize, values: Vec<String>) -> Self {
        if self.topic_filters.len() <= position {
            self.topic_filters.resize(position + 1, Vec::new());
        }
        self.topic_filters[position] = values;
        self
    }

    /// Restrict the block range.
    pub fn with_blocks(mut self, from: u64, to: Option<u64>) -> Self {
        self.from_block = from;
        self.to_block = to;
        self
    }

    /// Whether this query has a bounded block range (no live tail).
    pub fn is_bounded(&self) -> bool {
        self.to_block.is_some()
    }

    /// Whether a raw log satisfies every constraint of this query.
    pub fn matches(&self, log: &RawLog) -> bool {
        if !self.addresses.is_empty()
            && !self
                .addresses
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&log.address))
        {
            return false;
        }

        if let Some(topic0) = &self.event_topic {
            match log.event_topic() {
                Some(t) if t.eq_ignore_ascii_case(topic0) => {}
                _ => return false,
            }
        }

        for (i, allowed) in self.topic_filters.iter().enumerate() {
            if allowed.is_empty() {
                continue;
            }
            match log.topics.get(i + 1) {
                Some(t) if allowed.iter().any(|v| v.eq_ignore_ascii_case(t)) => {}
                _ => return false,
            }
        }

        if log.block_number < self.from_block {
            return false;
        }
        if let Some(to) = self.to_block {
            if log.block_number > to {
                return false;
            }
        }

        true
    }
}
