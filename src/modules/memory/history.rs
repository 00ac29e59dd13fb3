use std::collections::VecDeque;

use crate::modules::completion::types::ChatMessage;

pub const DEFAULT_MAX_ENTRIES: usize = 6;

/// Most-recent-N chat context sent with every reply request. Lives only in
/// memory and starts empty for every chat session.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    messages: VecDeque<ChatMessage>,
    max_entries: usize,
}

impl RollingHistory {
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            messages: VecDeque::with_capacity(max_entries + 1),
            max_entries,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_entries {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
