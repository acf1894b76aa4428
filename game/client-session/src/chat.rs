use std::{collections::VecDeque, time::Duration};

/// Number of messages kept for display.
pub const CHAT_MESSAGE_STACK: usize = 8;
/// Longest message that can be composed, in characters.
pub const MAX_CHAT_MESSAGE_LEN: usize = 80;

const BACKSPACE: char = '\u{8}';
const ESCAPE: char = '\u{1b}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub index: u64,
    pub creation_time: Duration,
    pub text: String,
}

/// The newest [`CHAT_MESSAGE_STACK`] messages, oldest are dropped first.
///
/// Every message gets the next index, indices are never reused even after
/// the message was dropped.
#[derive(Debug, Default)]
pub struct ChatStack {
    messages: VecDeque<ChatMessage>,
    next_index: u64,
}

impl ChatStack {
    pub fn add(&mut self, text: &str, now: Duration) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        if self.messages.len() == CHAT_MESSAGE_STACK {
            self.messages.pop_front();
        }
        self.messages.push_back(ChatMessage {
            index,
            creation_time: now,
            text: text.to_string(),
        });
        index
    }

    /// Message `level` steps back from the newest one (0 is the newest).
    /// Messages older than `expiration` are hidden.
    pub fn get(&self, level: usize, expiration: Duration, now: Duration) -> Option<&ChatMessage> {
        let msg = self.messages.iter().rev().nth(level)?;
        (now.saturating_sub(msg.creation_time) <= expiration).then_some(msg)
    }

    pub fn last_index(&self) -> Option<u64> {
        self.next_index.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Message the local player is typing.
#[derive(Debug, Default)]
pub struct ChatComposer {
    buffer: String,
}

impl ChatComposer {
    /// Handles one key, returns the message once it is committed.
    pub fn add_key(&mut self, key: char) -> Option<String> {
        match key {
            '\r' | '\n' => {
                let msg = std::mem::take(&mut self.buffer);
                (!msg.trim().is_empty()).then_some(msg)
            }
            BACKSPACE => {
                self.buffer.pop();
                None
            }
            ESCAPE => {
                self.buffer.clear();
                None
            }
            key if !key.is_control() => {
                if self.buffer.chars().count() < MAX_CHAT_MESSAGE_LEN {
                    self.buffer.push(key);
                }
                None
            }
            _ => None,
        }
    }

    pub fn current(&self) -> &str {
        &self.buffer
    }
}
