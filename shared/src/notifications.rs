use std::collections::BTreeMap;

/// Error messages currently on screen. A message is shown at most once no
/// matter how often it is reported.
///
/// Every report stamps the message. An expiry only removes the message if it
/// still carries the stamp the expiry was armed with, so re-reporting a
/// message restarts its display time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorQueue {
    messages: BTreeMap<String, u64>,
    next_stamp: u64,
}

impl ErrorQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the message (or keeps showing it) and returns the stamp its
    /// expiry must present.
    pub fn add(&mut self, message: impl Into<String>) -> u64 {
        self.next_stamp += 1;
        self.messages.insert(message.into(), self.next_stamp);
        self.next_stamp
    }

    /// Dismissal: removes the message whatever its stamp.
    pub fn remove(&mut self, message: &str) -> bool {
        self.messages.remove(message).is_some()
    }

    /// Removes the message only if it was not re-reported after `stamp`.
    pub fn expire(&mut self, message: &str, stamp: u64) -> bool {
        if self.messages.get(message) == Some(&stamp) {
            self.messages.remove(message);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.messages.contains_key(message)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
}
