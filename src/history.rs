/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Bounded circular buffer of submitted lines, with a navigation cursor
//! (§4.B). Capacity is fixed at construction time; de-duplicates
//! consecutive submissions whose whitespace-stripped forms match.

/// Default capacity used by [`crate::session::ServerConfig`] when the host
/// doesn't configure one explicitly.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct HistoryRing {
    capacity: usize,
    entries: Vec<String>,
    /// Whitespace/newline-stripped form of the most recently appended line,
    /// used for consecutive-duplicate detection.
    last_stripped: Option<String>,
    count: usize,
    first: usize,
    last: usize,
    /// -1 (`None`) means "not navigating"; `Some(0)` is the most recent
    /// entry, higher values walk backward in time.
    cursor: Option<usize>,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
            last_stripped: None,
            count: 0,
            first: 0,
            last: 0,
            cursor: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn strip(line: &str) -> String {
        line.chars().filter(|c| *c != ' ' && *c != '\n').collect()
    }

    /// Append `line`. No-ops (beyond resetting the cursor) when `line`'s
    /// stripped form matches the last appended stripped form.
    pub fn append(&mut self, line: impl Into<String>) {
        let line = line.into();
        let stripped = Self::strip(&line);

        if self.last_stripped.as_deref() == Some(stripped.as_str()) {
            self.cursor = None;
            return;
        }

        if self.count < self.capacity {
            if self.count != 0 {
                self.last = (self.last + 1) % self.capacity;
            }
            if self.entries.len() <= self.last {
                self.entries.push(line);
            } else {
                self.entries[self.last] = line;
            }
            self.count += 1;
        } else {
            self.first = (self.first + 1) % self.capacity;
            self.last = (self.last + 1) % self.capacity;
            self.entries[self.last] = line;
        }

        self.last_stripped = Some(stripped);
        self.cursor = None;
    }

    /// Move toward older entries, clamped at the oldest. Returns whether
    /// content is available to read.
    pub fn pos_back(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        let next = match self.cursor {
            None => 0,
            Some(c) => (c + 1).min(self.count - 1),
        };
        self.cursor = Some(next);
        true
    }

    /// Move toward newer entries; below 0 sets the cursor to "not
    /// navigating" (no content).
    pub fn pos_forward(&mut self) -> bool {
        match self.cursor {
            None => false,
            Some(0) => {
                self.cursor = None;
                false
            }
            Some(c) => {
                self.cursor = Some(c - 1);
                true
            }
        }
    }

    /// Read the entry the cursor currently points at, or `""` if not
    /// navigating.
    pub fn read(&self) -> &str {
        match self.cursor {
            None => "",
            Some(c) => {
                let idx = (self.last + self.capacity - c) % self.capacity;
                self.entries.get(idx).map(String::as_str).unwrap_or("")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_consecutive_submissions() {
        let mut ring = HistoryRing::new(4);
        ring.append("show interface up");
        assert_eq!(ring.count(), 1);
        ring.append("show  interface up\n"); // same when space/newline stripped
        assert_eq!(ring.count(), 1);
    }

    #[test]
    fn ring_bound_never_exceeds_capacity() {
        let mut ring = HistoryRing::new(3);
        for i in 0..10 {
            ring.append(format!("cmd{i}"));
        }
        assert!(ring.count() <= ring.capacity());
        assert_eq!(ring.count(), 3);
    }

    #[test]
    fn navigation_walks_backward_then_forward() {
        let mut ring = HistoryRing::new(4);
        ring.append("a");
        ring.append("b");
        ring.append("c");

        assert!(ring.pos_back());
        assert_eq!(ring.read(), "c");
        assert!(ring.pos_back());
        assert_eq!(ring.read(), "b");
        assert!(ring.pos_back());
        assert_eq!(ring.read(), "a");
        // Clamped at oldest.
        assert!(ring.pos_back());
        assert_eq!(ring.read(), "a");

        assert!(ring.pos_forward());
        assert_eq!(ring.read(), "b");
        assert!(ring.pos_forward());
        assert_eq!(ring.read(), "c");
        assert!(!ring.pos_forward());
        assert_eq!(ring.read(), "");
    }

    #[test]
    fn append_resets_cursor() {
        let mut ring = HistoryRing::new(4);
        ring.append("a");
        ring.append("b");
        ring.pos_back();
        ring.pos_back();
        ring.append("c");
        assert_eq!(ring.read(), "");
    }

    #[test]
    fn wraps_around_when_full() {
        let mut ring = HistoryRing::new(2);
        ring.append("a");
        ring.append("b");
        ring.append("c"); // evicts "a"
        assert!(ring.pos_back());
        assert_eq!(ring.read(), "c");
        assert!(ring.pos_back());
        assert_eq!(ring.read(), "b");
    }
}
