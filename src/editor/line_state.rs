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

//! The in-line buffer and cursor a session edits a byte at a time (§4.F).
//!
//! Every mutating method returns the bytes the session should echo back
//! to the peer rather than writing anywhere itself — `LineState` has no
//! I/O of its own, which keeps it unit-testable without a socket.

use crate::history::HistoryRing;

pub struct LineState {
    buf: Vec<u8>,
    pos: usize,
    history: HistoryRing,
}

impl LineState {
    pub fn new(history_capacity: usize) -> Self {
        LineState {
            buf: Vec::new(),
            pos: 0,
            history: HistoryRing::new(history_capacity),
        }
    }

    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_cursor_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Insert `bytes` at the cursor. Returns the bytes to echo: the
    /// inserted text, followed — if the cursor wasn't at the end — by the
    /// shifted tail and a run of backspaces to put the cursor back where
    /// it logically belongs.
    pub fn insert(&mut self, bytes: &[u8]) -> Vec<u8> {
        if self.is_cursor_at_end() {
            self.buf.extend_from_slice(bytes);
            self.pos += bytes.len();
            return bytes.to_vec();
        }

        let tail = self.buf.split_off(self.pos);
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(&tail);
        self.pos += bytes.len();

        let mut out = bytes.to_vec();
        out.extend_from_slice(&tail);
        out.extend(std::iter::repeat(0x08u8).take(tail.len()));
        out
    }

    /// `Backspace`/`Delete` (erase before cursor). `None` at the start of
    /// the line.
    pub fn backspace(&mut self) -> Option<Vec<u8>> {
        if self.pos == 0 {
            return None;
        }

        if !self.is_cursor_at_end() {
            self.pos -= 1;
            let end_pos = self.pos;
            self.buf.remove(end_pos);
            let tail = self.buf[end_pos..].to_vec();
            let goback = self.buf.len() - end_pos;

            let mut out = vec![0x08u8];
            out.extend_from_slice(&tail);
            out.push(b' ');
            out.push(0x08);
            out.extend(std::iter::repeat(0x08u8).take(goback));
            Some(out)
        } else {
            self.buf.pop();
            self.pos -= 1;
            Some(vec![0x08, b' ', 0x08])
        }
    }

    /// `ESC [ 3 ~` (delete the byte under/ahead of the cursor). `None` at
    /// the end of the line.
    pub fn delete_ahead(&mut self) -> Option<Vec<u8>> {
        if self.pos >= self.buf.len() {
            return None;
        }

        if self.pos == self.buf.len() - 1 {
            self.buf.truncate(self.pos);
            Some(vec![b' ', 0x08])
        } else {
            self.buf.remove(self.pos);
            let tail = self.buf[self.pos..].to_vec();
            let goback = tail.len() + 1;
            let mut out = tail;
            out.push(b' ');
            out.extend(std::iter::repeat(0x08u8).take(goback));
            Some(out)
        }
    }

    /// Moves the cursor by `delta` bytes, clamped to `[0, len]`. Moving
    /// left echoes backspaces; moving right re-echoes the bytes passed
    /// over (there's no local echo to rely on). `None` if out of bounds.
    pub fn cursor_move(&mut self, delta: isize) -> Option<Vec<u8>> {
        let dst = self.pos as isize + delta;
        if dst < 0 || dst > self.buf.len() as isize {
            return None;
        }

        let out = match delta.cmp(&0) {
            std::cmp::Ordering::Less => vec![0x08u8; (-delta) as usize],
            std::cmp::Ordering::Greater => self.buf[self.pos..self.pos + delta as usize].to_vec(),
            std::cmp::Ordering::Equal => Vec::new(),
        };
        self.pos = dst as usize;
        Some(out)
    }

    pub fn cursor_home(&mut self) -> Vec<u8> {
        self.cursor_move(-(self.pos as isize)).unwrap_or_default()
    }

    pub fn cursor_end(&mut self) -> Vec<u8> {
        let delta = self.buf.len() as isize - self.pos as isize;
        self.cursor_move(delta).unwrap_or_default()
    }

    /// `Ctrl-U`: erase visually back to the cursor and drop the whole
    /// buffer. If the cursor wasn't at the end, the tail past it is
    /// dropped without being erased on screen — matching the quirk of the
    /// routine this is grounded on.
    pub fn clear_all(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        for _ in 0..self.pos {
            out.extend_from_slice(b"\x08 \x08");
        }
        self.buf.clear();
        self.pos = 0;
        out
    }

    /// Walks history backward (`previous = true`) or forward, wiping the
    /// current line and replacing it with the entry landed on (or leaving
    /// it empty, at the forward boundary).
    pub fn history_checkout(&mut self, previous: bool) -> Vec<u8> {
        if self.history.count() == 0 {
            return Vec::new();
        }

        let ok = if previous {
            self.history.pos_back()
        } else {
            self.history.pos_forward()
        };

        let mut out = Vec::new();
        for _ in 0..self.buf.len() {
            out.extend_from_slice(b"\x08 \x08");
        }
        self.buf.clear();
        self.pos = 0;

        if ok {
            let content = self.history.read().as_bytes().to_vec();
            out.extend(self.insert(&content));
        }
        out
    }

    /// Takes the current line out of the buffer and resets it, ready for
    /// dispatch. Does not touch history — call [`Self::push_history`]
    /// once dispatch has run.
    pub fn take_line_and_reset(&mut self) -> String {
        let line = self.line();
        self.buf.clear();
        self.pos = 0;
        line
    }

    pub fn push_history(&mut self, line: impl Into<String>) {
        self.history.append(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_at_end_is_a_plain_append() {
        let mut ls = LineState::new(8);
        let echoed = ls.insert(b"show");
        assert_eq!(echoed, b"show");
        assert_eq!(ls.line(), "show");
        assert_eq!(ls.pos(), 4);
    }

    #[test]
    fn insert_mid_buffer_shifts_tail_and_rewinds_cursor() {
        let mut ls = LineState::new(8);
        ls.insert(b"sho interface");
        ls.cursor_move(-10); // back to just after "sho"
        let echoed = ls.insert(b"w");
        assert_eq!(ls.line(), "show interface");
        // echoes "w" + " interface" + 10 backspaces
        assert_eq!(echoed.len(), 1 + " interface".len() + 10);
    }

    #[test]
    fn backspace_at_end_pops_last_byte() {
        let mut ls = LineState::new(8);
        ls.insert(b"abc");
        let echoed = ls.backspace().unwrap();
        assert_eq!(ls.line(), "ab");
        assert_eq!(echoed, b"\x08 \x08");
    }

    #[test]
    fn backspace_at_start_of_line_is_a_no_op() {
        let mut ls = LineState::new(8);
        assert!(ls.backspace().is_none());
    }

    #[test]
    fn delete_ahead_mid_buffer_removes_under_cursor() {
        let mut ls = LineState::new(8);
        ls.insert(b"abcd");
        ls.cursor_move(-4);
        ls.delete_ahead();
        assert_eq!(ls.line(), "bcd");
        assert_eq!(ls.pos(), 0);
    }

    #[test]
    fn delete_ahead_at_end_of_line_is_a_no_op() {
        let mut ls = LineState::new(8);
        ls.insert(b"abc");
        assert!(ls.delete_ahead().is_none());
    }

    #[test]
    fn cursor_move_clamps_to_buffer_bounds() {
        let mut ls = LineState::new(8);
        ls.insert(b"ab");
        assert!(ls.cursor_move(5).is_none());
        assert!(ls.cursor_move(-5).is_none());
        assert!(ls.cursor_move(-1).is_some());
        assert_eq!(ls.pos(), 1);
    }

    #[test]
    fn clear_all_drops_the_buffer() {
        let mut ls = LineState::new(8);
        ls.insert(b"abc");
        ls.clear_all();
        assert!(ls.is_empty());
        assert_eq!(ls.pos(), 0);
    }

    #[test]
    fn history_checkout_replaces_current_line() {
        let mut ls = LineState::new(8);
        ls.insert(b"first");
        ls.push_history(ls.line());
        ls.take_line_and_reset();

        ls.insert(b"second");
        ls.push_history(ls.line());
        ls.take_line_and_reset();

        ls.history_checkout(true);
        assert_eq!(ls.line(), "second");
        ls.history_checkout(true);
        assert_eq!(ls.line(), "first");
        ls.history_checkout(false);
        assert_eq!(ls.line(), "second");
    }

    #[test]
    fn history_checkout_with_no_entries_is_a_no_op() {
        let mut ls = LineState::new(8);
        let echoed = ls.history_checkout(true);
        assert!(echoed.is_empty());
    }
}
