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

//! Context: the ordered list of `(param name, value)` pairs a
//! [`crate::completion::logic_path::LogicPath`] has accepted so far along
//! one branch of the exploration tree (§3, §9).
//!
//! Implemented as an immutable, `Rc`-shared cons-list rather than a
//! cloned `Vec`: forking a path when the tree branches only bumps a
//! reference count on the shared tail, instead of copying every
//! previously-accepted param.

use std::rc::Rc;

struct Node {
    name: String,
    value: String,
    parent: Context,
}

/// A persistent list of accepted `(name, value)` pairs. Cloning a
/// `Context` is O(1); [`Context::push`] returns a new head without
/// mutating (or even touching) the original.
#[derive(Clone, Default)]
pub struct Context(Option<Rc<Node>>);

impl Context {
    pub fn new() -> Self {
        Context(None)
    }

    /// Returns a new context with `(name, value)` appended after
    /// everything already in `self`.
    #[must_use]
    pub fn push(&self, name: impl Into<String>, value: impl Into<String>) -> Context {
        Context(Some(Rc::new(Node {
            name: name.into(),
            value: value.into(),
            parent: self.clone(),
        })))
    }

    /// The most recently pushed `(name, value)` pair, if any.
    pub fn last(&self) -> Option<(&str, &str)> {
        self.0.as_deref().map(|n| (n.name.as_str(), n.value.as_str()))
    }

    /// How many times `name` has been pushed.
    pub fn count(&self, name: &str) -> usize {
        let mut cnt = 0;
        let mut cur = &self.0;
        while let Some(node) = cur {
            if node.name == name {
                cnt += 1;
            }
            cur = &node.parent.0;
        }
        cnt
    }

    /// All values pushed under `name`, oldest first.
    pub fn lookup(&self, name: &str) -> Vec<String> {
        let mut values = Vec::new();
        let mut cur = &self.0;
        while let Some(node) = cur {
            if node.name == name {
                values.push(node.value.clone());
            }
            cur = &node.parent.0;
        }
        values.reverse();
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_last() {
        assert!(Context::new().last().is_none());
    }

    #[test]
    fn push_does_not_mutate_the_original() {
        let base = Context::new().push("state", "up");
        let forked_a = base.push("count", "5");
        let forked_b = base.push("count", "10");

        assert_eq!(base.last(), Some(("state", "up")));
        assert_eq!(forked_a.last(), Some(("count", "5")));
        assert_eq!(forked_b.last(), Some(("count", "10")));
    }

    #[test]
    fn count_and_lookup_walk_the_whole_chain() {
        let ctx = Context::new()
            .push("iface", "eth0")
            .push("iface", "eth1")
            .push("state", "up");

        assert_eq!(ctx.count("iface"), 2);
        assert_eq!(ctx.lookup("iface"), vec!["eth0", "eth1"]);
        assert_eq!(ctx.count("missing"), 0);
        assert!(ctx.lookup("missing").is_empty());
    }
}
