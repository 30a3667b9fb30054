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

//! The logic-path exploration tree (§3, §4.D): walks every permissible
//! sequence of params a command schema allows, given the tokens typed so
//! far, and collects completions/help from whichever leaves the walk
//! reaches.
//!
//! The root node carries no param. Each call to [`LogicPath::step`]
//! grows one level of children: the next static param (if any) plus
//! every dynamic param whose condition currently holds, then recurses
//! into those children with the remaining input. A node that rejects its
//! input value marks itself `invalid`, pruning its own subtree from
//! [`LogicPath::get_complete`]/[`LogicPath::get_helps`] without
//! affecting siblings.

use std::cell::{Cell, RefCell};

use super::condition::condition_check;
use super::context::Context;
use crate::schema::{CommandDef, HelpEntry, ParamDef};

pub struct LogicPath<'a> {
    command: &'a CommandDef,
    param_idx: Option<usize>,
    context: RefCell<Context>,
    static_param_pos: usize,
    invalid: Cell<bool>,
    input_val: RefCell<String>,
    children: RefCell<Vec<LogicPath<'a>>>,
}

impl<'a> LogicPath<'a> {
    pub fn new_root(command: &'a CommandDef) -> Self {
        LogicPath {
            command,
            param_idx: None,
            context: RefCell::new(Context::new()),
            static_param_pos: 0,
            invalid: Cell::new(false),
            input_val: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
        }
    }

    fn new_child(
        command: &'a CommandDef,
        param_idx: usize,
        static_param_pos: usize,
        context: Context,
    ) -> Self {
        LogicPath {
            command,
            param_idx: Some(param_idx),
            context: RefCell::new(context),
            static_param_pos,
            invalid: Cell::new(false),
            input_val: RefCell::new(String::new()),
            children: RefCell::new(Vec::new()),
        }
    }

    fn param(&self) -> Option<&'a ParamDef> {
        self.param_idx.map(|idx| &self.command.params[idx])
    }

    fn spawn_children(&self, static_param_pos: usize, context: &Context) {
        let mut children = self.children.borrow_mut();

        if let Some(&first_static) = self.command.static_params.first() {
            children.push(LogicPath::new_child(self.command, first_static, 0, context.clone()));
        }
        for &idx in &self.command.dynamic_params {
            if condition_check(&self.command.params[idx], context) {
                children.push(LogicPath::new_child(self.command, idx, static_param_pos, context.clone()));
            }
        }
    }

    /// Consume `values` one at a time, growing the tree as it goes.
    /// `next` mirrors whether the raw input ended in whitespace (i.e.
    /// whether we're completing the *next* param rather than refining
    /// the last one typed).
    pub fn step(&self, values: &[String], next: bool) {
        let Some(param_idx) = self.param_idx else {
            self.spawn_children(0, &self.context.borrow());
            for child in self.children.borrow().iter() {
                child.step(values, next);
            }
            return;
        };

        if values.is_empty() {
            return;
        }

        let value = &values[0];
        *self.input_val.borrow_mut() = value.clone();

        {
            let mut ctx = self.context.borrow_mut();
            let name = self.command.params[param_idx].name_desc.name.clone();
            let updated = ctx.push(name, value.clone());
            *ctx = updated;
        }

        let param = &self.command.params[param_idx];
        if !param.check_value(value) {
            if values.len() != 1 || next {
                self.invalid.set(true);
            }
            return;
        }
        if values.len() == 1 && !next {
            return;
        }

        let is_static = self.command.static_params.contains(&param_idx);
        let next_static_pos = self.static_param_pos + 1;

        {
            let ctx_snapshot = self.context.borrow().clone();
            let mut children = self.children.borrow_mut();

            if is_static && next_static_pos < self.command.static_params.len() {
                children.push(LogicPath::new_child(
                    self.command,
                    self.command.static_params[next_static_pos],
                    next_static_pos,
                    ctx_snapshot.clone(),
                ));
            }
            for &idx in &self.command.dynamic_params {
                if condition_check(&self.command.params[idx], &ctx_snapshot) {
                    children.push(LogicPath::new_child(
                        self.command,
                        idx,
                        self.static_param_pos,
                        ctx_snapshot.clone(),
                    ));
                }
            }
        }

        if values.len() > 1 {
            if self.children.borrow().is_empty() {
                self.invalid.set(true);
                return;
            }
            for child in self.children.borrow().iter() {
                child.step(&values[1..], next);
            }
        }
    }

    pub fn get_complete(&self) -> Vec<String> {
        if self.invalid.get() {
            return Vec::new();
        }

        let children = self.children.borrow();
        if children.is_empty() {
            match self.param() {
                Some(p) => p.get_completions(&self.input_val.borrow()),
                None => Vec::new(),
            }
        } else {
            children.iter().flat_map(|c| c.get_complete()).collect()
        }
    }

    pub fn get_helps(&self, next: bool) -> Vec<HelpEntry> {
        if self.invalid.get() {
            return Vec::new();
        }

        let children = self.children.borrow();
        if children.is_empty() {
            if !next || self.input_val.borrow().is_empty() {
                match self.param() {
                    Some(p) => p.get_helps(),
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            }
        } else {
            children.iter().flat_map(|c| c.get_helps(next)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_str;

    const DOC: &str = r#"{
      "commands": [
        {
          "name": "show_interface",
          "param": [
            { "name": "state", "type": "SELECTION", "range": ["up", "down"] },
            { "name": "count: how many", "type": "PLAIN", "condition": ["{state} eq up"] }
          ]
        }
      ]
    }"#;

    fn values(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dynamic_param_only_appears_once_its_condition_holds() {
        let top = load_str(DOC).unwrap();
        let cmd = &top.commands[0];

        let root = LogicPath::new_root(cmd);
        root.step(&values(&["up", ""]), true);
        let helps = root.get_helps(true);
        assert!(helps.iter().any(|h| h.what_to_input == "<count>"));

        let root_down = LogicPath::new_root(cmd);
        root_down.step(&values(&["down", ""]), true);
        let helps_down = root_down.get_helps(true);
        assert!(!helps_down.iter().any(|h| h.what_to_input == "<count>"));
    }

    #[test]
    fn invalid_value_prunes_its_subtree() {
        let top = load_str(DOC).unwrap();
        let cmd = &top.commands[0];

        let root = LogicPath::new_root(cmd);
        root.step(&values(&["sideways", "5"]), false);
        assert!(root.get_complete().is_empty());
    }
}
