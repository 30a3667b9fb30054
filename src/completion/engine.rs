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

//! Top-level completion/help entry points (§4.D): matches the typed line
//! against each command's fixed `prefix`, then walks the param tree for
//! whatever's left over.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::logic_path::LogicPath;
use crate::error::SchemaError;
use crate::schema::{self, CommandDef, HelpEntry, SchemaTop};
use crate::tokenizer::tokenize_strings;

/// Matches `inputs` against `cmd.prefix`. Returns `(completion text,
/// help text, matched, remaining unconsumed inputs)`. A command whose
/// `prefix` is empty never matches anything.
fn prefix_complete(cmd: &CommandDef, inputs: &[String], complete_next: bool) -> (String, String, bool, Vec<String>) {
    let prefix_segs: Vec<&str> = cmd.prefix.split_whitespace().collect();
    if prefix_segs.is_empty() {
        return (String::new(), String::new(), false, inputs.to_vec());
    }

    let inputs_len = inputs.len();
    for i in 0..prefix_segs.len().min(inputs_len) {
        if !prefix_segs[i].to_lowercase().starts_with(&inputs[i].to_lowercase()) {
            return (String::new(), String::new(), false, inputs.to_vec());
        }
    }

    if inputs_len > prefix_segs.len() {
        return (String::new(), String::new(), true, inputs[prefix_segs.len()..].to_vec());
    }

    if inputs_len == 0 {
        return (format!("{} ", prefix_segs[0]), prefix_segs[0].to_string(), true, Vec::new());
    }

    let last_input = &inputs[inputs_len - 1];
    if complete_next {
        if inputs_len < prefix_segs.len() {
            let seg = prefix_segs[inputs_len];
            return (format!("{seg} "), seg.to_string(), true, Vec::new());
        }
        return (String::new(), String::new(), true, Vec::new());
    }

    let seg = prefix_segs[inputs_len - 1];
    let padded = format!("{seg} ");
    let suffix = padded[last_input.len().min(padded.len())..].to_string();
    (suffix, seg.to_string(), true, Vec::new())
}

fn params_complete(cmd: &CommandDef, inputs: &[String], complete_next: bool) -> Vec<String> {
    if cmd.params.is_empty() {
        return Vec::new();
    }

    let root = LogicPath::new_root(cmd);
    root.step(inputs, complete_next);
    let comps = root.get_complete();

    for c in &comps {
        if c.is_empty() {
            return if complete_next { Vec::new() } else { vec![" ".to_string()] };
        }
        if c == " " && complete_next {
            return Vec::new();
        }
    }

    comps
}

fn params_help(cmd: &CommandDef, inputs: &[String], complete_next: bool) -> Vec<HelpEntry> {
    if cmd.params.is_empty() {
        return Vec::new();
    }

    let root = LogicPath::new_root(cmd);
    root.step(inputs, complete_next);
    root.get_helps(complete_next)
}

fn command_complete(cmd: &CommandDef, inputs: &[String], next: bool) -> Vec<String> {
    let (prefix_comp, _, matched, remaining) = prefix_complete(cmd, inputs, next);
    if !matched {
        return Vec::new();
    }
    if !prefix_comp.is_empty() {
        return vec![prefix_comp];
    }
    params_complete(cmd, &remaining, next)
}

fn command_help(cmd: &CommandDef, inputs: &[String], next: bool) -> Vec<HelpEntry> {
    let (_, prefix_help, matched, remaining) = prefix_complete(cmd, inputs, next);
    if !matched {
        return Vec::new();
    }
    if !prefix_help.is_empty() {
        return vec![HelpEntry {
            what_to_input: prefix_help,
            info: title_case(&cmd.name),
        }];
    }
    params_help(cmd, &remaining, next)
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strings_uniq(all: &[String]) -> Vec<String> {
    all.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

fn longest_common_prefix(strs: &[String]) -> String {
    if strs.is_empty() {
        return String::new();
    }
    if strs.len() == 1 {
        return strs[0].clone();
    }

    let mut prefix_len = 1usize;
    loop {
        let mut matched = 0;
        for s in strs {
            if s.len() < prefix_len || !s.starts_with(&strs[0][..prefix_len]) {
                break;
            }
            matched += 1;
        }
        if matched != strs.len() {
            break;
        }
        prefix_len += 1;
    }
    prefix_len -= 1;

    if prefix_len == 0 {
        String::new()
    } else {
        strs[0][..prefix_len].to_string()
    }
}

/// Renders help entries as two aligned columns. Approximates (rather
/// than replicates byte-for-byte) the original's `text/tabwriter`
/// formatting: entries sharing a `what_to_input` are merged into one
/// row with their `info` strings joined by `" / "`.
fn render_help_table(helps: &[HelpEntry]) -> String {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Vec<String>> = HashMap::new();

    for h in helps {
        merged.entry(h.what_to_input.clone()).or_default().push(h.info.clone());
        if !order.contains(&h.what_to_input) {
            order.push(h.what_to_input.clone());
        }
    }

    let col_width = order.iter().map(|k| k.len()).max().unwrap_or(0).max(16) + 4;

    let mut out = String::new();
    for key in &order {
        let infos = strings_uniq(merged.get(key).map(Vec::as_slice).unwrap_or_default());
        out.push_str(key);
        for _ in key.len()..col_width {
            out.push(' ');
        }
        out.push_str(&infos.join(" / "));
        out.push('\n');
    }
    out
}

/// Schema-driven completion and help, built from a parsed [`SchemaTop`].
pub struct Completer {
    schema: SchemaTop,
}

impl Completer {
    pub fn new(schema: SchemaTop) -> Self {
        Completer { schema }
    }

    pub fn from_str(raw: &str) -> Result<Self, SchemaError> {
        Ok(Self::new(schema::load_str(raw)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Ok(Self::new(schema::load_file(path)?))
    }

    /// Candidate completions for `input`: a common prefix to insert, a
    /// lone trailing space when the current token is already complete,
    /// or nothing when no command matches.
    pub fn get_completes(&self, input: &str) -> Vec<String> {
        let next = input.ends_with(' ');
        let segs = tokenize_strings(input);

        let mut completions = Vec::new();
        for cmd in &self.schema.commands {
            completions.extend(command_complete(cmd, &segs, next));
        }
        completions = strings_uniq(&completions);

        let common = longest_common_prefix(&completions);
        if !common.is_empty() {
            return vec![common];
        }

        if completions.iter().any(|c| c == " ") {
            return vec![" ".to_string()];
        }

        Vec::new()
    }

    /// Rendered help text for `input`.
    pub fn get_helps(&self, input: &str) -> String {
        let next = input.ends_with(' ');
        let segs = tokenize_strings(input);

        let mut helps = Vec::new();
        for cmd in &self.schema.commands {
            helps.extend(command_help(cmd, &segs, next));
        }

        render_help_table(&helps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
      "commands": [
        {
          "name": "show_interface",
          "prefix": "show interface",
          "param": [
            { "name": "state", "type": "SELECTION", "range": ["up", "down"] },
            { "name": "count: how many", "type": "PLAIN", "condition": ["{state} eq up"] }
          ]
        }
      ]
    }"#;

    #[test]
    fn completes_prefix_word_by_word() {
        let c = Completer::from_str(DOC).unwrap();
        assert_eq!(c.get_completes("sh"), vec!["ow "]);
        assert_eq!(c.get_completes("show "), vec!["interface "]);
    }

    #[test]
    fn completes_selection_param_after_prefix() {
        let c = Completer::from_str(DOC).unwrap();
        assert_eq!(c.get_completes("show interface u"), vec!["p "]);
    }

    #[test]
    fn dynamic_param_help_gated_by_condition() {
        let c = Completer::from_str(DOC).unwrap();
        let helps = c.get_helps("show interface up ");
        assert!(helps.contains("<count>"));
        let helps_down = c.get_helps("show interface down ");
        assert!(!helps_down.contains("<count>"));
    }

    #[test]
    fn unmatched_prefix_yields_no_completions() {
        let c = Completer::from_str(DOC).unwrap();
        assert!(c.get_completes("zzz").is_empty());
    }
}
