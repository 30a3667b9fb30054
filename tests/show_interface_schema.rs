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

//! End-to-end scenarios over the worked `show interface` schema: a
//! static SELECTION param `state` over `{up, down}` and a dynamic PLAIN
//! param `count` admissible only when `state eq up`.

use std::io::Write;
use std::sync::Once;

use telnet_shell::router::{self, Input};
use telnet_shell::Completer;

const SCHEMA: &str = r#"{
  "commands": [
    {
      "name": "show_interface",
      "prefix": "show interface",
      "param": [
        { "name": "state", "type": "SELECTION", "range": ["up", "down"] },
        { "name": "count: how many to show", "type": "PLAIN", "condition": ["state eq up"] }
      ]
    }
  ]
}"#;

fn completer() -> Completer {
    Completer::from_str(SCHEMA).unwrap()
}

#[test]
fn completes_the_bare_prefix() {
    assert_eq!(completer().get_completes(""), vec!["show "]);
}

#[test]
fn completes_a_partial_prefix_word() {
    assert_eq!(completer().get_completes("sh"), vec!["ow "]);
}

#[test]
fn completes_the_second_prefix_word() {
    assert_eq!(completer().get_completes("show "), vec!["interface "]);
}

#[test]
fn completes_the_selection_param_with_both_options() {
    let mut completions = completer().get_completes("show interface ");
    completions.sort();
    assert_eq!(completions, vec!["down ", "up "]);
}

#[test]
fn plain_param_offers_no_completions_but_does_offer_help() {
    let c = completer();
    assert!(c.get_completes("show interface up ").is_empty());

    let helps = c.get_helps("show interface up ");
    assert!(helps.contains("<count>"));
}

#[test]
fn dynamic_param_absent_when_its_condition_fails() {
    let c = completer();
    let helps = c.get_helps("show interface down ");
    assert!(!helps.contains("<count>"));
}

static ROUTER_INIT: Once = Once::new();

#[test]
fn mux_dispatches_with_the_expected_capture_groups() {
    ROUTER_INIT.call_once(|| {
        router::register_handler(
            "show_interface",
            r"^show interface (up|down)(?: (\d+))?$",
            Box::new(|input: &Input, w: &mut dyn Write| {
                assert_eq!(input.get_segment(0).unwrap(), "up");
                assert_eq!(input.get_segment(1).unwrap(), "5");
                let _ = write!(w, "interface up, showing 5");
            }),
        )
        .unwrap();
    });

    let mut out = Vec::new();
    router::mux("show interface up 5", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "interface up, showing 5");
}
