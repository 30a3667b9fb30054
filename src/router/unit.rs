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

//! The process-wide command registry and dispatch (§4.E, §5).
//!
//! One [`Unit`] per registered regex pattern, keyed in a single map
//! guarded by an `RwLock`: registration takes the write half, [`mux`]
//! (dispatch) takes the read half. Units may carry a default handler, a
//! progress handler, or both; both run, in that order, on every match.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{OnceLock, RwLock};

use regex::Regex;

use super::input::Input;
use super::progress::{call_progress_handler, ProgressHandler};
use crate::error::RouterError;

/// `(input, writer) -> ()`.
pub type DefaultHandler = Box<dyn Fn(&Input, &mut dyn Write) + Send + Sync>;

pub struct Unit {
    name: String,
    pattern: String,
    compiled: Regex,
    default_handler: Option<DefaultHandler>,
    progress_handler: Option<ProgressHandler>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[derive(Default)]
struct Registry {
    units: HashMap<String, Unit>,
}

fn registry() -> &'static RwLock<Registry> {
    static REG: OnceLock<RwLock<Registry>> = OnceLock::new();
    REG.get_or_init(|| RwLock::new(Registry::default()))
}

fn insert_unit(name: &str, pattern: &str) -> Result<(), RouterError> {
    let mut reg = registry().write().unwrap();
    if reg.units.contains_key(pattern) {
        return Err(RouterError::DuplicatePattern(pattern.to_string()));
    }

    let compiled = Regex::new(pattern).map_err(|source| RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    reg.units.insert(
        pattern.to_string(),
        Unit {
            name: name.to_string(),
            pattern: pattern.to_string(),
            compiled,
            default_handler: None,
            progress_handler: None,
        },
    );

    Ok(())
}

/// Register a default (non-streaming) handler for `pattern`.
pub fn register_handler(name: &str, pattern: &str, handler: DefaultHandler) -> Result<(), RouterError> {
    insert_unit(name, pattern)?;
    registry().write().unwrap().units.get_mut(pattern).unwrap().default_handler = Some(handler);
    Ok(())
}

/// Register a progress-streaming handler for `pattern`.
pub fn register_progress_handler(
    name: &str,
    pattern: &str,
    handler: ProgressHandler,
) -> Result<(), RouterError> {
    insert_unit(name, pattern)?;
    registry().write().unwrap().units.get_mut(pattern).unwrap().progress_handler = Some(handler);
    Ok(())
}

/// Dispatches `command` to every unit whose pattern matches, invoking
/// each match's progress handler (if any) then its default handler (if
/// any). Writes a "no handler" notice and returns
/// [`RouterError::NothingMatched`] when nothing matched.
pub fn mux(command: &str, writer: &mut dyn Write) -> Result<(), RouterError> {
    let reg = registry().read().unwrap();
    let mut handler_cnt = 0;

    for unit in reg.units.values() {
        let Some(caps) = unit.compiled.captures(command) else {
            continue;
        };

        let sub_matches: Vec<String> = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|mm| mm.as_str().to_string()).unwrap_or_default())
            .collect();
        let input = Input::new(command.to_string(), sub_matches, unit.name.clone());

        if let Some(handler) = &unit.progress_handler {
            let _ = call_progress_handler(handler, &input, writer);
        }
        if let Some(handler) = &unit.default_handler {
            handler(&input, writer);
        }

        handler_cnt += 1;
    }

    if handler_cnt == 0 {
        let _ = write!(writer, "No handler for the command \"{command}\"!");
        return Err(RouterError::NothingMatched(command.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn dispatches_to_matching_pattern_with_capture_groups() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        register_handler(
            "set_state",
            r"^set state (\w+) (\d+)$",
            Box::new(move |input: &Input, w: &mut dyn Write| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                assert_eq!(input.get_segment(0).unwrap(), "up");
                assert_eq!(input.get_segment(1).unwrap(), "5");
                let _ = write!(w, "ok");
            }),
        )
        .unwrap();

        let mut buf = Vec::new();
        mux("set state up 5", &mut buf).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(String::from_utf8(buf).unwrap(), "ok");
    }

    #[test]
    fn duplicate_pattern_is_rejected() {
        let pattern = r"^dup_test_pattern$";
        register_handler("a", pattern, Box::new(|_, _| {})).unwrap();
        let err = register_handler("b", pattern, Box::new(|_, _| {})).unwrap_err();
        assert!(matches!(err, RouterError::DuplicatePattern(_)));
    }

    #[test]
    fn no_match_writes_notice_and_errors() {
        let mut buf = Vec::new();
        let err = mux("totally-unregistered-command-xyz", &mut buf).unwrap_err();
        assert!(matches!(err, RouterError::NothingMatched(_)));
        assert!(String::from_utf8(buf).unwrap().contains("No handler for the command"));
    }
}
