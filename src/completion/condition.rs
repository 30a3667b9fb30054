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

//! Evaluates a dynamic param's `condition` strings against a [`Context`]
//! (§3, §4.D).
//!
//! Each condition is one of:
//! - `*` — always satisfied.
//! - `<toCheck> [not] eq <given>` — name- or value-mode equality.
//! - `<toCheck> [not] in <given...>` — name- or value-mode membership.
//!
//! `toCheck` is in *name mode* when it's a bare identifier, and *value
//! mode* when wrapped in `{}` (the braces are stripped before
//! comparison). A leading `-` inside `toCheck` switches to *relative
//! mode*, comparing against the single most recently accepted
//! `(name, value)` pair instead of the whole context.

use std::sync::OnceLock;

use regex::Regex;

use super::context::Context;
use crate::schema::ParamDef;

fn eq_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\{?\S+\}?)\s*(?:(not)\s+)?eq\s+(\S+)\s*").unwrap())
}

fn in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\{?\S+\}?)\s*(?:(not)\s+)?in\s+(.*)").unwrap())
}

fn name_mode(to_check: &str) -> bool {
    !(to_check.starts_with('{') && to_check.ends_with('}'))
}

fn strip_braces(to_check: &str) -> &str {
    to_check.trim_matches(|c| c == '{' || c == '}')
}

fn check_equal(context: &Context, to_check: &str, given: &str, not_eq: bool) -> bool {
    let name_mode = name_mode(to_check);
    let to_check = strip_braces(to_check);

    let equal = if to_check.starts_with('-') {
        // Offset-number syntax (`-2`, etc.) isn't supported, matching the original.
        match context.last() {
            None => return not_eq,
            Some((last_name, last_value)) => {
                (name_mode && last_name == given) || (!name_mode && last_value == given)
            }
        }
    } else if name_mode {
        return not_eq == (to_check != given);
    } else {
        context.lookup(to_check).iter().any(|v| v == given)
    };

    not_eq == !equal
}

fn check_in(context: &Context, to_check: &str, given: &str, not_in: bool) -> bool {
    let name_mode = name_mode(to_check);
    let to_check = strip_braces(to_check);
    let givens: Vec<&str> = given.split_whitespace().collect();

    let in_givens = if to_check.starts_with('-') {
        match context.last() {
            None => return not_in,
            Some((last_name, last_value)) => givens
                .iter()
                .any(|g| (name_mode && *g == last_name) || (!name_mode && *g == last_value)),
        }
    } else if name_mode {
        givens.iter().any(|g| *g == to_check)
    } else {
        let exists = context.lookup(to_check);
        exists.iter().any(|e| givens.iter().any(|g| g == e))
    };

    in_givens == !not_in
}

/// Whether `param`'s conditions all hold against `context`.
pub fn condition_check(param: &ParamDef, context: &Context) -> bool {
    if param.condition.is_empty() {
        return true;
    }

    if param.unique && context.count(&param.name_desc.name) > 0 {
        return false;
    }

    for c in &param.condition {
        if c == "*" {
            continue;
        }

        if let Some(caps) = eq_re().captures(c) {
            let to_check = caps.get(1).unwrap().as_str();
            let given = caps.get(3).unwrap().as_str();
            let not_eq = caps.get(2).is_some();
            if !check_equal(context, to_check, given, not_eq) {
                return false;
            }
            continue;
        }

        if let Some(caps) = in_re().captures(c) {
            let to_check = caps.get(1).unwrap().as_str();
            let given = caps.get(3).unwrap().as_str();
            let not_in = caps.get(2).is_some();
            if !check_in(context, to_check, given, not_in) {
                return false;
            }
            continue;
        }

        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParamNameDesc, ParamType};

    fn param(condition: &[&str]) -> ParamDef {
        ParamDef {
            name_desc: ParamNameDesc {
                name: "count".into(),
                desc: String::new(),
            },
            param_type: ParamType::Plain,
            range: None,
            optional: false,
            condition: condition.iter().map(|s| s.to_string()).collect(),
            unique: false,
        }
    }

    #[test]
    fn wildcard_always_holds() {
        assert!(condition_check(&param(&["*"]), &Context::new()));
    }

    #[test]
    fn name_mode_equality_is_literal() {
        // bare-identifier `eq` compares the literal token, not context state.
        let ctx = Context::new().push("state", "up");
        assert!(condition_check(&param(&["state eq state"]), &ctx));
        assert!(!condition_check(&param(&["state eq other"]), &ctx));
    }

    #[test]
    fn value_mode_equality_consults_context() {
        let ctx = Context::new().push("state", "up");
        assert!(condition_check(&param(&["{state} eq up"]), &ctx));
        assert!(!condition_check(&param(&["{state} eq down"]), &ctx));
    }

    #[test]
    fn relative_mode_uses_last_pushed_pair() {
        let ctx = Context::new().push("state", "up");
        assert!(condition_check(&param(&["{-} eq up"]), &ctx));
        assert!(!condition_check(&param(&["{-} eq down"]), &ctx));
    }

    #[test]
    fn not_in_negates_membership() {
        let ctx = Context::new().push("state", "up");
        assert!(condition_check(&param(&["{state} not in down maint"]), &ctx));
        assert!(!condition_check(&param(&["{state} not in up down"]), &ctx));
    }

    #[test]
    fn unique_param_rejected_once_already_present() {
        let mut p = param(&["*"]);
        p.unique = true;
        let ctx = Context::new().push("count", "5");
        assert!(!condition_check(&p, &ctx));
    }

    #[test]
    fn malformed_condition_fails_closed() {
        assert!(!condition_check(&param(&["not a condition"]), &Context::new()));
    }
}
