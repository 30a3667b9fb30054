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

//! Loads a schema document (§4.C): strips `//` comment lines, parses the
//! remaining JSON, then partitions each command's params into static and
//! dynamic groups.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use regex::Regex;

use super::model::{CommandDef, SchemaTop};
use crate::error::SchemaError;

fn comment_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*//.*$").unwrap())
}

/// Commands registered programmatically via [`register_command`], merged
/// into every schema loaded afterward — mirrors the original's
/// process-wide `cmdRegList`.
fn registered_commands() -> &'static Mutex<Vec<CommandDef>> {
    static REG: OnceLock<Mutex<Vec<CommandDef>>> = OnceLock::new();
    REG.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a command document (one `{"name": ..., "param": [...]}`
/// object, same shape as an entry of the schema's `"commands"` array) to
/// be merged into every [`load_str`]/[`load_file`] call from here on.
/// Malformed documents are silently dropped, matching the original's
/// `RegisterCmd`.
pub fn register_command(raw: &str) {
    let stripped = comment_line_re().replace_all(raw, "");
    if let Ok(cmd) = serde_json::from_str::<CommandDef>(&stripped) {
        registered_commands().lock().unwrap().push(cmd);
    }
}

fn finalize(mut top: SchemaTop) -> SchemaTop {
    top.commands
        .extend(registered_commands().lock().unwrap().iter().cloned());
    for cmd in &mut top.commands {
        cmd.partition_params();
    }
    top
}

/// Parse a schema document from a string.
pub fn load_str(raw: &str) -> Result<SchemaTop, SchemaError> {
    let stripped = comment_line_re().replace_all(raw, "");
    let top: SchemaTop = serde_json::from_str(&stripped)?;
    Ok(finalize(top))
}

/// Parse a schema document from a file on disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<SchemaTop, SchemaError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
    {
      // a trailing comment line, stripped before parsing
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
    }
    "#;

    #[test]
    fn strips_comments_and_parses() {
        let top = load_str(DOC).unwrap();
        assert_eq!(top.commands.len(), 1);
        let cmd = &top.commands[0];
        assert_eq!(cmd.name, "show_interface");
        assert_eq!(cmd.static_params, vec![0]);
        assert_eq!(cmd.dynamic_params, vec![1]);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(load_str("{ not json }").is_err());
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, DOC).unwrap();
        let top = load_file(&path).unwrap();
        assert_eq!(top.commands.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file("/nonexistent/path/schema.json").unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
