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

use std::io;
use thiserror::Error;

/// Errors raised while parsing a schema document (§4.C). These are
/// configuration errors: they propagate out of setup and never reach a
/// live session.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("param {param:?} has an invalid type {found:?} (expected SELECTION or PLAIN)")]
    InvalidParamType { param: String, found: String },

    #[error("command name must not be empty")]
    EmptyCommandName,
}

/// Errors raised by the command router (§4.E, §7 "Dispatch").
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("pattern {0:?} is already registered")]
    DuplicatePattern(String),

    #[error("invalid regular expression {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no handler for the command {0:?}")]
    NothingMatched(String),

    #[error("segment index {0} out of range")]
    SegmentOutOfRange(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised by the line editor (§4.F). An unknown escape sequence
/// bubbles up as [`EditorError::UnknownEscape`], which the session layer
/// treats as "close the connection" per §7's Input error policy.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unrecognized escape sequence")]
    UnknownEscape,

    #[error("connection closed by peer")]
    Closed,
}

/// Errors that can propagate out of a session task. Per §7, these never
/// escape the session's own `tokio::task` — the server loop logs and drops
/// the connection instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Top-level error type for anything that can fail during setup (schema
/// loading, router registration) and that the host application needs to
/// handle before accepting connections.
#[derive(Debug, Error)]
pub enum CliUiError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
