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

//! An embeddable interactive command-line interface exposed over a
//! telnet-like byte stream.
//!
//! Three subsystems interact to make that happen:
//!
//! 1. A schema-driven completion/help engine ([`schema`], [`completion`])
//!    that explores the tree of permissible parameter sequences a command
//!    document describes, offering tab-completions and `?`-help at any
//!    point in a partially typed line.
//! 2. A raw-byte line editor ([`editor`]) that turns a stream of
//!    keystrokes — including cursor movement, history navigation, and
//!    editing — into complete submitted lines.
//! 3. A regex-routed command dispatcher ([`router`]) that matches a
//!    submitted line against registered patterns and runs either a plain
//!    handler or a progress-streaming one.
//!
//! [`session`] wires the three together over a minimal telnet-protocol
//! front-end; [`logging`] and [`error`] are the ambient stack shared
//! across all of them.

pub mod completion;
pub mod editor;
pub mod error;
pub mod history;
pub mod logging;
pub mod router;
pub mod schema;
pub mod session;
pub mod tokenizer;

pub use completion::Completer;
pub use editor::LineState;
pub use error::CliUiError;
pub use history::HistoryRing;
pub use session::{Backend, SchemaBackend, Server, ServerConfig};
