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

//! The narrow interface a session wires the editor and router through
//! (§4.G): completion, help, dispatch, and a stubbed auth hook.

use std::io::Write;

use crate::completion::Completer;
use crate::error::RouterError;
use crate::router;

/// What a session needs from the rest of the crate to serve one
/// connection. The default blanket impl below wires a [`Completer`]
/// straight to the process-wide router registry, which is the only
/// implementation most hosts need.
pub trait Backend: Send + Sync {
    fn complete(&self, input: &str) -> Vec<String>;
    fn help(&self, input: &str) -> String;
    fn dispatch(&self, command: &str, writer: &mut dyn Write) -> Result<(), RouterError>;

    /// Always callable; the default accepts unconditionally. Real
    /// authentication is left to the host application.
    fn auth(&self, _user: &str, _pass: &str) -> bool {
        true
    }
}

/// A [`Backend`] over a schema-driven [`Completer`] and the process-wide
/// router registry.
pub struct SchemaBackend {
    completer: Completer,
}

impl SchemaBackend {
    pub fn new(completer: Completer) -> Self {
        SchemaBackend { completer }
    }
}

impl Backend for SchemaBackend {
    fn complete(&self, input: &str) -> Vec<String> {
        self.completer.get_completes(input)
    }

    fn help(&self, input: &str) -> String {
        self.completer.get_helps(input)
    }

    fn dispatch(&self, command: &str, writer: &mut dyn Write) -> Result<(), RouterError> {
        router::mux(command, writer)
    }
}
