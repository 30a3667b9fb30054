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

//! The telnet front-end (§4.G): protocol framing, the backend seam, and
//! the per-connection server loop.

pub mod backend;
pub mod server;
pub mod telnet;

pub use backend::{Backend, SchemaBackend};
pub use server::{Server, ServerConfig};
pub use telnet::TelnetStream;
