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

//! A minimal telnet CLI serving one schema-driven command: `show
//! interface <up|down> [count]`. Connect with `nc 127.0.0.1 2323` or any
//! telnet client.

use std::io::Write;
use std::sync::Arc;

use telnet_shell::logging::{self, DisplayPreference, TracingConfig};
use telnet_shell::router::{self, Input};
use telnet_shell::session::{SchemaBackend, Server, ServerConfig};
use telnet_shell::Completer;

const SCHEMA: &str = r#"{
  "commands": [
    {
      "name": "show_interface",
      "prefix": "show interface",
      "comment": "Show interface admin/oper state, optionally limited to N lines",
      "param": [
        { "name": "state: admin/oper state", "type": "SELECTION", "range": ["up", "down"] },
        { "name": "count: how many lines to show", "type": "PLAIN", "condition": ["state eq up"] }
      ]
    }
  ]
}"#;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    logging::init(TracingConfig::new_display(DisplayPreference::Stdout))
        .expect("tracing setup is infallible for the Display writer config");

    router::register_handler(
        "show_interface",
        r"^show interface (up|down)(?: (\d+))?$",
        Box::new(|input: &Input, w: &mut dyn Write| {
            let state = input.get_segment(0).unwrap_or("unknown");
            if input.segment_exists(1) {
                let count = input.get_segment(1).unwrap();
                let _ = writeln!(w, "interface is {state}, showing {count} lines");
            } else {
                let _ = writeln!(w, "interface is {state}");
            }
        }),
    )
    .expect("pattern is registered exactly once at startup");

    let completer = Completer::from_str(SCHEMA).expect("schema document is valid");
    let backend = Arc::new(SchemaBackend::new(completer));

    let mut config = ServerConfig::new("127.0.0.1:2323", backend);
    config.get_prompt = Box::new(|| "router".to_string());
    config.get_banner = Box::new(|| "Welcome to the demo CLI.".to_string());

    Server::new(config).run().await
}
