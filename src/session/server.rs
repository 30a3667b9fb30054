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

//! The listener and per-connection session loop (§4.G, §5): one
//! `tokio::task` per accepted connection, synchronous editor/completion/
//! router calls within that task, no state shared across tasks.

use std::sync::Arc;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use crate::editor::keys::{self, AfterEsc, CsiStep, EscapeAction};
use crate::editor::LineState;
use crate::history::DEFAULT_CAPACITY;
use crate::session::backend::Backend;
use crate::session::telnet::TelnetStream;

/// Programmatic configuration for the front-end: prompt/banner text,
/// listen address, history capacity, and the backend a session dispatches
/// through. File-based process configuration is left to the host
/// application.
pub struct ServerConfig {
    pub get_prompt: Box<dyn Fn() -> String + Send + Sync>,
    pub get_banner: Box<dyn Fn() -> String + Send + Sync>,
    pub listen_on: String,
    pub history_capacity: usize,
    pub backend: Arc<dyn Backend>,
}

impl ServerConfig {
    pub fn new(listen_on: impl Into<String>, backend: Arc<dyn Backend>) -> Self {
        ServerConfig {
            get_prompt: Box::new(|| "cli".to_string()),
            get_banner: Box::new(String::new),
            listen_on: listen_on.into(),
            history_capacity: DEFAULT_CAPACITY,
            backend,
        }
    }
}

fn exit_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(exit|quit)\s*$").unwrap())
}

pub struct Server {
    config: Arc<ServerConfig>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Server {
            config: Arc::new(config),
        }
    }

    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.listen_on).await?;
        tracing::info!(addr = %self.config.listen_on, "listening");

        loop {
            let (socket, peer) = listener.accept().await?;
            let config = self.config.clone();
            tokio::spawn(async move {
                tracing::info!(%peer, "connection accepted");
                if let Err(err) = serve_connection(socket, config).await {
                    tracing::warn!(%peer, error = %err, "session ended with an I/O error");
                } else {
                    tracing::info!(%peer, "session closed");
                }
            });
        }
    }
}

async fn prompt_line(config: &ServerConfig) -> String {
    format!("{}# ", (config.get_prompt)())
}

async fn serve_connection<S>(socket: S, config: Arc<ServerConfig>) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut telnet = TelnetStream::new(socket);
    telnet.negotiate().await?;
    telnet.clear_screen().await?;

    let banner = (config.get_banner)();
    if !banner.is_empty() {
        telnet.write_str(&banner).await?;
        telnet.write_str("\n").await?;
    }
    telnet.write_str(&prompt_line(&config).await).await?;

    let mut line = LineState::new(config.history_capacity);

    loop {
        let Some(byte) = telnet.read_byte().await? else {
            return Ok(());
        };

        if !keys::is_trigger(byte) {
            if byte == keys::LF {
                continue;
            }
            let echoed = line.insert(&[byte]);
            telnet.write_bytes(&echoed).await?;
            continue;
        }

        match byte {
            keys::CR => {
                telnet.write_str("\n").await?;
                if line.is_empty() {
                    telnet.write_str(&prompt_line(&config).await).await?;
                    continue;
                }

                let command = line.take_line_and_reset();
                if exit_re().is_match(&command) {
                    return Ok(());
                }

                let mut out = Vec::new();
                let _ = config.backend.dispatch(&command, &mut out);
                telnet.write_bytes(&out).await?;
                telnet.write_str("\n").await?;

                line.push_history(command);
                telnet.write_str(&prompt_line(&config).await).await?;
            }

            keys::TAB => {
                if !line.is_cursor_at_end() {
                    continue;
                }
                let input = line.line();
                let completions = config.backend.complete(&input);
                match completions.as_slice() {
                    [] => {}
                    [only] => {
                        let echoed = line.insert(only.as_bytes());
                        telnet.write_bytes(&echoed).await?;
                    }
                    many => {
                        telnet.write_str("\n").await?;
                        telnet.write_str(&many.join(" ")).await?;
                        telnet.write_str("\n").await?;
                        telnet.write_str(&prompt_line(&config).await).await?;
                        telnet.write_str(&line.line()).await?;
                    }
                }
            }

            keys::QM => {
                let help = config.backend.help(&line.line());
                if !help.is_empty() {
                    telnet.write_str("\n").await?;
                    telnet.write_str(&help).await?;
                    telnet.write_str("\n").await?;
                    telnet.write_str(&prompt_line(&config).await).await?;
                    telnet.write_str(&line.line()).await?;
                }
            }

            keys::BS | keys::DEL => {
                if let Some(echoed) = line.backspace() {
                    telnet.write_bytes(&echoed).await?;
                }
            }

            keys::ETX | keys::EOT | keys::SUB => return Ok(()),

            keys::CTRL_A => {
                let echoed = line.cursor_home();
                telnet.write_bytes(&echoed).await?;
            }

            keys::CTRL_E => {
                let echoed = line.cursor_end();
                telnet.write_bytes(&echoed).await?;
            }

            keys::CTRL_U => {
                let echoed = line.clear_all();
                telnet.write_bytes(&echoed).await?;
            }

            keys::ESC => {
                let Some(next) = telnet.read_byte().await? else {
                    return Ok(());
                };
                match keys::decode_after_esc(next) {
                    AfterEsc::Close => return Ok(()),
                    AfterEsc::Csi => {
                        let Some(csi_byte) = telnet.read_byte().await? else {
                            return Ok(());
                        };
                        let action = match keys::decode_csi(csi_byte) {
                            CsiStep::Done(action) => action,
                            CsiStep::NeedTilde(pending) => {
                                let Some(tilde) = telnet.read_byte().await? else {
                                    return Ok(());
                                };
                                keys::decode_tilde(tilde, pending)
                            }
                        };
                        apply_escape_action(action, &mut line, &mut telnet).await?;
                    }
                }
            }

            // NUL and anything else reaching here: no-op.
            _ => {}
        }
    }
}

async fn apply_escape_action<S>(
    action: EscapeAction,
    line: &mut LineState,
    telnet: &mut TelnetStream<S>,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let echoed = match action {
        EscapeAction::HistoryPrev => line.history_checkout(true),
        EscapeAction::HistoryNext => line.history_checkout(false),
        EscapeAction::CursorRight => line.cursor_move(1).unwrap_or_default(),
        EscapeAction::CursorLeft => line.cursor_move(-1).unwrap_or_default(),
        EscapeAction::Home => line.cursor_home(),
        EscapeAction::End => line.cursor_end(),
        EscapeAction::DeleteAhead => line.delete_ahead().unwrap_or_default(),
        EscapeAction::None => Vec::new(),
    };
    if !echoed.is_empty() {
        telnet.write_bytes(&echoed).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    struct EchoBackend;
    impl Backend for EchoBackend {
        fn complete(&self, input: &str) -> Vec<String> {
            if input.is_empty() {
                vec!["show".to_string()]
            } else {
                vec![]
            }
        }
        fn help(&self, _input: &str) -> String {
            "no help".to_string()
        }
        fn dispatch(
            &self,
            command: &str,
            writer: &mut dyn std::io::Write,
        ) -> Result<(), crate::error::RouterError> {
            let _ = write!(writer, "ran: {command}");
            Ok(())
        }
    }

    #[tokio::test]
    async fn full_line_round_trip_dispatches_and_reprompts() {
        let (client, mut peer) = duplex(4096);
        let config = Arc::new(ServerConfig::new("127.0.0.1:0", Arc::new(EchoBackend)));

        let task = tokio::spawn(async move {
            let _ = serve_connection(client, config).await;
        });

        peer.write_all(b"hi\r").await.unwrap();
        peer.write_all(&[keys::ETX]).await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = tokio::time::timeout(std::time::Duration::from_millis(200), peer.read(&mut chunk))
                .await
                .unwrap_or(Ok(0))
                .unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let _ = task.await;

        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("ran: hi"));
    }
}
