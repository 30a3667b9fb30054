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

//! Minimal telnet option negotiation and IAC framing over an async byte
//! stream (§4.G, §6). Negotiates Suppress-Go-Ahead, Echo, and window size
//! (NAWS) at connect time; everything else the peer proposes is denied.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const IAC: u8 = 255;
const CMD_SE: u8 = 240;
const CMD_SB: u8 = 250;
const CMD_WILL: u8 = 251;
const CMD_WONT: u8 = 252;
const CMD_DO: u8 = 253;
const CMD_DONT: u8 = 254;

const OPT_ECHO: u8 = 1;
const OPT_SUPPRESS_GA: u8 = 3;
const OPT_NAWS: u8 = 31;

/// Wraps a connected byte stream, stripping and answering telnet IAC
/// sequences so callers see a plain byte-at-a-time session.
pub struct TelnetStream<S> {
    inner: S,
    unix_write_mode: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> TelnetStream<S> {
    pub fn new(inner: S) -> Self {
        TelnetStream {
            inner,
            unix_write_mode: true,
        }
    }

    /// Sends the connect-time option offers: `WILL Suppress-Go-Ahead`,
    /// `WILL Echo`.
    pub async fn negotiate(&mut self) -> std::io::Result<()> {
        self.clear_screen().await?;
        self.raw_cmd(CMD_WILL, OPT_SUPPRESS_GA).await?;
        self.raw_cmd(CMD_WILL, OPT_ECHO).await?;
        Ok(())
    }

    async fn raw_cmd(&mut self, cmd: u8, opt: u8) -> std::io::Result<()> {
        self.inner.write_all(&[IAC, cmd, opt]).await
    }

    async fn deny(&mut self, cmd: u8, opt: u8) -> std::io::Result<()> {
        match cmd {
            CMD_DO => self.raw_cmd(CMD_WONT, opt).await,
            CMD_WILL => self.raw_cmd(CMD_DONT, opt).await,
            // DONT/WONT need no reply.
            _ => Ok(()),
        }
    }

    /// Reads the option byte of a subnegotiation and discards everything
    /// up to (and including) `IAC SE`.
    async fn skip_subneg(&mut self) -> std::io::Result<()> {
        let mut prev_iac = false;
        loop {
            let byte = self.inner.read_u8().await?;
            if prev_iac && byte == CMD_SE {
                return Ok(());
            }
            prev_iac = byte == IAC;
        }
    }

    /// Answers `DO NAWS` with `WILL NAWS` and a subnegotiation advertising
    /// the maximum representable window (`0xFFFF` x `0xFFFF`).
    async fn accept_naws(&mut self) -> std::io::Result<()> {
        self.raw_cmd(CMD_WILL, OPT_NAWS).await?;
        self.inner
            .write_all(&[IAC, CMD_SB, OPT_NAWS, 255, 255, 255, 255, IAC, CMD_SE])
            .await
    }

    /// Processes one telnet command byte already known to follow `IAC`.
    async fn handle_command(&mut self, cmd: u8) -> std::io::Result<()> {
        match cmd {
            CMD_SB => self.skip_subneg().await,
            CMD_DO | CMD_DONT | CMD_WILL | CMD_WONT => {
                let opt = self.inner.read_u8().await?;
                if cmd == CMD_DO && opt == OPT_NAWS {
                    self.accept_naws().await
                } else if (cmd == CMD_DO && (opt == OPT_ECHO || opt == OPT_SUPPRESS_GA))
                    || (cmd == CMD_WILL && opt == OPT_SUPPRESS_GA)
                {
                    // Already offered / harmless to allow silently.
                    Ok(())
                } else {
                    self.deny(cmd, opt).await
                }
            }
            _ => Ok(()),
        }
    }

    /// Reads the next application byte, transparently consuming and
    /// answering any telnet commands in the stream. Returns `Ok(None)` at
    /// EOF.
    pub async fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        loop {
            let byte = match self.inner.read_u8().await {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e),
            };

            if byte != IAC {
                return Ok(Some(byte));
            }

            let cmd = self.inner.read_u8().await?;
            if cmd == IAC {
                // Escaped 0xFF data byte.
                return Ok(Some(IAC));
            }
            self.handle_command(cmd).await?;
        }
    }

    /// Writes raw bytes, escaping literal `0xFF` as `IAC IAC` and, in unix
    /// write mode, normalizing bare `\n` to `\r\n`.
    pub async fn write_bytes(&mut self, data: &[u8]) -> std::io::Result<()> {
        let mut out = Vec::with_capacity(data.len());
        for &b in data {
            match b {
                IAC => out.extend_from_slice(&[IAC, IAC]),
                b'\n' if self.unix_write_mode => out.extend_from_slice(b"\r\n"),
                other => out.push(other),
            }
        }
        self.inner.write_all(&out).await?;
        self.inner.flush().await
    }

    pub async fn write_str(&mut self, s: &str) -> std::io::Result<()> {
        self.write_bytes(s.as_bytes()).await
    }

    pub async fn clear_screen(&mut self) -> std::io::Result<()> {
        self.inner.write_all(&[0x0c]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn iac_escaped_byte_passes_through_as_data() {
        let (client, mut server_side) = duplex(64);
        let mut telnet = TelnetStream::new(client);
        server_side.write_all(&[IAC, IAC, b'x']).await.unwrap();
        assert_eq!(telnet.read_byte().await.unwrap(), Some(IAC));
        assert_eq!(telnet.read_byte().await.unwrap(), Some(b'x'));
    }

    #[tokio::test]
    async fn negotiate_sends_will_sga_and_will_echo() {
        let (client, mut server_side) = duplex(64);
        let mut telnet = TelnetStream::new(client);
        telnet.negotiate().await.unwrap();

        let mut buf = [0u8; 16];
        let n = server_side.read(&mut buf).await.unwrap();
        let sent = &buf[..n];
        assert!(sent.windows(3).any(|w| w == [IAC, CMD_WILL, OPT_SUPPRESS_GA]));
        assert!(sent.windows(3).any(|w| w == [IAC, CMD_WILL, OPT_ECHO]));
    }

    #[tokio::test]
    async fn write_normalizes_bare_newline_to_crlf() {
        let (client, mut server_side) = duplex(64);
        let mut telnet = TelnetStream::new(client);
        telnet.write_str("a\nb").await.unwrap();
        let mut buf = [0u8; 16];
        let n = server_side.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"a\r\nb");
    }
}
