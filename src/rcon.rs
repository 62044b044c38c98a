//! TCP client for the remote console protocol
//!
//! Implements the Source-RCON framing the game server speaks: every packet
//! is `i32 LE length | i32 LE request id | i32 LE type | body | 0x00 0x00`.
//! A session is authenticate-once, then request/acknowledge per command.
//! Request ids are a monotonic counter; `-1` in an auth response means the
//! password was rejected.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::ConsoleConfig;
use crate::error::{CommandError, SessionError};
use crate::traits::{ConsoleSession, SessionFactory};

const SERVERDATA_RESPONSE_VALUE: i32 = 0;
const SERVERDATA_EXECCOMMAND: i32 = 2;
const SERVERDATA_AUTH_RESPONSE: i32 = 2;
const SERVERDATA_AUTH: i32 = 3;

/// Practical body limit of the protocol; longer lines are rejected before
/// touching the wire
const MAX_BODY_LEN: usize = 4096;

/// id (4) + type (4) + two terminating null bytes
const PACKET_OVERHEAD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Packet {
    id: i32,
    kind: i32,
    body: String,
}

fn encode_packet(id: i32, kind: i32, body: &str) -> Vec<u8> {
    let size = (body.len() + PACKET_OVERHEAD) as i32;
    let mut buf = Vec::with_capacity(body.len() + PACKET_OVERHEAD + 4);
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

fn decode_packet<R: Read>(reader: &mut R) -> io::Result<Packet> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = i32::from_le_bytes(len_buf);

    let min = PACKET_OVERHEAD as i32;
    let max = (MAX_BODY_LEN + PACKET_OVERHEAD) as i32;
    if len < min || len > max {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("packet length {len} out of range"),
        ));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;

    let mut id_buf = [0u8; 4];
    id_buf.copy_from_slice(&payload[0..4]);
    let mut kind_buf = [0u8; 4];
    kind_buf.copy_from_slice(&payload[4..8]);

    if payload[payload.len() - 2..] != [0, 0] {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "packet missing terminating null bytes",
        ));
    }

    let body = String::from_utf8_lossy(&payload[8..payload.len() - 2]).into_owned();
    Ok(Packet {
        id: i32::from_le_bytes(id_buf),
        kind: i32::from_le_bytes(kind_buf),
        body,
    })
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Session factory connecting to a real remote console over TCP
///
/// Endpoint, credentials and timeouts come from the injected
/// [`ConsoleConfig`].
#[derive(Debug, Clone)]
pub struct TcpConsoleClient {
    config: ConsoleConfig,
}

impl TcpConsoleClient {
    /// Create a client for the given console endpoint
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }

    /// The connection configuration
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

impl SessionFactory for TcpConsoleClient {
    type Session = TcpConsoleSession;

    fn open(&self) -> Result<TcpConsoleSession, SessionError> {
        let endpoint = self.config.endpoint();
        let addr = endpoint
            .to_socket_addrs()
            .map_err(|e| SessionError::ConnectFailed {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| SessionError::ConnectFailed {
                endpoint: endpoint.clone(),
                reason: "no addresses resolved".to_string(),
            })?;

        let stream = TcpStream::connect_timeout(&addr, self.config.connect_timeout()).map_err(
            |e| {
                if is_timeout(&e) {
                    SessionError::Timeout {
                        timeout_ms: self.config.connect_timeout_ms,
                    }
                } else {
                    SessionError::ConnectFailed {
                        endpoint: endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            },
        )?;

        let command_timeout = self.config.command_timeout();
        stream
            .set_read_timeout(Some(command_timeout))
            .and_then(|_| stream.set_write_timeout(Some(command_timeout)))
            .map_err(|e| SessionError::ConnectFailed {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let mut session = TcpConsoleSession {
            stream,
            next_id: 1,
            command_timeout_ms: self.config.command_timeout_ms,
        };
        session.authenticate(&self.config.password)?;
        Ok(session)
    }
}

/// An authenticated console session over one TCP connection
#[derive(Debug)]
pub struct TcpConsoleSession {
    stream: TcpStream,
    next_id: i32,
    command_timeout_ms: u64,
}

impl TcpConsoleSession {
    fn take_id(&mut self) -> i32 {
        let id = self.next_id;
        // Stay positive: -1 is the auth-rejection sentinel
        self.next_id = if self.next_id == i32::MAX {
            1
        } else {
            self.next_id + 1
        };
        id
    }

    fn authenticate(&mut self, password: &str) -> Result<(), SessionError> {
        let id = self.take_id();
        self.stream
            .write_all(&encode_packet(id, SERVERDATA_AUTH, password))
            .map_err(|e| self.io_to_session(e))?;

        // Some servers send an empty response value before the auth response
        loop {
            let packet = decode_packet(&mut self.stream).map_err(|e| self.io_to_session(e))?;
            match packet.kind {
                SERVERDATA_RESPONSE_VALUE => continue,
                SERVERDATA_AUTH_RESPONSE => {
                    if packet.id == -1 {
                        return Err(SessionError::AuthenticationFailed);
                    }
                    if packet.id != id {
                        return Err(SessionError::Protocol {
                            reason: format!(
                                "auth response for request {}, expected {}",
                                packet.id, id
                            ),
                        });
                    }
                    return Ok(());
                }
                other => {
                    return Err(SessionError::Protocol {
                        reason: format!("unexpected packet type {other} during authentication"),
                    });
                }
            }
        }
    }

    fn io_to_session(&self, err: io::Error) -> SessionError {
        if is_timeout(&err) {
            SessionError::Timeout {
                timeout_ms: self.command_timeout_ms,
            }
        } else {
            SessionError::Protocol {
                reason: err.to_string(),
            }
        }
    }

    fn io_to_command(&self, err: io::Error) -> CommandError {
        if is_timeout(&err) {
            CommandError::Timeout {
                timeout_ms: self.command_timeout_ms,
            }
        } else {
            CommandError::SendFailed {
                reason: err.to_string(),
            }
        }
    }
}

impl ConsoleSession for TcpConsoleSession {
    fn send(&mut self, command: &str) -> Result<String, CommandError> {
        if command.len() > MAX_BODY_LEN {
            return Err(CommandError::Oversized {
                len: command.len(),
                limit: MAX_BODY_LEN,
            });
        }

        let id = self.take_id();
        self.stream
            .write_all(&encode_packet(id, SERVERDATA_EXECCOMMAND, command))
            .map_err(|e| self.io_to_command(e))?;

        let response = decode_packet(&mut self.stream).map_err(|e| self.io_to_command(e))?;
        if response.kind != SERVERDATA_RESPONSE_VALUE {
            return Err(CommandError::SendFailed {
                reason: format!("unexpected packet type {} in command response", response.kind),
            });
        }
        if response.id != id {
            return Err(CommandError::NotAcknowledged {
                expected: id,
                actual: response.id,
            });
        }
        Ok(response.body)
    }

    fn close(self) -> Result<(), SessionError> {
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|e| SessionError::CloseFailed {
                reason: e.to_string(),
            })
    }
}
