use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::buf::{padding_to, MAX_ARRAY_LENGTH, MAX_BODY_LENGTH};
use crate::error::{ErrorKind, Result};
use crate::proto::Endianness;
use crate::sasl::{sasl_recv, Auth, SaslRequest, SaslResponse};
use crate::utils::trim_line_ending;
use crate::{Cursor, Error, RecvBuf};

use super::Address;

/// The state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportState {
    /// Connected, the initial nul byte not yet sent.
    SendNul,
    /// Nul byte sent, the AUTH line not yet sent.
    SendAuth,
    /// AUTH line sent, awaiting the server response.
    AwaitOk,
    /// Server accepted, the BEGIN line not yet sent.
    SendBegin,
    /// Authenticated; message framing is active.
    Ready,
    /// The connection failed or was closed.
    Closed,
}

impl TransportState {
    fn as_str(&self) -> &'static str {
        match self {
            TransportState::SendNul => "send-nul",
            TransportState::SendAuth => "send-auth",
            TransportState::AwaitOk => "await-ok",
            TransportState::SendBegin => "send-begin",
            TransportState::Ready => "ready",
            TransportState::Closed => "closed",
        }
    }
}

impl fmt::Display for TransportState {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection to a D-Bus endpoint.
///
/// Drives the client side of the transport state machine: connect, the
/// initial nul byte, the line-based SASL exchange, and once ready the
/// per-message framing.
///
/// # Examples
///
/// ```no_run
/// use minibus::connection::Transport;
/// use minibus::sasl::Auth;
///
/// # #[tokio::main(flavor = "current_thread")] async fn main() -> minibus::Result<()> {
/// let mut transport = Transport::session_bus().await?;
///
/// let mut buf = [0; 20];
/// transport.handshake(Auth::external_from_uid(&mut buf)).await?;
/// # Ok(()) }
/// ```
pub struct Transport {
    stream: UnixStream,
    state: TransportState,
}

impl Transport {
    /// Connect to the session bus.
    pub async fn session_bus() -> Result<Self> {
        Self::connect(&Address::session_bus()?).await
    }

    /// Connect to the system bus.
    pub async fn system_bus() -> Result<Self> {
        Self::connect(&Address::system_bus()?).await
    }

    /// Connect to the given address.
    pub async fn connect(address: &Address) -> Result<Self> {
        let stream = match address {
            Address::Unix(path) => {
                tracing::trace!(target: crate::TRACE, ?path, "connecting");
                UnixStream::connect(path).await?
            }
        };

        Ok(Self::from_stream(stream))
    }

    /// Construct a transport from an already-opened stream.
    ///
    /// The stream is assumed to be freshly opened: the handshake has not
    /// been performed yet.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            state: TransportState::SendNul,
        }
    }

    /// Perform the authentication handshake.
    ///
    /// Progresses nul byte, `AUTH EXTERNAL <uid-hex>`, the server reply and
    /// `BEGIN`. Any server reply other than an `OK` line fails with a
    /// bad-message error and closes the connection.
    pub async fn handshake(&mut self, auth: Auth<'_>) -> Result<()> {
        let request = SaslRequest::Auth(auth);

        loop {
            match self.state {
                TransportState::SendNul => {
                    self.stream.write_all(b"\0").await?;
                    self.state = TransportState::SendAuth;
                }
                TransportState::SendAuth => {
                    let mut line = Vec::with_capacity(64);

                    match &request {
                        SaslRequest::Auth(Auth::External(external)) => {
                            line.extend_from_slice(b"AUTH EXTERNAL ");
                            line.extend_from_slice(external);
                        }
                    }

                    line.extend_from_slice(b"\r\n");
                    self.stream.write_all(&line).await?;
                    self.state = TransportState::AwaitOk;
                }
                TransportState::AwaitOk => {
                    let line = recv_line(&mut self.stream).await?;

                    match sasl_recv(trim_line_ending(&line)) {
                        Ok(SaslResponse::Ok(guid)) => {
                            tracing::trace!(target: crate::TRACE, ?guid, "authenticated");
                            self.state = TransportState::SendBegin;
                        }
                        Err(error) => {
                            self.state = TransportState::Closed;
                            return Err(error);
                        }
                    }
                }
                TransportState::SendBegin => {
                    self.stream.write_all(b"BEGIN\r\n").await?;
                    self.state = TransportState::Ready;
                    return Ok(());
                }
                state => {
                    return Err(Error::new(ErrorKind::InvalidState(state.as_str())));
                }
            }
        }
    }

    /// Send the complete wire form of a single message.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_ready()?;
        self.stream.write_all(bytes).await?;
        Ok(())
    }

    /// Receive a single complete message into `recv`.
    pub async fn recv_message(&mut self, recv: &mut RecvBuf) -> Result<()> {
        self.ensure_ready()?;
        recv_message_into(&mut self.stream, recv).await
    }

    /// Split an authenticated transport into its read and write halves.
    pub(crate) fn into_split(self) -> Result<(OwnedReadHalf, OwnedWriteHalf)> {
        self.ensure_ready()?;
        Ok(self.stream.into_split())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state != TransportState::Ready {
            return Err(Error::new(ErrorKind::InvalidState(self.state.as_str())));
        }

        Ok(())
    }
}

/// Receive a single line ending in `\n`.
///
/// The server does not send anything beyond the response line until the
/// client has sent `BEGIN`, so reading never consumes message bytes.
async fn recv_line(stream: &mut UnixStream) -> Result<Vec<u8>> {
    let mut line = Vec::with_capacity(64);
    let mut byte = [0u8; 1];

    loop {
        stream.read_exact(&mut byte).await?;
        line.push(byte[0]);

        if byte[0] == b'\n' {
            return Ok(line);
        }

        if line.len() > 4096 {
            return Err(Error::new(ErrorKind::InvalidSasl));
        }
    }
}

/// Receive one complete message: the fixed 16 bytes, then the field array,
/// its padding and the body, sized from the parsed prefix.
///
/// Partial reads are accumulated by `read_exact`.
pub(crate) async fn recv_message_into<R>(read: &mut R, recv: &mut RecvBuf) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    recv.clear();

    let buf = recv.buf_mut();
    buf.resize(16, 0);
    read.read_exact(&mut buf[..]).await?;

    let endianness = match buf[0] {
        b'l' => Endianness::LITTLE,
        b'B' => Endianness::BIG,
        _ => return Err(Error::new(ErrorKind::BadMessage)),
    };

    let mut cursor = Cursor::new(&buf[4..], endianness);
    let body_length = u64::from(cursor.take_u32()?);
    let _serial = cursor.take_u32()?;
    let fields_length = u64::from(cursor.take_u32()?);

    if body_length > MAX_BODY_LENGTH {
        return Err(Error::new(ErrorKind::BodyTooLong(body_length)));
    }

    if fields_length > MAX_ARRAY_LENGTH {
        return Err(Error::new(ErrorKind::ArrayTooLong(fields_length)));
    }

    let fields_length = fields_length as usize;
    let padding = padding_to(16 + fields_length, 8);
    let total = fields_length + padding + body_length as usize;

    let buf = recv.buf_mut();
    buf.resize(16 + total, 0);
    read.read_exact(&mut buf[16..]).await?;

    tracing::trace!(target: crate::TRACE, len = 16 + total, "received message");
    Ok(())
}
