use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Weak};

use tokio::io::AsyncWriteExt;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::connection::{recv_message_into, Address, Transport};
use crate::decode::signature_of;
use crate::error::{ErrorKind, Result};
use crate::name::{BusName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::org_freedesktop_dbus::{self, NameFlag, NameReply};
use crate::proto::{Endianness, Flags};
use crate::sasl::Auth;
use crate::signature::SignatureBuf;
use crate::{
    BodyBuf, Cursor, Decode, Encode, Error, Message, MessageKind, OwnedMessage, RecvBuf, SendBuf,
};

#[cfg(test)]
mod tests;

/// An asynchronous D-Bus client.
///
/// The client owns the connection. One background task owns the read half
/// of the socket and advances the framing state machine; any number of
/// callers may share the client and keep calls outstanding concurrently,
/// each suspending until the dispatcher completes it with the reply
/// matching its serial.
///
/// Cloning the client is cheap and shares the connection.
///
/// # Examples
///
/// ```no_run
/// use minibus::{BusName, Client, MemberName, ObjectPath};
///
/// const DESTINATION: &BusName = BusName::new_const("org.freedesktop.DBus");
/// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
/// const GET_ID: &MemberName = MemberName::new_const("GetId");
///
/// # #[tokio::main(flavor = "current_thread")] async fn main() -> minibus::Result<()> {
/// let client = Client::session_bus().await?;
///
/// let id = client
///     .method_call(PATH, GET_ID)
///     .with_destination(DESTINATION)
///     .call::<String>()
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
    name: Arc<str>,
}

struct Shared {
    submit: Mutex<Submit>,
}

struct Submit {
    send: SendBuf,
    writer: OwnedWriteHalf,
    pending: HashMap<u32, Awaiter>,
    closed: bool,
}

struct Awaiter {
    expected: SignatureBuf,
    tx: oneshot::Sender<Result<Reply>>,
}

/// The decoded header context and raw body of a completed reply.
pub struct Reply {
    signature: SignatureBuf,
    body: Vec<u8>,
    endianness: Endianness,
}

impl Reply {
    /// The signature of the reply body.
    #[inline]
    pub fn signature(&self) -> &SignatureBuf {
        &self.signature
    }

    /// A cursor over the reply body.
    #[inline]
    pub fn body(&self) -> Cursor<'_> {
        Cursor::new(&self.body, self.endianness)
    }
}

impl Client {
    /// Connect to the session bus using the default configuration.
    #[inline]
    pub async fn session_bus() -> Result<Self> {
        ClientBuilder::new().connect().await
    }

    /// Connect to the system bus using the default configuration.
    #[inline]
    pub async fn system_bus() -> Result<Self> {
        ClientBuilder::new().system_bus().connect().await
    }

    /// The unique bus name of this connection, as returned by `Hello`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start building a method call.
    pub fn method_call<'a>(
        &'a self,
        path: &'a ObjectPath,
        member: &'a MemberName,
    ) -> Call<'a> {
        Call {
            client: self,
            path,
            member,
            interface: None,
            destination: None,
            flags: Flags::default(),
            body: BodyBuf::new(),
        }
    }

    /// Request a well-known name on the bus.
    ///
    /// Returns the bus reply code: primary owner, queued, exists, or
    /// already owner.
    pub async fn request_name(&self, name: &BusName, flags: NameFlag) -> Result<NameReply> {
        self.method_call(org_freedesktop_dbus::PATH, org_freedesktop_dbus::REQUEST_NAME)
            .with_destination(org_freedesktop_dbus::DESTINATION)
            .store(name)?
            .store(&flags)?
            .call::<NameReply>()
            .await
    }

    async fn submit(
        &self,
        call: &Call<'_>,
        awaiter: Option<SignatureBuf>,
    ) -> Result<Option<oneshot::Receiver<Result<Reply>>>> {
        let mut submit = self.shared.submit.lock().await;
        let submit = &mut *submit;

        if submit.closed {
            return Err(Error::new(ErrorKind::ConnectionClosed));
        }

        // Serial allocation, the write, and awaiter registration are one
        // critical section: the read task contends on the same lock, so an
        // awaiter is always registered before its reply can be matched.
        let serial = submit.send.next_serial()?;

        let mut message = Message::method_call(call.path, call.member, serial)
            .with_flags(call.flags)
            .with_body(&call.body);

        if let Some(interface) = call.interface {
            message = message.with_interface(interface);
        }

        if let Some(destination) = call.destination {
            message = message.with_destination(destination);
        }

        submit.send.write_message(&message)?;
        submit.writer.write_all(submit.send.get()).await?;

        tracing::trace!(
            target: crate::TRACE,
            serial = serial.get(),
            member = call.member.as_str(),
            "sent method call"
        );

        Ok(awaiter.map(|expected| {
            let (tx, rx) = oneshot::channel();
            submit.pending.insert(serial.get(), Awaiter { expected, tx });
            rx
        }))
    }
}

/// A method call being built.
///
/// Constructed through [`Client::method_call`]; body arguments are appended
/// with [`store()`], and the call is submitted with [`call()`] or
/// [`send()`].
///
/// [`store()`]: Self::store
/// [`call()`]: Self::call
/// [`send()`]: Self::send
pub struct Call<'a> {
    client: &'a Client,
    path: &'a ObjectPath,
    member: &'a MemberName,
    interface: Option<&'a InterfaceName>,
    destination: Option<&'a BusName>,
    flags: Flags,
    body: BodyBuf,
}

impl<'a> Call<'a> {
    /// Set the interface of the call.
    pub fn with_interface(mut self, interface: &'a InterfaceName) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Set the destination of the call.
    pub fn with_destination(mut self, destination: &'a BusName) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Modify the flags of the call.
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Append an argument to the body of the call.
    pub fn store<T>(mut self, value: &T) -> Result<Self>
    where
        T: ?Sized + Encode,
    {
        self.body.store(value)?;
        Ok(self)
    }

    /// Submit the call and await the reply, decoded as `T`.
    ///
    /// The reply is matched by serial, not by arrival order. A reply whose
    /// body signature does not equal the signature of `T` fails the call;
    /// an error reply fails the call with the peer's error name and
    /// message. Dropping the returned future cancels the call: the reply is
    /// silently discarded when it arrives.
    ///
    /// Timeouts are a caller-side concern, applied by wrapping the returned
    /// future, for example in [`tokio::time::timeout`].
    pub async fn call<T>(self) -> Result<T>
    where
        T: for<'de> Decode<'de>,
    {
        let expected = signature_of::<T>()?;

        let Some(rx) = self.client.submit(&self, Some(expected)).await? else {
            // Unreachable: an awaiter was requested.
            return Err(Error::new(ErrorKind::ConnectionClosed));
        };

        let reply = match rx.await {
            Ok(reply) => reply?,
            Err(_) => return Err(Error::new(ErrorKind::ConnectionClosed)),
        };

        let mut body = reply.body();
        body.read::<T>()
    }

    /// Submit the call without expecting a reply.
    ///
    /// Sets the `NO_REPLY_EXPECTED` flag and registers no awaiter.
    pub async fn send(mut self) -> Result<()> {
        self.flags = self.flags | Flags::NO_REPLY_EXPECTED;
        self.client.submit(&self, None).await?;
        Ok(())
    }
}

/// Builder for a [`Client`].
pub struct ClientBuilder {
    address: Option<Address>,
    system: bool,
    uid: Option<u32>,
    handler: Option<mpsc::UnboundedSender<OwnedMessage>>,
}

impl ClientBuilder {
    /// Construct a new builder targeting the session bus.
    pub fn new() -> Self {
        Self {
            address: None,
            system: false,
            uid: None,
            handler: None,
        }
    }

    /// Target the session bus (the default).
    pub fn session_bus(mut self) -> Self {
        self.system = false;
        self.address = None;
        self
    }

    /// Target the system bus.
    pub fn system_bus(mut self) -> Self {
        self.system = true;
        self.address = None;
        self
    }

    /// Target an explicit address.
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Authenticate as the given uid instead of the uid of the process.
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Register a handler hook for incoming method calls and signals.
    ///
    /// Every received `method_call` and `signal` message is forwarded to
    /// the sender; higher-level object registries consume this hook. When
    /// no handler is registered such messages are dropped.
    pub fn handler(mut self, handler: mpsc::UnboundedSender<OwnedMessage>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Connect and authenticate, then perform the `Hello` handshake.
    pub async fn connect(self) -> Result<Client> {
        let transport = match &self.address {
            Some(address) => Transport::connect(address).await?,
            None if self.system => Transport::system_bus().await?,
            None => Transport::session_bus().await?,
        };

        self.from_transport(transport).await
    }

    /// Authenticate over an already-connected stream.
    pub async fn connect_stream(self, stream: UnixStream) -> Result<Client> {
        self.from_transport(Transport::from_stream(stream)).await
    }

    async fn from_transport(self, mut transport: Transport) -> Result<Client> {
        let mut buf = [0; 20];

        let auth = match self.uid {
            Some(uid) => Auth::external_from_u32(&mut buf, uid),
            #[cfg(all(unix, feature = "libc"))]
            None => Auth::external_from_uid(&mut buf),
            #[cfg(not(all(unix, feature = "libc")))]
            None => return Err(Error::new(ErrorKind::InvalidState("auth-uid-unavailable"))),
        };

        transport.handshake(auth).await?;

        let (read, writer) = transport.into_split()?;

        let shared = Arc::new(Shared {
            submit: Mutex::new(Submit {
                send: SendBuf::new(),
                writer,
                pending: HashMap::new(),
                closed: false,
            }),
        });

        tokio::spawn(read_task(read, Arc::downgrade(&shared), self.handler));

        let client = Client {
            shared,
            name: Arc::from(""),
        };

        let name = client
            .method_call(org_freedesktop_dbus::PATH, org_freedesktop_dbus::HELLO)
            .with_destination(org_freedesktop_dbus::DESTINATION)
            .call::<String>()
            .await?;

        tracing::debug!(target: crate::TRACE, name, "connected");

        Ok(Client {
            name: Arc::from(name.as_str()),
            ..client
        })
    }
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The read loop: owns the read half of the socket, frames messages and
/// dispatches them until the stream errors or every client handle is gone.
async fn read_task(
    mut read: OwnedReadHalf,
    shared: Weak<Shared>,
    handler: Option<mpsc::UnboundedSender<OwnedMessage>>,
) {
    let mut recv = RecvBuf::new();

    let error = loop {
        if let Err(error) = recv_message_into(&mut read, &mut recv).await {
            break error;
        }

        // Unknown and invalid message types are skipped before header
        // parsing; conforming implementations must ignore them.
        if !matches!(recv.get().get(1).copied(), Some(1..=4)) {
            tracing::trace!(target: crate::TRACE, "ignoring message of unknown type");
            continue;
        }

        let message = match recv.read_message() {
            Ok(message) => message,
            Err(error) => break error,
        };

        let Some(shared) = shared.upgrade() else {
            return;
        };

        match message.kind {
            MessageKind::MethodReturn { reply_serial } => {
                let reply = Ok(Reply {
                    signature: message.signature().to_owned(),
                    body: message.raw_body().to_vec(),
                    endianness: message.endianness,
                });

                complete(&shared, reply_serial, message.signature().to_owned(), reply).await;
            }
            MessageKind::Error {
                error,
                reply_serial,
            } => {
                // By convention the first argument, if it is a string, is
                // an error message.
                let text = if message.signature().as_bytes().starts_with(b"s") {
                    message.body().read::<&str>().unwrap_or("")
                } else {
                    ""
                };

                let reply = Err(Error::new(ErrorKind::ResponseError(
                    error.as_str().into(),
                    text.into(),
                )));

                complete(&shared, reply_serial, SignatureBuf::empty(), reply).await;
            }
            MessageKind::MethodCall { .. } | MessageKind::Signal { .. } => {
                if let Some(handler) = &handler {
                    if handler.send(message.to_owned()).is_err() {
                        tracing::trace!(target: crate::TRACE, "handler hook closed");
                    }
                } else {
                    tracing::trace!(
                        target: crate::TRACE,
                        serial = message.serial().get(),
                        "no handler registered, dropping message"
                    );
                }
            }
        }
    };

    tracing::debug!(target: crate::TRACE, %error, "read loop terminated");

    // Complete all outstanding callers with a connection-closed error and
    // refuse further submissions.
    let Some(shared) = shared.upgrade() else {
        return;
    };

    let mut submit = shared.submit.lock().await;
    submit.closed = true;

    for (_, awaiter) in submit.pending.drain() {
        let _ = awaiter
            .tx
            .send(Err(Error::new(ErrorKind::ConnectionClosed)));
    }
}

/// Complete the awaiter registered for `reply_serial`, if any.
///
/// A reply for an unknown serial is dropped silently: either no call was
/// ever registered for it, or the caller has cancelled and its record was
/// already discarded.
async fn complete(
    shared: &Shared,
    reply_serial: NonZeroU32,
    signature: SignatureBuf,
    reply: Result<Reply>,
) {
    let mut submit = shared.submit.lock().await;

    let Some(awaiter) = submit.pending.remove(&reply_serial.get()) else {
        tracing::trace!(
            target: crate::TRACE,
            reply_serial = reply_serial.get(),
            "dropping reply for unknown serial"
        );
        return;
    };

    let reply = match reply {
        Ok(reply) if signature != awaiter.expected => {
            Err(Error::new(ErrorKind::UnexpectedVariant(0)))
        }
        reply => reply,
    };

    // A closed receiver is a cancelled caller; the reply is discarded.
    let _ = awaiter.tx.send(reply);
}
