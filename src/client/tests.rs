use std::num::NonZeroU32;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;

use crate::connection::recv_message_into;
use crate::error::ErrorKind;
use crate::name::{BusName, ErrorName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::{BodyBuf, ClientBuilder, Message, MessageKind, OwnedMessageKind, RecvBuf, SendBuf};

const PATH: &ObjectPath = ObjectPath::new_const("/com/example/Test");
const DESTINATION: &BusName = BusName::new_const("com.example.Test");
const INTERFACE: &InterfaceName = InterfaceName::new_const("com.example.Test");

/// A fake bus on the server end of a socket pair: drives the SASL exchange
/// and then hands incoming messages to `serve`.
struct FakeBus {
    stream: UnixStream,
    recv: RecvBuf,
    send: SendBuf,
}

impl FakeBus {
    fn new(stream: UnixStream) -> Self {
        Self {
            stream,
            recv: RecvBuf::new(),
            send: SendBuf::new(),
        }
    }

    async fn handshake(&mut self) {
        let mut nul = [0u8; 1];
        self.stream.read_exact(&mut nul).await.unwrap();
        assert_eq!(nul, [0]);

        let line = self.read_line().await;
        assert_eq!(line, b"AUTH EXTERNAL 31303030\r\n");

        self.stream.write_all(b"OK deadbeef\r\n").await.unwrap();

        let line = self.read_line().await;
        assert_eq!(line, b"BEGIN\r\n");
    }

    async fn read_line(&mut self) -> Vec<u8> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            self.stream.read_exact(&mut byte).await.unwrap();
            line.push(byte[0]);

            if byte[0] == b'\n' {
                return line;
            }
        }
    }

    /// Receive one message and return its serial and method member.
    async fn recv_call(&mut self) -> (NonZeroU32, String) {
        recv_message_into(&mut self.stream, &mut self.recv)
            .await
            .unwrap();

        let message = self.recv.read_message().unwrap();

        let MessageKind::MethodCall { member, .. } = message.kind() else {
            panic!("expected a method call");
        };

        (message.serial(), member.as_str().to_owned())
    }

    async fn reply(&mut self, reply_serial: NonZeroU32, body: &BodyBuf) {
        let serial = self.send.next_serial().unwrap();
        let message = Message::method_return(reply_serial, serial).with_body(body);
        self.send.write_message(&message).unwrap();
        self.stream.write_all(self.send.get()).await.unwrap();
    }

    /// Serve the initial `Hello` call.
    async fn hello(&mut self) {
        let (serial, member) = self.recv_call().await;
        assert_eq!(member, "Hello");

        let mut body = BodyBuf::new();
        body.store(":1.42").unwrap();
        self.reply(serial, &body).await;
    }
}

async fn connect(stream: UnixStream) -> crate::Client {
    ClientBuilder::new()
        .with_uid(1000)
        .connect_stream(stream)
        .await
        .unwrap()
}

#[tokio::test]
async fn hello_assigns_unique_name() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;
    });

    let client = connect(stream).await;
    assert_eq!(client.name(), ":1.42");

    server.await.unwrap();
}

#[tokio::test]
async fn replies_match_by_serial_not_arrival_order() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;

        // Receive both calls before replying, then reply in reverse order.
        let (first_serial, first) = bus.recv_call().await;
        let (second_serial, second) = bus.recv_call().await;
        assert_eq!(first, "First");
        assert_eq!(second, "Second");

        let mut body = BodyBuf::new();
        body.store(&2u32).unwrap();
        bus.reply(second_serial, &body).await;

        let mut body = BodyBuf::new();
        body.store(&1u32).unwrap();
        bus.reply(first_serial, &body).await;
    });

    let client = connect(stream).await;

    const FIRST: &MemberName = MemberName::new_const("First");
    const SECOND: &MemberName = MemberName::new_const("Second");

    let first = client
        .method_call(PATH, FIRST)
        .with_destination(DESTINATION);
    let second = client
        .method_call(PATH, SECOND)
        .with_destination(DESTINATION);

    let (first, second) = tokio::join!(first.call::<u32>(), second.call::<u32>());

    assert_eq!(first.unwrap(), 1);
    assert_eq!(second.unwrap(), 2);

    server.await.unwrap();
}

#[tokio::test]
async fn reply_signature_mismatch_fails_the_call() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;

        let (serial, _) = bus.recv_call().await;

        // The caller expects `u` but receives `t`.
        let mut body = BodyBuf::new();
        body.store(&1u64).unwrap();
        bus.reply(serial, &body).await;
    });

    let client = connect(stream).await;

    const MEMBER: &MemberName = MemberName::new_const("Mismatch");

    let error = client
        .method_call(PATH, MEMBER)
        .call::<u32>()
        .await
        .unwrap_err();

    assert!(matches!(error.kind(), ErrorKind::UnexpectedVariant(0)));

    server.await.unwrap();
}

#[tokio::test]
async fn error_reply_carries_name_and_message() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;

        let (reply_serial, _) = bus.recv_call().await;

        const FAILED: &ErrorName = ErrorName::new_const("org.freedesktop.DBus.Error.Failed");

        let mut body = BodyBuf::new();
        body.store("it broke").unwrap();

        let serial = bus.send.next_serial().unwrap();
        let message = Message::error(FAILED, reply_serial, serial).with_body(&body);
        bus.send.write_message(&message).unwrap();
        bus.stream.write_all(bus.send.get()).await.unwrap();
    });

    let client = connect(stream).await;

    const MEMBER: &MemberName = MemberName::new_const("Fails");

    let error = client
        .method_call(PATH, MEMBER)
        .call::<u32>()
        .await
        .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.contains("org.freedesktop.DBus.Error.Failed"));
    assert!(rendered.contains("it broke"));

    server.await.unwrap();
}

#[tokio::test]
async fn close_completes_outstanding_calls() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;

        // Receive a call and hang up without replying.
        let _ = bus.recv_call().await;
    });

    let client = connect(stream).await;

    const MEMBER: &MemberName = MemberName::new_const("Orphaned");

    let error = client
        .method_call(PATH, MEMBER)
        .call::<u32>()
        .await
        .unwrap_err();

    assert!(error.is_connection_closed());
    server.await.unwrap();
}

#[tokio::test]
async fn signals_are_forwarded_to_the_handler() {
    let (stream, server) = UnixStream::pair().unwrap();

    let server = tokio::spawn(async move {
        let mut bus = FakeBus::new(server);
        bus.handshake().await;
        bus.hello().await;

        const MEMBER: &MemberName = MemberName::new_const("Ping");

        let mut body = BodyBuf::new();
        body.store(&7u32).unwrap();

        let serial = bus.send.next_serial().unwrap();
        let message = Message::signal(PATH, INTERFACE, MEMBER, serial).with_body(&body);
        bus.send.write_message(&message).unwrap();
        bus.stream.write_all(bus.send.get()).await.unwrap();

        // Keep the connection open until the client side hangs up.
        let _ = bus.stream.read_u8().await;
    });

    let (tx, mut rx) = mpsc::unbounded_channel();

    let client = ClientBuilder::new()
        .with_uid(1000)
        .handler(tx)
        .connect_stream(stream)
        .await
        .unwrap();

    let signal = rx.recv().await.unwrap();

    let OwnedMessageKind::Signal { interface, member, .. } = &signal.kind else {
        panic!("expected a signal");
    };

    assert_eq!(**interface, *INTERFACE);
    assert_eq!(member.as_str(), "Ping");
    assert_eq!(signal.body().read::<u32>().unwrap(), 7);

    // Hanging up unblocks the server task.
    drop(client);
    server.await.unwrap();
}
