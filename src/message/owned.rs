use std::num::NonZeroU32;

use crate::name::{OwnedBusName, OwnedErrorName, OwnedInterfaceName, OwnedMemberName};
use crate::object_path::OwnedObjectPath;
use crate::proto::{Endianness, Flags};
use crate::{Cursor, Message, MessageKind, SignatureBuf};

/// The owned variant of [`MessageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedMessageKind {
    /// A method call.
    MethodCall {
        /// The object to send the call to.
        path: OwnedObjectPath,
        /// The method name.
        member: OwnedMemberName,
    },
    /// A method reply with returned data.
    MethodReturn {
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// An error reply.
    Error {
        /// The name of the error that occurred.
        error: OwnedErrorName,
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// A signal emission.
    Signal {
        /// The object the signal is emitted from.
        path: OwnedObjectPath,
        /// The interface the signal is emitted from.
        interface: OwnedInterfaceName,
        /// The signal name.
        member: OwnedMemberName,
    },
}

/// An owned D-Bus message.
///
/// This is what the client hands to registered handlers for incoming method
/// calls and signals: the decoded header values together with the raw body
/// bytes and the endianness needed to decode them.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedMessage {
    /// The kind of the message.
    pub kind: OwnedMessageKind,
    /// The serial of the message.
    pub serial: NonZeroU32,
    /// The flags of the message.
    pub flags: Flags,
    /// The interface of a method call, if any.
    pub interface: Option<OwnedInterfaceName>,
    /// The destination of the message, if any.
    pub destination: Option<OwnedBusName>,
    /// The sender of the message, if any.
    pub sender: Option<Box<str>>,
    /// The signature of the body.
    pub signature: SignatureBuf,
    /// The raw body bytes.
    pub body: Vec<u8>,
    /// The endianness the body is encoded with.
    pub endianness: Endianness,
}

impl OwnedMessage {
    /// A cursor over the body of the message.
    #[inline]
    pub fn body(&self) -> Cursor<'_> {
        Cursor::new(&self.body, self.endianness)
    }

    pub(crate) fn from_borrowed(message: &Message<'_>) -> Self {
        let kind = match message.kind {
            MessageKind::MethodCall { path, member } => OwnedMessageKind::MethodCall {
                path: path.to_owned(),
                member: member.to_owned(),
            },
            MessageKind::MethodReturn { reply_serial } => {
                OwnedMessageKind::MethodReturn { reply_serial }
            }
            MessageKind::Error {
                error,
                reply_serial,
            } => OwnedMessageKind::Error {
                error: error.to_owned(),
                reply_serial,
            },
            MessageKind::Signal {
                path,
                interface,
                member,
            } => OwnedMessageKind::Signal {
                path: path.to_owned(),
                interface: interface.to_owned(),
                member: member.to_owned(),
            },
        };

        Self {
            kind,
            serial: message.serial,
            flags: message.flags,
            interface: message.interface.map(ToOwned::to_owned),
            destination: message.destination.map(ToOwned::to_owned),
            sender: message.sender.map(Into::into),
            signature: message.signature.to_owned(),
            body: message.body.to_vec(),
            endianness: message.endianness,
        }
    }
}
