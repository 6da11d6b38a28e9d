use std::num::NonZeroU32;

use crate::name::{BusName, ErrorName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::proto::{Endianness, Flags};
use crate::signature::Signature;
use crate::{BodyBuf, Cursor, MessageKind, OwnedMessage};

/// A borrowed D-Bus message: the header values plus the body bytes.
///
/// This is the borrowed variant of [`OwnedMessage`]; received messages
/// borrow from the receive buffer they were read out of.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU32;
///
/// use minibus::{Message, MemberName, MessageKind, ObjectPath};
///
/// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
/// const HELLO: &MemberName = MemberName::new_const("Hello");
///
/// let serial = NonZeroU32::new(1).unwrap();
/// let m = Message::method_call(PATH, HELLO, serial);
///
/// assert_eq!(m.kind(), MessageKind::MethodCall { path: PATH, member: HELLO });
/// assert_eq!(m.serial(), serial);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message<'a> {
    pub(crate) kind: MessageKind<'a>,
    pub(crate) serial: NonZeroU32,
    pub(crate) flags: Flags,
    pub(crate) interface: Option<&'a InterfaceName>,
    pub(crate) destination: Option<&'a BusName>,
    pub(crate) sender: Option<&'a str>,
    pub(crate) signature: &'a Signature,
    pub(crate) body: &'a [u8],
    pub(crate) endianness: Endianness,
}

impl<'a> Message<'a> {
    fn new(kind: MessageKind<'a>, serial: NonZeroU32) -> Self {
        Self {
            kind,
            serial,
            flags: Flags::default(),
            interface: None,
            destination: None,
            sender: None,
            signature: Signature::EMPTY,
            body: &[],
            endianness: Endianness::NATIVE,
        }
    }

    /// Construct a method call message.
    pub fn method_call(
        path: &'a ObjectPath,
        member: &'a MemberName,
        serial: NonZeroU32,
    ) -> Self {
        Self::new(MessageKind::MethodCall { path, member }, serial)
    }

    /// Construct a signal message.
    pub fn signal(
        path: &'a ObjectPath,
        interface: &'a InterfaceName,
        member: &'a MemberName,
        serial: NonZeroU32,
    ) -> Self {
        Self::new(
            MessageKind::Signal {
                path,
                interface,
                member,
            },
            serial,
        )
    }

    /// Construct a method return replying to `reply_serial`.
    pub fn method_return(reply_serial: NonZeroU32, serial: NonZeroU32) -> Self {
        Self::new(MessageKind::MethodReturn { reply_serial }, serial)
    }

    /// Construct an error replying to `reply_serial`.
    pub fn error(
        error: &'a ErrorName,
        reply_serial: NonZeroU32,
        serial: NonZeroU32,
    ) -> Self {
        Self::new(
            MessageKind::Error {
                error,
                reply_serial,
            },
            serial,
        )
    }

    /// The kind of the message.
    #[inline]
    pub fn kind(&self) -> MessageKind<'a> {
        self.kind
    }

    /// The serial of the message.
    #[inline]
    pub fn serial(&self) -> NonZeroU32 {
        self.serial
    }

    /// The flags of the message.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The interface of the message, if any.
    #[inline]
    pub fn interface(&self) -> Option<&'a InterfaceName> {
        match self.kind {
            MessageKind::Signal { interface, .. } => Some(interface),
            _ => self.interface,
        }
    }

    /// The destination of the message, if any.
    #[inline]
    pub fn destination(&self) -> Option<&'a BusName> {
        self.destination
    }

    /// The sender of the message, if any.
    #[inline]
    pub fn sender(&self) -> Option<&'a str> {
        self.sender
    }

    /// The signature of the body.
    #[inline]
    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    /// A cursor over the body of the message, in the endianness the message
    /// was encoded with.
    #[inline]
    pub fn body(&self) -> Cursor<'a> {
        Cursor::new(self.body, self.endianness)
    }

    /// The raw body bytes of the message.
    #[inline]
    pub(crate) fn raw_body(&self) -> &'a [u8] {
        self.body
    }

    /// Modify the flags of the message.
    pub fn with_flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// Set the interface of a method call message.
    pub fn with_interface(self, interface: &'a InterfaceName) -> Self {
        Self {
            interface: Some(interface),
            ..self
        }
    }

    /// Set the destination of the message.
    pub fn with_destination(self, destination: &'a BusName) -> Self {
        Self {
            destination: Some(destination),
            ..self
        }
    }

    /// Set the sender of the message.
    pub fn with_sender(self, sender: &'a str) -> Self {
        Self {
            sender: Some(sender),
            ..self
        }
    }

    /// Attach a body to the message.
    ///
    /// The signature, bytes and endianness are taken from the buffer; the
    /// message will be encoded in the same endianness as its body.
    pub fn with_body(self, body: &'a BodyBuf) -> Self {
        Self {
            signature: body.signature(),
            body: body.get(),
            endianness: body.endianness(),
            ..self
        }
    }

    /// Convert into an [`OwnedMessage`].
    pub fn to_owned(&self) -> OwnedMessage {
        OwnedMessage::from_borrowed(self)
    }
}
