use std::num::NonZeroU32;

use crate::name::{ErrorName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::proto::MessageType;

/// The kind of a [`Message`].
///
/// The kind carries exactly the header fields which are required for its
/// message type, making ill-formed combinations unrepresentable on the send
/// side.
///
/// [`Message`]: crate::Message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind<'a> {
    /// A method call. This message type may prompt a reply.
    MethodCall {
        /// The object to send the call to.
        path: &'a ObjectPath,
        /// The method name.
        member: &'a MemberName,
    },
    /// A method reply with returned data.
    MethodReturn {
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// An error reply.
    Error {
        /// The name of the error that occurred.
        error: &'a ErrorName,
        /// The serial of the message this is a reply to.
        reply_serial: NonZeroU32,
    },
    /// A signal emission.
    Signal {
        /// The object the signal is emitted from.
        path: &'a ObjectPath,
        /// The interface the signal is emitted from.
        interface: &'a InterfaceName,
        /// The signal name.
        member: &'a MemberName,
    },
}

impl MessageKind<'_> {
    /// The wire message type of this kind.
    pub(crate) fn message_type(&self) -> MessageType {
        match self {
            MessageKind::MethodCall { .. } => MessageType::METHOD_CALL,
            MessageKind::MethodReturn { .. } => MessageType::METHOD_RETURN,
            MessageKind::Error { .. } => MessageType::ERROR,
            MessageKind::Signal { .. } => MessageType::SIGNAL,
        }
    }
}
