pub use self::message::Message;
mod message;

pub use self::message_kind::MessageKind;
mod message_kind;

pub use self::owned::{OwnedMessage, OwnedMessageKind};
mod owned;
