//! An asynchronous D-Bus client library.
//!
//! This crate implements the D-Bus wire protocol (version 1): a type-directed
//! binary codec honoring the protocol's alignment, padding and signature
//! rules, the message header model, SASL `EXTERNAL` authentication, and an
//! asynchronous client which demultiplexes replies to callers by serial
//! number.
//!
//! # Examples
//!
//! ```no_run
//! use minibus::{BusName, Client, MemberName, ObjectPath};
//!
//! const DESTINATION: &BusName = BusName::new_const("org.freedesktop.DBus");
//! const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
//! const LIST_NAMES: &MemberName = MemberName::new_const("ListNames");
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() -> minibus::Result<()> {
//! let client = Client::session_bus().await?;
//!
//! let reply = client
//!     .method_call(PATH, LIST_NAMES)
//!     .with_destination(DESTINATION)
//!     .call::<Vec<String>>()
//!     .await?;
//!
//! for name in reply {
//!     println!("{name}");
//! }
//! # Ok(()) }
//! ```

#[macro_use]
mod macros;

#[doc(inline)]
pub use self::error::{Error, Result};
mod error;

pub mod proto;

#[doc(inline)]
pub use self::signature::{Signature, SignatureBuf, SignatureError};
pub mod signature;

#[doc(inline)]
pub use self::object_path::{ObjectPath, OwnedObjectPath, PathError, PathErrorKind};
mod object_path;

#[doc(inline)]
pub use self::name::{
    BusName, ErrorName, InterfaceName, MemberName, NameError, NameErrorKind, OwnedBusName,
    OwnedErrorName, OwnedInterfaceName, OwnedMemberName,
};
mod name;

pub use self::buf::{ArrayReader, ArrayWriter, BodyBuf, Cursor};
pub mod buf;

#[doc(inline)]
pub use self::encode::{BasicType, Encode, UnixFd};
mod encode;

#[doc(inline)]
pub use self::decode::{signature_of, Decode};
mod decode;

#[doc(inline)]
pub use self::variant::Variant;
mod variant;

pub use self::message::{Message, MessageKind, OwnedMessage, OwnedMessageKind};
mod message;

#[doc(inline)]
pub use self::send_buf::SendBuf;
mod send_buf;

#[doc(inline)]
pub use self::recv_buf::{read_message, RecvBuf};
mod recv_buf;

pub mod sasl;

pub mod connection;

#[cfg(feature = "tokio")]
pub use self::client::{Call, Client, ClientBuilder, Reply};
#[cfg(feature = "tokio")]
mod client;

pub mod org_freedesktop_dbus;

mod utils;

/// The `tracing` target used by this crate.
#[cfg(feature = "tokio")]
pub(crate) const TRACE: &str = "minibus";
