//! Types associated with the `org.freedesktop.DBus` interface.

use crate::error::Result;
use crate::name::{BusName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::signature::{Signature, SignatureBuilder, SignatureError};
use crate::{BodyBuf, Cursor, Decode, Encode};

/// Well known destination name of the message bus itself.
pub const DESTINATION: &BusName = BusName::new_const("org.freedesktop.DBus");

/// Well known interface of the message bus itself.
pub const INTERFACE: &InterfaceName = InterfaceName::new_const("org.freedesktop.DBus");

/// Well known path of the message bus itself.
pub const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");

/// The `Hello` method, which returns the unique name of the connection.
pub const HELLO: &MemberName = MemberName::new_const("Hello");

/// The `RequestName` method.
pub const REQUEST_NAME: &MemberName = MemberName::new_const("RequestName");

raw_set! {
    /// The flags to a `RequestName` call.
    #[repr(u32)]
    pub enum NameFlag {
        /// If an application A specifies this flag and succeeds in becoming
        /// the owner of the name, and another application B later calls
        /// `RequestName` with the `REPLACE_EXISTING` flag, then application
        /// A will lose ownership and receive a
        /// `org.freedesktop.DBus.NameLost` signal, and application B will
        /// become the new owner.
        ALLOW_REPLACEMENT = 1,
        /// Try to replace the current owner if there is one. If this flag
        /// is not set the application will only become the owner of the
        /// name if there is no current owner.
        REPLACE_EXISTING = 2,
        /// Without this flag, if an application requests a name that is
        /// already owned, the application will be placed in a queue to own
        /// the name when the current owner gives it up. If this flag is
        /// given, the request simply fails instead.
        DO_NOT_QUEUE = 4,
    }
}

raw_enum! {
    /// The reply code of a `RequestName` call.
    #[repr(u32)]
    pub enum NameReply {
        /// The caller is now the primary owner of the name, replacing any
        /// previous owner.
        PRIMARY_OWNER = 1,
        /// The name already had an owner and the caller has been placed in
        /// the queue for it.
        IN_QUEUE = 2,
        /// The name already has an owner and the request failed.
        EXISTS = 3,
        /// The caller is already the owner of the name.
        ALREADY_OWNER = 4,
    }
}

impl Encode for NameFlag {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::UINT32)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u32(self.0)
    }
}

impl<'de> Decode<'de> for NameReply {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::UINT32)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(NameReply::new(cursor.take_u32()?))
    }
}
