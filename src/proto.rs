//! Low level constants of the D-Bus wire protocol.

raw_enum! {
    /// The endianness of a message.
    ///
    /// Declared by the first byte of every message; all multi-byte integers
    /// in the message are encoded accordingly.
    #[repr(u8)]
    pub enum Endianness {
        /// Little endian, ASCII `'l'`.
        LITTLE = b'l',
        /// Big endian, ASCII `'B'`.
        BIG = b'B',
    }
}

impl Endianness {
    /// The endianness of the current host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::LITTLE;
    /// The endianness of the current host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::BIG;
}

raw_enum! {
    /// The type of a message.
    ///
    /// Unknown types must be ignored by conforming implementations.
    #[repr(u8)]
    pub enum MessageType {
        /// This is an invalid type.
        INVALID = 0,
        /// Method call. This message type may prompt a reply.
        METHOD_CALL = 1,
        /// Method reply with returned data.
        METHOD_RETURN = 2,
        /// Error reply. If the first argument exists and is a string, it is
        /// an error message.
        ERROR = 3,
        /// Signal emission.
        SIGNAL = 4,
    }
}

raw_set! {
    /// Flags inside of a D-Bus message.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::proto::Flags;
    ///
    /// let flags = Flags::default();
    /// assert!(!(flags & Flags::NO_REPLY_EXPECTED));
    ///
    /// let flags = flags | Flags::NO_REPLY_EXPECTED;
    /// assert!(flags & Flags::NO_REPLY_EXPECTED);
    /// assert!(!(flags & Flags::NO_AUTO_START));
    /// ```
    #[repr(u8)]
    pub enum Flags {
        /// This message does not expect method return replies or error
        /// replies, even if it is of a type that can have a reply; the reply
        /// should be omitted.
        NO_REPLY_EXPECTED = 1,
        /// The bus must not launch an owner for the destination name in
        /// response to this message.
        NO_AUTO_START = 2,
        /// This flag may be set on a method call message to inform the
        /// receiving side that the caller is prepared to wait for interactive
        /// authorization, which might take a considerable time to complete.
        ALLOW_INTERACTIVE_AUTHORIZATION = 4,
    }
}

raw_enum! {
    /// The code of a header field.
    ///
    /// Each field is a `(code, variant)` struct in the header's field array;
    /// the code fixes the signature of the variant payload.
    #[repr(u8)]
    pub enum FieldCode {
        /// Not a valid field code, an error if it appears in a message.
        INVALID = 0,
        /// The object to send a call to, or the object a signal is emitted
        /// from. Payload signature `o`.
        PATH = 1,
        /// The interface to invoke a method call on, or that a signal is
        /// emitted from. Optional for method calls, required for signals.
        /// Payload signature `s`.
        INTERFACE = 2,
        /// The member, either the method name or signal name. Payload
        /// signature `s`.
        MEMBER = 3,
        /// The name of the error that occurred, for errors. Payload
        /// signature `s`.
        ERROR_NAME = 4,
        /// The serial number of the message this message is a reply to.
        /// Payload signature `u`.
        REPLY_SERIAL = 5,
        /// The name of the connection this message is intended for. Payload
        /// signature `s`.
        DESTINATION = 6,
        /// Unique name of the sending connection. Payload signature `s`.
        SENDER = 7,
        /// The signature of the message body. If omitted, it is assumed to
        /// be the empty signature, in which case the body must be 0-length.
        /// Payload signature `g`.
        SIGNATURE = 8,
        /// The number of Unix file descriptors that accompany the message.
        /// Payload signature `u`.
        UNIX_FDS = 9,
    }
}

raw_enum! {
    /// A type code inside of a signature.
    #[repr(u8)]
    pub enum Type {
        /// Not a valid type code, used to terminate signatures.
        INVALID = b'\0',
        /// 8-bit unsigned integer.
        BYTE = b'y',
        /// Boolean value: 0 is false, 1 is true, everything else is invalid.
        BOOLEAN = b'b',
        /// 16-bit signed integer.
        INT16 = b'n',
        /// 16-bit unsigned integer.
        UINT16 = b'q',
        /// 32-bit signed integer.
        INT32 = b'i',
        /// 32-bit unsigned integer.
        UINT32 = b'u',
        /// 64-bit signed integer.
        INT64 = b'x',
        /// 64-bit unsigned integer.
        UINT64 = b't',
        /// IEEE 754 double precision floating point.
        DOUBLE = b'd',
        /// UTF-8 string with no embedded nul bytes, nul terminated on the
        /// wire.
        STRING = b's',
        /// Name of an object instance.
        OBJECT_PATH = b'o',
        /// A type signature.
        SIGNATURE = b'g',
        /// Array of a single complete type.
        ARRAY = b'a',
        /// Variant type; the type of the value is part of the value itself.
        VARIANT = b'v',
        /// Unix file descriptor index.
        UNIX_FD = b'h',
        /// Struct opening parenthesis.
        OPEN_PAREN = b'(',
        /// Struct closing parenthesis.
        CLOSE_PAREN = b')',
        /// Dict entry opening brace.
        OPEN_BRACE = b'{',
        /// Dict entry closing brace.
        CLOSE_BRACE = b'}',
    }
}

/// The major protocol version implemented by this crate.
pub const VERSION: u8 = 1;
