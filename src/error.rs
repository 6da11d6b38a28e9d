use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;

use crate::name::NameError;
use crate::object_path::PathError;
use crate::signature::SignatureError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised by this crate.
///
/// Codec errors carry the byte index, relative to the start of the message,
/// at which they occurred.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    #[inline]
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Construct an unexpected-enum error at the given byte index.
    ///
    /// Used by the [`labeled_enum!`] macro.
    ///
    /// [`labeled_enum!`]: crate::labeled_enum
    #[doc(hidden)]
    #[inline]
    pub fn unexpected_enum(at: usize) -> Self {
        Self::new(ErrorKind::UnexpectedEnum(at))
    }

    /// Test if the error indicates that the connection has been closed.
    #[inline]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self.kind, ErrorKind::ConnectionClosed)
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => Self::new(ErrorKind::ConnectionClosed),
            _ => Self::new(ErrorKind::Io(error)),
        }
    }
}

impl From<SignatureError> for Error {
    #[inline]
    fn from(error: SignatureError) -> Self {
        Self::new(ErrorKind::Signature(error))
    }
}

impl From<PathError> for Error {
    #[inline]
    fn from(error: PathError) -> Self {
        Self::new(ErrorKind::ObjectPath(error))
    }
}

impl From<NameError> for Error {
    #[inline]
    fn from(error: NameError) -> Self {
        Self::new(ErrorKind::Name(error))
    }
}

impl From<Utf8Error> for Error {
    #[inline]
    fn from(error: Utf8Error) -> Self {
        Self::new(ErrorKind::Utf8(error))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io(error) => error.fmt(f),
            ErrorKind::Signature(error) => error.fmt(f),
            ErrorKind::ObjectPath(error) => error.fmt(f),
            ErrorKind::Name(error) => error.fmt(f),
            ErrorKind::Utf8(error) => error.fmt(f),
            ErrorKind::OutOfRange(at) => {
                write!(f, "Input past the end of the buffer at byte {at}")
            }
            ErrorKind::NotNullTerminated(at) => {
                write!(f, "String at byte {at} is not nul terminated")
            }
            ErrorKind::UnexpectedEnum(at) => {
                write!(f, "Unknown enumeration label at byte {at}")
            }
            ErrorKind::UnexpectedVariant(at) => {
                write!(f, "No variant matches the signature at byte {at}")
            }
            ErrorKind::BufferTooSmall(at) => {
                write!(f, "Fixed-capacity buffer exhausted at byte {at}")
            }
            ErrorKind::StringTooLong(len) => {
                write!(f, "String of length {len} is too long")
            }
            ErrorKind::ArrayTooLong(len) => {
                write!(f, "Array of length {len} is too long (max is 67108864)")
            }
            ErrorKind::BodyTooLong(len) => {
                write!(f, "Body of length {len} is too long (max is 134217728)")
            }
            ErrorKind::InvalidEnumConversion => {
                write!(f, "Enumeration value has no string label")
            }
            ErrorKind::BadMessage => write!(f, "Malformed message or authentication reply"),
            ErrorKind::ConnectionClosed => write!(f, "Connection closed"),
            ErrorKind::MissingBus => write!(f, "Missing session bus address"),
            ErrorKind::InvalidAddress => write!(f, "Invalid D-Bus address"),
            ErrorKind::InvalidSasl => write!(f, "Invalid SASL message"),
            ErrorKind::InvalidState(state) => {
                write!(f, "Invalid connection state `{state}`")
            }
            ErrorKind::InvalidProtocolVersion(version) => {
                write!(f, "Unsupported protocol version {version}")
            }
            ErrorKind::MissingPath => write!(f, "Missing required PATH header field"),
            ErrorKind::MissingInterface => write!(f, "Missing required INTERFACE header field"),
            ErrorKind::MissingMember => write!(f, "Missing required MEMBER header field"),
            ErrorKind::MissingErrorName => write!(f, "Missing required ERROR_NAME header field"),
            ErrorKind::MissingReplySerial => {
                write!(f, "Missing required REPLY_SERIAL header field")
            }
            ErrorKind::ZeroSerial => write!(f, "Zero serial in message header"),
            ErrorKind::SerialsExhausted => write!(f, "Message serial space exhausted"),
            ErrorKind::ResponseError(error_name, message) => {
                write!(f, "Error reply {error_name}: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(error) => Some(error),
            ErrorKind::Signature(error) => Some(error),
            ErrorKind::ObjectPath(error) => Some(error),
            ErrorKind::Name(error) => Some(error),
            ErrorKind::Utf8(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    Io(io::Error),
    Signature(SignatureError),
    ObjectPath(PathError),
    Name(NameError),
    Utf8(Utf8Error),
    OutOfRange(usize),
    NotNullTerminated(usize),
    UnexpectedEnum(usize),
    UnexpectedVariant(usize),
    BufferTooSmall(usize),
    StringTooLong(u64),
    ArrayTooLong(u64),
    BodyTooLong(u64),
    #[allow(unused)]
    InvalidEnumConversion,
    BadMessage,
    ConnectionClosed,
    MissingBus,
    InvalidAddress,
    InvalidSasl,
    InvalidState(&'static str),
    InvalidProtocolVersion(u8),
    MissingPath,
    MissingInterface,
    MissingMember,
    MissingErrorName,
    MissingReplySerial,
    ZeroSerial,
    SerialsExhausted,
    ResponseError(Box<str>, Box<str>),
}
