use crate::encode::UnixFd;
use crate::error::{ErrorKind, Result};
use crate::object_path::ObjectPath;
use crate::signature::{Signature, SignatureBuilder, SignatureError};
use crate::{BodyBuf, Cursor, Decode, Encode, Error};

/// A variant over the basic types: a self-describing value carrying its
/// signature inline.
///
/// Encoding emits the signature of the selected alternative followed by the
/// value; the signature is derived from the alternative's static type, never
/// sniffed from bytes. Decoding reads the inline signature and matches it
/// against the alternatives in declaration order, failing with an
/// unexpected-variant error when nothing matches.
///
/// # Examples
///
/// ```
/// use minibus::{BodyBuf, Variant};
/// use minibus::proto::Endianness;
///
/// let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
/// buf.store(&Variant::U32(123))?;
///
/// assert_eq!(buf.get(), &[1, b'u', 0, 0, 123, 0, 0, 0]);
/// # Ok::<_, minibus::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant<'de> {
    /// An unsigned 8-bit integer, `y`.
    U8(u8),
    /// A boolean, `b`.
    Bool(bool),
    /// A signed 16-bit integer, `n`.
    I16(i16),
    /// An unsigned 16-bit integer, `q`.
    U16(u16),
    /// A signed 32-bit integer, `i`.
    I32(i32),
    /// An unsigned 32-bit integer, `u`.
    U32(u32),
    /// A signed 64-bit integer, `x`.
    I64(i64),
    /// An unsigned 64-bit integer, `t`.
    U64(u64),
    /// A double-precision float, `d`.
    F64(f64),
    /// A string, `s`.
    String(&'de str),
    /// An object path, `o`.
    ObjectPath(&'de ObjectPath),
    /// A signature, `g`.
    Signature(&'de Signature),
    /// A Unix file descriptor index, `h`.
    UnixFd(UnixFd),
}

impl<'de> Variant<'de> {
    /// The signature of the selected alternative.
    pub fn value_signature(&self) -> &'static Signature {
        match self {
            Variant::U8(..) => Signature::BYTE,
            Variant::Bool(..) => Signature::BOOL,
            Variant::I16(..) => Signature::INT16,
            Variant::U16(..) => Signature::UINT16,
            Variant::I32(..) => Signature::INT32,
            Variant::U32(..) => Signature::UINT32,
            Variant::I64(..) => Signature::INT64,
            Variant::U64(..) => Signature::UINT64,
            Variant::F64(..) => Signature::DOUBLE,
            Variant::String(..) => Signature::STRING,
            Variant::ObjectPath(..) => Signature::OBJECT_PATH,
            Variant::Signature(..) => Signature::SIGNATURE,
            Variant::UnixFd(..) => Signature::UNIX_FD,
        }
    }
}

impl Encode for Variant<'_> {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::VARIANT)
    }

    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        self.value_signature().encode(buf)?;

        match self {
            Variant::U8(value) => value.encode(buf),
            Variant::Bool(value) => value.encode(buf),
            Variant::I16(value) => value.encode(buf),
            Variant::U16(value) => value.encode(buf),
            Variant::I32(value) => value.encode(buf),
            Variant::U32(value) => value.encode(buf),
            Variant::I64(value) => value.encode(buf),
            Variant::U64(value) => value.encode(buf),
            Variant::F64(value) => value.encode(buf),
            Variant::String(value) => value.encode(buf),
            Variant::ObjectPath(value) => value.encode(buf),
            Variant::Signature(value) => value.encode(buf),
            Variant::UnixFd(value) => value.encode(buf),
        }
    }
}

impl<'de> Decode<'de> for Variant<'de> {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::VARIANT)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let at = cursor.pos();
        let signature = cursor.read::<&Signature>()?;

        match signature.as_bytes() {
            b"y" => Ok(Variant::U8(cursor.read()?)),
            b"b" => Ok(Variant::Bool(cursor.read()?)),
            b"n" => Ok(Variant::I16(cursor.read()?)),
            b"q" => Ok(Variant::U16(cursor.read()?)),
            b"i" => Ok(Variant::I32(cursor.read()?)),
            b"u" => Ok(Variant::U32(cursor.read()?)),
            b"x" => Ok(Variant::I64(cursor.read()?)),
            b"t" => Ok(Variant::U64(cursor.read()?)),
            b"d" => Ok(Variant::F64(cursor.read()?)),
            b"s" => Ok(Variant::String(cursor.read()?)),
            b"o" => Ok(Variant::ObjectPath(cursor.read()?)),
            b"g" => Ok(Variant::Signature(cursor.read()?)),
            b"h" => Ok(Variant::UnixFd(cursor.read()?)),
            _ => Err(Error::new(ErrorKind::UnexpectedVariant(at))),
        }
    }
}
