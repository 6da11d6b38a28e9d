use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{ErrorKind, Result};
use crate::name::{
    BusName, ErrorName, InterfaceName, MemberName, OwnedBusName, OwnedErrorName,
    OwnedInterfaceName, OwnedMemberName,
};
use crate::object_path::{ObjectPath, OwnedObjectPath};
use crate::signature::{Signature, SignatureBuilder, SignatureError};
use crate::{BodyBuf, Error, SignatureBuf};

/// A value which can be encoded into a message body.
///
/// Implementations are provided for every shape the protocol can marshal:
/// the fixed-width scalars, string-likes, arrays (slices, `Vec`, fixed-size
/// arrays, sets), dicts (maps keyed by a [basic type]), structs (tuples up
/// to 16 fields), variants and `()` for the empty body. User-defined struct
/// types can implement this directly on top of the [`BodyBuf`] primitives.
///
/// The signature of an encoded value is derived from its static type
/// through [`signature()`], which is what links writers, readers and
/// variant dispatch. A type without an implementation cannot be handed to
/// the codec at all; unsupported types are rejected at compile time. Note
/// that `i8` deliberately has no implementation, since signed 8-bit
/// integers are not a valid wire type.
///
/// [basic type]: BasicType
/// [`signature()`]: Self::signature
pub trait Encode {
    /// The natural alignment of the encoded value.
    const ALIGNMENT: usize;

    /// Compose the signature of this type.
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError>;

    /// Encode `self` into the buffer.
    fn encode(&self, buf: &mut BodyBuf) -> Result<()>;
}

/// Marker for the protocol's basic (non-container) types, the only types
/// permitted as dict keys.
pub trait BasicType: self::sealed::Sealed {}

mod sealed {
    pub trait Sealed {}
}

macro_rules! basic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl self::sealed::Sealed for $ty {}
            impl BasicType for $ty {}
        )*
    };
}

basic! {
    u8, bool, i16, u16, i32, u32, i64, u64, f64, str, String, Signature,
    SignatureBuf, ObjectPath, OwnedObjectPath, UnixFd,
}

impl<T: ?Sized + BasicType> self::sealed::Sealed for &T {}
impl<T: ?Sized + BasicType> BasicType for &T {}

/// A 32-bit index into the out-of-band array of file descriptors
/// accompanying a message.
///
/// The descriptors themselves are transferred via a platform-specific
/// mechanism which this crate does not implement; only the index is
/// marshalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct UnixFd(pub u32);

macro_rules! scalar {
    ($ty:ty, $alignment:expr, $signature:ident, $put:ident) => {
        impl Encode for $ty {
            const ALIGNMENT: usize = $alignment;

            #[inline]
            fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                builder.extend_from_signature(Signature::$signature)
            }

            #[inline]
            fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
                buf.$put(*self)
            }
        }
    };
}

scalar!(u8, 1, BYTE, put_u8);
scalar!(i16, 2, INT16, put_i16);
scalar!(u16, 2, UINT16, put_u16);
scalar!(i32, 4, INT32, put_i32);
scalar!(u32, 4, UINT32, put_u32);
scalar!(i64, 8, INT64, put_i64);
scalar!(u64, 8, UINT64, put_u64);
scalar!(f64, 8, DOUBLE, put_f64);

/// A boolean is marshalled as a 32-bit unsigned integer of 0 or 1.
impl Encode for bool {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::BOOL)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u32(u32::from(*self))
    }
}

impl Encode for UnixFd {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::UNIX_FD)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u32(self.0)
    }
}

/// A string is marshalled as its u32 byte length (excluding the nul
/// terminator), the bytes, and a nul byte.
impl Encode for str {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::STRING)
    }

    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_string_like(self.as_bytes(), buf)
    }
}

impl Encode for String {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <str as Encode>::signature(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        self.as_str().encode(buf)
    }
}

fn encode_string_like(bytes: &[u8], buf: &mut BodyBuf) -> Result<()> {
    let Ok(len) = u32::try_from(bytes.len()) else {
        return Err(Error::new(ErrorKind::StringTooLong(bytes.len() as u64)));
    };

    buf.put_u32(len)?;
    buf.put_slice_nul(bytes)
}

impl Encode for ObjectPath {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::OBJECT_PATH)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_string_like(self.as_bytes(), buf)
    }
}

impl Encode for OwnedObjectPath {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <ObjectPath as Encode>::signature(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        (**self).encode(buf)
    }
}

/// A signature value is marshalled as its u8 length, the bytes, and a nul
/// byte. Lengths are capped at 255 by construction.
impl Encode for Signature {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        builder.extend_from_signature(Signature::SIGNATURE)
    }

    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        buf.put_u8(self.len() as u8)?;
        buf.put_slice_nul(self.as_bytes())
    }
}

impl Encode for SignatureBuf {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <Signature as Encode>::signature(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        (**self).encode(buf)
    }
}

// Validated names marshal as plain strings.
macro_rules! name_as_string {
    ($($name:ty, $owned:ty;)*) => {
        $(
            impl Encode for $name {
                const ALIGNMENT: usize = 4;

                #[inline]
                fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                    <str as Encode>::signature(builder)
                }

                #[inline]
                fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
                    self.as_str().encode(buf)
                }
            }

            impl Encode for $owned {
                const ALIGNMENT: usize = 4;

                #[inline]
                fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                    <str as Encode>::signature(builder)
                }

                #[inline]
                fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
                    self.as_str().encode(buf)
                }
            }
        )*
    };
}

name_as_string! {
    InterfaceName, OwnedInterfaceName;
    BusName, OwnedBusName;
    MemberName, OwnedMemberName;
    ErrorName, OwnedErrorName;
}

impl<T: ?Sized + Encode> Encode for &T {
    const ALIGNMENT: usize = T::ALIGNMENT;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        T::signature(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        (**self).encode(buf)
    }
}

fn array_signature<T: Encode>(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
    builder.open_array()?;
    T::signature(builder)?;
    builder.close_array();
    Ok(())
}

fn encode_array<'a, T, I>(iter: I, buf: &mut BodyBuf) -> Result<()>
where
    T: 'a + Encode,
    I: IntoIterator<Item = &'a T>,
{
    let mut array = buf.write_array(T::ALIGNMENT)?;

    for value in iter {
        array.write(value)?;
    }

    array.finish()
}

impl<T: Encode> Encode for [T] {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_array(self, buf)
    }
}

impl<T: Encode> Encode for Vec<T> {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_array(self, buf)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_array(self, buf)
    }
}

impl<T: Encode> Encode for HashSet<T> {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_array(self, buf)
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_array(self, buf)
    }
}

fn dict_signature<K, V>(builder: &mut SignatureBuilder) -> Result<(), SignatureError>
where
    K: Encode + BasicType,
    V: Encode,
{
    builder.open_array()?;
    builder.open_dict_entry()?;
    K::signature(builder)?;
    V::signature(builder)?;
    builder.close_dict_entry()?;
    builder.close_array();
    Ok(())
}

fn encode_dict<'a, K, V, I>(iter: I, buf: &mut BodyBuf) -> Result<()>
where
    K: 'a + Encode + BasicType,
    V: 'a + Encode,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    // Dict entries have struct alignment regardless of their field types.
    let mut array = buf.write_array(8)?;

    for (key, value) in iter {
        array.buf().align(8)?;
        array.write(key)?;
        array.write(value)?;
    }

    array.finish()
}

impl<K, V> Encode for HashMap<K, V>
where
    K: Encode + BasicType,
    V: Encode,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        dict_signature::<K, V>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_dict(self, buf)
    }
}

impl<K, V> Encode for BTreeMap<K, V>
where
    K: Encode + BasicType,
    V: Encode,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        dict_signature::<K, V>(builder)
    }

    #[inline]
    fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
        encode_dict(self, buf)
    }
}

/// The empty body.
impl Encode for () {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(_: &mut SignatureBuilder) -> Result<(), SignatureError> {
        Ok(())
    }

    #[inline]
    fn encode(&self, _: &mut BodyBuf) -> Result<()> {
        Ok(())
    }
}

// Tuples marshal as structs: aligned to 8, fields in declared order.
macro_rules! impl_tuple {
    ($($ty:ident),*) => {
        impl<$($ty,)*> Encode for ($($ty,)*)
        where
            $($ty: Encode,)*
        {
            const ALIGNMENT: usize = 8;

            fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                builder.open_struct()?;
                $(<$ty>::signature(builder)?;)*
                builder.close_struct()
            }

            #[allow(non_snake_case)]
            fn encode(&self, buf: &mut BodyBuf) -> Result<()> {
                buf.align(8)?;
                let ($($ty,)*) = self;
                $($ty.encode(buf)?;)*
                Ok(())
            }
        }
    };
}

repeat!(impl_tuple);
