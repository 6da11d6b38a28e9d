use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::str::from_utf8;

use crate::encode::{BasicType, UnixFd};
use crate::error::{ErrorKind, Result};
use crate::name::{
    BusName, ErrorName, InterfaceName, MemberName, OwnedBusName, OwnedErrorName,
    OwnedInterfaceName, OwnedMemberName,
};
use crate::object_path::{ObjectPath, OwnedObjectPath};
use crate::signature::{Signature, SignatureBuilder, SignatureError};
use crate::{Cursor, Encode, Error, SignatureBuf};

/// A value which can be decoded from a message body.
///
/// The lifetime `'de` is that of the received message; decoders for
/// string-like types borrow from it (`&str`, `&Signature`, `&ObjectPath`),
/// while owning decoders (`String`, containers) copy out of it.
///
/// Decoding a value never retains references into the message past the
/// decode call itself, and a partially decoded value must be discarded on
/// error.
pub trait Decode<'de>: Sized {
    /// The natural alignment of the encoded value.
    const ALIGNMENT: usize;

    /// Compose the signature of this type.
    ///
    /// This mirrors [`Encode::signature`] and is what reply dispatch
    /// compares wire signatures against.
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError>;

    /// Decode a value from the cursor.
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self>;
}

/// Derive the signature of a decodable type.
///
/// # Examples
///
/// ```
/// use minibus::{signature_of, Signature};
///
/// let sig = signature_of::<Vec<(String, u64)>>()?;
/// assert_eq!(&*sig, Signature::new(b"a(st)")?);
/// # Ok::<_, minibus::SignatureError>(())
/// ```
pub fn signature_of<'de, T: Decode<'de>>() -> Result<SignatureBuf, SignatureError> {
    let mut builder = SignatureBuilder::new();
    T::signature(&mut builder)?;
    Ok(builder.to_signature_buf())
}

macro_rules! scalar {
    ($ty:ty, $alignment:expr, $take:ident) => {
        impl<'de> Decode<'de> for $ty {
            const ALIGNMENT: usize = $alignment;

            #[inline]
            fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                <$ty as Encode>::signature(builder)
            }

            #[inline]
            fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
                cursor.$take()
            }
        }
    };
}

scalar!(u8, 1, take_u8);
scalar!(i16, 2, take_i16);
scalar!(u16, 2, take_u16);
scalar!(i32, 4, take_i32);
scalar!(u32, 4, take_u32);
scalar!(i64, 8, take_i64);
scalar!(u64, 8, take_u64);
scalar!(f64, 8, take_f64);

/// Booleans decode permissively: 0 is false and any nonzero u32 is true.
///
/// The protocol specifies only 0 and 1 as valid values; this implementation
/// accepts what remote peers send rather than failing the message.
impl<'de> Decode<'de> for bool {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <bool as Encode>::signature(builder)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(cursor.take_u32()? != 0)
    }
}

impl<'de> Decode<'de> for UnixFd {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <UnixFd as Encode>::signature(builder)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(UnixFd(cursor.take_u32()?))
    }
}

impl<'de> Decode<'de> for &'de str {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <str as Encode>::signature(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let len = cursor.take_u32()? as usize;
        let bytes = cursor.take_slice_nul(len)?;
        Ok(from_utf8(bytes)?)
    }
}

impl<'de> Decode<'de> for String {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <str as Encode>::signature(builder)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(cursor.read::<&str>()?.to_owned())
    }
}

impl<'de> Decode<'de> for &'de Signature {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <Signature as Encode>::signature(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let len = cursor.take_u8()? as usize;
        let bytes = cursor.take_slice_nul(len)?;
        Ok(Signature::new(bytes)?)
    }
}

impl<'de> Decode<'de> for SignatureBuf {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <Signature as Encode>::signature(builder)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(cursor.read::<&Signature>()?.to_owned())
    }
}

impl<'de> Decode<'de> for &'de ObjectPath {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <ObjectPath as Encode>::signature(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let path = cursor.read::<&str>()?;
        Ok(ObjectPath::new(path)?)
    }
}

impl<'de> Decode<'de> for OwnedObjectPath {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        <ObjectPath as Encode>::signature(builder)
    }

    #[inline]
    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        Ok(cursor.read::<&ObjectPath>()?.to_owned())
    }
}

macro_rules! name_as_string {
    ($($name:ident, $owned:ident;)*) => {
        $(
            impl<'de> Decode<'de> for &'de $name {
                const ALIGNMENT: usize = 4;

                #[inline]
                fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                    <str as Encode>::signature(builder)
                }

                fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
                    let name = cursor.read::<&str>()?;
                    Ok($name::new(name)?)
                }
            }

            impl<'de> Decode<'de> for $owned {
                const ALIGNMENT: usize = 4;

                #[inline]
                fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                    <str as Encode>::signature(builder)
                }

                #[inline]
                fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
                    Ok(cursor.read::<&$name>()?.to_owned())
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

fn array_signature<'de, T: Decode<'de>>(
    builder: &mut SignatureBuilder,
) -> Result<(), SignatureError> {
    builder.open_array()?;
    T::signature(builder)?;
    builder.close_array();
    Ok(())
}

impl<'de, T: Decode<'de>> Decode<'de> for Vec<T> {
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(T::ALIGNMENT)?;
        let mut values = Vec::new();

        while reader.has_next() {
            values.push(reader.read_next()?);
        }

        reader.finish()?;
        Ok(values)
    }
}

/// Fixed-size arrays fill by index; excess elements on the wire fail with
/// an out-of-range error, missing elements remain default.
impl<'de, T, const N: usize> Decode<'de> for [T; N]
where
    T: Decode<'de> + Default,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(T::ALIGNMENT)?;
        let mut values: [T; N] = std::array::from_fn(|_| T::default());
        let mut n = 0;

        while reader.has_next() {
            if n >= N {
                return Err(Error::new(ErrorKind::OutOfRange(reader.pos())));
            }

            values[n] = reader.read_next()?;
            n += 1;
        }

        reader.finish()?;
        Ok(values)
    }
}

impl<'de, T> Decode<'de> for HashSet<T>
where
    T: Decode<'de> + Eq + Hash,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(T::ALIGNMENT)?;
        let mut values = HashSet::new();

        while reader.has_next() {
            values.insert(reader.read_next()?);
        }

        reader.finish()?;
        Ok(values)
    }
}

impl<'de, T> Decode<'de> for BTreeSet<T>
where
    T: Decode<'de> + Ord,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        array_signature::<T>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(T::ALIGNMENT)?;
        let mut values = BTreeSet::new();

        while reader.has_next() {
            values.insert(reader.read_next()?);
        }

        reader.finish()?;
        Ok(values)
    }
}

fn dict_signature<'de, K, V>(builder: &mut SignatureBuilder) -> Result<(), SignatureError>
where
    K: Decode<'de> + BasicType,
    V: Decode<'de>,
{
    builder.open_array()?;
    builder.open_dict_entry()?;
    K::signature(builder)?;
    V::signature(builder)?;
    builder.close_dict_entry()?;
    builder.close_array();
    Ok(())
}

impl<'de, K, V> Decode<'de> for HashMap<K, V>
where
    K: Decode<'de> + BasicType + Eq + Hash,
    V: Decode<'de>,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        dict_signature::<K, V>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(8)?;
        let mut values = HashMap::new();

        while reader.has_next() {
            reader.cursor().align(8)?;
            let key = reader.read_next()?;
            let value = reader.read_next()?;
            values.insert(key, value);
        }

        reader.finish()?;
        Ok(values)
    }
}

impl<'de, K, V> Decode<'de> for BTreeMap<K, V>
where
    K: Decode<'de> + BasicType + Ord,
    V: Decode<'de>,
{
    const ALIGNMENT: usize = 4;

    #[inline]
    fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
        dict_signature::<K, V>(builder)
    }

    fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
        let mut reader = cursor.read_array(8)?;
        let mut values = BTreeMap::new();

        while reader.has_next() {
            reader.cursor().align(8)?;
            let key = reader.read_next()?;
            let value = reader.read_next()?;
            values.insert(key, value);
        }

        reader.finish()?;
        Ok(values)
    }
}

/// The empty body.
impl<'de> Decode<'de> for () {
    const ALIGNMENT: usize = 1;

    #[inline]
    fn signature(_: &mut SignatureBuilder) -> Result<(), SignatureError> {
        Ok(())
    }

    #[inline]
    fn decode(_: &mut Cursor<'de>) -> Result<Self> {
        Ok(())
    }
}

macro_rules! impl_tuple {
    ($($ty:ident),*) => {
        impl<'de, $($ty,)*> Decode<'de> for ($($ty,)*)
        where
            $($ty: Decode<'de>,)*
        {
            const ALIGNMENT: usize = 8;

            fn signature(builder: &mut SignatureBuilder) -> Result<(), SignatureError> {
                builder.open_struct()?;
                $(<$ty>::signature(builder)?;)*
                builder.close_struct()
            }

            #[allow(non_snake_case)]
            fn decode(cursor: &mut Cursor<'de>) -> Result<Self> {
                cursor.align(8)?;
                $(let $ty = cursor.read::<$ty>()?;)*
                Ok(($($ty,)*))
            }
        }
    };
}

repeat!(impl_tuple);
