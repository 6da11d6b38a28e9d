use std::fmt;
use std::str::from_utf8_unchecked;

use super::{validate, SignatureBuf, SignatureError};

/// A validated D-Bus signature.
///
/// This is an unsized view; the owned variant is [`SignatureBuf`].
///
/// # Examples
///
/// ```
/// use minibus::Signature;
///
/// const SIG: &Signature = Signature::new_const(b"a{sv}");
///
/// assert!(Signature::new(b"a(st)").is_ok());
/// assert!(Signature::new(b"a").is_err());
/// ```
#[derive(Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct Signature([u8]);

impl Signature {
    /// The empty signature.
    pub const EMPTY: &'static Signature = Signature::new_const(b"");

    /// The signature of a single byte, `y`.
    pub const BYTE: &'static Signature = Signature::new_const(b"y");

    /// The signature of a boolean, `b`.
    pub const BOOL: &'static Signature = Signature::new_const(b"b");

    /// The signature of a signed 16-bit integer, `n`.
    pub const INT16: &'static Signature = Signature::new_const(b"n");

    /// The signature of an unsigned 16-bit integer, `q`.
    pub const UINT16: &'static Signature = Signature::new_const(b"q");

    /// The signature of a signed 32-bit integer, `i`.
    pub const INT32: &'static Signature = Signature::new_const(b"i");

    /// The signature of an unsigned 32-bit integer, `u`.
    pub const UINT32: &'static Signature = Signature::new_const(b"u");

    /// The signature of a signed 64-bit integer, `x`.
    pub const INT64: &'static Signature = Signature::new_const(b"x");

    /// The signature of an unsigned 64-bit integer, `t`.
    pub const UINT64: &'static Signature = Signature::new_const(b"t");

    /// The signature of an IEEE 754 double-precision float, `d`.
    pub const DOUBLE: &'static Signature = Signature::new_const(b"d");

    /// The signature of a string, `s`.
    pub const STRING: &'static Signature = Signature::new_const(b"s");

    /// The signature of an object path, `o`.
    pub const OBJECT_PATH: &'static Signature = Signature::new_const(b"o");

    /// The signature of a signature, `g`.
    pub const SIGNATURE: &'static Signature = Signature::new_const(b"g");

    /// The signature of a variant, `v`.
    pub const VARIANT: &'static Signature = Signature::new_const(b"v");

    /// The signature of a Unix file descriptor index, `h`.
    pub const UNIX_FD: &'static Signature = Signature::new_const(b"h");

    /// Construct a new signature with validation inside of a constant
    /// context.
    ///
    /// Panics in case the signature is invalid.
    ///
    /// ```compile_fail
    /// use minibus::Signature;
    ///
    /// const BAD: &Signature = Signature::new_const(b"(y");
    /// ```
    #[inline]
    #[track_caller]
    pub const fn new_const(signature: &[u8]) -> &Signature {
        if validate(signature).is_err() {
            panic!("Invalid D-Bus signature");
        }

        // SAFETY: The byte slice is repr transparent over this type.
        unsafe { Self::new_unchecked(signature) }
    }

    /// Try to construct a new signature with validation.
    #[inline]
    pub const fn new(signature: &[u8]) -> Result<&Signature, SignatureError> {
        if let Err(error) = validate(signature) {
            return Err(error);
        }

        // SAFETY: The byte slice is repr transparent over this type.
        unsafe { Ok(Self::new_unchecked(signature)) }
    }

    /// Construct a new signature without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the signature is valid.
    pub(crate) const unsafe fn new_unchecked(signature: &[u8]) -> &Self {
        &*(signature as *const _ as *const Signature)
    }

    /// Test if the signature is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length of the signature in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the signature as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: Validation ensures that the signature is ASCII.
        unsafe { from_utf8_unchecked(&self.0) }
    }

    /// Get the signature as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<Signature> for Signature {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl ToOwned for Signature {
    type Owned = SignatureBuf;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // SAFETY: A valid signature is a valid signature buffer.
        unsafe { SignatureBuf::from_slice_unchecked(&self.0) }
    }
}

impl PartialEq<SignatureBuf> for Signature {
    #[inline]
    fn eq(&self, other: &SignatureBuf) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl PartialEq<SignatureBuf> for &Signature {
    #[inline]
    fn eq(&self, other: &SignatureBuf) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl PartialEq<[u8]> for Signature {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Signature {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl<const N: usize> PartialEq<[u8; N]> for &Signature {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}
