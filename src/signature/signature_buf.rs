use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use super::{validate, Signature, SignatureError, MAX_SIGNATURE};

/// An owned D-Bus signature.
///
/// Storage is inline and bounded by the protocol maximum of 255 bytes.
/// Equality is bytewise. Dereferences to [`Signature`].
///
/// # Examples
///
/// ```
/// use minibus::{Signature, SignatureBuf};
///
/// let sig = SignatureBuf::new(b"aay")?;
/// assert_eq!(&*sig, Signature::new(b"aay")?);
/// # Ok::<_, minibus::SignatureError>(())
/// ```
#[derive(Clone)]
pub struct SignatureBuf {
    data: [u8; MAX_SIGNATURE],
    len: u8,
}

impl SignatureBuf {
    /// Construct a new empty signature.
    pub const fn empty() -> Self {
        Self {
            data: [0; MAX_SIGNATURE],
            len: 0,
        }
    }

    /// Construct a new signature with validation.
    pub fn new(signature: &[u8]) -> Result<Self, SignatureError> {
        validate(signature)?;
        // SAFETY: Just validated above.
        unsafe { Ok(Self::from_slice_unchecked(signature)) }
    }

    /// Construct from a slice without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the slice is a valid signature, which
    /// also bounds its length to 255.
    pub(crate) unsafe fn from_slice_unchecked(signature: &[u8]) -> Self {
        let mut data = [0; MAX_SIGNATURE];
        data[..signature.len()].copy_from_slice(signature);

        Self {
            data,
            len: signature.len() as u8,
        }
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }
}

impl Default for SignatureBuf {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for SignatureBuf {
    type Target = Signature;

    #[inline]
    fn deref(&self) -> &Self::Target {
        // SAFETY: Construction ensures the contents are a valid signature.
        unsafe { Signature::new_unchecked(self.as_slice()) }
    }
}

impl Borrow<Signature> for SignatureBuf {
    #[inline]
    fn borrow(&self) -> &Signature {
        self
    }
}

impl AsRef<Signature> for SignatureBuf {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl fmt::Debug for SignatureBuf {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignatureBuf").field(&self.as_str()).finish()
    }
}

impl PartialEq for SignatureBuf {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for SignatureBuf {}

impl Hash for SignatureBuf {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl PartialEq<Signature> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        self.as_slice() == other.as_bytes()
    }
}

impl PartialEq<&Signature> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &&Signature) -> bool {
        self.as_slice() == other.as_bytes()
    }
}
