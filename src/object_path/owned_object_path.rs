use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use super::{ObjectPath, PathError};

/// An owned D-Bus object path.
///
/// Dereferences to [`ObjectPath`].
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct OwnedObjectPath(Box<str>);

impl OwnedObjectPath {
    /// Try to construct a new owned object path with validation.
    pub fn new(path: &str) -> Result<Self, PathError> {
        Ok(ObjectPath::new(path)?.to_owned())
    }

    #[inline]
    pub(crate) fn from_path(path: &ObjectPath) -> Self {
        Self(path.as_str().into())
    }
}

impl Deref for OwnedObjectPath {
    type Target = ObjectPath;

    #[inline]
    fn deref(&self) -> &Self::Target {
        // SAFETY: Construction ensures the contents are a valid path.
        unsafe { ObjectPath::new_unchecked(&self.0) }
    }
}

impl Borrow<ObjectPath> for OwnedObjectPath {
    #[inline]
    fn borrow(&self) -> &ObjectPath {
        self
    }
}

impl AsRef<ObjectPath> for OwnedObjectPath {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl fmt::Debug for OwnedObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedObjectPath").field(&&self.0).finish()
    }
}

impl fmt::Display for OwnedObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<ObjectPath> for OwnedObjectPath {
    #[inline]
    fn eq(&self, other: &ObjectPath) -> bool {
        **self == *other
    }
}

impl PartialEq<&ObjectPath> for OwnedObjectPath {
    #[inline]
    fn eq(&self, other: &&ObjectPath) -> bool {
        **self == **other
    }
}
