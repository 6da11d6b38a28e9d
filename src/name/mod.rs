//! Validated D-Bus name types.
//!
//! Interface, bus, member and error names each have their own validation
//! rules; validation happens at construction time so that all subsequent
//! code can assume well-formed values.

pub use self::name_error::{NameError, NameErrorKind};
mod name_error;

pub(crate) use self::validation::{validate_bus, validate_interface, validate_member};
mod validation;


use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

macro_rules! name_type {
    (
        $(#[doc = $doc:literal])*
        $name:ident, $owned:ident, $validate:path
    ) => {
        $(#[doc = $doc])*
        #[derive(Hash, PartialEq, Eq)]
        #[repr(transparent)]
        pub struct $name(str);

        impl $name {
            /// Construct with validation inside of a constant context.
            ///
            /// Panics in case the name is invalid.
            #[inline]
            #[track_caller]
            pub const fn new_const(name: &str) -> &$name {
                if $validate(name.as_bytes()).is_err() {
                    panic!("Invalid D-Bus name");
                }

                // SAFETY: The string slice is repr transparent over this type.
                unsafe { Self::new_unchecked(name) }
            }

            /// Try to construct a new name with validation.
            #[inline]
            pub const fn new(name: &str) -> Result<&$name, NameError> {
                if let Err(error) = $validate(name.as_bytes()) {
                    return Err(error);
                }

                // SAFETY: The string slice is repr transparent over this type.
                unsafe { Ok(Self::new_unchecked(name)) }
            }

            /// Construct without validation.
            ///
            /// # Safety
            ///
            /// The caller must ensure that the name is valid.
            pub(crate) const unsafe fn new_unchecked(name: &str) -> &Self {
                &*(name as *const _ as *const $name)
            }

            /// Get the name as a string.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&&self.0).finish()
            }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<$name> for $name {
            #[inline]
            fn as_ref(&self) -> &$name {
                self
            }
        }

        impl PartialEq<str> for $name {
            #[inline]
            fn eq(&self, other: &str) -> bool {
                &self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            #[inline]
            fn eq(&self, other: &&str) -> bool {
                &self.0 == *other
            }
        }

        impl ToOwned for $name {
            type Owned = $owned;

            #[inline]
            fn to_owned(&self) -> Self::Owned {
                $owned(self.0.into())
            }
        }

        impl<'a> TryFrom<&'a str> for &'a $name {
            type Error = NameError;

            #[inline]
            fn try_from(name: &'a str) -> Result<Self, Self::Error> {
                $name::new(name)
            }
        }

        #[doc = concat!("The owned variant of [`", stringify!($name), "`].")]
        #[derive(Clone, Hash, PartialEq, Eq)]
        pub struct $owned(Box<str>);

        impl $owned {
            /// Try to construct a new owned name with validation.
            pub fn new(name: &str) -> Result<Self, NameError> {
                Ok($name::new(name)?.to_owned())
            }
        }

        impl Deref for $owned {
            type Target = $name;

            #[inline]
            fn deref(&self) -> &Self::Target {
                // SAFETY: Construction ensures the contents are valid.
                unsafe { $name::new_unchecked(&self.0) }
            }
        }

        impl Borrow<$name> for $owned {
            #[inline]
            fn borrow(&self) -> &$name {
                self
            }
        }

        impl AsRef<$name> for $owned {
            #[inline]
            fn as_ref(&self) -> &$name {
                self
            }
        }

        impl fmt::Debug for $owned {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($owned)).field(&&self.0).finish()
            }
        }

        impl fmt::Display for $owned {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl PartialEq<$name> for $owned {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                **self == *other
            }
        }

        impl PartialEq<&$name> for $owned {
            #[inline]
            fn eq(&self, other: &&$name) -> bool {
                **self == **other
            }
        }
    };
}

name_type! {
    /// A validated D-Bus interface name.
    ///
    /// Two or more dot-separated elements of `[A-Z][a-z][0-9]_` characters;
    /// elements are non-empty and do not begin with a digit; total length in
    /// `[3, 255]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::InterfaceName;
    ///
    /// const INTERFACE: &InterfaceName = InterfaceName::new_const("org.freedesktop.DBus");
    ///
    /// assert!(InterfaceName::new("org.freedesktop..DBus").is_err());
    /// ```
    InterfaceName, OwnedInterfaceName, validate_interface
}

name_type! {
    /// A validated D-Bus bus name.
    ///
    /// As an interface name, except a leading `:` marks a unique connection
    /// name, `-` is permitted (but discouraged), and elements of unique
    /// names may begin with a digit.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::BusName;
    ///
    /// assert!(BusName::new("org.freedesktop.DBus").is_ok());
    /// assert!(BusName::new(":1.42").is_ok());
    /// ```
    BusName, OwnedBusName, validate_bus
}

name_type! {
    /// A validated D-Bus member name.
    ///
    /// A single element of `[A-Z][a-z][0-9]_` characters with no dots, not
    /// beginning with a digit; length in `[1, 255]`.
    MemberName, OwnedMemberName, validate_member
}

name_type! {
    /// A validated D-Bus error name.
    ///
    /// Error names have the same restrictions as interface names.
    ErrorName, OwnedErrorName, validate_interface
}
