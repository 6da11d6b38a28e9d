/// Helper to efficiently repeat type parameters for tuple impls.
macro_rules! repeat {
    ($macro:path) => {
        $macro!(A);
        $macro!(A, B);
        $macro!(A, B, C);
        $macro!(A, B, C, D);
        $macro!(A, B, C, D, E);
        $macro!(A, B, C, D, E, F);
        $macro!(A, B, C, D, E, F, G);
        $macro!(A, B, C, D, E, F, G, H);
        $macro!(A, B, C, D, E, F, G, H, I);
        $macro!(A, B, C, D, E, F, G, H, I, J);
        $macro!(A, B, C, D, E, F, G, H, I, J, K);
        $macro!(A, B, C, D, E, F, G, H, I, J, K, L);
        $macro!(A, B, C, D, E, F, G, H, I, J, K, L, M);
        $macro!(A, B, C, D, E, F, G, H, I, J, K, L, M, N);
        $macro!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O);
        $macro!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P);
    };
}

/// Construct a transparent struct wrapping a raw protocol value, with
/// associated constants for the closed set of known values.
///
/// Unknown values remain representable, which is what the wire demands: raw
/// protocol enumerations decode without validation.
macro_rules! raw_enum {
    (
        $(#[doc = $doc:literal])*
        #[repr($repr:ty)]
        $vis:vis enum $name:ident {
            $(
                $(#[$($variant_meta:meta)*])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $name(pub(crate) $repr);

        impl $name {
            $(
                $(#[$($variant_meta)*])*
                $vis const $variant: Self = Self($value);
            )*

            /// Construct from a raw value.
            #[inline]
            #[allow(dead_code)]
            pub(crate) const fn new(value: $repr) -> Self {
                Self(value)
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match *self {
                    $(Self::$variant => f.write_str(stringify!($variant)),)*
                    Self(raw) => write!(f, "{}({raw})", stringify!($name)),
                }
            }
        }
    }
}

/// Construct a transparent bit-set over a raw protocol value.
///
/// The generated type supports `|` to combine flags and `&` to test them.
macro_rules! raw_set {
    (
        $(#[doc = $doc:literal])*
        #[repr($repr:ty)]
        $vis:vis enum $name:ident {
            $(
                $(#[$($variant_meta:meta)*])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Default, Clone, Copy, PartialEq, Eq)]
        #[repr(transparent)]
        $vis struct $name(pub(crate) $repr);

        impl $name {
            $(
                $(#[$($variant_meta)*])*
                $vis const $variant: Self = Self($value);
            )*
        }

        impl ::core::ops::BitOr for $name {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::core::ops::BitAnd for $name {
            type Output = bool;

            #[inline]
            fn bitand(self, rhs: Self) -> bool {
                self.0 & rhs.0 != 0
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut f = f.debug_set();
                let mut rest = self.0;

                $(
                    if $value != 0 && rest & $value == $value {
                        f.entry(&format_args!("{}", stringify!($variant)));
                        rest &= !$value;
                    }
                )*

                if rest != 0 {
                    f.entry(&format_args!("{rest:#b}"));
                }

                f.finish()
            }
        }
    }
}

/// Construct an enumeration which marshals as its string label.
///
/// The label is written as a D-Bus string (`s`); decoding an unknown label
/// fails with an unexpected-enum error carrying the byte index of the label.
///
/// # Examples
///
/// ```
/// use minibus::{BodyBuf, Signature};
/// use minibus::proto::Endianness;
///
/// minibus::labeled_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Mode {
///         Read = "read",
///         Write = "write",
///     }
/// }
///
/// let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
/// buf.store(&Mode::Read)?;
///
/// assert_eq!(buf.signature(), Signature::STRING);
/// assert_eq!(buf.get(), &[4, 0, 0, 0, b'r', b'e', b'a', b'd', 0]);
/// # Ok::<_, minibus::Error>(())
/// ```
#[macro_export]
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$($variant_meta:meta)*])*
                $variant:ident = $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$($variant_meta)*])*
                $variant,
            )*
        }

        impl $name {
            /// The string label of this value.
            $vis fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl $crate::Encode for $name {
            const ALIGNMENT: usize = 4;

            #[inline]
            fn signature(
                builder: &mut $crate::signature::SignatureBuilder,
            ) -> ::core::result::Result<(), $crate::SignatureError> {
                <str as $crate::Encode>::signature(builder)
            }

            #[inline]
            fn encode(&self, buf: &mut $crate::BodyBuf) -> $crate::Result<()> {
                <str as $crate::Encode>::encode(self.label(), buf)
            }
        }

        impl<'de> $crate::Decode<'de> for $name {
            const ALIGNMENT: usize = 4;

            #[inline]
            fn signature(
                builder: &mut $crate::signature::SignatureBuilder,
            ) -> ::core::result::Result<(), $crate::SignatureError> {
                <str as $crate::Encode>::signature(builder)
            }

            #[inline]
            fn decode(cursor: &mut $crate::Cursor<'de>) -> $crate::Result<Self> {
                let at = cursor.pos();
                let label = cursor.read::<&str>()?;

                match label {
                    $($label => Ok(Self::$variant),)*
                    _ => Err($crate::Error::unexpected_enum(at)),
                }
            }
        }
    }
}
