//! String codecs for enumerations
//!
//! Each enumeration carries an explicit mapping table between its variants and
//! their canonical strings. The same table drives JSON (de)serialization and
//! the text columns of the SQL store, so the wire and the database never
//! disagree about spelling.

use thiserror::Error;

/// Raised when a string matches no entry of a mapping table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declare an enumeration together with its canonical string table
///
/// Generates `as_str`, `MAPPING`, `NAMES`, `Display`, `FromStr`, and serde
/// impls that read and write the canonical strings.
///
/// # Example
/// ```rust,ignore
/// string_enum! {
///     /// How an expense was paid
///     pub enum PaymentMethod("payment method") {
///         Cash => "cash",
///         Transfer => "transfer",
///     }
/// }
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Variant to canonical string table
            pub const MAPPING: &'static [($name, &'static str)] = &[$(($name::$variant, $text)),+];

            /// Canonical strings in declaration order
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::core::codec::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::MAPPING
                    .iter()
                    .find(|(_, text)| *text == s)
                    .map(|(variant, _)| *variant)
                    .ok_or_else(|| $crate::core::codec::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::NAMES.join(", "),
                    })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse::<$name>()
                    .map_err(|_| <D::Error as ::serde::de::Error>::unknown_variant(&raw, Self::NAMES))
            }
        }
    };
}
