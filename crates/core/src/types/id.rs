//! Newtype IDs for type-safe entity references.
//!
//! The catalog API hands out opaque string identifiers, and references to
//! other entities arrive in one of two shapes depending on whether the
//! server populated them:
//!
//! ```json
//! { "parentCategory": "65f1c0..." }
//! { "parentCategory": { "_id": "65f1c0...", "name": "Tea" } }
//! ```
//!
//! Every ID generated by [`define_id!`] deserializes from either shape (and
//! from a bare integer), so record types can declare references as plain
//! `Option<CategoryId>` or `Vec<TransportId>`.

use serde::Deserialize;

/// Wire shapes accepted for an identifier or a reference to one.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawReference {
    Text(String),
    Number(u64),
    Document {
        #[serde(rename = "_id", alias = "id")]
        id: Box<RawReference>,
    },
}

impl RawReference {
    /// Flatten to the underlying identifier text.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
            Self::Document { id } => id.into_string(),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a bare string, `Deserialize` from a string, an integer,
///   or a populated document carrying `_id`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use taiyuan_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new("a1");
/// let bin = BinId::new("a1");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// # let _ = (shelf, bin);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <$crate::types::id::RawReference as ::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                Ok(Self(raw.into_string()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(TransportId);
define_id!(CarouselId);
define_id!(OrderId);
