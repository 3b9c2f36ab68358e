//! Validated SQL identifiers
//!
//! Table and column names reach the database only through these types, and
//! only in quoted form. Validation mirrors what PostgreSQL itself accepts for
//! a quoted identifier, so names that would be truncated or rejected by the
//! server are caught before any statement is sent.
//!
//! # Example
//!
//! ```rust
//! use lossdrill_core::identifiers::TableName;
//!
//! let table = TableName::new("customers").unwrap();
//! assert_eq!(table.quoted(), "\"customers\"");
//!
//! assert!(TableName::new("").is_err());
//! ```

use serde::{Deserialize, Serialize};

/// Longest identifier PostgreSQL keeps without truncation (`NAMEDATALEN - 1`).
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Errors that can occur when validating an identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidIdentifier {
    /// Identifier is empty
    #[error("identifier cannot be empty")]
    Empty,
    /// Identifier would be truncated by the server
    #[error("identifier '{name}' is {len} bytes (max {MAX_IDENTIFIER_BYTES})")]
    TooLong { name: String, len: usize },
    /// Identifier contains a NUL byte, which no quoting can carry
    #[error("identifier '{name}' contains a NUL byte")]
    NulByte { name: String },
}

fn validate(name: &str) -> Result<(), InvalidIdentifier> {
    if name.is_empty() {
        return Err(InvalidIdentifier::Empty);
    }
    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(InvalidIdentifier::TooLong {
            name: name.to_string(),
            len: name.len(),
        });
    }
    if name.contains('\0') {
        return Err(InvalidIdentifier::NulByte {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Quote an identifier for inclusion in SQL text.
///
/// Embedded double quotes are doubled, so the result always names exactly
/// the relation or column given, with case preserved.
pub fn quote_ident(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

macro_rules! identifier_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated identifier
            pub fn new(name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
                let name = name.into();
                validate(&name)?;
                Ok(Self(name))
            }

            /// Create an identifier without checks (for known-valid constants).
            pub(crate) fn new_unchecked(name: &str) -> Self {
                Self(name.to_string())
            }

            /// Raw, unquoted name as stored in the catalog
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Name quoted for SQL text
            pub fn quoted(&self) -> String {
                quote_ident(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidIdentifier;

            fn try_from(name: String) -> Result<Self, Self::Error> {
                Self::new(name)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier_type!(
    /// Name of a table (target or backup), unqualified
    TableName
);

identifier_type!(
    /// Name of a column
    ColumnName
);

impl TableName {
    /// Name with a `_v{version}` suffix, validated like any other name
    pub fn versioned(&self, version: u32) -> Result<Self, InvalidIdentifier> {
        Self::new(format!("{}_v{}", self.0, version))
    }
}
