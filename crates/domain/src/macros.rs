//! Macro for implementing Display and FromStr for record attribute enums
//!
//! Record attributes (time type, importance, visibility) are persisted as
//! short lowercase words. This macro keeps the string mapping in one place
//! and handles case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use almanac_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Mood {
//!     Calm,
//!     Busy,
//! }
//!
//! impl_domain_enum_conversions!(Mood {
//!     Calm => "calm",
//!     Busy => "busy",
//! });
//! ```

/// Implements Display and FromStr traits for attribute enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
