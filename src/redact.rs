//! Secret redaction for keys in logs, serialization, and display.
//!
//! The signer key travels from [`crate::config::BridgeConfig`] into each
//! [`crate::evm::EvmClientConfig`] wrapped in [`Redacted`], so it never shows
//! up through `Debug`, `Display`, or `Serialize`.

use std::fmt::{self, Debug, Display};

/// Wrapper that redacts its inner value when formatted or serialized.
///
/// # Example
///
/// ```
/// use bridgehub_rs::redact::Redacted;
///
/// let key = Redacted("0x7726827caac94a7f9e1b160f7ea819f172f7b6f9d2a97f992c38edeab82d4110");
/// assert_eq!(format!("{key:?}"), "<redacted>");
/// assert_eq!(key.to_string(), "<redacted>");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// The wrapped secret; keep it out of log fields
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}
