/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Errors that can originate from the crypto primitives.
///
/// Kept small and manually `Display`-ed rather than pulled in via a derive macro, matching the
/// rest of this codebase's leaf crates.
pub enum CryptoError {
    /// The underlying CSPRNG failed to produce bytes.
    EntropyUnavailable,

    /// A key or IV of the wrong length was supplied.
    InvalidKeyMaterial,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntropyUnavailable => f.write_str("EntropyUnavailable"),
            Self::InvalidKeyMaterial => f.write_str("InvalidKeyMaterial"),
        }
    }
}

impl std::fmt::Debug for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for CryptoError {}
