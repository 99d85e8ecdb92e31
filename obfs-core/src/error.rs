/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use obfs_crypto::CryptoError;

/// Errors surfaced by the dispatch framework or a protocol module.
///
/// The core never retries internally: every variant here is handed back to the dispatcher's
/// caller, which owns the connection lifecycle and decides whether/how to close it.
pub enum ObfsError {
    /// CLI/config parsing failure, or a parameter record that violates a mode's rules
    /// (e.g. `--dest` given in socks mode). Carries a human-readable usage message.
    Configuration(String),

    /// The named protocol is not in the registry.
    ModuleNotRegistered(String),

    /// The module declined to create a session (bad params, allocation failure).
    SessionCreationFailed,

    /// The CSPRNG or digest primitive failed.
    Crypto(CryptoError),

    /// The peer sent a malformed or forged handshake, or derivation failed. The session is no
    /// longer usable; the caller must close the connection.
    ProtocolViolation(&'static str),

    /// A second handshake call was attempted on a session; forbidden by this framework.
    HandshakeAlreadySent,
}

impl From<CryptoError> for ObfsError {
    #[inline(always)]
    fn from(e: CryptoError) -> Self {
        Self::Crypto(e)
    }
}

impl std::fmt::Display for ObfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Self::ModuleNotRegistered(name) => write!(f, "protocol '{}' is not registered", name),
            Self::SessionCreationFailed => f.write_str("session creation failed"),
            Self::Crypto(e) => write!(f, "crypto error: {}", e),
            Self::ProtocolViolation(why) => write!(f, "protocol violation: {}", why),
            Self::HandshakeAlreadySent => f.write_str("handshake() called more than once on this session"),
        }
    }
}

impl std::fmt::Debug for ObfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for ObfsError {}
