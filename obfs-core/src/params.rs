/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::net::SocketAddr;

use zeroize::Zeroizing;

/// How this instance participates in the tunnel.
///
/// `is_initiator()` tracks the source's "is-initiator flag": true for every mode except
/// `SimpleServer`, which only ever accepts and responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Accept plaintext locally, dial a fixed obfuscated target, initiate the handshake.
    SimpleClient,

    /// Accept a SOCKS connection locally, learn the target from the SOCKS request, dial it
    /// obfuscated, initiate the handshake.
    SocksClient,

    /// Accept an obfuscated connection, respond to the handshake, relay plaintext to a fixed
    /// local target.
    SimpleServer,
}

impl Mode {
    #[inline(always)]
    pub fn is_initiator(self) -> bool {
        !matches!(self, Mode::SimpleServer)
    }

    /// Default listen port per mode, used when the CLI doesn't spell one out explicitly.
    #[inline(always)]
    pub fn default_port(self) -> u16 {
        match self {
            Mode::SimpleClient => 48988,
            Mode::SocksClient => 23548,
            Mode::SimpleServer => 11253,
        }
    }
}

/// Parsed, per-listener configuration. Built once from the CLI, shared by reference across every
/// session that listener accepts or dials.
pub struct Params {
    /// Registry name of the protocol to use, e.g. `"obfs2"`.
    pub protocol: String,

    pub mode: Mode,

    /// Address to accept connections on.
    pub listen: SocketAddr,

    /// Fixed peer address. Required for `SimpleClient`/`SimpleServer`, forbidden for
    /// `SocksClient` (where the target is instead learned per-connection from the SOCKS request).
    pub target: Option<SocketAddr>,

    /// Shared secret, if configured. Zeroized on drop.
    pub shared_secret: Option<Zeroizing<Vec<u8>>>,
}

impl Params {
    #[inline(always)]
    pub fn is_initiator(&self) -> bool {
        self.mode.is_initiator()
    }

    /// Validate the mode/target pairing the source requires: target required except in socks
    /// mode, forbidden in socks mode.
    pub fn validate(&self) -> Result<(), String> {
        match self.mode {
            Mode::SocksClient if self.target.is_some() => Err("--dest is forbidden in socks mode".to_string()),
            Mode::SocksClient => Ok(()),
            _ if self.target.is_none() => Err("--dest is required in client/server mode".to_string()),
            _ => Ok(()),
        }
    }
}
