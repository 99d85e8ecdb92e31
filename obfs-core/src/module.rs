/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::buffer::ByteBuffer;
use crate::error::ObfsError;
use crate::params::Params;

/// Result of a `recv` call that did not encounter a protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// Made progress; call again whenever more bytes arrive.
    Progress,

    /// Need at least this many additional bytes buffered in `src` before another call can make
    /// progress. The caller must not invoke `recv` again until that much more has arrived.
    NeedMore(usize),
}

/// Per-connection state for one side of one obfuscated tunnel.
///
/// This is the "opaque state pointer" of the source re-architected as a trait object: the
/// dispatcher holds a `Box<dyn Session>` and never looks inside it. Destruction is ordinary
/// `Drop` -- implementers that hold key material should zero it in their `Drop` impl (typically
/// for free, by storing it in `obfs_crypto::Secret`).
pub trait Session: Send {
    /// Append the initial handshake message, if this protocol has one, to `out`. Called at most
    /// once, immediately after the session is created and before any `send`.
    ///
    /// The default implementation is the "no handshake" no-op the source tolerates for modules
    /// that don't need one.
    fn handshake(&mut self, out: &mut ByteBuffer) -> Result<(), ObfsError> {
        let _ = out;
        Ok(())
    }

    /// Transform user bytes into wire bytes. Consumes all of `src`, appends to `dst`.
    fn send(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<(), ObfsError>;

    /// Transform wire bytes into user bytes. Consumes what it can from `src`, appends plaintext
    /// to `dst`.
    fn recv(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<RecvOutcome, ObfsError>;
}

/// A pluggable obfuscation protocol.
///
/// Implement this once per protocol and register an instance with the [`crate::Registry`]. This
/// is the "vtable" of the source: every module supplies the same capability set, and the
/// dispatcher never has to know which protocol it's talking to.
pub trait ProtocolModule: Send + Sync {
    /// Short identifier used on the command line, e.g. `"obfs2"`.
    fn name(&self) -> &'static str;

    /// Construct a fresh session for one connection.
    fn create_session(&self, params: &Params) -> Result<Box<dyn Session>, ObfsError>;
}
