/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::buffer::ByteBuffer;
use crate::error::ObfsError;
use crate::module::{RecvOutcome, Session};
use crate::params::Params;
use crate::registry::Registry;

/// Routes framework calls to whichever module a session belongs to.
///
/// The dispatcher holds no per-session state of its own -- every mutable field lives inside the
/// `Box<dyn Session>` the module handed back from `init`. Its only job beyond forwarding calls is
/// enforcing the one rule the source leaves implicit: `handshake` may be called at most once, and
/// only before the first `send`.
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Construct a module-specific session. Returns `Err` on failure; there is nothing further
    /// to clean up in that case since no session was ever allocated.
    pub fn init(&self, protocol: &str, params: &Params) -> Result<SessionHandle, ObfsError> {
        let session = self.registry.create_session(protocol, params)?;
        Ok(SessionHandle { session, handshake_sent: false })
    }
}

/// A live session plus the bookkeeping needed to enforce handshake-once.
pub struct SessionHandle {
    session: Box<dyn Session>,
    handshake_sent: bool,
}

impl SessionHandle {
    /// Append the initial handshake bytes to `out`, if this module has one. Must be called at
    /// most once, immediately after creation and before any `send`.
    pub fn handshake(&mut self, out: &mut ByteBuffer) -> Result<(), ObfsError> {
        if self.handshake_sent {
            debug_assert!(false, "handshake() called more than once on this session");
            return Err(ObfsError::HandshakeAlreadySent);
        }
        self.handshake_sent = true;
        self.session.handshake(out)
    }

    /// Transform user bytes into wire bytes.
    #[inline(always)]
    pub fn send(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<(), ObfsError> {
        self.session.send(src, dst)
    }

    /// Transform wire bytes into user bytes.
    #[inline(always)]
    pub fn recv(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<RecvOutcome, ObfsError> {
        self.session.recv(src, dst)
    }

    // No explicit `destroy`: dropping the handle drops the session, and well-behaved modules
    // zero their key material in their own `Drop` impls.
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct NoopSession;
    impl Session for NoopSession {
        fn send(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<(), ObfsError> {
            dst.append(&src.remove_all());
            Ok(())
        }
        fn recv(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<RecvOutcome, ObfsError> {
            dst.append(&src.remove_all());
            Ok(RecvOutcome::Progress)
        }
    }

    struct NoopModule;
    impl crate::module::ProtocolModule for NoopModule {
        fn name(&self) -> &'static str {
            "noop"
        }
        fn create_session(&self, _params: &Params) -> Result<Box<dyn Session>, ObfsError> {
            Ok(Box::new(NoopSession))
        }
    }

    fn test_params() -> Params {
        Params {
            protocol: "noop".to_string(),
            mode: crate::params::Mode::SimpleClient,
            listen: "127.0.0.1:1".parse().unwrap(),
            target: Some("127.0.0.1:2".parse().unwrap()),
            shared_secret: None,
        }
    }

    #[test]
    fn second_handshake_call_is_rejected() {
        let registry = Registry::with_modules([Arc::new(NoopModule) as Arc<dyn crate::module::ProtocolModule>]);
        let dispatcher = Dispatcher::new(&registry);
        let mut handle = dispatcher.init("noop", &test_params()).unwrap();
        let mut out = ByteBuffer::new();
        assert!(handle.handshake(&mut out).is_ok());
        assert!(handle.handshake(&mut out).is_err());
    }
}
