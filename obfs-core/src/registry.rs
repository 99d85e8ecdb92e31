/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ObfsError;
use crate::module::{ProtocolModule, Session};
use crate::params::Params;

/// Maps protocol name to module descriptor.
///
/// Registration is static: built once, before any session is created, and never mutated again.
/// The source's dynamically-loaded function-pointer table becomes a plain immutable map of
/// `Arc<dyn ProtocolModule>` -- reading it concurrently from many connection-handling tasks is
/// always safe.
#[derive(Default)]
pub struct Registry(BTreeMap<&'static str, Arc<dyn ProtocolModule>>);

impl Registry {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a registry from a fixed set of modules. Intended to be called exactly once, at
    /// process start, typically to populate a `std::sync::OnceLock`.
    pub fn with_modules(modules: impl IntoIterator<Item = Arc<dyn ProtocolModule>>) -> Self {
        let mut r = Self::new();
        for m in modules {
            r.register(m);
        }
        r
    }

    pub fn register(&mut self, module: Arc<dyn ProtocolModule>) {
        self.0.insert(module.name(), module);
    }

    #[inline(always)]
    pub fn is_supported(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names of every registered protocol, in a stable order, for help text.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn create_session(&self, name: &str, params: &Params) -> Result<Box<dyn Session>, ObfsError> {
        self.0
            .get(name)
            .ok_or_else(|| ObfsError::ModuleNotRegistered(name.to_string()))?
            .create_session(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ByteBuffer;
    use crate::module::RecvOutcome;

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
    impl ProtocolModule for NoopModule {
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
    fn unregistered_name_is_not_supported() {
        let r = Registry::new();
        assert!(!r.is_supported("noop"));
        assert!(r.create_session("noop", &test_params()).is_err());
    }

    #[test]
    fn registered_module_is_reachable_by_name() {
        let r = Registry::with_modules([Arc::new(NoopModule) as Arc<dyn ProtocolModule>]);
        assert!(r.is_supported("noop"));
        assert!(r.create_session("noop", &test_params()).is_ok());
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["noop"]);
    }
}
