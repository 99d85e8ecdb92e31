/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use obfs_core::{ObfsError, Params, ProtocolModule, Session};

use crate::session::Obfs2Session;

/// Registry-facing entry point for obfs2. Stateless -- every field a session needs lives in the
/// `Obfs2Session` it hands back from `create_session`.
#[derive(Default)]
pub struct Obfs2Module;

impl ProtocolModule for Obfs2Module {
    fn name(&self) -> &'static str {
        "obfs2"
    }

    fn create_session(&self, params: &Params) -> Result<Box<dyn Session>, ObfsError> {
        Ok(Box::new(Obfs2Session::new(params)?))
    }
}
