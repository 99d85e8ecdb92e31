/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! obfs2: a lightweight, keyed, IV-stream-cipher-based obfuscator with padding-based
//! anti-fingerprinting. Not a secure channel -- no forward secrecy, no authentication, no replay
//! protection. See `Obfs2Module` for the registry-facing entry point.

pub mod constants;
mod keys;
mod module;
mod session;

pub use module::Obfs2Module;
pub use session::{Obfs2Session, Phase};
