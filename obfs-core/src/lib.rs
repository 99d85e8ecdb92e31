/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod buffer;
pub mod dispatch;
pub mod error;
pub mod module;
pub mod params;
pub mod registry;

pub use buffer::ByteBuffer;
pub use dispatch::{Dispatcher, SessionHandle};
pub use error::ObfsError;
pub use module::{ProtocolModule, RecvOutcome, Session};
pub use params::{Mode, Params};
pub use registry::Registry;
