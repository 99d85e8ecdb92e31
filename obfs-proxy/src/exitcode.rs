/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Small, self-contained process exit codes -- this binary only ever needs a handful, so pulling
//! in a crate for BSD `sysexits.h` constants would be more ceremony than the problem warrants.

pub const OK: i32 = 0;
pub const ERR_USAGE: i32 = 64;
pub const ERR_RUNTIME: i32 = 70;
