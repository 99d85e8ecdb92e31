/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod digest;
pub mod error;
pub mod random;
pub mod secret;
pub mod stream_cipher;

pub use digest::Sha256;
pub use error::CryptoError;
pub use secret::Secret;
pub use stream_cipher::AesCtr;
