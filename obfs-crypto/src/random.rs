/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::CryptoError;

/// Fill `buf` with cryptographically strong random bytes.
#[inline(always)]
pub fn random_bytes(buf: &mut [u8]) -> Result<(), CryptoError> {
    openssl::rand::rand_bytes(buf).map_err(|_| CryptoError::EntropyUnavailable)
}

/// Convenience: a fresh random 16-byte seed.
#[inline(always)]
pub fn random_seed() -> Result<[u8; 16], CryptoError> {
    let mut s = [0u8; 16];
    random_bytes(&mut s)?;
    Ok(s)
}

/// A uniformly random 32-bit value.
#[inline(always)]
pub fn random_u32() -> Result<u32, CryptoError> {
    let mut b = [0u8; 4];
    random_bytes(&mut b)?;
    Ok(u32::from_ne_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_fills_the_whole_buffer_and_varies() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        random_bytes(&mut a).unwrap();
        random_bytes(&mut b).unwrap();
        assert_ne!(a, b, "two independent draws should not collide");
    }
}
