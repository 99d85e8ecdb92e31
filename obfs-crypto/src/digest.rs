/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use sha2::Digest as _;

pub const SHA256_LENGTH: usize = 32;

/// Incremental SHA-256, thin wrapper over the `sha2` crate.
#[repr(transparent)]
pub struct Sha256(sha2::Sha256);

impl Sha256 {
    #[inline(always)]
    pub fn new() -> Self {
        Self(sha2::Sha256::new())
    }

    #[inline(always)]
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    #[inline(always)]
    pub fn finish(self) -> [u8; SHA256_LENGTH] {
        self.0.finalize().into()
    }

    /// One-shot digest of a single slice.
    #[inline(always)]
    pub fn hash(data: &[u8]) -> [u8; SHA256_LENGTH] {
        let mut h = Self::new();
        h.update(data);
        h.finish()
    }
}

impl Default for Sha256 {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_matches_one_shot() {
        let mut incremental = Sha256::new();
        incremental.update(b"hello, ");
        incremental.update(b"world");
        assert_eq!(incremental.finish(), Sha256::hash(b"hello, world"));
    }

    #[test]
    fn empty_input_known_vector() {
        let d = Sha256::hash(b"");
        assert_eq!(d[0], 0xe3);
        assert_eq!(d[31], 0x55);
    }
}
