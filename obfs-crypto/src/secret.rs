/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use zeroize::Zeroize;

/// A fixed-size byte array holding key material that is wiped on drop.
///
/// Mirrors the `Secret<N>` type this codebase's session-layer crates thread through their key
/// schedules; distinct uses get distinct `N` (a 16-byte seed vs. a 32-byte digest output) so the
/// compiler catches a derivation routine feeding the wrong thing into the wrong slot.
pub struct Secret<const N: usize>([u8; N]);

impl<const N: usize> Secret<N> {
    #[inline(always)]
    pub fn new(b: [u8; N]) -> Self {
        Self(b)
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline(always)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }

    /// True if every byte is zero — the sentinel this protocol uses for "not yet known".
    #[inline(always)]
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl<const N: usize> Default for Secret<N> {
    #[inline(always)]
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> Clone for Secret<N> {
    #[inline(always)]
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<const N: usize> Drop for Secret<N> {
    #[inline(always)]
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
