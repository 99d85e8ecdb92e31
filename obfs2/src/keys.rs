/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use obfs_core::ObfsError;
use obfs_crypto::{AesCtr, Sha256};

use crate::constants::OBFUSCATE_HASH_ITERATIONS;

/// Shared core of both derivation routines in the spec: hash `keytype ‖ parts... ‖ keytype`,
/// optionally strengthen the result against a configured shared secret with
/// `OBFUSCATE_HASH_ITERATIONS` rounds of re-hashing, then split the 32-byte result into an
/// AES-128 key and IV.
///
/// The keytype string really is fed twice -- once before the seed material and once after. This
/// is a real part of the protocol's domain separation, not an accident to "fix".
fn derive(keytype: &[u8], parts: &[&[u8; 16]], secret_configured: bool) -> Result<AesCtr, ObfsError> {
    let mut d = Sha256::new();
    d.update(keytype);
    for part in parts {
        d.update(part.as_slice());
    }
    d.update(keytype);
    let mut buf = d.finish();

    if secret_configured {
        for _ in 0..OBFUSCATE_HASH_ITERATIONS {
            buf = Sha256::hash(&buf);
        }
    }

    let cipher = AesCtr::new(&buf[0..16], &buf[16..32])?;
    Ok(cipher)
}

/// Derives a padding-key cipher from one side's own seed (and the shared secret, if any). Used
/// for both `send_padding_crypto` (our seed) and `recv_padding_crypto` (the peer's seed).
pub fn derive_padding_key(seed: &[u8; 16], secret_seed: Option<&[u8; 16]>, keytype: &[u8]) -> Result<AesCtr, ObfsError> {
    let mut parts: Vec<&[u8; 16]> = vec![seed];
    if let Some(ss) = secret_seed {
        parts.push(ss);
    }
    derive(keytype, &parts, secret_seed.is_some())
}

/// Derives a session-key cipher from every seed currently known, in order: initiator, responder,
/// secret. Only called once both seeds are known (i.e. once the peer's handshake has arrived).
pub fn derive_key(
    initiator_seed: Option<&[u8; 16]>,
    responder_seed: Option<&[u8; 16]>,
    secret_seed: Option<&[u8; 16]>,
    keytype: &[u8],
) -> Result<AesCtr, ObfsError> {
    let mut parts: Vec<&[u8; 16]> = Vec::with_capacity(3);
    if let Some(s) = initiator_seed {
        parts.push(s);
    }
    if let Some(s) = responder_seed {
        parts.push(s);
    }
    if let Some(s) = secret_seed {
        parts.push(s);
    }
    derive(keytype, &parts, secret_seed.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{INITIATOR_DATA_KEYTYPE, RESPONDER_DATA_KEYTYPE};

    #[test]
    fn derivation_is_deterministic() {
        let seed = [7u8; 16];
        let mut a = derive_padding_key(&seed, None, INITIATOR_DATA_KEYTYPE).unwrap();
        let mut b = derive_padding_key(&seed, None, INITIATOR_DATA_KEYTYPE).unwrap();
        let mut buf_a = [1u8; 16];
        let mut buf_b = [1u8; 16];
        a.crypt_in_place(&mut buf_a);
        b.crypt_in_place(&mut buf_b);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn different_keytypes_yield_different_keystreams() {
        let seed = [7u8; 16];
        let mut a = derive_padding_key(&seed, None, INITIATOR_DATA_KEYTYPE).unwrap();
        let mut b = derive_padding_key(&seed, None, RESPONDER_DATA_KEYTYPE).unwrap();
        let mut buf_a = [1u8; 16];
        let mut buf_b = [1u8; 16];
        a.crypt_in_place(&mut buf_a);
        b.crypt_in_place(&mut buf_b);
        assert_ne!(buf_a, buf_b);
    }

    #[test]
    fn secret_seed_changes_the_derived_key() {
        let i = [1u8; 16];
        let r = [2u8; 16];
        let secret = [9u8; 16];
        let mut without = derive_key(Some(&i), Some(&r), None, INITIATOR_DATA_KEYTYPE).unwrap();
        let mut with = derive_key(Some(&i), Some(&r), Some(&secret), INITIATOR_DATA_KEYTYPE).unwrap();
        let mut buf_a = [1u8; 16];
        let mut buf_b = [1u8; 16];
        without.crypt_in_place(&mut buf_a);
        with.crypt_in_place(&mut buf_b);
        assert_ne!(buf_a, buf_b);
    }
}
