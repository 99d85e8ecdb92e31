/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use openssl::symm::{Cipher, Crypter, Mode};

use crate::error::CryptoError;

fn aes_ctr_by_key_size(ks: usize) -> Result<Cipher, CryptoError> {
    match ks {
        16 => Ok(Cipher::aes_128_ctr()),
        24 => Ok(Cipher::aes_192_ctr()),
        32 => Ok(Cipher::aes_256_ctr()),
        _ => Err(CryptoError::InvalidKeyMaterial),
    }
}

/// AES-CTR stream cipher. In CTR mode encrypt and decrypt are the same operation, so a single
/// type serves both directions -- one instance for sending, one for receiving.
pub struct AesCtr(Vec<u8>, Crypter);

impl AesCtr {
    /// Construct and initialize an AES-CTR keystream with the given key and IV.
    ///
    /// Key must be 16, 24, or 32 bytes. The obfs2 module only ever uses 16-byte (AES-128) keys
    /// and 16-byte IVs, but the wrapper is not hardcoded to that so it can serve other callers.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let cipher = aes_ctr_by_key_size(key.len())?;
        let crypter = Crypter::new(cipher, Mode::Encrypt, key, Some(iv)).map_err(|_| CryptoError::InvalidKeyMaterial)?;
        Ok(Self(key.to_vec(), crypter))
    }

    /// Advance the keystream over `data`, encrypting or decrypting it in place.
    #[inline(always)]
    pub fn crypt_in_place(&mut self, data: &mut [u8]) {
        if data.is_empty() {
            return;
        }
        // CTR mode crypter output length equals input length; openssl requires a scratch buffer
        // that is not aliased with the input, so stage through one and copy back.
        let mut out = vec![0u8; data.len() + Cipher::aes_128_ctr().block_size()];
        let n = self.1.update(data, &mut out).expect("AES-CTR keystream update cannot fail");
        debug_assert_eq!(n, data.len(), "CTR mode output length must equal input length");
        data.copy_from_slice(&out[..data.len()]);
    }
}

impl Drop for AesCtr {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.0.zeroize();
    }
}
