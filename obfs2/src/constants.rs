/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Wire-visible constants. Every value here is part of the protocol: changing one breaks
//! interoperability with any peer that didn't change it identically.

/// Seed bytes contributed by each side.
pub const OBFUSCATE_SEED_LENGTH: usize = 16;

/// Truncated shared-secret digest length.
pub const SHARED_SECRET_LENGTH: usize = 16;

/// SHA-256 digest size.
pub const SHA256_LENGTH: usize = 32;

/// Handshake magic value, big-endian on the wire. Authenticates that the receiver derived the
/// same padding key the sender used.
pub const OBFUSCATE_MAGIC_VALUE: u32 = 0x2BF5CA7E;

/// Maximum padding length a handshake may declare. Anything larger is a protocol violation.
pub const OBFUSCATE_MAX_PADDING: u32 = 8192;

/// Rounds of additional SHA-256 applied to strengthen a configured shared secret.
pub const OBFUSCATE_HASH_ITERATIONS: usize = 100_000;

/// 8 encrypted header bytes following the cleartext seed: MAGIC(4) ‖ PADLEN(4).
pub const HANDSHAKE_HEADER_LEN: usize = 8;

/// Total length of the unpadded handshake prefix: SEED ‖ E(MAGIC ‖ PADLEN).
pub const HANDSHAKE_PREFIX_LEN: usize = OBFUSCATE_SEED_LENGTH + HANDSHAKE_HEADER_LEN;

/// Key-type strings, fed to the digest verbatim (no NUL terminator). Exact bytes must match
/// across implementations for key derivation to agree.
pub const INITIATOR_PADDING_KEYTYPE: &[u8] = b"Initiator obfuscation padding";
pub const RESPONDER_PADDING_KEYTYPE: &[u8] = b"Responder obfuscation padding";
pub const INITIATOR_DATA_KEYTYPE: &[u8] = b"Initiator obfuscated data";
pub const RESPONDER_DATA_KEYTYPE: &[u8] = b"Responder obfuscated data";
