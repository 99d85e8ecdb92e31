/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use obfs_core::{ByteBuffer, ObfsError, Params, RecvOutcome, Session};
use obfs_crypto::random::{random_bytes, random_seed, random_u32};
use obfs_crypto::{AesCtr, Secret, Sha256};

use crate::constants::{
    INITIATOR_DATA_KEYTYPE, INITIATOR_PADDING_KEYTYPE, OBFUSCATE_MAGIC_VALUE, OBFUSCATE_MAX_PADDING, RESPONDER_DATA_KEYTYPE,
    RESPONDER_PADDING_KEYTYPE, SHARED_SECRET_LENGTH,
};
use crate::keys::{derive_key, derive_padding_key};

/// Which leg of the handshake/stream state machine a session is in.
///
/// Governs which branch of `recv` executes; `send` only cares whether `send_crypto` exists yet,
/// which happens to coincide with "not WaitForKey" but is tracked separately below because a
/// single `recv` call can cross all three phases before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitForKey,
    WaitForPadding,
    Open,
}

/// Per-connection obfs2 state.
///
/// `initiator_seed`/`responder_seed` use `Option` rather than an all-zero sentinel for "not yet
/// known" -- the spec permits either, and `Option` is the form that can't be confused with a
/// genuine (if astronomically unlikely) all-zero seed. Seeds and the secret seed are held in
/// `Secret<16>` so the destroy-zeroes invariant (spec) falls out of `Secret`'s own `Drop` rather
/// than a hand-written wipe here.
pub struct Obfs2Session {
    phase: Phase,
    we_are_initiator: bool,

    initiator_seed: Option<Secret<16>>,
    responder_seed: Option<Secret<16>>,
    secret_seed: Option<Secret<16>>,

    send_padding_crypto: AesCtr,
    recv_padding_crypto: Option<AesCtr>,
    send_crypto: Option<AesCtr>,
    recv_crypto: Option<AesCtr>,

    padding_left_to_read: u32,

    /// User bytes offered via `send` before `send_crypto` exists. An empty buffer stands in for
    /// the source's "absent" pending-data-to-send; there's no behavioral difference and it
    /// avoids an extra layer of `Option`.
    pending_data_to_send: ByteBuffer,
}

impl Obfs2Session {
    pub fn new(params: &Params) -> Result<Self, ObfsError> {
        let we_are_initiator = params.is_initiator();
        let own_seed = random_seed()?;

        let (initiator_seed, responder_seed) = if we_are_initiator {
            (Some(Secret::new(own_seed)), None)
        } else {
            (None, Some(Secret::new(own_seed)))
        };

        let secret_seed = match &params.shared_secret {
            Some(secret) => {
                let digest = Sha256::hash(secret);
                let mut s = [0u8; 16];
                s.copy_from_slice(&digest[..SHARED_SECRET_LENGTH]);
                Some(Secret::new(s))
            }
            None => None,
        };

        let own_padding_keytype = if we_are_initiator { INITIATOR_PADDING_KEYTYPE } else { RESPONDER_PADDING_KEYTYPE };
        let send_padding_crypto = derive_padding_key(&own_seed, secret_seed.as_ref().map(Secret::as_bytes), own_padding_keytype)?;

        Ok(Self {
            phase: Phase::WaitForKey,
            we_are_initiator,
            initiator_seed,
            responder_seed,
            secret_seed,
            send_padding_crypto,
            recv_padding_crypto: None,
            send_crypto: None,
            recv_crypto: None,
            padding_left_to_read: 0,
            pending_data_to_send: ByteBuffer::new(),
        })
    }

    #[inline(always)]
    fn own_seed(&self) -> &[u8; 16] {
        if self.we_are_initiator {
            self.initiator_seed.as_ref().expect("our own seed is set at creation").as_bytes()
        } else {
            self.responder_seed.as_ref().expect("our own seed is set at creation").as_bytes()
        }
    }

    #[inline(always)]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Session for Obfs2Session {
    fn handshake(&mut self, out: &mut ByteBuffer) -> Result<(), ObfsError> {
        let padlen = random_u32()? % OBFUSCATE_MAX_PADDING;
        let mut message = Vec::with_capacity(8 + padlen as usize);
        message.extend_from_slice(&OBFUSCATE_MAGIC_VALUE.to_be_bytes());
        message.extend_from_slice(&padlen.to_be_bytes());

        let mut pad = vec![0u8; padlen as usize];
        random_bytes(&mut pad)?;
        message.extend_from_slice(&pad);

        self.send_padding_crypto.crypt_in_place(&mut message);

        out.append(self.own_seed());
        out.append(&message);
        Ok(())
    }

    fn send(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<(), ObfsError> {
        match self.send_crypto.as_mut() {
            Some(cipher) => {
                if !self.pending_data_to_send.is_empty() {
                    let mut pending = self.pending_data_to_send.remove_all();
                    cipher.crypt_in_place(&mut pending);
                    dst.append(&pending);
                }
                let mut data = src.remove_all();
                cipher.crypt_in_place(&mut data);
                dst.append(&data);
            }
            None => {
                let data = src.remove_all();
                if !data.is_empty() {
                    self.pending_data_to_send.append(&data);
                }
            }
        }
        Ok(())
    }

    fn recv(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<RecvOutcome, ObfsError> {
        loop {
            match self.phase {
                Phase::WaitForKey => {
                    const PREFIX_LEN: usize = 24;
                    if src.len() < PREFIX_LEN {
                        return Ok(RecvOutcome::NeedMore(PREFIX_LEN));
                    }
                    let header = src.remove(PREFIX_LEN);

                    let mut peer_seed = [0u8; 16];
                    peer_seed.copy_from_slice(&header[0..16]);
                    if self.we_are_initiator {
                        self.responder_seed = Some(Secret::new(peer_seed));
                    } else {
                        self.initiator_seed = Some(Secret::new(peer_seed));
                    }

                    let (send_kt, recv_kt, recv_pad_kt) = if self.we_are_initiator {
                        (INITIATOR_DATA_KEYTYPE, RESPONDER_DATA_KEYTYPE, RESPONDER_PADDING_KEYTYPE)
                    } else {
                        (RESPONDER_DATA_KEYTYPE, INITIATOR_DATA_KEYTYPE, INITIATOR_PADDING_KEYTYPE)
                    };

                    let secret_seed_bytes = self.secret_seed.as_ref().map(Secret::as_bytes);
                    self.send_crypto = Some(derive_key(
                        self.initiator_seed.as_ref().map(Secret::as_bytes),
                        self.responder_seed.as_ref().map(Secret::as_bytes),
                        secret_seed_bytes,
                        send_kt,
                    )?);
                    self.recv_crypto = Some(derive_key(
                        self.initiator_seed.as_ref().map(Secret::as_bytes),
                        self.responder_seed.as_ref().map(Secret::as_bytes),
                        secret_seed_bytes,
                        recv_kt,
                    )?);
                    let mut recv_padding_crypto = derive_padding_key(&peer_seed, secret_seed_bytes, recv_pad_kt)?;

                    let mut tail: [u8; 8] = header[16..24].try_into().expect("exactly 8 bytes");
                    recv_padding_crypto.crypt_in_place(&mut tail);
                    self.recv_padding_crypto = Some(recv_padding_crypto);

                    let magic = u32::from_be_bytes(tail[0..4].try_into().unwrap());
                    let padlen = u32::from_be_bytes(tail[4..8].try_into().unwrap());
                    if magic != OBFUSCATE_MAGIC_VALUE {
                        return Err(ObfsError::ProtocolViolation("bad handshake magic"));
                    }
                    if padlen > OBFUSCATE_MAX_PADDING {
                        return Err(ObfsError::ProtocolViolation("padding length exceeds maximum"));
                    }

                    self.padding_left_to_read = padlen;
                    self.phase = Phase::WaitForPadding;
                }

                Phase::WaitForPadding => {
                    while self.padding_left_to_read > 0 {
                        if src.is_empty() {
                            return Ok(RecvOutcome::NeedMore(self.padding_left_to_read as usize));
                        }
                        let drained = src.drain(self.padding_left_to_read as usize);
                        self.padding_left_to_read -= drained as u32;
                    }
                    self.phase = Phase::Open;
                }

                Phase::Open => {
                    let mut data = src.remove_all();
                    if !data.is_empty() {
                        self.recv_crypto.as_mut().expect("recv_crypto derived on entry to WaitForPadding").crypt_in_place(&mut data);
                        dst.append(&data);
                    }
                    return Ok(RecvOutcome::Progress);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obfs_core::Mode;

    fn params(mode: Mode, target: Option<&str>, secret: Option<&str>) -> Params {
        Params {
            protocol: "obfs2".to_string(),
            mode,
            listen: "127.0.0.1:1".parse().unwrap(),
            target: target.map(|t| t.parse().unwrap()),
            shared_secret: secret.map(|s| zeroize::Zeroizing::new(s.as_bytes().to_vec())),
        }
    }

    fn client_params(secret: Option<&str>) -> Params {
        params(Mode::SimpleClient, Some("127.0.0.1:2"), secret)
    }

    fn server_params(secret: Option<&str>) -> Params {
        params(Mode::SimpleServer, Some("127.0.0.1:2"), secret)
    }

    /// Exchanges handshakes between two freshly-created sessions so both reach `Open`.
    fn exchange_handshakes(initiator: &mut Obfs2Session, responder: &mut Obfs2Session) {
        let mut i_hs = ByteBuffer::new();
        initiator.handshake(&mut i_hs).unwrap();
        let mut r_hs = ByteBuffer::new();
        responder.handshake(&mut r_hs).unwrap();

        assert_eq!(responder.recv(&mut i_hs, &mut ByteBuffer::new()).unwrap(), RecvOutcome::Progress);
        assert_eq!(initiator.recv(&mut r_hs, &mut ByteBuffer::new()).unwrap(), RecvOutcome::Progress);
    }

    #[test]
    fn s1_no_secret_round_trip() {
        let mut initiator = Obfs2Session::new(&client_params(None)).unwrap();
        let mut responder = Obfs2Session::new(&server_params(None)).unwrap();
        exchange_handshakes(&mut initiator, &mut responder);

        let mut plain = ByteBuffer::new();
        plain.append(b"hello");
        let mut wire = ByteBuffer::new();
        initiator.send(&mut plain, &mut wire).unwrap();

        let mut out = ByteBuffer::new();
        assert_eq!(responder.recv(&mut wire, &mut out).unwrap(), RecvOutcome::Progress);
        assert_eq!(out.remove_all(), b"hello");
    }

    #[test]
    fn s2_shared_secret_round_trip() {
        let mut initiator = Obfs2Session::new(&client_params(Some("himitsu"))).unwrap();
        let mut responder = Obfs2Session::new(&server_params(Some("himitsu"))).unwrap();
        exchange_handshakes(&mut initiator, &mut responder);

        let mut plain = ByteBuffer::new();
        plain.append(b"hello");
        let mut wire = ByteBuffer::new();
        initiator.send(&mut plain, &mut wire).unwrap();

        let mut out = ByteBuffer::new();
        assert_eq!(responder.recv(&mut wire, &mut out).unwrap(), RecvOutcome::Progress);
        assert_eq!(out.remove_all(), b"hello");
    }

    #[test]
    fn s3_mismatched_secret_rejected() {
        let mut initiator = Obfs2Session::new(&client_params(Some("a"))).unwrap();
        let mut responder = Obfs2Session::new(&server_params(Some("b"))).unwrap();

        let mut i_hs = ByteBuffer::new();
        initiator.handshake(&mut i_hs).unwrap();

        let mut discard = ByteBuffer::new();
        let result = responder.recv(&mut i_hs, &mut discard);
        assert!(result.is_err(), "mismatched secrets must not silently interoperate (magic check almost always fails)");
    }

    #[test]
    fn s4_truncated_handshake_asks_for_more_without_mutating_state() {
        let mut initiator = Obfs2Session::new(&client_params(None)).unwrap();
        let mut responder = Obfs2Session::new(&server_params(None)).unwrap();

        let mut i_hs = ByteBuffer::new();
        initiator.handshake(&mut i_hs).unwrap();
        let mut truncated = ByteBuffer::new();
        truncated.append(&i_hs.remove(23));

        let mut discard = ByteBuffer::new();
        assert_eq!(responder.recv(&mut truncated, &mut discard).unwrap(), RecvOutcome::NeedMore(24));
        assert_eq!(responder.phase(), Phase::WaitForKey);
        assert_eq!(truncated.len(), 23, "bytes must not be consumed when more are needed");
    }

    #[test]
    fn s5_oversized_padding_rejected() {
        let mut responder = Obfs2Session::new(&server_params(None)).unwrap();

        // Craft a handshake whose declared PADLEN, once decrypted by the responder, is 8193.
        let seed = [0x42u8; 16];
        let mut padding_crypto = derive_padding_key(&seed, None, INITIATOR_PADDING_KEYTYPE).unwrap();
        let mut header = Vec::with_capacity(8);
        header.extend_from_slice(&OBFUSCATE_MAGIC_VALUE.to_be_bytes());
        header.extend_from_slice(&8193u32.to_be_bytes());
        padding_crypto.crypt_in_place(&mut header);

        let mut wire = ByteBuffer::new();
        wire.append(&seed);
        wire.append(&header);

        let mut discard = ByteBuffer::new();
        assert!(responder.recv(&mut wire, &mut discard).is_err());
    }

    #[test]
    fn s6_pending_data_flushes_before_post_handshake_data() {
        let mut initiator = Obfs2Session::new(&client_params(None)).unwrap();
        let mut responder = Obfs2Session::new(&server_params(None)).unwrap();

        // U1 offered before the handshake completes: buffered, not sent yet.
        let mut u1 = ByteBuffer::new();
        u1.append(b"A");
        let mut wire = ByteBuffer::new();
        initiator.send(&mut u1, &mut wire).unwrap();
        assert!(wire.is_empty(), "nothing should hit the wire before send_crypto exists");

        exchange_handshakes(&mut initiator, &mut responder);

        // U2 offered after the handshake: the pending "A" must flush first, contiguously.
        let mut u2 = ByteBuffer::new();
        u2.append(b"B");
        initiator.send(&mut u2, &mut wire).unwrap();

        let mut out = ByteBuffer::new();
        assert_eq!(responder.recv(&mut wire, &mut out).unwrap(), RecvOutcome::Progress);
        assert_eq!(out.remove_all(), b"AB");
    }

    #[test]
    fn single_call_delivers_everything_available_in_one_shot() {
        let mut initiator = Obfs2Session::new(&client_params(None)).unwrap();
        let mut responder = Obfs2Session::new(&server_params(None)).unwrap();

        let mut i_hs = ByteBuffer::new();
        initiator.handshake(&mut i_hs).unwrap();
        let i_hs_bytes = i_hs.peek(i_hs.len());

        let mut r_hs = ByteBuffer::new();
        responder.handshake(&mut r_hs).unwrap();
        // Feeding our own handshake to the initiator derives its send_crypto, so the payload
        // below actually gets encrypted instead of merely queued as pending data.
        assert_eq!(initiator.recv(&mut r_hs, &mut ByteBuffer::new()).unwrap(), RecvOutcome::Progress);

        let mut payload = ByteBuffer::new();
        payload.append(b"a single shot payload");
        let mut wire = ByteBuffer::new();
        initiator.send(&mut payload, &mut wire).unwrap();

        // The responder receives the handshake and the encrypted payload together, as a single
        // buffer delivered in one `recv` call.
        let mut full = ByteBuffer::new();
        full.append(&i_hs_bytes);
        full.append(&wire.remove_all());

        let mut out = ByteBuffer::new();
        assert_eq!(responder.recv(&mut full, &mut out).unwrap(), RecvOutcome::Progress);
        assert_eq!(out.remove_all(), b"a single shot payload");
    }
}
