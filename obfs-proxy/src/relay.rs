/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use obfs_core::{ByteBuffer, Dispatcher, Mode, Params, RecvOutcome, Registry, SessionHandle};

use crate::log::Log;

const IO_CHUNK: usize = 16 * 1024;

/// Accepts connections on `params.listen` and relays each one per `params.mode`, until the
/// listener itself errors out (which in practice only happens if the OS yanks the socket away).
pub async fn run(registry: &'static Registry, protocol: String, params: Arc<Params>, log: Arc<Log>) -> io::Result<()> {
    let listener = TcpListener::bind(params.listen).await?;
    log.info(format!("listening on {} ({:?}, protocol={})", params.listen, params.mode, protocol));

    loop {
        let (socket, peer) = listener.accept().await?;
        let protocol = protocol.clone();
        let params = params.clone();
        let log = log.clone();

        tokio::spawn(async move {
            let result = match params.mode {
                Mode::SimpleClient => handle_simple_client(registry, &protocol, &params, socket).await,
                Mode::SocksClient => handle_socks_client(registry, &protocol, &params, socket).await,
                Mode::SimpleServer => handle_simple_server(registry, &protocol, &params, socket).await,
            };
            if let Err(e) = result {
                log.debug(format!("connection from {} ended: {}", peer, e));
            }
        });
    }
}

/// Plaintext in locally, obfuscated out to the fixed `--dest`.
async fn handle_simple_client(registry: &Registry, protocol: &str, params: &Params, local: TcpStream) -> io::Result<()> {
    let target = params.target.expect("validated: client mode always has a target");
    let remote = TcpStream::connect(target).await?;
    relay_as_initiator(registry, protocol, params, local, remote).await
}

/// Accepts a local SOCKS5 client, learns the target from its CONNECT request, then relays the
/// same way `handle_simple_client` does with that per-connection target in place of a fixed one.
async fn handle_socks_client(registry: &Registry, protocol: &str, params: &Params, mut local: TcpStream) -> io::Result<()> {
    let target = socks5_handshake(&mut local).await?;
    let remote = TcpStream::connect(target).await?;
    relay_as_initiator(registry, protocol, params, local, remote).await
}

/// Obfuscated in from the network, plaintext out to the fixed `--dest`.
async fn handle_simple_server(registry: &Registry, protocol: &str, params: &Params, remote: TcpStream) -> io::Result<()> {
    let target = params.target.expect("validated: server mode always has a target");
    let local = TcpStream::connect(target).await?;
    relay_as_responder(registry, protocol, params, local, remote).await
}

async fn relay_as_initiator(registry: &Registry, protocol: &str, params: &Params, plain: TcpStream, wire: TcpStream) -> io::Result<()> {
    let dispatcher = Dispatcher::new(registry);
    let handle = dispatcher.init(protocol, params).map_err(to_io_error)?;
    pump(plain, wire, handle).await
}

async fn relay_as_responder(registry: &Registry, protocol: &str, params: &Params, plain: TcpStream, wire: TcpStream) -> io::Result<()> {
    let dispatcher = Dispatcher::new(registry);
    let handle = dispatcher.init(protocol, params).map_err(to_io_error)?;
    pump(plain, wire, handle).await
}

fn to_io_error(e: obfs_core::ObfsError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Bidirectionally relays `plain` (application bytes) against `wire` (obfuscated bytes) through
/// `session`, emitting the session's handshake message onto the wire first if it has one.
async fn pump(mut plain: TcpStream, mut wire: TcpStream, mut session: SessionHandle) -> io::Result<()> {
    let mut handshake_out = ByteBuffer::new();
    session.handshake(&mut handshake_out).map_err(to_io_error)?;
    if !handshake_out.is_empty() {
        wire.write_all(&handshake_out.remove_all()).await?;
    }

    let mut plain_read = vec![0u8; IO_CHUNK];
    let mut wire_read = vec![0u8; IO_CHUNK];
    let mut user_src = ByteBuffer::new();
    let mut wire_src = ByteBuffer::new();

    loop {
        tokio::select! {
            n = plain.read(&mut plain_read) => {
                let n = n?;
                if n == 0 {
                    let _ = wire.shutdown().await;
                    return Ok(());
                }
                user_src.append(&plain_read[..n]);
                let mut wire_dst = ByteBuffer::new();
                session.send(&mut user_src, &mut wire_dst).map_err(to_io_error)?;
                if !wire_dst.is_empty() {
                    wire.write_all(&wire_dst.remove_all()).await?;
                }
            }
            n = wire.read(&mut wire_read) => {
                let n = n?;
                if n == 0 {
                    let _ = plain.shutdown().await;
                    return Ok(());
                }
                wire_src.append(&wire_read[..n]);
                let mut plain_dst = ByteBuffer::new();
                match session.recv(&mut wire_src, &mut plain_dst).map_err(to_io_error)? {
                    RecvOutcome::Progress => {
                        if !plain_dst.is_empty() {
                            plain.write_all(&plain_dst.remove_all()).await?;
                        }
                    }
                    // Not enough buffered yet; wait for the next read to bring more.
                    RecvOutcome::NeedMore(_) => {}
                }
            }
        }
    }
}

/// Reads a SOCKS5 greeting and CONNECT request with no authentication, replies with a success
/// reply carrying an all-zero bound address (this proxy never needs the client to know or care
/// what local address the eventual dial used), and returns the requested target. `BIND`/`UDP
/// ASSOCIATE` and username/password auth are out of scope -- this is the transport's own tunnel
/// setup, not a general-purpose SOCKS server.
async fn socks5_handshake(stream: &mut TcpStream) -> io::Result<SocketAddr> {
    let mut greeting = [0u8; 2];
    stream.read_exact(&mut greeting).await?;
    if greeting[0] != 0x05 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported SOCKS version"));
    }
    let nmethods = greeting[1] as usize;
    let mut methods = vec![0u8; nmethods];
    stream.read_exact(&mut methods).await?;
    // Always offer "no authentication required"; refuse to speak to a client that can't accept it.
    stream.write_all(&[0x05, 0x00]).await?;

    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;
    let (version, cmd, atyp) = (header[0], header[1], header[3]);
    if version != 0x05 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported SOCKS version"));
    }
    if cmd != 0x01 {
        write_socks5_reply(stream, 0x07).await?; // command not supported
        return Err(io::Error::new(io::ErrorKind::InvalidData, "only CONNECT is supported"));
    }

    let target = match atyp {
        0x01 => {
            let mut addr = [0u8; 4];
            stream.read_exact(&mut addr).await?;
            let port = read_port(stream).await?;
            SocketAddr::from((addr, port))
        }
        0x03 => {
            let mut len_buf = [0u8; 1];
            stream.read_exact(&mut len_buf).await?;
            let mut name = vec![0u8; len_buf[0] as usize];
            stream.read_exact(&mut name).await?;
            let port = read_port(stream).await?;
            let host = String::from_utf8(name).map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-UTF8 hostname"))?;
            tokio::net::lookup_host((host.as_str(), port))
                .await?
                .next()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "could not resolve requested hostname"))?
        }
        0x04 => {
            let mut addr = [0u8; 16];
            stream.read_exact(&mut addr).await?;
            let port = read_port(stream).await?;
            SocketAddr::from((addr, port))
        }
        _ => {
            write_socks5_reply(stream, 0x08).await?; // address type not supported
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported address type"));
        }
    };

    write_socks5_reply(stream, 0x00).await?;
    Ok(target)
}

async fn read_port(stream: &mut TcpStream) -> io::Result<u16> {
    let mut port = [0u8; 2];
    stream.read_exact(&mut port).await?;
    Ok(u16::from_be_bytes(port))
}

async fn write_socks5_reply(stream: &mut TcpStream, rep: u8) -> io::Result<()> {
    stream.write_all(&[0x05, rep, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await
}
