/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::net::{SocketAddr, ToSocketAddrs};

use clap::{Arg, ArgMatches, Command};
use zeroize::Zeroizing;

use obfs_core::{Mode, Params};

/// Builds the top-level `Command`. Laid out the way this codebase's own service binary builds
/// its CLI: a `Command` per protocol module with a subcommand per mode, rather than a derive
/// macro -- each module gets to own its exact argument shape, and the registry (not a shared
/// derive'd enum) is what decides which protocols exist.
pub fn build_command() -> Command {
    Command::new("obfs-proxy")
        .about("Pluggable-transport obfuscating proxy")
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("obfs2")
                .about("obfs2: keyed, IV-stream-cipher obfuscator with padding")
                .arg(Arg::new("dest").long("dest").value_name("HOST:PORT").num_args(1))
                .arg(Arg::new("shared-secret").long("shared-secret").value_name("STR").num_args(1))
                .subcommand_required(true)
                .subcommand(Command::new("client").arg(Arg::new("listen").index(1).required(true)))
                .subcommand(Command::new("socks").arg(Arg::new("listen").index(1).required(true)))
                .subcommand(Command::new("server").arg(Arg::new("listen").index(1).required(true))),
        )
}

/// Parse a `HOST:PORT` string, filling in `default_port` if the string has no `:PORT` suffix that
/// resolves, and taking the first resolved address if the host is a DNS name with multiple
/// records.
fn parse_endpoint(s: &str, default_port: u16) -> Result<SocketAddr, String> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let with_port = format!("{}:{}", s, default_port);
    if let Ok(addr) = with_port.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.to_socket_addrs()
        .ok()
        .and_then(|mut it| it.next())
        .or_else(|| with_port.to_socket_addrs().ok().and_then(|mut it| it.next()))
        .ok_or_else(|| format!("could not resolve endpoint '{}'", s))
}

/// Extracts the single `(protocol_name, Params)` this process should run, given the already
/// mode-dispatched subcommand matches. Enforces the mode/`--dest` pairing rules the spec requires:
/// `--dest` is mandatory for client/server, forbidden for socks.
pub fn parse(matches: &ArgMatches) -> Result<(String, Params), String> {
    let (protocol, proto_matches) = matches.subcommand().ok_or_else(|| "a protocol module is required".to_string())?;

    let (mode_name, mode_matches) = proto_matches.subcommand().ok_or_else(|| "a mode (client|socks|server) is required".to_string())?;

    let mode = match mode_name {
        "client" => Mode::SimpleClient,
        "socks" => Mode::SocksClient,
        "server" => Mode::SimpleServer,
        other => return Err(format!("unknown mode '{}'", other)),
    };

    let dest = proto_matches.get_one::<String>("dest");
    let target = match (mode, dest) {
        (Mode::SocksClient, Some(_)) => return Err("--dest is forbidden in socks mode".to_string()),
        (Mode::SocksClient, None) => None,
        (_, Some(d)) => Some(parse_endpoint(d, mode.default_port())?),
        (_, None) => return Err("--dest is required in client/server mode".to_string()),
    };

    let shared_secret = proto_matches
        .get_one::<String>("shared-secret")
        .map(|s| Zeroizing::new(s.as_bytes().to_vec()));

    let listen_str = mode_matches.get_one::<String>("listen").expect("listen is a required positional");
    let listen = parse_endpoint(listen_str, mode.default_port())?;

    let params = Params {
        protocol: protocol.to_string(),
        mode,
        listen,
        target,
        shared_secret,
    };
    params.validate()?;

    Ok((protocol.to_string(), params))
}
