/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod cli;
mod exitcode;
mod log;
mod relay;

use std::sync::{Arc, OnceLock};

use obfs_core::Registry;
use obfs2::Obfs2Module;

use log::Log;

/// Every protocol this binary knows about, built once before any session is created. A
/// `OnceLock` rather than a lazily-populated `Arc` makes that "built exactly once, read-only
/// from then on" contract a property of the type rather than a convention callers have to
/// honor.
static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry::with_modules([Arc::new(Obfs2Module::default()) as Arc<dyn obfs_core::ProtocolModule>]))
}

fn main() {
    let matches = cli::build_command().get_matches();

    let log = Arc::new(Log::new(None, true, std::env::var_os("OBFS_DEBUG").is_some()).unwrap_or_else(|e| {
        eprintln!("could not open log: {}", e);
        std::process::exit(exitcode::ERR_RUNTIME);
    }));

    let (protocol, params) = match cli::parse(&matches) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("obfs-proxy: {}", msg);
            std::process::exit(exitcode::ERR_USAGE);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => log.fatal(format!("failed to start async runtime: {}", e)),
    };

    let result = runtime.block_on(relay::run(registry(), protocol, Arc::new(params), log.clone()));
    if let Err(e) = result {
        log.fatal(format!("relay loop exited: {}", e));
    }
}
