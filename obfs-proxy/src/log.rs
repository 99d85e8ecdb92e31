/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

/// A small leveled log handle, shared across relay tasks as `Arc<Mutex<Log>>`.
///
/// Writes to stderr and/or an optional file, gated by a debug toggle -- the same shape this
/// codebase's own service binary threads through its connection handlers, just without the file
/// rotation/max-size bookkeeping that binary needs for a long-running daemon and this one, being
/// a thin relay, does not.
pub struct Log {
    file: Option<Mutex<std::fs::File>>,
    stderr: bool,
    debug: bool,
}

impl Log {
    pub fn new(path: Option<&str>, stderr: bool, debug: bool) -> std::io::Result<Self> {
        let file = match path {
            Some(p) => Some(Mutex::new(OpenOptions::new().create(true).append(true).open(p)?)),
            None => None,
        };
        Ok(Self { file, stderr, debug })
    }

    fn write_line(&self, level: &str, msg: &str) {
        let line = format!("[{}] {}\n", level, msg);
        if self.stderr {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
        if let Some(f) = &self.file {
            if let Ok(mut f) = f.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    #[inline]
    pub fn info(&self, msg: impl AsRef<str>) {
        self.write_line("info", msg.as_ref());
    }

    #[inline]
    pub fn warn(&self, msg: impl AsRef<str>) {
        self.write_line("warn", msg.as_ref());
    }

    #[inline]
    pub fn error(&self, msg: impl AsRef<str>) {
        self.write_line("error", msg.as_ref());
    }

    #[inline]
    pub fn debug(&self, msg: impl AsRef<str>) {
        if self.debug {
            self.write_line("debug", msg.as_ref());
        }
    }

    /// Log and immediately terminate the process -- used for the handful of startup failures
    /// that leave nothing sensible to continue doing.
    pub fn fatal(&self, msg: impl AsRef<str>) -> ! {
        self.error(msg);
        std::process::exit(crate::exitcode::ERR_RUNTIME);
    }
}
