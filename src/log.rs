// Copyright (c) 2019-present the orbital-physics contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A minimal global log, the same shape as a game engine's: a
//! `lazy_static` singleton behind a mutex, with a severity level that lets a
//! host application mute everything below a threshold. `Context` never
//! panics or prints on recoverable conditions; it logs through here instead.

use lazy_static::lazy_static;
use parking_lot::Mutex;

/// Severity of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageKind {
    Information,
    Warning,
    Error,
}

struct LogState {
    verbosity: MessageKind,
}

lazy_static! {
    static ref LOG: Mutex<LogState> = Mutex::new(LogState {
        verbosity: MessageKind::Information,
    });
}

/// Global logger. All entry points are free functions operating on a
/// process-wide singleton, mirroring how a host engine's logger is usually
/// reached from deep inside unrelated subsystems.
pub struct Log;

impl Log {
    /// Only messages at or above `verbosity` are printed.
    pub fn set_verbosity(verbosity: MessageKind) {
        LOG.lock().verbosity = verbosity;
    }

    pub fn info<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Information, msg.as_ref());
    }

    pub fn warn<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Warning, msg.as_ref());
    }

    pub fn err<S: AsRef<str>>(msg: S) {
        Self::write(MessageKind::Error, msg.as_ref());
    }

    fn write(kind: MessageKind, msg: &str) {
        if kind < LOG.lock().verbosity {
            return;
        }
        let prefix = match kind {
            MessageKind::Information => "[INFO]",
            MessageKind::Warning => "[WARN]",
            MessageKind::Error => "[ERROR]",
        };
        eprintln!("{prefix} orbital_physics: {msg}");
    }
}
