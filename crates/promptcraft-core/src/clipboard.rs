//! Clipboard copy with a primary backend and a manual fallback.
//!
//! The primary backend pipes text into a system clipboard command. The
//! fallback writes an OSC 52 escape sequence, which terminals that support it
//! turn into a clipboard write even over SSH.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

use crate::defaults;

/// Commands tried in order by [`CommandClipboard::system`].
const SYSTEM_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
];

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("nothing to copy")]
    Empty,
    #[error("no clipboard command available (tried {tried})")]
    Unavailable { tried: String },
    #[error("failed to run clipboard command {command}: {source}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with non-zero status: {status}")]
    CommandFailed { command: String, status: String },
    #[error("failed to write clipboard escape sequence: {0}")]
    Write(#[source] io::Error),
    #[error("clipboard writer lock poisoned")]
    Poisoned,
    #[error("primary copy failed ({primary}); fallback copy failed ({fallback})")]
    AllBackendsFailed { primary: String, fallback: String },
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardBackend: Send + Sync {
    fn copy_text(&self, text: &str) -> ClipboardResult<()>;
    fn name(&self) -> &str;
}

/// Which mechanism ended up holding the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyConfirmation {
    Copied,
    CopiedViaFallback,
}

impl CopyConfirmation {
    pub fn message(&self) -> &'static str {
        defaults::COPY_CONFIRMATION
    }
}

/// Copy `text`, falling back when the primary backend is missing or fails.
///
/// Only errors when both mechanisms fail, so a copy request never ends
/// silently.
pub fn copy_with_fallback(
    primary: Option<&dyn ClipboardBackend>,
    fallback: &dyn ClipboardBackend,
    text: &str,
) -> ClipboardResult<CopyConfirmation> {
    if text.is_empty() {
        return Err(ClipboardError::Empty);
    }

    let primary_error = match primary {
        Some(backend) => match backend.copy_text(text) {
            Ok(()) => {
                debug!(backend = backend.name(), "Copied to clipboard");
                return Ok(CopyConfirmation::Copied);
            }
            Err(err) => {
                warn!(
                    backend = backend.name(),
                    error = %err,
                    "Primary clipboard copy failed, using fallback"
                );
                err.to_string()
            }
        },
        None => "unavailable".to_string(),
    };

    match fallback.copy_text(text) {
        Ok(()) => {
            debug!(backend = fallback.name(), "Copied to clipboard via fallback");
            Ok(CopyConfirmation::CopiedViaFallback)
        }
        Err(err) => Err(ClipboardError::AllBackendsFailed {
            primary: primary_error,
            fallback: err.to_string(),
        }),
    }
}

/// Pipes text into the first available clipboard command.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    candidates: Vec<(String, Vec<String>)>,
}

impl CommandClipboard {
    /// `wl-copy`, `xclip` and `pbcopy`, in that order.
    pub fn system() -> Self {
        Self {
            candidates: SYSTEM_COMMANDS
                .iter()
                .map(|(cmd, args)| {
                    (
                        cmd.to_string(),
                        args.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn with_command(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            candidates: vec![(command.into(), args)],
        }
    }

    fn run(command: &str, args: &[String], text: &str) -> ClipboardResult<()> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| ClipboardError::CommandIo {
                command: command.to_string(),
                source: err,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // Reap the child so a failed write leaves no zombie behind.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClipboardError::CommandIo {
                    command: command.to_string(),
                    source: err,
                });
            }
        }

        let status = child.wait().map_err(|err| ClipboardError::CommandIo {
            command: command.to_string(),
            source: err,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                command: command.to_string(),
                status: status.to_string(),
            })
        }
    }
}

impl ClipboardBackend for CommandClipboard {
    fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        for (command, args) in &self.candidates {
            match Self::run(command, args, text) {
                Err(ClipboardError::CommandIo { source, .. })
                    if source.kind() == io::ErrorKind::NotFound =>
                {
                    debug!(command = %command, "Clipboard command not installed");
                    continue;
                }
                other => return other,
            }
        }
        Err(ClipboardError::Unavailable {
            tried: self
                .candidates
                .iter()
                .map(|(cmd, _)| cmd.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn name(&self) -> &str {
        "command"
    }
}

/// Writes an OSC 52 "set clipboard" escape sequence to a terminal.
pub struct Osc52Clipboard<W: Write + Send> {
    writer: Mutex<W>,
}

impl Osc52Clipboard<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> ClipboardResult<W> {
        self.writer.into_inner().map_err(|_| ClipboardError::Poisoned)
    }

    pub fn sequence(text: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        format!("\x1b]52;c;{}\x07", encoded)
    }
}

impl<W: Write + Send> ClipboardBackend for Osc52Clipboard<W> {
    fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        let mut writer = self.writer.lock().map_err(|_| ClipboardError::Poisoned)?;
        writer
            .write_all(Self::sequence(text).as_bytes())
            .and_then(|_| writer.flush())
            .map_err(ClipboardError::Write)
    }

    fn name(&self) -> &str {
        "osc52"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeBackend {
        fail: bool,
        calls: AtomicUsize,
        copied: Mutex<Option<String>>,
    }

    impl FakeBackend {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
                copied: Mutex::new(None),
            }
        }
    }

    impl ClipboardBackend for FakeBackend {
        fn copy_text(&self, text: &str) -> ClipboardResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClipboardError::CommandFailed {
                    command: "fake".to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            *self.copied.lock().unwrap() = Some(text.to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let primary = FakeBackend::new(false);
        let fallback = FakeBackend::new(false);

        let result = copy_with_fallback(Some(&primary), &fallback, "prompt").unwrap();

        assert_eq!(result, CopyConfirmation::Copied);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
        assert_eq!(primary.copied.lock().unwrap().as_deref(), Some("prompt"));
    }

    #[test]
    fn test_primary_failure_uses_fallback() {
        let primary = FakeBackend::new(true);
        let fallback = FakeBackend::new(false);

        let result = copy_with_fallback(Some(&primary), &fallback, "prompt").unwrap();

        assert_eq!(result, CopyConfirmation::CopiedViaFallback);
        assert_eq!(fallback.copied.lock().unwrap().as_deref(), Some("prompt"));
    }

    #[test]
    fn test_missing_primary_uses_fallback() {
        let fallback = FakeBackend::new(false);
        let result = copy_with_fallback(None, &fallback, "prompt").unwrap();
        assert_eq!(result, CopyConfirmation::CopiedViaFallback);
        assert_eq!(result.message(), defaults::COPY_CONFIRMATION);
    }

    #[test]
    fn test_both_failing_reports_error() {
        let primary = FakeBackend::new(true);
        let fallback = FakeBackend::new(true);

        let err = copy_with_fallback(Some(&primary), &fallback, "prompt").unwrap_err();

        assert!(matches!(err, ClipboardError::AllBackendsFailed { .. }));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_text_rejected() {
        let fallback = FakeBackend::new(false);
        let err = copy_with_fallback(None, &fallback, "").unwrap_err();
        assert!(matches!(err, ClipboardError::Empty));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_osc52_writes_escape_sequence() {
        let backend = Osc52Clipboard::new(Vec::new());
        backend.copy_text("hi").unwrap();
        let written = backend.into_inner().unwrap();
        assert_eq!(written, b"\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        let backend =
            CommandClipboard::with_command("promptcraft-no-such-clipboard-command", Vec::new());
        let err = backend.copy_text("prompt").unwrap_err();
        assert!(matches!(err, ClipboardError::Unavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exiting_before_reading_input_reports_io_error() {
        // `true` never reads stdin, so a write larger than the pipe buffer fails.
        let backend = CommandClipboard::with_command("true", Vec::new());
        let text = "x".repeat(1 << 20);

        let err = backend.copy_text(&text).unwrap_err();

        match err {
            ClipboardError::CommandIo { command, source } => {
                assert_eq!(command, "true");
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_command_falls_back_to_osc52() {
        let primary =
            CommandClipboard::with_command("promptcraft-no-such-clipboard-command", Vec::new());
        let fallback = Osc52Clipboard::new(Vec::new());

        let result = copy_with_fallback(Some(&primary), &fallback, "prompt").unwrap();

        assert_eq!(result, CopyConfirmation::CopiedViaFallback);
        assert!(!fallback.into_inner().unwrap().is_empty());
    }
}
