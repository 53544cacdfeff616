//! Subprocess execution and shell detection.
//!
//! On Windows the `tar` found on `PATH` usually comes from a Unix-compatible
//! environment (Git Bash, MSYS2, Cygwin) that expects `/c/dir` rather than
//! `C:\dir`. Whether such an environment is active is detected by probing
//! two Unix commands through the platform shell.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::io;
use std::process::Command;

static DRIVE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]):").expect("valid drive prefix regex"));

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    pub success: bool,
    /// stdout followed by stderr.
    pub combined: String,
}

impl CommandOutput {
    pub fn succeeded(combined: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            success: true,
            combined: combined.into(),
        }
    }

    pub fn failed(status: i32, combined: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            success: false,
            combined: combined.into(),
        }
    }
}

/// Runs programs to completion, capturing their output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput>;
}

/// Runs programs with [`std::process::Command`].
///
/// The child inherits the working directory and environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
        tracing::debug!("running {} {:?}", program, args);
        let output = Command::new(program).args(args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            status: output.status.code(),
            success: output.status.success(),
            combined,
        })
    }
}

/// Host operating system family, as far as path syntax is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Interactive shell and its "run this command line" flag.
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            Self::Windows => ("cmd", "/C"),
            Self::Unix => ("sh", "-c"),
        }
    }
}

/// Whether the platform shell understands Unix commands.
///
/// A Windows-native shell answers an unknown command with a message quoting
/// it (`'ls' is not recognized as an internal or external command`). The
/// shell counts as Unix-compatible when either `ls` or `sh --version` is
/// answered without such a quote.
pub fn is_unix_shell(runner: &dyn CommandRunner, platform: Platform) -> bool {
    let (shell, flag) = platform.shell();
    let probe = |command: &str, marker: &str| {
        let args = [OsString::from(flag), OsString::from(command)];
        match runner.run(shell, &args) {
            Ok(output) => !output.combined.contains(marker),
            Err(e) => {
                tracing::debug!("shell probe `{}` failed: {}", command, e);
                false
            }
        }
    };

    probe("ls", "'ls'") || probe("sh --version", "'sh'")
}

/// Rewrites a Windows path into the form a Unix-compatible shell expects.
///
/// # Examples
///
/// ```
/// use deps_tar::shell::to_unix_shell_path;
///
/// assert_eq!(to_unix_shell_path(r"C:\work\vendor\pkg.tgz"), "/C/work/vendor/pkg.tgz");
/// assert_eq!(to_unix_shell_path("relative\\dir"), "relative/dir");
/// ```
pub fn to_unix_shell_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    DRIVE_PREFIX.replace(&slashed, "/$1").into_owned()
}
