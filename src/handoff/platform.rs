//! Clipboard and browser side effects.
//!
//! Both operations shell out to whatever the host OS provides. The command to
//! run is planned first ([`SystemPlatform::clipboard_command`],
//! [`SystemPlatform::browser_command`]) and then executed, so the
//! per-OS selection can be inspected without touching the real clipboard.
//!
//! | OS family  | Clipboard                         | Browser                         |
//! |------------|-----------------------------------|---------------------------------|
//! | macOS      | `pbcopy` (stdin)                  | `open <url>`                    |
//! | Windows    | `powershell Set-Clipboard`        | `rundll32 url.dll,...`          |
//! | other Unix | `xclip` or `xsel` (stdin)         | first launcher found on `PATH`  |
//!
//! No timeouts are applied: a hung utility blocks the calling request.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::PlatformError;

/// Clipboard utilities probed on Unix, in order of preference.
const UNIX_CLIPBOARD_TOOLS: [(&str, &[&str]); 2] = [
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Browser launchers probed on Unix, in order of preference.
const UNIX_BROWSERS: [&str; 6] = [
    "xdg-open",
    "sensible-browser",
    "x-www-browser",
    "firefox",
    "chromium",
    "google-chrome",
];

/// OS-level side effects needed by the handoff tool.
///
/// Implementations must be shareable across HTTP requests; neither method
/// retains state between calls.
pub trait Platform: Send + Sync {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if no clipboard mechanism is available or it fails.
    fn copy_to_clipboard(&self, text: &str) -> Result<(), PlatformError>;

    /// Opens `url` in the default browser.
    ///
    /// # Errors
    ///
    /// Returns an error if no launcher is available or it fails.
    fn open_url(&self, url: &str) -> Result<(), PlatformError>;
}

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Linux, the BSDs and anything else.
    Unix,
}

impl OsFamily {
    /// The family of the running host.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to its family.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Unix,
        }
    }
}

/// A planned external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or resolved path.
    pub program: PathBuf,
    /// Arguments.
    pub args: Vec<String>,
    /// Payload written to the program's stdin, if any.
    pub stdin: Option<String>,
}

impl CommandSpec {
    fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(ToString::to_string).collect(),
            stdin: None,
        }
    }

    #[must_use]
    fn with_stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }

    /// Short program name for messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Runs the command to completion.
    ///
    /// Output is discarded: in stdio mode our stdout carries the protocol.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started, its stdin cannot be
    /// written, or it exits unsuccessfully.
    pub fn run(&self) -> Result<(), PlatformError> {
        let program = self.display_name();
        tracing::debug!(program = %program, args = ?self.args, "Running external command");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|source| PlatformError::Spawn {
            program: program.clone(),
            source,
        })?;

        if let (Some(input), Some(mut stdin)) = (&self.stdin, child.stdin.take()) {
            if let Err(source) = stdin.write_all(input.as_bytes()) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PlatformError::Stdin { program, source });
            }
            // stdin is dropped here so the child sees EOF
        }

        let status = child.wait().map_err(|source| PlatformError::Spawn {
            program: program.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(PlatformError::ExitStatus { program, status })
        }
    }
}

/// [`Platform`] backed by the host's own utilities.
#[derive(Debug, Clone)]
pub struct SystemPlatform {
    family: OsFamily,
    /// Overrides `PATH` when probing for Unix utilities.
    search_path: Option<OsString>,
}

impl SystemPlatform {
    /// Creates a platform adapter for the running host.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(OsFamily::current())
    }

    /// Creates a platform adapter for a specific OS family.
    #[must_use]
    pub const fn new(family: OsFamily) -> Self {
        Self {
            family,
            search_path: None,
        }
    }

    /// Probes `search_path` instead of `PATH` for Unix utilities.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Returns the OS family this adapter targets.
    #[must_use]
    pub const fn family(&self) -> OsFamily {
        self.family
    }

    /// Plans the command that writes `text` to the clipboard.
    ///
    /// # Errors
    ///
    /// On Unix, returns [`PlatformError::NoClipboardUtility`] when neither
    /// `xclip` nor `xsel` is installed.
    pub fn clipboard_command(&self, text: &str) -> Result<CommandSpec, PlatformError> {
        match self.family {
            OsFamily::MacOs => Ok(CommandSpec::new("pbcopy", &[]).with_stdin(text)),
            OsFamily::Windows => {
                let script = format!("Set-Clipboard -Value {}", powershell_quote(text));
                Ok(CommandSpec::new(
                    "powershell",
                    &["-NoProfile", "-Command", &script],
                ))
            }
            OsFamily::Unix => UNIX_CLIPBOARD_TOOLS
                .iter()
                .find_map(|(name, args)| {
                    self.find_program(name)
                        .map(|path| CommandSpec::new(path, args).with_stdin(text))
                })
                .ok_or(PlatformError::NoClipboardUtility),
        }
    }

    /// Plans the command that opens `url` in a browser.
    ///
    /// # Errors
    ///
    /// On Unix, returns [`PlatformError::NoBrowser`] when none of the known
    /// launchers is installed.
    pub fn browser_command(&self, url: &str) -> Result<CommandSpec, PlatformError> {
        match self.family {
            OsFamily::MacOs => Ok(CommandSpec::new("open", &[url])),
            OsFamily::Windows => Ok(CommandSpec::new(
                "rundll32",
                &["url.dll,FileProtocolHandler", url],
            )),
            OsFamily::Unix => UNIX_BROWSERS
                .iter()
                .find_map(|name| self.find_program(name))
                .map(|path| CommandSpec::new(path, &[url]))
                .ok_or(PlatformError::NoBrowser),
        }
    }

    /// Returns the first executable called `name` on the search path.
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))?;

        std::env::split_paths(&search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::detect()
    }
}

impl Platform for SystemPlatform {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), PlatformError> {
        self.clipboard_command(text)?.run()
    }

    fn open_url(&self, url: &str) -> Result<(), PlatformError> {
        self.browser_command(url)?.run()
    }
}

/// Quotes `text` as a PowerShell single-quoted string literal.
fn powershell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_family_mapping() {
        assert_eq!(OsFamily::from_os("macos"), OsFamily::MacOs);
        assert_eq!(OsFamily::from_os("windows"), OsFamily::Windows);
        assert_eq!(OsFamily::from_os("linux"), OsFamily::Unix);
        assert_eq!(OsFamily::from_os("freebsd"), OsFamily::Unix);
    }

    #[test]
    fn macos_clipboard_pipes_text() {
        let spec = SystemPlatform::new(OsFamily::MacOs)
            .clipboard_command("hello")
            .unwrap();
        assert_eq!(spec.program, PathBuf::from("pbcopy"));
        assert!(spec.args.is_empty());
        assert_eq!(spec.stdin.as_deref(), Some("hello"));
    }

    #[test]
    fn windows_clipboard_inlines_escaped_text() {
        let spec = SystemPlatform::new(OsFamily::Windows)
            .clipboard_command("it's done")
            .unwrap();
        assert_eq!(spec.program, PathBuf::from("powershell"));
        assert_eq!(
            spec.args,
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                "Set-Clipboard -Value 'it''s done'".to_string(),
            ]
        );
        assert!(spec.stdin.is_none());
    }

    #[test]
    fn fixed_browser_commands() {
        let mac = SystemPlatform::new(OsFamily::MacOs)
            .browser_command("https://example.com")
            .unwrap();
        assert_eq!(mac.program, PathBuf::from("open"));
        assert_eq!(mac.args, vec!["https://example.com".to_string()]);

        let windows = SystemPlatform::new(OsFamily::Windows)
            .browser_command("https://example.com")
            .unwrap();
        assert_eq!(windows.program, PathBuf::from("rundll32"));
        assert_eq!(
            windows.args,
            vec![
                "url.dll,FileProtocolHandler".to_string(),
                "https://example.com".to_string(),
            ]
        );
    }

    #[test]
    fn unix_without_utilities_fails() {
        let dir = tempfile::tempdir().unwrap();
        let platform = SystemPlatform::new(OsFamily::Unix).with_search_path(dir.path());

        assert!(matches!(
            platform.clipboard_command("x"),
            Err(PlatformError::NoClipboardUtility)
        ));
        assert!(matches!(
            platform.browser_command("https://example.com"),
            Err(PlatformError::NoBrowser)
        ));
        assert!(matches!(
            platform.copy_to_clipboard("x"),
            Err(PlatformError::NoClipboardUtility)
        ));
    }

    #[cfg(unix)]
    fn install_fake(dir: &Path, name: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unix_prefers_xclip() {
        let dir = tempfile::tempdir().unwrap();
        install_fake(dir.path(), "xsel");
        install_fake(dir.path(), "xclip");

        let spec = SystemPlatform::new(OsFamily::Unix)
            .with_search_path(dir.path())
            .clipboard_command("hello")
            .unwrap();
        assert_eq!(spec.program, dir.path().join("xclip"));
        assert_eq!(spec.args, vec!["-selection".to_string(), "clipboard".to_string()]);
        assert_eq!(spec.stdin.as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn unix_falls_back_to_xsel() {
        let dir = tempfile::tempdir().unwrap();
        install_fake(dir.path(), "xsel");

        let spec = SystemPlatform::new(OsFamily::Unix)
            .with_search_path(dir.path())
            .clipboard_command("hello")
            .unwrap();
        assert_eq!(spec.display_name(), "xsel");
        assert_eq!(spec.args, vec!["--clipboard".to_string(), "--input".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn unix_browser_probe_order() {
        let dir = tempfile::tempdir().unwrap();
        install_fake(dir.path(), "firefox");
        install_fake(dir.path(), "x-www-browser");

        let spec = SystemPlatform::new(OsFamily::Unix)
            .with_search_path(dir.path())
            .browser_command("https://example.com")
            .unwrap();
        assert_eq!(spec.display_name(), "x-www-browser");
        assert_eq!(spec.args, vec!["https://example.com".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xclip"), "").unwrap();

        let platform = SystemPlatform::new(OsFamily::Unix).with_search_path(dir.path());
        assert!(matches!(
            platform.clipboard_command("x"),
            Err(PlatformError::NoClipboardUtility)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn run_feeds_stdin_and_checks_status() {
        let ok = CommandSpec::new("sh", &["-c", "cat >/dev/null"]).with_stdin("payload");
        assert!(ok.run().is_ok());

        let failing = CommandSpec::new("sh", &["-c", "exit 3"]);
        match failing.run() {
            Err(PlatformError::ExitStatus { program, status }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected exit status error, got {other:?}"),
        }
    }

    #[test]
    fn run_reports_missing_program() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4711", &[]);
        assert!(matches!(spec.run(), Err(PlatformError::Spawn { .. })));
    }
}
