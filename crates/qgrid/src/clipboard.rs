//! System clipboard access for copied grid selections.
//!
//! The backend is picked once from `[clipboard]` config. On Wayland the
//! `wl-copy` helper is preferred because arboard cannot keep ownership of the
//! selection after a terminal app hands it over.

use crate::config::{ClipboardBackend, ClipboardConfig};
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Resolved backend after looking at config and the session environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Disabled,
    Arboard,
    WlCopy { cmd: PathBuf },
}

pub fn choose_backend(cfg: &ClipboardConfig) -> Result<BackendChoice> {
    match cfg.backend {
        ClipboardBackend::Disabled => Ok(BackendChoice::Disabled),
        ClipboardBackend::Arboard => Ok(BackendChoice::Arboard),
        ClipboardBackend::WlCopy => {
            let cmd = find_in_path(&cfg.wl_copy_cmd).ok_or_else(|| {
                anyhow!(
                    "Clipboard backend wl-copy selected, but '{}' was not found on PATH",
                    cfg.wl_copy_cmd
                )
            })?;
            Ok(BackendChoice::WlCopy { cmd })
        }
        ClipboardBackend::Auto => {
            if cfg!(target_os = "linux") && is_wayland_session() {
                if let Some(cmd) = find_in_path(&cfg.wl_copy_cmd) {
                    return Ok(BackendChoice::WlCopy { cmd });
                }
            }
            Ok(BackendChoice::Arboard)
        }
    }
}

/// Writes text to whichever backend was chosen at startup.
pub struct Clipboard {
    choice: BackendChoice,
    config: ClipboardConfig,
    // Created on first use; some environments have no display at startup.
    arboard: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new(config: &ClipboardConfig) -> Result<Self> {
        let choice = choose_backend(config)?;
        tracing::info!(backend = ?choice, "clipboard backend selected");
        Ok(Self {
            choice,
            config: config.clone(),
            arboard: None,
        })
    }

    pub fn choice(&self) -> &BackendChoice {
        &self.choice
    }

    pub fn copy(&mut self, text: &str) -> Result<()> {
        match &self.choice {
            BackendChoice::Disabled => bail!("Clipboard is disabled in config"),
            BackendChoice::WlCopy { cmd } => copy_with_wl_copy(text, &self.config, cmd),
            BackendChoice::Arboard => {
                let mut clipboard = match self.arboard.take() {
                    Some(c) => c,
                    None => arboard::Clipboard::new().context("Clipboard unavailable")?,
                };
                let written = clipboard
                    .set_text(text.to_string())
                    .context("Failed to write clipboard");
                self.arboard = Some(clipboard);
                written
            }
        }
    }
}

impl std::fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clipboard")
            .field("choice", &self.choice)
            .field("arboard_ready", &self.arboard.is_some())
            .finish()
    }
}

pub fn copy_with_wl_copy(text: &str, cfg: &ClipboardConfig, cmd: &Path) -> Result<()> {
    let mut command = Command::new(cmd);
    if cfg.wl_copy_primary {
        command.arg("-p");
    }
    if cfg.wl_copy_trim_newline {
        command.arg("-n");
    }

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to start wl-copy")?;

    if let Some(mut stdin) = child.stdin.take() {
        use std::io::Write;
        stdin
            .write_all(text.as_bytes())
            .context("Failed to write to wl-copy stdin")?;
    }

    // wl-copy may stay alive to serve the selection. Wait briefly for an early
    // failure, then leave it to a reaper thread.
    let deadline = Instant::now() + Duration::from_millis(250);
    loop {
        let status = child
            .try_wait()
            .context("Failed to check wl-copy status")?;
        match status {
            Some(status) if status.success() => return Ok(()),
            Some(status) => {
                // stderr is only read on failure: a forked child can hold the pipe open.
                let mut stderr_bytes = Vec::new();
                if let Some(mut stderr) = child.stderr.take() {
                    use std::io::Read;
                    let _ = stderr.read_to_end(&mut stderr_bytes);
                }
                let stderr = String::from_utf8_lossy(&stderr_bytes);
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    bail!("wl-copy failed with exit status {}", status);
                }
                bail!("wl-copy failed: {}", stderr);
            }
            None if Instant::now() >= deadline => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
                return Ok(());
            }
            None => std::thread::sleep(Duration::from_millis(10)),
        }
    }
}

fn is_wayland_session() -> bool {
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        return true;
    }
    std::env::var("XDG_SESSION_TYPE").is_ok_and(|v| v.eq_ignore_ascii_case("wayland"))
}

fn find_in_path(cmd: &str) -> Option<PathBuf> {
    let cmd_path = Path::new(cmd);
    #[cfg(windows)]
    let has_separator = cmd.contains('/') || cmd.contains('\\');
    #[cfg(not(windows))]
    let has_separator = cmd.contains('/');

    if has_separator {
        return is_executable_file(cmd_path).then(|| cmd_path.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable_file(candidate))
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(target_os = "linux")]
    use serial_test::serial;

    fn base_cfg() -> ClipboardConfig {
        ClipboardConfig::default()
    }

    #[cfg(unix)]
    fn write_executable(path: &Path, contents: &str) {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn forced_wl_copy_errors_when_missing() {
        let cfg = ClipboardConfig {
            backend: ClipboardBackend::WlCopy,
            wl_copy_cmd: "definitely-not-a-real-wl-copy-binary".to_string(),
            ..base_cfg()
        };

        let err = choose_backend(&cfg).unwrap_err().to_string();
        assert!(err.contains("wl-copy selected"));
        assert!(err.contains("not found"));
    }

    #[test]
    fn disabled_backend_refuses_to_copy() {
        let cfg = ClipboardConfig {
            backend: ClipboardBackend::Disabled,
            ..base_cfg()
        };
        let mut clipboard = Clipboard::new(&cfg).unwrap();
        assert_eq!(clipboard.choice(), &BackendChoice::Disabled);

        let err = clipboard.copy("a\tb").unwrap_err().to_string();
        assert!(err.contains("disabled"));
    }

    #[test]
    #[cfg(unix)]
    fn wl_copy_receives_text_on_stdin() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("wl-copy");
        let out = dir.path().join("copied.txt");
        write_executable(
            &fake,
            &format!("#!/bin/sh\ncat > '{}'\nexit 0\n", out.display()),
        );

        let cfg = ClipboardConfig {
            backend: ClipboardBackend::WlCopy,
            wl_copy_cmd: fake.to_string_lossy().into_owned(),
            ..base_cfg()
        };
        let mut clipboard = Clipboard::new(&cfg).unwrap();
        clipboard.copy("1\t2\n3\t4").unwrap();

        // The helper may still be running once copy returns.
        let mut copied = String::new();
        for _ in 0..200 {
            copied = std::fs::read_to_string(&out).unwrap_or_default();
            if copied == "1\t2\n3\t4" {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(copied, "1\t2\n3\t4");
    }

    #[test]
    #[cfg(unix)]
    fn wl_copy_surfaces_stderr_on_failure() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("wl-copy");
        // Read stdin before exiting to avoid an EPIPE race.
        write_executable(&fake, "#!/bin/sh\ncat >/dev/null\necho boom 1>&2\nexit 1\n");

        let err = copy_with_wl_copy("hello", &base_cfg(), &fake)
            .unwrap_err()
            .to_string();
        assert!(err.contains("boom"));
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn auto_selects_wl_copy_when_wayland_and_present() {
        struct EnvGuard {
            path: Option<std::ffi::OsString>,
            wayland: Option<std::ffi::OsString>,
        }
        impl Drop for EnvGuard {
            fn drop(&mut self) {
                match self.path.take() {
                    Some(v) => std::env::set_var("PATH", v),
                    None => std::env::remove_var("PATH"),
                }
                match self.wayland.take() {
                    Some(v) => std::env::set_var("WAYLAND_DISPLAY", v),
                    None => std::env::remove_var("WAYLAND_DISPLAY"),
                }
            }
        }

        let dir = TempDir::new().unwrap();
        write_executable(&dir.path().join("wl-copy"), "#!/bin/sh\ncat >/dev/null\nexit 0\n");

        let _guard = EnvGuard {
            path: std::env::var_os("PATH"),
            wayland: std::env::var_os("WAYLAND_DISPLAY"),
        };
        std::env::set_var("PATH", dir.path().as_os_str());
        std::env::set_var("WAYLAND_DISPLAY", "wayland-1");

        let choice = choose_backend(&base_cfg()).unwrap();
        assert!(matches!(choice, BackendChoice::WlCopy { .. }));
    }
}
