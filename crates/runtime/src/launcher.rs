//! Tool server process launching.
//!
//! Selects an interpreter from the server script's extension and builds
//! the child process command: inherited environment, forced UTF-8 text
//! encoding, and the active virtualenv's packages on the import path so
//! the server can locate its dependencies.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{Error, Result};

/// The kind of tool server script, determined by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// A `.py` script, run with a Python interpreter.
    Python,
    /// A `.js` script, run with Node.
    Node,
}

impl ScriptKind {
    /// Determine the script kind from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("py") => Ok(Self::Python),
            Some("js") => Ok(Self::Node),
            _ => Err(Error::UnsupportedScript {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The interpreter used to run scripts of this kind.
    ///
    /// Python prefers the active virtualenv's interpreter, falling back
    /// to `python3` on PATH.
    pub fn interpreter(&self) -> PathBuf {
        match self {
            Self::Python => {
                if let Some(venv) = env::var_os("VIRTUAL_ENV") {
                    let candidate = venv_interpreter(Path::new(&venv));
                    if candidate.is_file() {
                        return candidate;
                    }
                }
                PathBuf::from("python3")
            }
            Self::Node => PathBuf::from("node"),
        }
    }
}

/// Build the command that starts the tool server child process.
///
/// Fails with [`Error::UnsupportedScript`] before anything is spawned if
/// the extension is not recognized.
pub fn server_command(script: &Path) -> Result<Command> {
    let kind = ScriptKind::from_path(script)?;
    let interpreter = kind.interpreter();
    tracing::debug!(?kind, interpreter = %interpreter.display(), "launching tool server");

    let mut cmd = Command::new(interpreter);
    cmd.arg(script);

    // The child inherits our environment; force a consistent text
    // encoding on its stdio so the line-oriented transport stays UTF-8.
    cmd.env("PYTHONIOENCODING", "utf-8");
    #[cfg(windows)]
    cmd.env("PYTHONLEGACYWINDOWSSTDIO", "0");

    if kind == ScriptKind::Python {
        if let Some(venv) = env::var_os("VIRTUAL_ENV") {
            if let Some(site_packages) = venv_site_packages(Path::new(&venv)) {
                let mut paths = vec![site_packages];
                if let Some(existing) = env::var_os("PYTHONPATH") {
                    paths.extend(env::split_paths(&existing));
                }
                if let Ok(joined) = env::join_paths(paths) {
                    cmd.env("PYTHONPATH", joined);
                }
            }
        }
    }

    Ok(cmd)
}

fn venv_interpreter(venv: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        venv.join("Scripts").join("python.exe")
    }
    #[cfg(not(windows))]
    {
        venv.join("bin").join("python")
    }
}

/// Locate `site-packages` inside a virtualenv, if present.
fn venv_site_packages(venv: &Path) -> Option<PathBuf> {
    #[cfg(windows)]
    {
        let site = venv.join("Lib").join("site-packages");
        site.is_dir().then_some(site)
    }
    #[cfg(not(windows))]
    {
        // Layout is {venv}/lib/pythonX.Y/site-packages; the version
        // directory is discovered rather than assumed.
        let lib = venv.join("lib");
        for entry in fs::read_dir(lib).ok()? {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            if name.starts_with("python") {
                let site = path.join("site-packages");
                if site.is_dir() {
                    return Some(site);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_extension_selected() {
        let kind = ScriptKind::from_path(Path::new("server.py")).unwrap();
        assert_eq!(kind, ScriptKind::Python);
    }

    #[test]
    fn node_extension_selected() {
        let kind = ScriptKind::from_path(Path::new("weather/server.js")).unwrap();
        assert_eq!(kind, ScriptKind::Node);
        assert_eq!(kind.interpreter(), PathBuf::from("node"));
    }

    #[test]
    fn unsupported_extension_rejected() {
        for path in ["server.sh", "server", "server.rb"] {
            let err = ScriptKind::from_path(Path::new(path)).unwrap_err();
            assert!(matches!(err, Error::UnsupportedScript { .. }), "{path}");
        }
    }

    #[test]
    fn command_forces_utf8_stdio() {
        let cmd = server_command(Path::new("server.py")).unwrap();
        let envs: Vec<_> = cmd.as_std().get_envs().collect();
        assert!(
            envs.iter()
                .any(|(k, v)| *k == "PYTHONIOENCODING" && *v == Some(OsStr::new("utf-8")))
        );
    }

    #[test]
    fn unsupported_script_builds_no_command() {
        assert!(server_command(Path::new("server.txt")).is_err());
    }
}
