//! Post-create helpers: env-file copying, dependency installs, and editor
//! launching. All of these are best-effort; failures downgrade messaging but
//! never fail a flow.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};

/// Package managers recognised by lockfile detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Bun,
    Pnpm,
    Yarn,
    Npm,
    Cargo,
}

impl PackageManager {
    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Bun => "bun",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
            PackageManager::Cargo => "cargo",
        }
    }

    /// The install command for this manager.
    pub fn install_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Bun => ("bun", &["install"]),
            PackageManager::Pnpm => ("pnpm", &["install"]),
            PackageManager::Yarn => ("yarn", &["install"]),
            PackageManager::Npm => ("npm", &["install"]),
            PackageManager::Cargo => ("cargo", &["fetch"]),
        }
    }

    /// Lockfiles and manifests checked during detection, most specific first.
    /// The lockfile order matters: a repo with both `pnpm-lock.yaml` and
    /// `package.json` should install with pnpm, not npm.
    fn detection_table() -> &'static [(&'static str, PackageManager)] {
        &[
            ("bun.lockb", PackageManager::Bun),
            ("bun.lock", PackageManager::Bun),
            ("pnpm-lock.yaml", PackageManager::Pnpm),
            ("yarn.lock", PackageManager::Yarn),
            ("package-lock.json", PackageManager::Npm),
            ("package.json", PackageManager::Npm),
            ("Cargo.toml", PackageManager::Cargo),
        ]
    }
}

/// Detect the package manager used in `dir`, if any.
pub fn detect_package_manager(dir: &Path) -> Option<PackageManager> {
    PackageManager::detection_table()
        .iter()
        .find(|(file, _)| dir.join(file).is_file())
        .map(|(_, pm)| *pm)
}

/// Run the manager's install command in `dir`, blocking until it finishes.
pub fn install_dependencies(dir: &Path, pm: PackageManager) -> anyhow::Result<()> {
    let (program, args) = pm.install_command();
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run {}", pm.name()))?;
    if !status.success() {
        bail!("{} install exited with {}", pm.name(), status);
    }
    Ok(())
}

/// Copy top-level `.env*` files from `source` into `dest`.
///
/// These files are gitignored in most projects, so a fresh worktree starts
/// without them. Returns the copied file names; individual failures are
/// skipped silently.
pub fn copy_env_files(source: &Path, dest: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(source) else {
        return Vec::new();
    };
    let mut copied = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(".env") || !path.is_file() {
            continue;
        }
        if fs::copy(&path, dest.join(name)).is_ok() {
            copied.push(PathBuf::from(name));
        }
    }
    copied.sort();
    copied
}

/// Open `path` in an editor, detached.
///
/// Priority: the configured command, then `cursor`, then `code`, then the
/// platform's folder opener.
pub fn open_editor(configured: Option<&str>, path: &Path) -> anyhow::Result<()> {
    if let Some(editor) = configured {
        return launch(editor, path);
    }

    for candidate in ["cursor", "code"] {
        if which::which(candidate).is_ok() {
            return launch(candidate, path);
        }
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    };
    if which::which(opener).is_ok() {
        return launch_with(opener, &[], path);
    }

    bail!("No editor found. Set ARBOR_EDITOR or install cursor/code.");
}

fn launch(editor: &str, path: &Path) -> anyhow::Result<()> {
    // cursor and code reuse an existing window unless told otherwise.
    match editor {
        "cursor" => launch_with(editor, &["--new-window"], path),
        "code" => launch_with(editor, &["-n"], path),
        _ => launch_with(editor, &[], path),
    }
}

fn launch_with(program: &str, args: &[&str], path: &Path) -> anyhow::Result<()> {
    Command::new(program)
        .args(args)
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch {program}"))?;
    Ok(())
}

/// The post-create and open operations the flows are written against.
/// [`DevHooks`] is the production implementation; tests record calls instead
/// of spawning processes.
pub trait Hooks {
    fn copy_env_files(&self, source: &Path, dest: &Path) -> Vec<PathBuf>;
    fn detect_package_manager(&self, dir: &Path) -> Option<PackageManager>;
    fn install_dependencies(&self, dir: &Path, pm: PackageManager) -> anyhow::Result<()>;
    fn open_editor(&self, configured: Option<&str>, path: &Path) -> anyhow::Result<()>;
}

/// Production [`Hooks`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevHooks;

impl DevHooks {
    pub fn new() -> Self {
        Self
    }
}

impl Hooks for DevHooks {
    fn copy_env_files(&self, source: &Path, dest: &Path) -> Vec<PathBuf> {
        copy_env_files(source, dest)
    }

    fn detect_package_manager(&self, dir: &Path) -> Option<PackageManager> {
        detect_package_manager(dir)
    }

    fn install_dependencies(&self, dir: &Path, pm: PackageManager) -> anyhow::Result<()> {
        install_dependencies(dir, pm)
    }

    fn open_editor(&self, configured: Option<&str>, path: &Path) -> anyhow::Result<()> {
        open_editor(configured, path)
    }
}
