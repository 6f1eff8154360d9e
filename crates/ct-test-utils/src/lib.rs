use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use anyhow::{Context, Result, anyhow};
use log::debug;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static SPAWN_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Environment mutations via `std::env::set_var`/`std::env::remove_var` must be
/// serialized with `env_lock()`; read-only lookups can proceed without it.
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Held while writing and executing fake binaries.
///
/// Executing a file that another thread still has open for writing fails with
/// `ETXTBSY` on Linux, so tests that spawn scripts written by `TreeBuilder`
/// take this lock for the whole test.
pub fn spawn_lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Restores an environment variable to its previous value on drop.
pub struct EnvGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        match value {
            Some(value) => unsafe {
                std::env::set_var(key, value);
            },
            None => unsafe {
                std::env::remove_var(key);
            },
        }
        Self { key, previous }
    }

    pub fn unset(key: &'static str) -> Self {
        Self::set(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe {
                std::env::set_var(self.key, value);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[derive(Debug)]
struct FixtureFile {
    path: PathBuf,
    text: String,
    executable: bool,
}

/// Builds a throwaway directory tree under a temp dir.
pub struct TreeBuilder {
    root: TempDir,
    files: Vec<FixtureFile>,
    dirs: Vec<PathBuf>,
}

impl TreeBuilder {
    pub fn new() -> std::io::Result<Self> {
        let root = tempfile::tempdir()?;
        Ok(Self {
            root,
            files: Vec::new(),
            dirs: Vec::new(),
        })
    }

    pub fn file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.files.push(FixtureFile {
            path: path.as_ref().to_path_buf(),
            text: text.into(),
            executable: false,
        });
        self
    }

    /// Adds a shell script with the executable bit set (unix only).
    pub fn script(mut self, path: impl AsRef<Path>, body: impl AsRef<str>) -> Self {
        self.files.push(FixtureFile {
            path: path.as_ref().to_path_buf(),
            text: format!("#!/bin/sh\n{}\n", body.as_ref()),
            executable: true,
        });
        self
    }

    /// Adds an empty directory.
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<TreeFixture> {
        let root_path = self.root.path().to_path_buf();

        for dir in self.dirs {
            validate_fixture_path(&dir)?;
            let path = root_path.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("create fixture dir {}", path.display()))?;
        }

        for file in self.files {
            validate_fixture_path(&file.path)?;
            let path = root_path.join(&file.path);
            write_file(&path, &file.text)?;
            if file.executable {
                make_executable(&path)?;
            }
        }

        let root = root_path
            .canonicalize()
            .with_context(|| format!("canonicalize fixture root {}", root_path.display()))?;
        debug!("fixture tree ready at {}", root.display());
        Ok(TreeFixture {
            root,
            _temp: self.root,
        })
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new().expect("tempdir")
    }
}

pub struct TreeFixture {
    root: PathBuf,
    _temp: TempDir,
}

impl TreeFixture {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: impl AsRef<Path>, text: &str) -> Result<()> {
        let relative = relative.as_ref();
        validate_fixture_path(relative)?;
        write_file(&self.root.join(relative), text)
    }

    pub fn remove(&self, relative: impl AsRef<Path>) -> Result<()> {
        let relative = relative.as_ref();
        validate_fixture_path(relative)?;
        let path = self.root.join(relative);
        fs::remove_file(&path).with_context(|| format!("remove fixture file {}", path.display()))
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create fixture dir {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("write fixture file {}", path.display()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .with_context(|| format!("stat fixture script {}", path.display()))?
        .permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("chmod fixture script {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn validate_fixture_path(path: &Path) -> Result<()> {
    if path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        })
    {
        return Err(anyhow!(
            "fixture path must be relative and not contain '..': {}",
            path.display()
        ));
    }
    Ok(())
}
