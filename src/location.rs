//! Uniform metadata for local paths and remote URLs.
//!
//! A [`Location`] is classified once, at construction, by a purely syntactic
//! rule: a path containing `://` is remote, everything else is local. Local
//! queries go to the filesystem; remote queries probe the resource over HTTP.
//! Construction never fails. A path that cannot name anything simply does
//! not exist, is not a directory, is not hidden and has length zero; only
//! [`Location::open`] and the mutating operations report it as an error.

use std::fmt;
use std::fs;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use reqwest::Url;

use crate::config::{AccessMode, HandleConfig, RemoteConfig};
use crate::error::{HandleError, Result};
use crate::handle::{DynHandle, Handle};
use crate::io::{BackingStore, HttpStore, LocalFileStore};

const SCHEME_SEPARATOR: &str = "://";

/// A local path or remote URL.
#[derive(Debug, Clone)]
pub struct Location {
    path: String,
    remote: bool,
    absolute: String,
    transport: Arc<RemoteConfig>,
}

impl Location {
    /// Classify `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let remote = path.contains(SCHEME_SEPARATOR);
        let absolute = if remote {
            normalize_remote(&path)
        } else {
            absolutize(&path)
        };
        Self {
            path,
            remote,
            absolute,
            transport: Arc::default(),
        }
    }

    /// Wrap a native path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref().to_string_lossy().into_owned())
    }

    /// The entry `child` inside `parent`.
    pub fn with_parent(parent: &Location, child: &str) -> Self {
        let joined = if parent.remote {
            format!("{}/{}", parent.absolute.trim_end_matches('/'), child)
        } else {
            Path::new(&parent.absolute)
                .join(child)
                .to_string_lossy()
                .into_owned()
        };
        Self::new(joined).with_remote_config_arc(Arc::clone(&parent.transport))
    }

    /// Use `config` for the HTTP probes behind remote metadata queries.
    pub fn with_remote_config(self, config: RemoteConfig) -> Self {
        self.with_remote_config_arc(Arc::new(config))
    }

    fn with_remote_config_arc(mut self, transport: Arc<RemoteConfig>) -> Self {
        self.transport = transport;
        self
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// The path exactly as given.
    pub fn raw_path(&self) -> &str {
        &self.path
    }

    /// Last path component; empty for a filesystem root or bare host.
    pub fn name(&self) -> String {
        if self.remote {
            return remote_name(&self.absolute).to_string();
        }
        Path::new(&self.absolute)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Local: the path exists. Remote: the resource answers successfully.
    pub async fn exists(&self) -> bool {
        if self.remote {
            return self.probe().await.is_some();
        }
        self.local_path().is_some_and(|path| path.exists())
    }

    pub async fn can_read(&self) -> bool {
        if self.remote {
            return self.exists().await;
        }
        let Some(path) = self.local_path() else {
            return false;
        };
        if path.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            fs::File::open(path).is_ok()
        }
    }

    /// Whether this process may write here, ownership included. Remote
    /// resources are never writable.
    pub fn can_write(&self) -> bool {
        if self.remote {
            return false;
        }
        self.local_path().is_some_and(is_writable_path)
    }

    pub fn is_directory(&self) -> bool {
        !self.remote && self.local_path().is_some_and(|path| path.is_dir())
    }

    pub async fn is_file(&self) -> bool {
        self.exists().await && !self.is_directory()
    }

    pub fn is_hidden(&self) -> bool {
        if self.remote {
            return false;
        }
        let Some(path) = self.local_path() else {
            return false;
        };
        is_hidden_path(path)
    }

    /// Size in bytes; zero when unknown or missing.
    pub async fn length(&self) -> u64 {
        if self.remote {
            return self.probe().await.map_or(0, |meta| meta.length);
        }
        self.local_path()
            .and_then(|path| fs::metadata(path).ok())
            .map_or(0, |meta| meta.len())
    }

    /// Modification time of a local path.
    pub fn last_modified(&self) -> Option<SystemTime> {
        if self.remote {
            return None;
        }
        fs::metadata(self.local_path()?).ok()?.modified().ok()
    }

    /// Lexically absolute form: relative paths are joined to the working
    /// directory and `.`/`..` are folded, symlinks are left alone. Remote
    /// URLs lose trailing slashes; requests still go to the URL as given.
    pub fn absolute_path(&self) -> &str {
        &self.absolute
    }

    pub fn absolute_file(&self) -> Location {
        Location::new(self.absolute.clone()).with_remote_config_arc(Arc::clone(&self.transport))
    }

    /// Fully resolved form. Equals [`absolute_path`](Self::absolute_path)
    /// when no symlinks are involved, and for paths that do not exist.
    pub fn canonical_path(&self) -> String {
        if self.remote {
            return self.absolute.clone();
        }
        self.local_path()
            .and_then(|path| fs::canonicalize(path).ok())
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.absolute.clone())
    }

    pub fn canonical_file(&self) -> Location {
        Location::new(self.canonical_path()).with_remote_config_arc(Arc::clone(&self.transport))
    }

    /// Path of the containing directory, if there is one.
    pub fn parent(&self) -> Option<String> {
        if self.remote {
            return remote_parent(&self.absolute).map(str::to_string);
        }
        Path::new(&self.absolute)
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
    }

    pub fn parent_file(&self) -> Option<Location> {
        self.parent()
            .map(|parent| Location::new(parent).with_remote_config_arc(Arc::clone(&self.transport)))
    }

    /// Names of the entries of a directory, sorted, hidden ones included.
    /// `None` for anything that is not a readable directory.
    pub fn list(&self) -> Option<Vec<String>> {
        self.list_filtered(false)
    }

    /// [`list`](Self::list), optionally without hidden entries.
    pub fn list_filtered(&self, exclude_hidden: bool) -> Option<Vec<String>> {
        if !self.is_directory() {
            return None;
        }
        let entries = fs::read_dir(self.local_path()?).ok()?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !exclude_hidden || !Location::with_parent(self, name).is_hidden())
            .collect();
        names.sort();
        Some(names)
    }

    /// [`list`](Self::list), as locations.
    pub fn list_files(&self) -> Option<Vec<Location>> {
        let names = self.list()?;
        Some(
            names
                .iter()
                .map(|name| Location::with_parent(self, name))
                .collect(),
        )
    }

    /// `file://` URL of a local path (directories end with a separator), or
    /// the remote URL itself.
    pub fn to_url(&self) -> Result<Url> {
        let text = if self.remote {
            self.absolute.clone()
        } else {
            let mut text = format!("file://{}", self.absolute);
            if self.is_directory() && !text.ends_with(MAIN_SEPARATOR) {
                text.push(MAIN_SEPARATOR);
            }
            text
        };
        Url::parse(&text).map_err(|e| HandleError::InvalidPath {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Open a handle on the backend this location selects.
    ///
    /// Remote resources are always opened read-only whatever `config.mode`
    /// says; writes through the handle then fail as unsupported.
    pub async fn open(&self, config: &HandleConfig) -> Result<DynHandle> {
        let window = config.effective_window_size();
        let store: Box<dyn BackingStore> = if self.remote {
            Url::parse(&self.path).map_err(|e| HandleError::InvalidPath {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            if config.mode == AccessMode::ReadWrite {
                tracing::debug!(url = %self.path, "remote resources open read-only");
            }
            Box::new(HttpStore::open(self.path.clone(), &config.remote).await?)
        } else {
            let path = self.checked_local_path()?;
            Box::new(LocalFileStore::open(path, config.mode)?)
        };
        Ok(Handle::new(store, window))
    }

    /// Create this directory; the parent must exist.
    pub fn create_dir(&self) -> Result<()> {
        let path = self.writable_local_path("create_dir")?;
        fs::create_dir(path).map_err(|e| HandleError::io(&self.absolute, e))
    }

    /// Create this directory and any missing parents.
    pub fn create_dir_all(&self) -> Result<()> {
        let path = self.writable_local_path("create_dir_all")?;
        fs::create_dir_all(path).map_err(|e| HandleError::io(&self.absolute, e))
    }

    /// Create an empty file, failing if something already exists here.
    pub fn create_new_file(&self) -> Result<()> {
        let path = self.writable_local_path("create_new_file")?;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
            .map_err(|e| HandleError::io(&self.absolute, e))
    }

    /// Delete a file or an empty directory.
    pub fn remove(&self) -> Result<()> {
        let path = self.writable_local_path("remove")?;
        let result = if path.is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| HandleError::io(&self.absolute, e))
    }

    async fn probe(&self) -> Option<crate::io::RemoteMetadata> {
        match HttpStore::probe(&self.path, &self.transport).await {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!(url = %self.path, error = %e, "remote probe failed");
                None
            }
        }
    }

    fn local_path(&self) -> Option<&Path> {
        if self.remote || self.absolute.contains('\0') {
            return None;
        }
        Some(Path::new(&self.absolute))
    }

    fn checked_local_path(&self) -> Result<&Path> {
        self.local_path().ok_or_else(|| HandleError::InvalidPath {
            path: self.path.clone(),
            reason: "contains a NUL byte".to_string(),
        })
    }

    fn writable_local_path(&self, operation: &'static str) -> Result<&Path> {
        if self.remote {
            return Err(HandleError::unsupported(operation));
        }
        self.checked_local_path()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.absolute == other.absolute
    }
}

impl Eq for Location {}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::from_path(path)
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::from_path(path)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::new(path)
    }
}

fn absolutize(path: &str) -> String {
    let path = Path::new(path);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize(&joined).to_string_lossy().into_owned()
}

/// Fold `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(unix)]
fn is_writable_path(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable_path(path: &Path) -> bool {
    if path.is_dir() {
        return fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly());
    }
    fs::OpenOptions::new().write(true).open(path).is_ok()
}

#[cfg(windows)]
fn is_hidden_path(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    fs::metadata(path).is_ok_and(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
}

#[cfg(not(windows))]
fn is_hidden_path(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Byte index where the path part of a URL begins (after `scheme://host`).
fn remote_path_start(url: &str) -> usize {
    let authority = url.find(SCHEME_SEPARATOR).map_or(0, |i| i + SCHEME_SEPARATOR.len());
    url[authority..]
        .find('/')
        .map_or(url.len(), |i| authority + i)
}

/// Drop trailing slashes after the host, so `http://h/data/` and
/// `http://h/data` name the same location.
fn normalize_remote(url: &str) -> String {
    let start = remote_path_start(url);
    let trimmed = url.trim_end_matches('/');
    if trimmed.len() < start {
        return url[..start].to_string();
    }
    trimmed.to_string()
}

fn remote_name(url: &str) -> &str {
    let start = remote_path_start(url);
    let trimmed = url.trim_end_matches('/');
    if trimmed.len() <= start {
        return "";
    }
    trimmed[start..].rsplit('/').next().unwrap_or_default()
}

fn remote_parent(url: &str) -> Option<&str> {
    let start = remote_path_start(url);
    let trimmed = url.trim_end_matches('/');
    if trimmed.len() <= start {
        return None;
    }
    trimmed[start..]
        .rfind('/')
        .map(|i| &trimmed[..start + i])
}
