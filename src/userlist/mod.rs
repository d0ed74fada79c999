//! The super-user allow-list ("UserList"): one identity per line in the cell
//! configuration directory.
//!
//! Every operation, reads included, runs under one process-wide lock so a
//! reader never interleaves with a rewrite. Malformed lines are handled
//! strictly: reads and rewrites stop at the first bad line and leave the file
//! alone, while [`UserList::contains`] answers `false`.

mod rewrite;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};

use crate::config::GateConfig;
use crate::error::{ParseError, StoreError, StoreResult};
use crate::identity::{decode_line, encode_line, Identity, USERLIST_MAXLINESIZE};

static USERLIST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Which entries [`UserList::iterate_nth`] counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    /// Count legacy names only; extended entries are skipped without
    /// advancing the index. Kept for old enumeration interfaces.
    LegacyOnly,
}

#[derive(Debug, Clone)]
struct Entry {
    raw: String,
    identity: Identity,
}

#[derive(Debug, Clone)]
pub struct UserList {
    path: PathBuf,
    max_line_size: usize,
    lock_timeout: Duration,
}

impl UserList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), max_line_size: USERLIST_MAXLINESIZE, lock_timeout: Duration::from_secs(5) }
    }

    pub fn from_config(cfg: &GateConfig) -> Self {
        Self { path: cfg.userlist_path(), max_line_size: cfg.max_line_size, lock_timeout: cfg.lock_timeout() }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path { &self.path }

    fn lock(&self) -> StoreResult<MutexGuard<'static, ()>> {
        USERLIST_LOCK.try_lock_for(self.lock_timeout).ok_or_else(|| {
            tracing::warn!(target: "cellguard::userlist", "user list lock not acquired within {:?}", self.lock_timeout);
            StoreError::Busy
        })
    }

    /// Read and decode the whole file. Caller holds the lock.
    fn read_entries(&self) -> StoreResult<Vec<Entry>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let mut entries = Vec::new();
        if bytes.is_empty() {
            return Ok(entries);
        }
        let limit = self.max_line_size.saturating_sub(2);
        let body = bytes.strip_suffix(b"\n").unwrap_or(&bytes[..]);
        for (i, raw) in body.split(|b| *b == b'\n').enumerate() {
            let line = i + 1;
            if raw.len() > limit {
                tracing::warn!(target: "cellguard::userlist", "{}: line {} is {} bytes, rejecting list", self.path.display(), line, raw.len());
                return Err(StoreError::LineTooLong { line, len: raw.len() });
            }
            let decoded = std::str::from_utf8(raw)
                .map_err(|_| ParseError::InvalidUtf8)
                .and_then(|text| decode_line(text).map(|identity| (text, identity)));
            match decoded {
                Ok((text, identity)) => entries.push(Entry { raw: text.to_string(), identity }),
                Err(source) => {
                    tracing::warn!(target: "cellguard::userlist", "{}: line {} is malformed ({}), rejecting list", self.path.display(), line, source);
                    return Err(StoreError::Corrupt { line, source });
                }
            }
        }
        Ok(entries)
    }

    fn write_entries(&self, entries: &[Entry]) -> StoreResult<()> {
        let mut out = String::with_capacity(entries.iter().map(|e| e.raw.len() + 1).sum());
        for e in entries {
            out.push_str(&e.raw);
            out.push('\n');
        }
        rewrite::replace_contents(&self.path, &out)?;
        Ok(())
    }

    /// Every stored identity, in file order. A missing file is an empty list.
    pub fn load(&self) -> StoreResult<Vec<Identity>> {
        let _guard = self.lock()?;
        Ok(self.read_entries()?.into_iter().map(|e| e.identity).collect())
    }

    /// Whether `target` is listed. Sentinel identities are always listed.
    /// Read failures are logged and answer `false`; use [`UserList::load`]
    /// to see the error.
    pub fn contains(&self, target: &Identity) -> bool {
        if target.is_sentinel() {
            return true;
        }
        let found = self.lock().and_then(|_guard| {
            Ok(self.read_entries()?.iter().any(|e| e.identity.matches(target)))
        });
        match found {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(target: "cellguard::userlist", "lookup of '{}' failed: {}", target.display_name(), e);
                false
            }
        }
    }

    pub fn add(&self, identity: &Identity) -> StoreResult<()> {
        if identity.is_sentinel() {
            return Err(StoreError::AlreadyExists);
        }
        let line = encode_line(identity, self.max_line_size)?;

        let _guard = self.lock()?;
        let mut entries = self.read_entries()?;
        if entries.iter().any(|e| e.identity.matches(identity)) {
            return Err(StoreError::AlreadyExists);
        }
        entries.push(Entry { raw: line.trim_end_matches('\n').to_string(), identity: identity.clone() });
        self.write_entries(&entries)?;
        tracing::info!(target: "cellguard::userlist", "added '{}' to {}", identity.display_name(), self.path.display());
        Ok(())
    }

    /// Drop every entry matching `identity`. The file is not rewritten when
    /// nothing matches.
    pub fn delete(&self, identity: &Identity) -> StoreResult<()> {
        let _guard = self.lock()?;
        let entries = self.read_entries()?;
        let before = entries.len();
        let kept: Vec<Entry> = entries.into_iter().filter(|e| !e.identity.matches(identity)).collect();
        if kept.len() == before {
            return Err(StoreError::NotFound);
        }
        self.write_entries(&kept)?;
        tracing::info!(
            target: "cellguard::userlist",
            "removed {} entr{} for '{}' from {}",
            before - kept.len(), if before - kept.len() == 1 { "y" } else { "ies" },
            identity.display_name(), self.path.display()
        );
        Ok(())
    }

    /// The `index`-th (from zero) entry under `filter`, or `None` past the end.
    pub fn iterate_nth(&self, index: usize, filter: ListFilter) -> StoreResult<Option<Identity>> {
        let _guard = self.lock()?;
        let entries = self.read_entries()?;
        let nth = entries
            .into_iter()
            .map(|e| e.identity)
            .filter(|id| match filter {
                ListFilter::All => true,
                ListFilter::LegacyOnly => id.is_legacy(),
            })
            .nth(index);
        Ok(nth)
    }

    pub fn nth_identity(&self, index: usize) -> StoreResult<Option<Identity>> {
        self.iterate_nth(index, ListFilter::All)
    }

    // Bare-name interfaces kept for older administrative tools.

    pub fn add_user(&self, name: &str) -> StoreResult<()> { self.add(&Identity::legacy(name)) }

    pub fn delete_user(&self, name: &str) -> StoreResult<()> { self.delete(&Identity::legacy(name)) }

    /// Display name of the `index`-th legacy entry. Extended entries are
    /// invisible here.
    pub fn nth_user(&self, index: usize) -> StoreResult<Option<String>> {
        Ok(self
            .iterate_nth(index, ListFilter::LegacyOnly)?
            .map(|id| id.display_name().to_string()))
    }
}
