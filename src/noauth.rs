//! No-auth override: while the marker file exists every caller is treated as
//! a super-user. Nothing is cached; each check goes to the filesystem.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audit::{AuditEvent, AuditSink};

pub struct NoAuthFlag {
    path: PathBuf,
    audit: Arc<dyn AuditSink>,
}

impl NoAuthFlag {
    pub fn new(path: impl Into<PathBuf>, audit: Arc<dyn AuditSink>) -> Self {
        Self { path: path.into(), audit }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Errors other than not-found count as inactive so a broken filesystem
    /// never grants access.
    pub fn is_active(&self) -> bool {
        match std::fs::metadata(&self.path) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(
                    target: "cellguard::noauth",
                    "cannot stat no-auth marker '{}': {}; treating override as inactive",
                    self.path.display(), e
                );
                false
            }
        }
    }

    /// Create or remove the marker. The attempt is audited either way, with
    /// the OS error code attached when it fails.
    pub fn set_active(&self, active: bool) -> io::Result<()> {
        let (event, result) = if active {
            let r = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .map(|_| ());
            (AuditEvent::NoAuthEnabled, r)
        } else {
            (AuditEvent::NoAuthDisabled, std::fs::remove_file(&self.path))
        };

        let code = match &result {
            Ok(()) => 0,
            Err(e) => e.raw_os_error().unwrap_or(-1),
        };
        self.audit.record(event, code);

        match &result {
            Ok(()) => tracing::info!(target: "cellguard::noauth", "no-auth override {}", if active { "enabled" } else { "disabled" }),
            Err(e) => tracing::warn!(target: "cellguard::noauth", "failed to {} no-auth override: {}", if active { "enable" } else { "disable" }, e),
        }
        result
    }
}
