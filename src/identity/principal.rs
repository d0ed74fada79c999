use std::fmt;

/// Kind code of a bare-name legacy principal.
pub const KIND_LEGACY: i32 = 0;
/// Kind code used by token-based (GSS) principals.
pub const KIND_GSS: i32 = 1;
/// Kind code of the built-in always-trusted identities.
pub const KIND_SUPERUSER: i32 = 2;

// Display-only names; they never appear in tickets or in the user list.
pub const LOCALAUTH_NAME: &str = "<LocalAuth>";
pub const NOAUTH_NAME: &str = "<NoAuth>";

/// A principal as seen by the super-user gate.
///
/// Matching uses only the `(kind_code, exported_name)` pair. A legacy name has
/// kind [`KIND_LEGACY`] and its own bytes as exported name, so an extended
/// entry of kind 0 carrying the same bytes names the same principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    LegacyV4 { name: String },
    Extended { kind: i32, exported_name: Vec<u8>, display_name: String },
    SuperuserSentinel { display_name: String },
}

impl Identity {
    pub fn legacy(name: impl Into<String>) -> Self {
        Identity::LegacyV4 { name: name.into() }
    }

    pub fn extended(kind: i32, exported_name: impl Into<Vec<u8>>, display_name: impl Into<String>) -> Self {
        Identity::Extended { kind, exported_name: exported_name.into(), display_name: display_name.into() }
    }

    /// The identity a process's own local credentials map to.
    pub fn local_auth() -> Self {
        Identity::SuperuserSentinel { display_name: LOCALAUTH_NAME.to_string() }
    }

    /// The identity reported while the no-auth override is active.
    pub fn no_auth() -> Self {
        Identity::SuperuserSentinel { display_name: NOAUTH_NAME.to_string() }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::LegacyV4 { name } => name,
            Identity::Extended { display_name, .. } | Identity::SuperuserSentinel { display_name } => display_name,
        }
    }

    pub fn kind_code(&self) -> i32 {
        match self {
            Identity::LegacyV4 { .. } => KIND_LEGACY,
            Identity::Extended { kind, .. } => *kind,
            Identity::SuperuserSentinel { .. } => KIND_SUPERUSER,
        }
    }

    pub fn exported_name(&self) -> &[u8] {
        match self {
            Identity::LegacyV4 { name } => name.as_bytes(),
            Identity::Extended { exported_name, .. } => exported_name,
            Identity::SuperuserSentinel { display_name } => display_name.as_bytes(),
        }
    }

    pub fn is_legacy(&self) -> bool { matches!(self, Identity::LegacyV4 { .. }) }

    /// Built-in always-trusted identity: the sentinel variant, or any
    /// identity carrying the [`KIND_SUPERUSER`] kind code.
    pub fn is_sentinel(&self) -> bool { self.kind_code() == KIND_SUPERUSER }

    /// Exact, case-sensitive comparison of kind and exported name.
    /// Display names are advisory and never compared.
    pub fn matches(&self, other: &Identity) -> bool {
        self.kind_code() == other.kind_code() && self.exported_name() == other.exported_name()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
