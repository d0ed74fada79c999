use crate::config::CellConfig;
use crate::error::RealmError;

/// Historical ticket field limits (name, instance, realm).
pub const MAXKTCNAMELEN: usize = 64;
pub const MAXKTCREALMLEN: usize = 64;

/// Decides whether a ticket realm belongs to the local cell.
pub trait RealmResolver: Send + Sync {
    fn is_local_realm(&self, name: &str, instance: &str, realm: &str) -> Result<bool, RealmError>;
}

/// Local realms derived from the cell configuration: the upper-cased cell
/// name plus any extra realms, minus explicitly excluded principals.
#[derive(Debug, Clone, Default)]
pub struct LocalRealms {
    realms: Vec<String>,
    excluded: Vec<String>,
}

impl LocalRealms {
    pub fn new<I, S>(realms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { realms: realms.into_iter().map(Into::into).collect(), excluded: Vec::new() }
    }

    pub fn from_cell(cell: &CellConfig) -> Self {
        let mut realms = Vec::with_capacity(cell.local_realms.len() + 1);
        if !cell.name.is_empty() {
            realms.push(cell.name.to_uppercase());
        }
        realms.extend(cell.local_realms.iter().cloned());
        Self { realms, excluded: cell.excluded_principals.clone() }
    }

    pub fn exclude(mut self, principal: impl Into<String>) -> Self {
        self.excluded.push(principal.into());
        self
    }

    fn is_excluded(&self, name: &str, instance: &str, realm: &str) -> bool {
        let principal = if instance.is_empty() {
            format!("{}@{}", name, realm)
        } else {
            format!("{}.{}@{}", name, instance, realm)
        };
        self.excluded.iter().any(|p| *p == principal)
    }
}

impl RealmResolver for LocalRealms {
    fn is_local_realm(&self, name: &str, instance: &str, realm: &str) -> Result<bool, RealmError> {
        if realm.is_empty() {
            return Ok(true);
        }
        if realm.len() >= MAXKTCREALMLEN {
            return Err(RealmError::RealmTooLong(realm.to_string()));
        }
        if !self.realms.iter().any(|r| r.eq_ignore_ascii_case(realm)) {
            return Ok(false);
        }
        Ok(!self.is_excluded(name, instance, realm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> CellConfig {
        CellConfig {
            name: "example.org".into(),
            local_realms: vec!["AD.EXAMPLE.ORG".into()],
            excluded_principals: vec!["admin@EXAMPLE.ORG".into()],
        }
    }

    #[test]
    fn empty_realm_is_local() {
        let r = LocalRealms::from_cell(&cell());
        assert_eq!(r.is_local_realm("bob", "", ""), Ok(true));
    }

    #[test]
    fn cell_name_and_extra_realms_are_local() {
        let r = LocalRealms::from_cell(&cell());
        assert_eq!(r.is_local_realm("bob", "", "EXAMPLE.ORG"), Ok(true));
        assert_eq!(r.is_local_realm("bob", "", "example.org"), Ok(true));
        assert_eq!(r.is_local_realm("bob", "admin", "AD.EXAMPLE.ORG"), Ok(true));
        assert_eq!(r.is_local_realm("bob", "", "OTHER.ORG"), Ok(false));
    }

    #[test]
    fn excluded_principal_is_foreign() {
        let r = LocalRealms::from_cell(&cell());
        assert_eq!(r.is_local_realm("admin", "", "EXAMPLE.ORG"), Ok(false));
        assert_eq!(r.is_local_realm("admin", "x", "EXAMPLE.ORG"), Ok(true));

        let r = LocalRealms::new(["EXAMPLE.ORG"]).exclude("bob.ops@EXAMPLE.ORG");
        assert_eq!(r.is_local_realm("bob", "ops", "EXAMPLE.ORG"), Ok(false));
        assert_eq!(r.is_local_realm("bob", "", "EXAMPLE.ORG"), Ok(true));
    }

    #[test]
    fn oversized_realm_is_an_error() {
        let r = LocalRealms::new(["EXAMPLE.ORG"]);
        let long = "R".repeat(MAXKTCREALMLEN);
        assert!(matches!(r.is_local_realm("bob", "", &long), Err(RealmError::RealmTooLong(_))));
    }
}
