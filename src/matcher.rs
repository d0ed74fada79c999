//! Legacy ticket principals: rebuild `name[.instance][@realm]` from ticket
//! fields and look the result up as a bare name in the user list.

use crate::identity::Identity;
use crate::realm::{RealmResolver, MAXKTCNAMELEN, MAXKTCREALMLEN};
use crate::userlist::UserList;

/// Principal name a process's own local credentials carry.
pub const AUTH_SUPERUSER: &str = "afs";

/// Longest composed principal: two names, a realm, and their separators,
/// in a fixed buffer that also holds a terminator.
pub const MAX_PRINCIPAL_LEN: usize = MAXKTCNAMELEN + MAXKTCNAMELEN + MAXKTCREALMLEN + 2;

/// Build a candidate principal, or `None` when it cannot be formed: no name,
/// an instance without a separator, or a result over [`MAX_PRINCIPAL_LEN`].
pub fn compose_principal(name: &str, sep: &str, instance: Option<&str>, realm: Option<&str>) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let mut full = String::with_capacity(MAX_PRINCIPAL_LEN);
    full.push_str(name);

    if let Some(inst) = instance.filter(|i| !i.is_empty()) {
        if sep.is_empty() {
            return None;
        }
        full.push_str(sep);
        full.push_str(inst);
    }
    if let Some(realm) = realm.filter(|r| !r.is_empty()) {
        full.push('@');
        full.push_str(realm);
    }

    (full.len() <= MAX_PRINCIPAL_LEN).then_some(full)
}

fn find_composed(list: &UserList, name: &str, instance: &str, realm: Option<&str>) -> Option<Identity> {
    let candidate = compose_principal(name, ".", Some(instance), realm)?;
    let id = Identity::legacy(candidate);
    if list.contains(&id) { Some(id) } else { None }
}

/// Whether a ticket principal is a super-user; returns the identity that
/// matched. Any resolution failure denies.
pub fn legacy_superuser(
    list: &UserList,
    realms: &dyn RealmResolver,
    name: &str,
    instance: &str,
    realm: &str,
) -> Option<Identity> {
    let is_local = match realms.is_local_realm(name, instance, realm) {
        Ok(local) => local,
        Err(e) => {
            tracing::debug!(target: "cellguard::gate", "realm resolution for '{}' failed: {}", name, e);
            return None;
        }
    };

    if instance.is_empty() && realm.is_empty() && name == AUTH_SUPERUSER {
        return Some(Identity::local_auth());
    }

    if is_local {
        return find_composed(list, name, instance, None);
    }

    if let Some(id) = find_composed(list, name, instance, Some(realm)) {
        return Some(id);
    }
    // Ticket realms and configured cell names often differ only in case.
    let lowered = realm.to_ascii_lowercase();
    if lowered != realm {
        if let Some(id) = find_composed(list, name, instance, Some(&lowered)) {
            return Some(id);
        }
    }
    let raised = realm.to_ascii_uppercase();
    if raised != realm && raised != lowered {
        return find_composed(list, name, instance, Some(&raised));
    }
    None
}
