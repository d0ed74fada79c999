//! Per-call super-user decision.
//!
//! The no-auth override is consulted first; otherwise the call's security
//! class picks the check. Every internal failure is a deny: a broken check
//! must never read as a grant, and nothing about the failure leaves the
//! process.

use std::sync::Arc;

use crate::audit::{AuditEvent, AuditSink, TracingAudit};
use crate::call::{CallSecurity, SecurityClass};
use crate::config::GateConfig;
use crate::identity::Identity;
use crate::matcher;
use crate::noauth::NoAuthFlag;
use crate::realm::{LocalRealms, RealmResolver, MAXKTCNAMELEN};
use crate::userlist::UserList;

/// Status returned by [`SuperUserGate::check_auth`] for non-super-users.
pub const PERMISSION_DENIED_CODE: i32 = 10029;

/// Longest name [`SuperUserGate::super_user_name`] returns, in bytes.
pub const LEGACY_NAME_MAX: usize = MAXKTCNAMELEN - 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedQuery {
    AnyUser,
    Admin,
}

pub struct SuperUserGate {
    userlist: UserList,
    noauth: NoAuthFlag,
    realms: Arc<dyn RealmResolver>,
    audit: Arc<dyn AuditSink>,
}

impl SuperUserGate {
    pub fn new(userlist: UserList, noauth: NoAuthFlag, realms: Arc<dyn RealmResolver>, audit: Arc<dyn AuditSink>) -> Self {
        Self { userlist, noauth, realms, audit }
    }

    /// Gate with the configured cell's realms and audit records sent to `tracing`.
    pub fn from_config(cfg: &GateConfig) -> Self {
        Self::from_config_with(cfg, Arc::new(LocalRealms::from_cell(&cfg.cell)), Arc::new(TracingAudit))
    }

    pub fn from_config_with(cfg: &GateConfig, realms: Arc<dyn RealmResolver>, audit: Arc<dyn AuditSink>) -> Self {
        let noauth = NoAuthFlag::new(cfg.noauth_path(), audit.clone());
        Self::new(UserList::from_config(cfg), noauth, realms, audit)
    }

    pub fn userlist(&self) -> &UserList { &self.userlist }

    pub fn noauth(&self) -> &NoAuthFlag { &self.noauth }

    /// The identity that makes `call` a super-user, or `None` to deny.
    pub fn super_identity<C: CallSecurity + ?Sized>(&self, call: &C) -> Option<Identity> {
        if self.noauth.is_active() {
            self.audit.record(AuditEvent::NoAuthInUse, 0);
            tracing::info!(target: "cellguard::gate", "no-auth override active; granting super-user");
            return Some(Identity::no_auth());
        }

        let class = call.security_class();
        let granted = match class {
            SecurityClass::Unauthenticated => None,
            // Support for these tokens was removed; never trust them.
            SecurityClass::LegacyPasswordBased => None,
            SecurityClass::TicketBased => match call.ticket_info() {
                Ok(t) => self.is_legacy_superuser(&t.name, &t.instance, &t.realm),
                Err(e) => {
                    tracing::debug!(target: "cellguard::gate", "no ticket details on call: {}", e);
                    None
                }
            },
            SecurityClass::TokenBased => match call.token_info() {
                Ok(t) if self.userlist.contains(&t.identity) => Some(t.identity),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(target: "cellguard::gate", "no token identity on call: {}", e);
                    None
                }
            },
            SecurityClass::Unknown(index) => {
                tracing::debug!(target: "cellguard::gate", "unrecognised security index {}; denying", index);
                None
            }
        };

        match &granted {
            Some(id) => tracing::debug!(target: "cellguard::gate", class = class.as_str(), "super-user granted to '{}'", id),
            None => tracing::debug!(target: "cellguard::gate", class = class.as_str(), "super-user denied"),
        }
        granted
    }

    pub fn is_superuser<C: CallSecurity + ?Sized>(&self, call: &C) -> bool {
        self.super_identity(call).is_some()
    }

    /// Ticket principal check, exposed for callers that already hold the
    /// ticket fields.
    pub fn is_legacy_superuser(&self, name: &str, instance: &str, realm: &str) -> Option<Identity> {
        matcher::legacy_superuser(&self.userlist, self.realms.as_ref(), name, instance, realm)
    }

    /// 0 for super-users, [`PERMISSION_DENIED_CODE`] otherwise.
    pub fn check_auth<C: CallSecurity + ?Sized>(&self, call: &C) -> i32 {
        if self.is_superuser(call) { 0 } else { PERMISSION_DENIED_CODE }
    }

    /// Printable name of the super-user behind `call`, in the form older
    /// interfaces expect: extended identities are prefixed with `eName: `.
    pub fn super_user_name<C: CallSecurity + ?Sized>(&self, call: &C) -> Option<String> {
        let id = self.super_identity(call)?;
        let name = match &id {
            Identity::Extended { display_name, .. } => format!("eName: {}", display_name),
            other => other.display_name().to_string(),
        };
        Some(truncate_on_char_boundary(name, LEGACY_NAME_MAX))
    }

    pub fn check_restricted_query<C: CallSecurity + ?Sized>(&self, call: &C, level: RestrictedQuery) -> bool {
        match level {
            RestrictedQuery::AnyUser => true,
            RestrictedQuery::Admin => self.is_superuser(call),
        }
    }
}

fn truncate_on_char_boundary(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_utf8() {
        assert_eq!(truncate_on_char_boundary("abc".into(), 5), "abc");
        assert_eq!(truncate_on_char_boundary("abcdef".into(), 3), "abc");
        // 'é' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_on_char_boundary("aéb".into(), 2), "a");
    }
}
