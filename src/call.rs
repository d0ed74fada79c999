//! What the gate needs to know about an inbound RPC call. The transport owns
//! the call; it exposes the negotiated security class and, depending on the
//! class, either ticket fields or a ready-made identity.

use std::time::SystemTime;

use crate::error::ExtractionError;
use crate::identity::Identity;

/// Negotiated security mechanism of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityClass {
    Unauthenticated,
    /// Deprecated password-based tokens; no longer honoured.
    LegacyPasswordBased,
    /// Kerberos-style tickets carrying name, instance and realm.
    TicketBased,
    /// Modern tokens carrying a full identity.
    TokenBased,
    Unknown(u32),
}

impl SecurityClass {
    /// Map a transport security index to a class.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => SecurityClass::Unauthenticated,
            1 => SecurityClass::LegacyPasswordBased,
            2 => SecurityClass::TicketBased,
            4 => SecurityClass::TokenBased,
            other => SecurityClass::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityClass::Unauthenticated => "null",
            SecurityClass::LegacyPasswordBased => "vab",
            SecurityClass::TicketBased => "kad",
            SecurityClass::TokenBased => "gk",
            SecurityClass::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketInfo {
    pub name: String,
    pub instance: String,
    pub realm: String,
    pub expires_at: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub identity: Identity,
    pub expires_at: Option<SystemTime>,
}

pub trait CallSecurity {
    fn security_class(&self) -> SecurityClass;
    fn ticket_info(&self) -> Result<TicketInfo, ExtractionError>;
    fn token_info(&self) -> Result<TokenInfo, ExtractionError>;
}
