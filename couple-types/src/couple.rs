//! Per-device pairing status.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of a pairing this device is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoupleRole {
    /// Not part of any pairing.
    #[default]
    None,
    /// Created the pairing and owns the invite code.
    Owner,
    /// Joined the pairing by redeeming the owner's code.
    Partner,
}

impl CoupleRole {
    /// Stable string form used in persisted state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Owner => "owner",
            Self::Partner => "partner",
        }
    }

    /// Returns true for `Owner` and `Partner`.
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Owner | Self::Partner)
    }

    /// The other side of the pairing. `None` has no counterpart.
    pub fn counterpart(&self) -> Option<Self> {
        match self {
            Self::Owner => Some(Self::Partner),
            Self::Partner => Some(Self::Owner),
            Self::None => None,
        }
    }
}

impl fmt::Display for CoupleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoupleRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "owner" => Ok(Self::Owner),
            "partner" => Ok(Self::Partner),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

/// Business-rule gate for whether sync is permitted.
///
/// Every pairing transition sets `Unlocked`; `Locked` is only reachable by
/// loading state written by an older build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entitlement {
    Locked,
    #[default]
    Unlocked,
}

impl Entitlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for Entitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entitlement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(Self::Locked),
            "unlocked" => Ok(Self::Unlocked),
            other => Err(Error::InvalidEntitlement(other.to_string())),
        }
    }
}

/// Coarse pairing status, keyed by `(role, paired)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingStatus {
    Unpaired,
    OwnerPaired,
    PartnerPaired,
}

/// Local record of this device's pairing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoupleState {
    pub role: CoupleRole,
    pub entitlement: Entitlement,
    pub paired: bool,
    /// Canonical `XXXX-XXXX` invite code. Present while paired.
    pub invite_code: Option<String>,
}

impl CoupleState {
    /// Returns true if the entitlement allows sync.
    pub fn is_unlocked(&self) -> bool {
        self.entitlement == Entitlement::Unlocked
    }

    /// Returns the invite code if it is present and not blank.
    pub fn active_code(&self) -> Option<&str> {
        self.invite_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }

    /// Returns the coarse status. A `paired` flag without a member role
    /// counts as unpaired.
    pub fn status(&self) -> PairingStatus {
        match (self.role, self.paired) {
            (CoupleRole::Owner, true) => PairingStatus::OwnerPaired,
            (CoupleRole::Partner, true) => PairingStatus::PartnerPaired,
            _ => PairingStatus::Unpaired,
        }
    }

    /// Returns true when the state allows a remote read or write:
    /// unlocked, paired, a member role and a non-empty code.
    pub fn can_sync(&self) -> bool {
        self.is_unlocked() && self.paired && self.role.is_member() && self.active_code().is_some()
    }
}
