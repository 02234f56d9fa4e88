//! Policy tag kinds shared by the preload and dynamic tables.

use serde::{Deserialize, Serialize};

/// Which kind of policy a lookup is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Upgrade to a secure transport.
    Upgrade,
    /// SPKI pin set.
    Spki,
    /// Trust-agility key in the given slot.
    TrustAgility(TrustAgilitySlot),
}

impl TagKind {
    /// All kinds, in table order.
    pub const ALL: [TagKind; 4] = [
        TagKind::Upgrade,
        TagKind::Spki,
        TagKind::TrustAgility(TrustAgilitySlot::Primary),
        TagKind::TrustAgility(TrustAgilitySlot::Secondary),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Upgrade => "upgrade",
            TagKind::Spki => "spki",
            TagKind::TrustAgility(TrustAgilitySlot::Primary) => "trust_agility_0",
            TagKind::TrustAgility(TrustAgilitySlot::Secondary) => "trust_agility_1",
        }
    }
}

/// The two trust-agility key slots a host may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustAgilitySlot {
    Primary,
    Secondary,
}

impl TrustAgilitySlot {
    /// Slot position (0 or 1).
    pub fn index(self) -> usize {
        match self {
            TrustAgilitySlot::Primary => 0,
            TrustAgilitySlot::Secondary => 1,
        }
    }
}
