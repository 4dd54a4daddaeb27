//! Save records for production orders and binary snapshots of a base.
//!
//! [`ProductionRecord`] is the per-order save format (camelCase keys, JSON or
//! RON). [`Base::serialize`] packs a whole base, its orders, and the
//! campaign into a `bitcode` blob behind a versioned header.

use crate::base::{Base, BaseLedger};
use crate::campaign::Campaign;
use crate::production::Production;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Amount written by old saves for "produce forever and sell".
pub const LEGACY_INFINITE_AMOUNT: u32 = i32::MAX as u32;

/// Amount such orders are migrated to.
pub const LEGACY_DEFAULT_AMOUNT: u32 = 999;

/// Magic number identifying a Foundry base snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xF0D2_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors restoring a production order from a save record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unknown manufacture rule '{0}'")]
    UnknownManufacture(String),
    #[error("production of '{0}' has a zero amount")]
    InvalidAmount(String),
    #[error("failed to parse production record: {0}")]
    Parse(String),
    #[error("failed to write production record: {0}")]
    Write(String),
}

/// Errors encoding or decoding a base snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("snapshot order {index}: {source}")]
    Production {
        index: usize,
        #[source]
        source: LoadError,
    },
}

// ---------------------------------------------------------------------------
// Production record
// ---------------------------------------------------------------------------

fn is_false(v: &bool) -> bool {
    !*v
}

fn default_amount() -> u32 {
    1
}

/// The saved form of one production order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    /// Manufacture rule name.
    pub item: String,
    #[serde(default)]
    pub assigned: u32,
    #[serde(default)]
    pub spent: u32,
    #[serde(default = "default_amount")]
    pub amount: u32,
    #[serde(default)]
    pub infinite: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_production_info: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub awaiting_start: bool,
}

impl ProductionRecord {
    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::Write(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self, LoadError> {
        serde_json::from_str(s).map_err(|e| LoadError::Parse(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, LoadError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LoadError::Write(e.to_string()))
    }

    pub fn from_ron(s: &str) -> Result<Self, LoadError> {
        ron::from_str(s).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

impl Production {
    /// Snapshot this order as a save record. The reward tally is written
    /// only for rules with a random-reward table.
    pub fn save(&self) -> ProductionRecord {
        ProductionRecord {
            item: self.rules().name.clone(),
            assigned: self.assigned_engineers(),
            spent: self.time_spent(),
            amount: self.amount_total(),
            infinite: self.infinite_amount(),
            sell: self.sell_items(),
            random_production_info: self
                .rules()
                .has_random_outputs()
                .then(|| self.random_production_info().clone()),
            awaiting_start: self.awaiting_start(),
        }
    }

    /// Rebuild an order from a save record.
    ///
    /// Old saves marked "produce forever and sell" with an amount of
    /// `i32::MAX`; those become infinite, selling orders of 999 units.
    pub fn load(record: &ProductionRecord, registry: &Registry) -> Result<Self, LoadError> {
        let rules = registry
            .manufacture_by_name(&record.item)
            .ok_or_else(|| LoadError::UnknownManufacture(record.item.clone()))?;
        if record.amount == 0 && !record.infinite {
            return Err(LoadError::InvalidAmount(record.item.clone()));
        }

        let mut production = Production::new(rules.clone(), record.amount);
        production.set_assigned_engineers(record.assigned);
        production.set_time_spent(record.spent);
        production.set_infinite_amount(record.infinite);
        production.set_sell_items(record.sell);
        production.set_awaiting_start(record.awaiting_start);
        if rules.has_random_outputs()
            && let Some(info) = &record.random_production_info
        {
            production.set_random_production_info(info.clone());
        }

        if record.amount == LEGACY_INFINITE_AMOUNT {
            log::debug!("migrating legacy infinite order of {}", record.item);
            production.set_amount_total(LEGACY_DEFAULT_AMOUNT);
            production.set_infinite_amount(true);
            production.set_sell_items(true);
        }
        Ok(production)
    }
}

// ---------------------------------------------------------------------------
// Base snapshot
// ---------------------------------------------------------------------------

/// Header prepended to every base snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Game hour the snapshot was taken at.
    pub hour: u64,
}

impl SnapshotHeader {
    pub fn new(hour: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            hour,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(SnapshotError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Binary form of a production order. Unlike [`ProductionRecord`] every
/// field is always present, since bitcode cannot skip fields.
#[derive(Debug, Serialize, Deserialize)]
struct ProductionSnapshot {
    item: String,
    assigned: u32,
    spent: u32,
    amount: u32,
    infinite: bool,
    sell: bool,
    awaiting_start: bool,
    random_production_info: BTreeMap<String, u32>,
}

impl From<&Production> for ProductionSnapshot {
    fn from(p: &Production) -> Self {
        Self {
            item: p.rules().name.clone(),
            assigned: p.assigned_engineers(),
            spent: p.time_spent(),
            amount: p.amount_total(),
            infinite: p.infinite_amount(),
            sell: p.sell_items(),
            awaiting_start: p.awaiting_start(),
            random_production_info: p.random_production_info().clone(),
        }
    }
}

impl From<ProductionSnapshot> for ProductionRecord {
    fn from(s: ProductionSnapshot) -> Self {
        Self {
            item: s.item,
            assigned: s.assigned,
            spent: s.spent,
            amount: s.amount,
            infinite: s.infinite,
            sell: s.sell,
            random_production_info: Some(s.random_production_info),
            awaiting_start: s.awaiting_start,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BaseSnapshot {
    header: SnapshotHeader,
    name: String,
    ledger: BaseLedger,
    productions: Vec<ProductionSnapshot>,
    campaign: Campaign,
}

/// Read just the header of a snapshot. bitcode has no partial decoding, so
/// the whole payload is decoded.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, SnapshotError> {
    let snapshot: BaseSnapshot =
        bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

impl Base {
    /// Encode this base, its orders, and the campaign state.
    pub fn serialize(&self, campaign: &Campaign, hour: u64) -> Result<Vec<u8>, SnapshotError> {
        let snapshot = BaseSnapshot {
            header: SnapshotHeader::new(hour),
            name: self.name.clone(),
            ledger: self.ledger.clone(),
            productions: self.productions().iter().map(ProductionSnapshot::from).collect(),
            campaign: campaign.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode a snapshot written by [`Base::serialize`], resolving every
    /// order's rule against `registry`.
    pub fn deserialize(data: &[u8], registry: &Registry) -> Result<(Base, Campaign), SnapshotError> {
        let snapshot: BaseSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let mut base = Base::new(snapshot.name, snapshot.ledger);
        for (index, p) in snapshot.productions.into_iter().enumerate() {
            let production = Production::load(&p.into(), registry)
                .map_err(|source| SnapshotError::Production { index, source })?;
            base.add_production(production);
        }
        Ok((base, snapshot.campaign))
    }
}
