use crate::soldier::Soldier;
use serde::{Deserialize, Serialize};

/// Hours a person produced by manufacture spends in transit to the base.
pub const SPAWNED_PERSON_TRANSFER_HOURS: u32 = 24;

/// What a transfer delivers on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPayload {
    Scientists(u32),
    Engineers(u32),
    Soldier(Soldier),
}

impl TransferPayload {
    /// Living quarters the payload occupies once delivered.
    pub fn personnel(&self) -> u32 {
        match self {
            TransferPayload::Scientists(n) | TransferPayload::Engineers(n) => *n,
            TransferPayload::Soldier(_) => 1,
        }
    }
}

/// A delayed delivery to a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub hours: u32,
    pub payload: TransferPayload,
}

impl Transfer {
    pub fn new(hours: u32, payload: TransferPayload) -> Self {
        Self { hours, payload }
    }

    /// Count down by `hours`. Returns `true` once the transfer has arrived.
    pub fn advance(&mut self, hours: u32) -> bool {
        self.hours = self.hours.saturating_sub(hours);
        self.hours == 0
    }
}
