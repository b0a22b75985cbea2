//! Price board state container — app-owned, crate-provided update logic.

use super::wire::AssetPriceUpdate;
use super::{AssetPrice, ChangeMode};
use crate::shared::AssetId;
use std::collections::HashMap;

/// Records touched by one applied batch, with the generation each was
/// stamped with.
///
/// Hand it back to [`PriceBoard::expire_flash`] once the flash window has
/// elapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashTicket {
    entries: Vec<(AssetId, u64)>,
}

impl FlashTicket {
    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Latest price record per asset.
///
/// Records are inserted or overwritten by id and never removed.
#[derive(Debug, Clone, Default)]
pub struct PriceBoard {
    records: HashMap<AssetId, AssetPrice>,
    mode: ChangeMode,
    generation: u64,
}

impl PriceBoard {
    pub fn new(mode: ChangeMode) -> Self {
        Self {
            records: HashMap::new(),
            mode,
            generation: 0,
        }
    }

    pub fn mode(&self) -> ChangeMode {
        self.mode
    }

    /// Merge a batch into the board.
    ///
    /// Every record in the batch is marked updated and gets a fresh generation.
    /// The returned ticket expires exactly those marks.
    pub fn apply_batch(&mut self, batch: Vec<AssetPriceUpdate>) -> FlashTicket {
        let mut ticket = FlashTicket {
            entries: Vec::with_capacity(batch.len()),
        };

        for update in batch {
            self.generation += 1;
            let previous = self.records.get(&update.id);
            let record = AssetPrice::from_update(update, previous, self.mode, self.generation);
            ticket.entries.push((record.id.clone(), record.generation));
            self.records.insert(record.id.clone(), record);
        }

        tracing::debug!(
            touched = ticket.len(),
            total = self.records.len(),
            "Applied price batch"
        );
        ticket
    }

    /// Clear the transient flags set by the batch behind `ticket`.
    ///
    /// A record re-touched by a later batch keeps its flags. Returns how many
    /// records were settled.
    pub fn expire_flash(&mut self, ticket: &FlashTicket) -> usize {
        let mut settled = 0;
        for (id, generation) in &ticket.entries {
            if let Some(record) = self.records.get_mut(id) {
                if record.generation == *generation {
                    record.settle();
                    settled += 1;
                }
            }
        }
        settled
    }

    pub fn get(&self, id: &AssetId) -> Option<&AssetPrice> {
        self.records.get(id)
    }

    /// All records in arbitrary order.
    pub fn records(&self) -> impl Iterator<Item = &AssetPrice> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
