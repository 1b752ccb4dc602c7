//! Graphic object registry
//!
//! DCS graphic payloads are stored once and shared between every cell that
//! shows them. Entries are keyed by exact payload equality and reference
//! counted; an entry is dropped as soon as its last cell lets go of it.
//! Cells and snapshots only ever hold a [`GraphicId`].

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::trace;

const FIRST_GRAPHIC_ID: u32 = 1;

/// Lookup key for a tracked graphic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphicId(pub u32);

/// A stored graphic payload and the number of cells referencing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedGraphic {
    pub id: GraphicId,
    pub payload: String,
    pub ref_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct GraphicRegistry {
    entries: HashMap<GraphicId, TrackedGraphic>,
    /// Payload hash to the entries sharing it
    by_hash: HashMap<u64, Vec<GraphicId>>,
    next_id: u32,
}

fn payload_hash(payload: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    payload.hash(&mut hasher);
    hasher.finish()
}

impl GraphicRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_hash: HashMap::new(),
            next_id: FIRST_GRAPHIC_ID,
        }
    }

    fn alloc_id(&mut self) -> GraphicId {
        loop {
            let id = GraphicId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if id.0 != 0 && !self.entries.contains_key(&id) {
                return id;
            }
        }
    }

    /// Take a reference to `payload`, storing it if it is new
    pub fn intern(&mut self, payload: &str) -> GraphicId {
        if let Some(id) = self.find(payload) {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.ref_count += 1;
                trace!(id = id.0, refs = entry.ref_count, "graphic reused");
            }
            return id;
        }

        let id = self.alloc_id();
        self.entries.insert(
            id,
            TrackedGraphic {
                id,
                payload: payload.to_string(),
                ref_count: 1,
            },
        );
        self.by_hash.entry(payload_hash(payload)).or_default().push(id);
        trace!(id = id.0, bytes = payload.len(), "graphic stored");
        id
    }

    /// Drop one reference. Returns true when this removed the entry.
    pub fn release(&mut self, id: GraphicId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count > 0 {
            return false;
        }

        if let Some(entry) = self.entries.remove(&id) {
            let hash = payload_hash(&entry.payload);
            if let Some(ids) = self.by_hash.get_mut(&hash) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.by_hash.remove(&hash);
                }
            }
        }
        trace!(id = id.0, "graphic removed");
        true
    }

    /// The entry holding exactly this payload
    pub fn find(&self, payload: &str) -> Option<GraphicId> {
        self.by_hash
            .get(&payload_hash(payload))?
            .iter()
            .copied()
            .find(|id| {
                self.entries
                    .get(id)
                    .is_some_and(|entry| entry.payload == payload)
            })
    }

    pub fn get(&self, id: GraphicId) -> Option<&TrackedGraphic> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: GraphicId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
