use tracing::warn;

use crate::models::Mess;

/// In-memory collection of mess listings for the lifetime of a client
/// session. The backend stays the owner of record; this store only
/// mirrors what the server last returned, so every write is a wholesale
/// replacement of a listing or of the whole set.
#[derive(Debug, Default)]
pub struct ListingStore {
    messes: Vec<Mess>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messes(&self) -> &[Mess] {
        &self.messes
    }

    pub fn get(&self, id: &str) -> Option<&Mess> {
        self.messes.iter().find(|mess| mess.id == id)
    }

    pub fn len(&self) -> usize {
        self.messes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messes.is_empty()
    }

    /// Replace the whole collection with a fresh fetch.
    pub fn replace_all(&mut self, messes: Vec<Mess>) {
        self.messes = messes;
    }

    /// Put a newly created listing at the front, the way the UI shows it.
    pub fn prepend(&mut self, mess: Mess) {
        self.messes.insert(0, mess);
    }

    /// Swap in the server's updated copy of a listing. Late responses win;
    /// an id we have never seen is logged and dropped, not inserted.
    pub fn apply_update(&mut self, updated: Mess) -> bool {
        match self.messes.iter_mut().find(|mess| mess.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => {
                warn!("Ignoring update for unknown mess {}", updated.id);
                false
            }
        }
    }
}
