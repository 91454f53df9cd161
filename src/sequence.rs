//! The rolling Sparkplug B message sequence number.

use crate::store::KeyValueStore;
use serde_json::Value;

/// State key holding the last sequence number handed out.
pub const SEQ_KEY: &str = "seq";

/// Sequence counter shared by every device behind one edge node.
///
/// Each BIRTH or DATA payload consumes the next value; after 255 the counter
/// wraps to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    last: Option<u8>,
}

impl SequenceCounter {
    /// A counter whose first value will be 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter that continues after `last`.
    pub fn starting_after(last: u8) -> Self {
        Self { last: Some(last) }
    }

    /// Loads the counter from flow state.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let last = match store.get(SEQ_KEY) {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_u64().and_then(|v| u8::try_from(v).ok()) {
                Some(seq) => Some(seq),
                None => {
                    log::warn!("discarding invalid stored sequence number {}", value);
                    None
                }
            },
        };
        Self { last }
    }

    /// Persists the last value handed out. A counter that never advanced
    /// leaves the store untouched.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        if let Some(last) = self.last {
            store.set(SEQ_KEY, Value::from(last));
        }
    }

    /// Increments the counter and returns the new value.
    pub fn advance(&mut self) -> u8 {
        let seq = self.last.map_or(0, |last| last.wrapping_add(1));
        self.last = Some(seq);
        seq
    }

    /// The last value handed out, if any.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_starts_at_zero() {
        let mut seq = SequenceCounter::new();
        assert_eq!(seq.advance(), 0);
        assert_eq!(seq.advance(), 1);
    }

    #[test]
    fn test_wraps_after_255() {
        let mut seq = SequenceCounter::starting_after(254);
        assert_eq!(seq.advance(), 255);
        assert_eq!(seq.advance(), 0);
    }

    #[test]
    fn test_persists_across_loads() {
        let mut store = MemoryStore::new();
        let mut seq = SequenceCounter::load(&store);
        seq.advance();
        seq.advance();
        seq.save(&mut store);

        let mut reloaded = SequenceCounter::load(&store);
        assert_eq!(reloaded.advance(), 2);
    }

    #[test]
    fn test_invalid_stored_value_restarts() {
        let mut store = MemoryStore::new();
        store.set(SEQ_KEY, Value::from(1000));
        assert_eq!(SequenceCounter::load(&store).last(), None);
    }
}
