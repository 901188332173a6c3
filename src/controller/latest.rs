//! Latest-request-wins bookkeeping.
//!
//! Every issued request gets a [`Ticket`]; only the ticket of the most recently
//! issued key may apply its response. Older responses are dropped on arrival,
//! which stands in for cancelling the in-flight request.

/// Proof that a request was issued for `key` at a given generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    generation: u64,
    key: K,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the most recently issued key
#[derive(Debug)]
pub struct LatestRequest<K> {
    generation: u64,
    current: Option<K>,
    pending: bool,
}

impl<K> Default for LatestRequest<K> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
            pending: false,
        }
    }
}

impl<K: Clone + PartialEq> LatestRequest<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a request for `key` unless it is already the current key
    pub fn issue(&mut self, key: K) -> Option<Ticket<K>> {
        if self.current.as_ref() == Some(&key) {
            return None;
        }
        Some(self.force_issue(key))
    }

    /// Issue a request even if `key` is unchanged (retry)
    pub fn force_issue(&mut self, key: K) -> Ticket<K> {
        self.generation += 1;
        self.current = Some(key.clone());
        self.pending = true;
        Ticket {
            generation: self.generation,
            key,
        }
    }

    /// Mark the current key as satisfied without a request (cache hit)
    pub fn satisfy(&mut self, key: K) {
        self.generation += 1;
        self.current = Some(key);
        self.pending = false;
    }

    /// Whether a response for `ticket` may still be applied
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        ticket.generation == self.generation
    }

    /// Consume a response: `true` if it belongs to the latest request
    pub fn complete(&mut self, ticket: &Ticket<K>) -> bool {
        if self.is_current(ticket) {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Latest request still awaiting its response
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn current_key(&self) -> Option<&K> {
        self.current.as_ref()
    }
}
