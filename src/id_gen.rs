/// Rule-id allocator for the induction arena.
///
/// Ids freed when a rule is inlined away are handed out again, keeping the
/// id space dense over long inputs.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    next: u32,
    freed: Vec<u32>,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            next: 0,
            freed: Vec::new(),
        }
    }

    /// Allocates an id, reusing a freed one if available.
    pub(crate) fn get(&mut self) -> u32 {
        if let Some(id) = self.freed.pop() {
            id
        } else {
            let id = self.next;
            self.next += 1;
            id
        }
    }

    /// Returns an id to the pool.
    pub(crate) fn free(&mut self, id: u32) {
        debug_assert!(id < self.next, "freed an id that was never allocated");
        self.freed.push(id);
    }
}
