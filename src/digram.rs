use crate::sequitur::Sequitur;
use crate::symbol::{is_body_end, is_body_start, SymbolHash};
use slotmap::DefaultKey;
use std::collections::hash_map::Entry;
use std::hash::Hash;

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Looks up a digram in the index, registering it when unseen.
    ///
    /// Returns `Some(first_of_match)` only for a genuine, non-overlapping
    /// earlier occurrence; `None` means the digram is now indexed at this
    /// location (or was skipped).
    pub(crate) fn find_and_add_digram(
        &mut self,
        first: DefaultKey,
        second: DefaultKey,
    ) -> Option<DefaultKey> {
        debug_assert_eq!(
            self.symbols[first].next,
            Some(second),
            "digram symbols must be adjacent"
        );

        // No digram forms across a body sentinel.
        if is_body_start(&self.symbols[first].symbol) || is_body_end(&self.symbols[second].symbol)
        {
            return None;
        }

        let first_hash = SymbolHash::from_symbol(&self.symbols[first].symbol);
        let second_hash = SymbolHash::from_symbol(&self.symbols[second].symbol);

        match self.digram_index.entry((first_hash, second_hash)) {
            Entry::Vacant(e) => {
                e.insert(first);
                None
            }
            Entry::Occupied(mut e) => {
                let other_first = *e.get();

                if other_first == first {
                    return None;
                }

                // The indexed node may have been removed by an earlier
                // rewrite; repoint the entry here.
                if !self.symbols.contains_key(other_first) {
                    e.insert(first);
                    return None;
                }

                let other_second = self.symbols[other_first]
                    .next
                    .expect("indexed digram lost its successor");

                // Overlap guard: adjacent repeats like "aaa" share a node
                // and must not spawn a rule.
                if other_second == first || other_first == second {
                    return None;
                }

                // Hashes collide in principle; confirm token equality.
                let symbols_equal = self.symbols[first]
                    .symbol
                    .equals(&self.symbols[other_first].symbol)
                    && self.symbols[second]
                        .symbol
                        .equals(&self.symbols[other_second].symbol);

                if symbols_equal {
                    Some(other_first)
                } else {
                    None
                }
            }
        }
    }

    /// Drops the digram starting at `first` from the index, but only when
    /// the index entry points at this exact location.
    pub(crate) fn unindex_digram(&mut self, first: DefaultKey) {
        if is_body_start(&self.symbols[first].symbol) {
            return;
        }

        let Some(second) = self.symbols[first].next else {
            return;
        };

        if is_body_end(&self.symbols[second].symbol) {
            return;
        }

        let first_hash = SymbolHash::from_symbol(&self.symbols[first].symbol);
        let second_hash = SymbolHash::from_symbol(&self.symbols[second].symbol);

        if let Entry::Occupied(e) = self.digram_index.entry((first_hash, second_hash)) {
            if *e.get() == first {
                e.remove();
            }
        }
    }
}
