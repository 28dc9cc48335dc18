//! Core induction rewrites.
//!
//! These methods restore the two induction invariants after every token:
//! when a digram repeats without overlap it is replaced at both locations by
//! a nonterminal (reusing an existing rule when the other occurrence spans
//! one exactly), and any rule whose reference count falls to one is inlined
//! back where it is used.

use crate::sequitur::Sequitur;
use crate::symbol::{is_body_end, is_body_start, Symbol, SymbolHash, SymbolNode};
use log::trace;
use slotmap::DefaultKey;
use std::hash::Hash;

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Examines the digram beginning at `first` and rewrites the grammar if
    /// it repeats elsewhere. Recurses into the new digrams each rewrite
    /// creates, so a single call may cascade.
    pub(crate) fn process(&mut self, first: DefaultKey) {
        let Some(second) = self.symbols[first].next else {
            return;
        };
        if is_body_start(&self.symbols[first].symbol) || is_body_end(&self.symbols[second].symbol)
        {
            // No digram at a body edge.
            return;
        }

        if let Some(other) = self.find_and_add_digram(first, second) {
            if let Some(rule_head) = self.complete_rule(other) {
                // The other occurrence is exactly an existing rule's body.
                let nonterm = self.substitute(first, rule_head);
                self.recheck(nonterm);
            } else {
                let (loc1, loc2) = self.rule_swap(first, other);
                self.recheck_pair(loc1, loc2);
            }
        }
    }

    /// Checks whether the digram at `first` spans an entire rule body, i.e.
    /// is bracketed by a matching RuleHead/RuleTail pair.
    pub(crate) fn complete_rule(&self, first: DefaultKey) -> Option<DefaultKey> {
        let second = self.symbols[first].next?;

        let prev = self.symbols[first].prev?;
        if !matches!(self.symbols[prev].symbol, Symbol::RuleHead { .. }) {
            return None;
        }

        let after_second = self.symbols[second].next?;
        if !matches!(self.symbols[after_second].symbol, Symbol::RuleTail) {
            return None;
        }

        if let Symbol::RuleHead { tail, .. } = self.symbols[prev].symbol {
            if tail == after_second {
                return Some(prev);
            }
        }

        None
    }

    /// Creates a new rule from a repeated digram and substitutes a
    /// nonterminal at both occurrences.
    ///
    /// The rule body gets fresh copies of the two symbols, and the digram
    /// index is repointed at the rule's copy, so later repeats resolve to
    /// the rule directly.
    pub(crate) fn rule_swap(
        &mut self,
        match1: DefaultKey,
        match2: DefaultKey,
    ) -> (DefaultKey, DefaultKey) {
        debug_assert_ne!(match1, match2, "occurrences must be distinct");

        let match1_second = self.symbols[match1]
            .next
            .expect("digram start lost its successor");

        let first_symbol = self.symbols[match1].symbol.clone_symbol();
        let second_symbol = self.symbols[match1_second].symbol.clone_symbol();

        let rule_id = self.id_gen.get();
        trace!("new rule {rule_id} from repeated digram");

        let tail_key = self.symbols.insert(SymbolNode::new(Symbol::RuleTail));
        let head_key = self.symbols.insert(SymbolNode::new(Symbol::RuleHead {
            rule_id,
            count: 0,
            tail: tail_key,
        }));

        let rule_first = self.symbols.insert(SymbolNode::new(first_symbol));
        let rule_second = self.symbols.insert(SymbolNode::new(second_symbol));

        // head -> first -> second -> tail
        self.symbols[head_key].next = Some(rule_first);
        self.symbols[rule_first].prev = Some(head_key);
        self.symbols[rule_first].next = Some(rule_second);
        self.symbols[rule_second].prev = Some(rule_first);
        self.symbols[rule_second].next = Some(tail_key);
        self.symbols[tail_key].prev = Some(rule_second);

        self.unindex_digram(match1);
        self.unindex_digram(match2);

        let first_hash = SymbolHash::from_symbol(&self.symbols[rule_first].symbol);
        let second_hash = SymbolHash::from_symbol(&self.symbols[rule_second].symbol);
        self.digram_index
            .insert((first_hash, second_hash), rule_first);

        self.rule_index.insert(rule_id, head_key);

        // The copied symbols may themselves reference rules.
        self.bump_if_rule_ref(rule_first);
        self.bump_if_rule_ref(rule_second);

        let loc1 = self.substitute(match1, head_key);
        let loc2 = self.substitute(match2, head_key);

        (loc1, loc2)
    }

    /// Replaces the digram at `first` with a single nonterminal referencing
    /// the rule at `rule_head`. Returns the inserted node.
    pub(crate) fn substitute(&mut self, first: DefaultKey, rule_head: DefaultKey) -> DefaultKey {
        let second = self.symbols[first]
            .next
            .expect("digram start lost its successor");

        debug_assert!(
            matches!(self.symbols[rule_head].symbol, Symbol::RuleHead { .. }),
            "substitution target must be a rule"
        );

        let before = self.symbols[first].prev;
        let after = self.symbols[second].next;

        // Isolate: the digrams touching the replaced pair die with it.
        if let Some(prev) = before {
            self.unindex_digram(prev);
        }
        self.unindex_digram(second);

        self.drop_if_rule_ref(first);
        self.drop_if_rule_ref(second);

        let rule_id = match self.symbols[rule_head].symbol {
            Symbol::RuleHead { rule_id, .. } => rule_id,
            _ => unreachable!(),
        };

        let nonterm = self
            .symbols
            .insert(SymbolNode::new(Symbol::RuleRef { rule_id }));

        self.symbols[nonterm].prev = before;
        self.symbols[nonterm].next = after;

        if let Some(prev) = before {
            self.symbols[prev].next = Some(nonterm);
        }
        if let Some(next) = after {
            self.symbols[next].prev = Some(nonterm);
        }

        self.bump_rule_count(rule_head);

        self.symbols.remove(first);
        self.symbols.remove(second);

        // Rule utility: a rule referenced from inside this rule's body may
        // have dropped to a single use.
        let rule_first = self.symbols[rule_head]
            .next
            .expect("rule body must be nonempty");
        let rule_second = self.symbols[rule_first]
            .next
            .expect("rule body must hold a digram");

        self.inline_single_use(rule_first);
        self.inline_single_use(rule_second);

        nonterm
    }

    /// Inlines the rule behind `node` when it is a nonterminal whose rule is
    /// referenced exactly once, splicing the body in place of the reference
    /// and deleting the rule.
    pub(crate) fn inline_single_use(&mut self, node: DefaultKey) {
        // An earlier cascade may already have consumed this node.
        if !self.symbols.contains_key(node) {
            return;
        }

        let Symbol::RuleRef { rule_id } = self.symbols[node].symbol else {
            return;
        };

        let Some(&rule_head) = self.rule_index.get(&rule_id) else {
            return;
        };

        let count = match self.symbols[rule_head].symbol {
            Symbol::RuleHead { count, .. } => count,
            _ => unreachable!(),
        };

        debug_assert!(count > 0, "live rule with zero references");

        if count != 1 {
            return;
        }

        trace!("inlining single-use rule {rule_id}");

        let rule_first = self.symbols[rule_head]
            .next
            .expect("rule body must be nonempty");
        let rule_tail = match self.symbols[rule_head].symbol {
            Symbol::RuleHead { tail, .. } => tail,
            _ => unreachable!(),
        };
        let rule_last = self.symbols[rule_tail]
            .prev
            .expect("rule body must be nonempty");

        let before = self.symbols[node].prev;
        let after = self.symbols[node].next;

        if let Some(prev) = before {
            self.unindex_digram(prev);
        }
        self.unindex_digram(node);

        self.rule_index.remove(&rule_id);
        self.id_gen.free(rule_id);

        // Detach the sentinels, then splice the body where the reference was.
        self.symbols.remove(rule_head);
        self.symbols.remove(rule_tail);

        self.symbols[rule_first].prev = before;
        self.symbols[rule_last].next = after;

        if let Some(prev) = before {
            self.symbols[prev].next = Some(rule_first);
        }
        if let Some(next) = after {
            self.symbols[next].prev = Some(rule_last);
        }

        self.symbols.remove(node);

        // The splice created a digram on each side of the old reference.
        if let Some(prev) = before {
            if !is_body_start(&self.symbols[prev].symbol) {
                self.process(prev);
            }
        }
        // That process call can cascade over the spliced body.
        if let Some(next) = after {
            if self.symbols.contains_key(next)
                && self.symbols.contains_key(rule_last)
                && !is_body_end(&self.symbols[next].symbol)
            {
                self.process(rule_last);
            }
        }
    }

    /// Re-examines the digrams on either side of a freshly inserted
    /// nonterminal; each can itself be a repeat.
    pub(crate) fn recheck(&mut self, node: DefaultKey) {
        if !self.symbols.contains_key(node) {
            return;
        }

        if let Some(prev) = self.symbols[node].prev {
            if !is_body_start(&self.symbols[prev].symbol) {
                self.process(prev);
            }
        }

        // The cascade above may have consumed the node.
        if !self.symbols.contains_key(node) {
            return;
        }

        if let Some(next) = self.symbols[node].next {
            if !is_body_end(&self.symbols[next].symbol)
                && !is_body_start(&self.symbols[node].symbol)
            {
                self.process(node);
            }
        }
    }

    /// Boundary re-examination after a rule swap inserted two nonterminals.
    pub(crate) fn recheck_pair(&mut self, loc1: DefaultKey, loc2: DefaultKey) {
        if self.symbols.contains_key(loc1) {
            if let Some(next) = self.symbols[loc1].next {
                if !is_body_end(&self.symbols[next].symbol) {
                    self.process(loc1);
                }
            }
        }

        if self.symbols.contains_key(loc2) {
            if let Some(next) = self.symbols[loc2].next {
                if !is_body_end(&self.symbols[next].symbol) {
                    self.process(loc2);
                }
            }
        }

        if self.symbols.contains_key(loc2) {
            if let Some(prev) = self.symbols[loc2].prev {
                if prev != loc1 && !is_body_start(&self.symbols[prev].symbol) {
                    self.process(prev);
                }
            }
        }

        if self.symbols.contains_key(loc1) {
            if let Some(prev) = self.symbols[loc1].prev {
                if prev != loc2 && !is_body_start(&self.symbols[prev].symbol) {
                    self.process(prev);
                }
            }
        }
    }

    #[inline]
    fn bump_if_rule_ref(&mut self, key: DefaultKey) {
        if let Symbol::RuleRef { rule_id } = self.symbols[key].symbol {
            if let Some(&head_key) = self.rule_index.get(&rule_id) {
                self.bump_rule_count(head_key);
            }
        }
    }

    #[inline]
    fn drop_if_rule_ref(&mut self, key: DefaultKey) {
        if let Symbol::RuleRef { rule_id } = self.symbols[key].symbol {
            if let Some(&head_key) = self.rule_index.get(&rule_id) {
                self.drop_rule_count(head_key);
            }
        }
    }

    #[inline]
    fn bump_rule_count(&mut self, head_key: DefaultKey) {
        if let Symbol::RuleHead { count, .. } = &mut self.symbols[head_key].symbol {
            *count += 1;
        }
    }

    #[inline]
    fn drop_rule_count(&mut self, head_key: DefaultKey) {
        if let Symbol::RuleHead { count, .. } = &mut self.symbols[head_key].symbol {
            debug_assert!(*count > 0, "reference count underflow");
            *count -= 1;
        }
    }
}
