use crate::cfg::{Cfg, CfgSymbol};
use crate::error::Error;
use crate::id_gen::IdGenerator;
use crate::symbol::{is_body_start, Symbol, SymbolHash, SymbolNode};
use ahash::AHashMap as HashMap;
use indexmap::IndexMap;
use slotmap::{DefaultKey, SlotMap};
use std::hash::Hash;

/// Online grammar induction engine.
///
/// Consumes input one token at a time and maintains a grammar that satisfies
/// two invariants at every stable point:
/// 1. Digram uniqueness: no pair of adjacent symbols occurs twice without
///    overlapping.
/// 2. Rule utility: every rule except rule 0 (the live input sequence) is
///    referenced at least twice.
///
/// Call [`Sequitur::into_cfg`] when the input is exhausted to obtain the
/// finalized, queryable [`Cfg`].
pub struct Sequitur<T> {
    /// Arena of linked symbol nodes; every rule body lives here.
    pub(crate) symbols: SlotMap<DefaultKey, SymbolNode<T>>,

    /// Digram value -> first node of its unique indexed occurrence.
    pub(crate) digram_index: HashMap<(SymbolHash, SymbolHash), DefaultKey>,

    /// Rule id -> RuleHead sentinel.
    pub(crate) rule_index: HashMap<u32, DefaultKey>,

    pub(crate) id_gen: IdGenerator,

    /// RuleTail of rule 0, where fresh input is appended.
    pub(crate) sequence_end: DefaultKey,

    length: usize,
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Creates an empty engine holding only rule 0, the start rule.
    pub fn new() -> Self {
        let mut symbols = SlotMap::new();
        let mut id_gen = IdGenerator::new();

        let rule_id = id_gen.get();
        debug_assert_eq!(rule_id, 0, "the start rule must get id 0");

        let tail_key = symbols.insert(SymbolNode::new(Symbol::RuleTail));
        let head_key = symbols.insert(SymbolNode::new(Symbol::RuleHead {
            rule_id,
            count: 0,
            tail: tail_key,
        }));

        symbols[head_key].next = Some(tail_key);
        symbols[tail_key].prev = Some(head_key);

        let mut rule_index = HashMap::default();
        rule_index.insert(rule_id, head_key);

        Self {
            symbols,
            digram_index: HashMap::default(),
            rule_index,
            id_gen,
            sequence_end: tail_key,
            length: 0,
        }
    }

    /// Appends one token and restores the grammar invariants.
    pub fn push(&mut self, value: T) {
        let new_key = self.symbols.insert(SymbolNode::new(Symbol::Value(value)));

        // Link in just before rule 0's tail sentinel.
        let tail_key = self.sequence_end;
        let prev_key = self.symbols[tail_key].prev;

        self.symbols[new_key].next = Some(tail_key);
        self.symbols[new_key].prev = prev_key;
        self.symbols[tail_key].prev = Some(new_key);

        if let Some(prev) = prev_key {
            self.symbols[prev].next = Some(new_key);
        }

        self.length += 1;

        // The new node's predecessor is the left half of the only new digram.
        if self.length > 1 {
            if let Some(prev) = prev_key {
                if !is_body_start(&self.symbols[prev].symbol) {
                    self.process(prev);
                }
            }
        }
    }

    /// Feeds a whole sequence of tokens.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }

    /// Number of input tokens consumed so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Rule id -> RuleHead key for every live rule.
    pub(crate) fn rules(&self) -> &HashMap<u32, DefaultKey> {
        &self.rule_index
    }

    /// Number of live rules, including rule 0.
    pub fn rule_count(&self) -> usize {
        self.rule_index.len()
    }

    /// Snapshot of grammar size versus input size.
    pub fn stats(&self) -> CompressionStats {
        let mut total_symbols = 0;

        for &head_key in self.rule_index.values() {
            let mut current = self.symbols[head_key].next;
            while let Some(key) = current {
                if matches!(self.symbols[key].symbol, Symbol::RuleTail) {
                    break;
                }
                total_symbols += 1;
                current = self.symbols[key].next;
            }
        }

        CompressionStats {
            input_length: self.length,
            grammar_symbols: total_symbols,
            num_rules: self.rule_index.len(),
        }
    }

    /// Finalizes induction, discarding the live arena and producing the
    /// queryable grammar.
    ///
    /// Rules keep their induction ids; rule 0 becomes the start symbol.
    /// Fails on empty input, since a grammar needs at least one terminal.
    pub fn into_cfg(self) -> Result<Cfg<T>, Error> {
        if self.length == 0 {
            return Err(Error::EmptyInput);
        }

        // Materialize rules in ascending id order so the finalized table is
        // deterministic regardless of hash-map iteration.
        let mut ids: Vec<u32> = self.rule_index.keys().copied().collect();
        ids.sort_unstable();

        let mut rules = IndexMap::new();
        for id in ids {
            let head = self.rule_index[&id];
            let mut body = Vec::new();
            let mut current = self.symbols[head].next;
            while let Some(key) = current {
                match &self.symbols[key].symbol {
                    Symbol::Value(v) => body.push(CfgSymbol::Terminal(v.clone())),
                    Symbol::RuleRef { rule_id } => body.push(CfgSymbol::Nonterminal(*rule_id)),
                    Symbol::RuleTail => break,
                    Symbol::RuleHead { .. } => {
                        unreachable!("nested RuleHead inside a rule body")
                    }
                }
                current = self.symbols[key].next;
            }
            rules.insert(id, body);
        }

        Ok(Cfg::from_parts(0, rules))
    }
}

impl<T: Hash + Eq + Clone> Default for Sequitur<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Grammar size versus input size during or after induction.
#[derive(Debug, Clone, Copy)]
pub struct CompressionStats {
    /// Number of input tokens consumed.
    pub input_length: usize,
    /// Total symbols across all rule bodies.
    pub grammar_symbols: usize,
    /// Number of rules, including the start rule.
    pub num_rules: usize,
}

impl CompressionStats {
    /// Grammar symbols as a percentage of input length; lower is better.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_length == 0 {
            0.0
        } else {
            (self.grammar_symbols as f64 / self.input_length as f64) * 100.0
        }
    }
}
