use crate::sequitur::Sequitur;
use crate::symbol::Symbol;
use slotmap::DefaultKey;
use std::hash::Hash;

/// Iterator reconstructing the original input from the live induction
/// grammar, descending into rules depth-first.
pub struct SequiturIter<'a, T> {
    sequitur: &'a Sequitur<T>,
    current: Option<DefaultKey>,
    stack: Vec<DefaultKey>,
}

impl<'a, T: Hash + Eq + Clone> SequiturIter<'a, T> {
    pub(crate) fn new(sequitur: &'a Sequitur<T>) -> Self {
        let rule_0_head = *sequitur.rules().get(&0).expect("rule 0 must exist");
        let start = sequitur.symbols[rule_0_head]
            .next
            .expect("rule 0 head links forward");

        let mut stack = Vec::new();
        let current = Self::resolve_forward(sequitur, start, &mut stack);

        Self {
            sequitur,
            current,
            stack,
        }
    }

    /// Walks forward to the next terminal, entering rule bodies and popping
    /// back out at their tails.
    fn resolve_forward(
        sequitur: &Sequitur<T>,
        key: DefaultKey,
        stack: &mut Vec<DefaultKey>,
    ) -> Option<DefaultKey> {
        match &sequitur.symbols[key].symbol {
            Symbol::Value(_) => Some(key),

            Symbol::RuleRef { rule_id } => {
                stack.push(key);
                let rule_head = *sequitur.rules().get(rule_id)?;
                let rule_first = sequitur.symbols[rule_head].next?;
                Self::resolve_forward(sequitur, rule_first, stack)
            }

            Symbol::RuleHead { .. } => {
                let next = sequitur.symbols[key].next?;
                Self::resolve_forward(sequitur, next, stack)
            }

            Symbol::RuleTail => {
                if let Some(parent) = stack.pop() {
                    let next = sequitur.symbols[parent].next?;
                    Self::resolve_forward(sequitur, next, stack)
                } else {
                    None
                }
            }
        }
    }
}

impl<'a, T: Hash + Eq + Clone> Iterator for SequiturIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let current_key = self.current?;

        let value = match &self.sequitur.symbols[current_key].symbol {
            Symbol::Value(v) => v,
            _ => unreachable!("resolve_forward only stops at terminals"),
        };

        let next_key = self.sequitur.symbols[current_key].next?;
        self.current = Self::resolve_forward(self.sequitur, next_key, &mut self.stack);

        Some(value)
    }
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Iterates over the reconstructed input sequence.
    pub fn iter(&self) -> SequiturIter<'_, T> {
        SequiturIter::new(self)
    }
}

impl<'a, T: Hash + Eq + Clone> IntoIterator for &'a Sequitur<T> {
    type Item = &'a T;
    type IntoIter = SequiturIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
