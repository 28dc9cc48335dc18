use slotmap::DefaultKey;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Symbol kinds in the induction arena.
///
/// Rule bodies are doubly linked lists of these, bracketed by a
/// `RuleHead`/`RuleTail` sentinel pair so splice logic never has to
/// special-case list edges.
#[derive(Debug, Clone)]
pub(crate) enum Symbol<T> {
    /// A terminal symbol holding one input token.
    Value(T),

    /// A nonterminal: a reference to another rule by id.
    RuleRef { rule_id: u32 },

    /// Sentinel opening a rule body. Carries the rule's reference count
    /// and a link to its closing sentinel.
    RuleHead {
        rule_id: u32,
        count: u32,
        tail: DefaultKey,
    },

    /// Sentinel closing a rule body.
    RuleTail,
}

/// A node in the linked symbol graph.
#[derive(Debug)]
pub(crate) struct SymbolNode<T> {
    pub symbol: Symbol<T>,
    pub prev: Option<DefaultKey>,
    pub next: Option<DefaultKey>,
}

impl<T> SymbolNode<T> {
    pub(crate) fn new(symbol: Symbol<T>) -> Self {
        Self {
            symbol,
            prev: None,
            next: None,
        }
    }
}

/// Compact hash of a symbol, used in digram index keys.
///
/// A 64-bit hash instead of the full symbol keeps the key `Copy` and the
/// index cheap; lookups re-verify equality to catch collisions.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub(crate) struct SymbolHash(u64);

impl SymbolHash {
    pub(crate) fn from_symbol<T: Hash>(symbol: &Symbol<T>) -> Self {
        let mut hasher = DefaultHasher::new();
        match symbol {
            Symbol::Value(v) => {
                0u8.hash(&mut hasher);
                v.hash(&mut hasher);
            }
            Symbol::RuleRef { rule_id } => {
                1u8.hash(&mut hasher);
                rule_id.hash(&mut hasher);
            }
            Symbol::RuleHead { rule_id, .. } => {
                2u8.hash(&mut hasher);
                rule_id.hash(&mut hasher);
            }
            Symbol::RuleTail => {
                3u8.hash(&mut hasher);
            }
        }
        SymbolHash(hasher.finish())
    }
}

impl<T: Clone> Symbol<T> {
    /// Clones the symbol's payload without any list linkage.
    pub(crate) fn clone_symbol(&self) -> Symbol<T> {
        match self {
            Symbol::Value(v) => Symbol::Value(v.clone()),
            Symbol::RuleRef { rule_id } => Symbol::RuleRef { rule_id: *rule_id },
            Symbol::RuleHead {
                rule_id,
                count,
                tail,
            } => Symbol::RuleHead {
                rule_id: *rule_id,
                count: *count,
                tail: *tail,
            },
            Symbol::RuleTail => Symbol::RuleTail,
        }
    }
}

impl<T: PartialEq> Symbol<T> {
    /// Token-level equality, used to re-verify digram index hits.
    pub(crate) fn equals(&self, other: &Symbol<T>) -> bool {
        match (self, other) {
            (Symbol::Value(a), Symbol::Value(b)) => a == b,
            (Symbol::RuleRef { rule_id: a }, Symbol::RuleRef { rule_id: b }) => a == b,
            (Symbol::RuleHead { rule_id: a, .. }, Symbol::RuleHead { rule_id: b, .. }) => a == b,
            (Symbol::RuleTail, Symbol::RuleTail) => true,
            _ => false,
        }
    }
}

/// True for the sentinel that opens a rule body.
#[inline(always)]
pub(crate) fn is_body_start<T>(symbol: &Symbol<T>) -> bool {
    matches!(symbol, Symbol::RuleHead { .. })
}

/// True for the sentinel that closes a rule body.
#[inline(always)]
pub(crate) fn is_body_end<T>(symbol: &Symbol<T>) -> bool {
    matches!(symbol, Symbol::RuleTail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_per_token() {
        let sym1 = Symbol::Value('a');
        let sym2 = Symbol::Value('a');
        let sym3 = Symbol::Value('b');

        assert_eq!(
            SymbolHash::from_symbol(&sym1),
            SymbolHash::from_symbol(&sym2)
        );
        assert_ne!(
            SymbolHash::from_symbol(&sym1),
            SymbolHash::from_symbol(&sym3)
        );
    }

    #[test]
    fn rule_refs_hash_by_id() {
        let rule1 = Symbol::<()>::RuleRef { rule_id: 1 };
        let rule2 = Symbol::<()>::RuleRef { rule_id: 1 };
        let rule3 = Symbol::<()>::RuleRef { rule_id: 2 };

        assert_eq!(
            SymbolHash::from_symbol(&rule1),
            SymbolHash::from_symbol(&rule2)
        );
        assert_ne!(
            SymbolHash::from_symbol(&rule1),
            SymbolHash::from_symbol(&rule3)
        );
    }

    #[test]
    fn terminal_and_rule_ref_never_equal() {
        let term = Symbol::Value(42u32);
        let nonterm = Symbol::<u32>::RuleRef { rule_id: 42 };
        assert!(!term.equals(&nonterm));
    }

    #[test]
    fn fresh_node_is_unlinked() {
        let node = SymbolNode::new(Symbol::Value('x'));
        assert!(matches!(node.symbol, Symbol::Value('x')));
        assert_eq!(node.prev, None);
        assert_eq!(node.next, None);
    }
}
