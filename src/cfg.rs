use ahash::AHashMap as HashMap;
use indexmap::IndexMap;
use std::fmt;

/// A symbol in a finalized rule body.
///
/// Nonterminals are names into the owning [`Cfg`]'s rule table, never
/// pointers, so the grammar graph has a single owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CfgSymbol<T> {
    Terminal(T),
    Nonterminal(u32),
}

impl<T> CfgSymbol<T> {
    /// The referenced rule name, if this is a nonterminal.
    pub fn as_nonterminal(&self) -> Option<u32> {
        match self {
            CfgSymbol::Nonterminal(name) => Some(*name),
            CfgSymbol::Terminal(_) => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for CfgSymbol<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgSymbol::Terminal(t) => write!(f, "{t}"),
            // Reserved bracket syntax keeps printed bodies unambiguous.
            CfgSymbol::Nonterminal(name) => write!(f, "~[{name}]"),
        }
    }
}

/// A finalized context-free grammar: rule name -> body, plus a start name
/// and a memoized expansion cache.
///
/// The rule table preserves insertion order; together with monotone rule
/// naming this makes every scan over the grammar deterministic. The cache
/// is cleared wholesale by any structural edit, since an edit anywhere can
/// change downstream expansions.
#[derive(Debug, Clone)]
pub struct Cfg<T> {
    pub(crate) start: u32,
    pub(crate) rules: IndexMap<u32, Vec<CfgSymbol<T>>>,
    pub(crate) cache: HashMap<u32, Vec<T>>,
    pub(crate) next_name: u32,
}

impl<T> Cfg<T> {
    /// Builds a grammar from a start name and a rule table.
    ///
    /// The internal name generator is primed past the largest existing name
    /// so later [`Cfg::add_rule`](Self::add_rule) calls never collide.
    pub(crate) fn from_parts(start: u32, rules: IndexMap<u32, Vec<CfgSymbol<T>>>) -> Self {
        debug_assert!(rules.contains_key(&start), "start rule missing");
        let next_name = rules.keys().copied().max().map_or(0, |m| m + 1);
        Self {
            start,
            rules,
            cache: HashMap::default(),
            next_name,
        }
    }

    /// The start rule's name.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// The `{name -> body}` rule table, in insertion order.
    pub fn rules(&self) -> &IndexMap<u32, Vec<CfgSymbol<T>>> {
        &self.rules
    }

    /// Rule names in insertion order.
    pub fn names(&self) -> Vec<u32> {
        self.rules.keys().copied().collect()
    }

    /// A rule's body. Panics on an unknown name: asking for a rule that does
    /// not exist means an invariant was already broken.
    pub fn body(&self, name: u32) -> &[CfgSymbol<T>] {
        self.rules
            .get(&name)
            .unwrap_or_else(|| panic!("no rule named {name}"))
    }

    /// Per-rule use counts: one per nonterminal occurrence anywhere in the
    /// grammar. The start rule is seeded at 2 so it never looks removable.
    pub fn counts(&self) -> HashMap<u32, usize> {
        let mut counts = HashMap::default();
        counts.insert(self.start, 2usize);
        for body in self.rules.values() {
            for sym in body {
                if let CfgSymbol::Nonterminal(name) = sym {
                    *counts.entry(*name).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Total symbols across all rule bodies; the grammar-size metric the
    /// reducer and lossifiers are expected to shrink.
    pub fn symbol_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Nonterminal reference edges `(lhs, rhs, multiplicity)` for graph
    /// rendering, in insertion order.
    pub fn edges(&self) -> Vec<(u32, u32, usize)> {
        let mut out = Vec::new();
        for (&lhs, body) in &self.rules {
            let mut multiplicity: IndexMap<u32, usize> = IndexMap::new();
            for sym in body {
                if let CfgSymbol::Nonterminal(rhs) = sym {
                    *multiplicity.entry(*rhs).or_insert(0) += 1;
                }
            }
            for (rhs, count) in multiplicity {
                out.push((lhs, rhs, count));
            }
        }
        out
    }
}

impl<T: Clone> Cfg<T> {
    /// Expands a rule to its terminal string, depth-first and left to right.
    ///
    /// Memoized per rule; a cache hit is a clone. The cache is a pure
    /// function of current rule contents, which is why every structural
    /// edit clears it.
    pub fn expand(&mut self, name: u32) -> Vec<T> {
        if let Some(hit) = self.cache.get(&name) {
            return hit.clone();
        }

        let body = self
            .rules
            .get(&name)
            .unwrap_or_else(|| panic!("no rule named {name}"))
            .clone();

        let mut out = Vec::with_capacity(body.len());
        for sym in body {
            match sym {
                CfgSymbol::Terminal(t) => out.push(t),
                CfgSymbol::Nonterminal(inner) => out.extend(self.expand(inner)),
            }
        }

        self.cache.insert(name, out.clone());
        out
    }

    /// Expands the start rule: the full regenerated input.
    pub fn expand_start(&mut self) -> Vec<T> {
        self.expand(self.start)
    }
}

/// Structural equality on start name and rule table; the memo cache is
/// derived state and not part of a grammar's identity.
impl<T: PartialEq> PartialEq for Cfg<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.rules == other.rules
    }
}

impl<T: fmt::Display> fmt::Display for Cfg<T> {
    /// One line per rule, `~[name] => body`, sorted by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<u32> = self.rules.keys().copied().collect();
        names.sort_unstable();
        for name in names {
            write!(f, "~[{name}] => ")?;
            for sym in &self.rules[&name] {
                write!(f, "{sym}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
