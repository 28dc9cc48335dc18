//! Exact grammar reduction.
//!
//! Five rewrite rules are driven to a joint fixed point: singleton
//! elimination, internal unification, pairwise unification, rule
//! application, and duplicate elimination. Every rule scans the grammar in
//! a stable ascending-size order and, on its first hit, applies the rewrite
//! and restarts its scan; `factor`/`replace` can change rule count and body
//! contents mid-scan, so no iteration state survives a hit.

use crate::cfg::{Cfg, CfgSymbol};
use ahash::AHashMap as HashMap;
use log::debug;

/// Exact grammar-shrinking engine.
///
/// Consumes a grammar and rewrites it until none of the five rules finds
/// anything left to do. Reduction preserves the expansion of every
/// surviving rule; only the factoring changes.
pub struct Reducer<T> {
    cfg: Cfg<T>,
}

impl<T: Clone + PartialEq> Reducer<T> {
    /// Takes ownership of the grammar to reduce. Clone the grammar first to
    /// keep the unreduced original.
    pub fn new(cfg: Cfg<T>) -> Self {
        Self { cfg }
    }

    /// Runs all rules to their joint fixed point and returns the grammar.
    pub fn run(mut self) -> Cfg<T> {
        loop {
            let mut changed = false;
            changed |= self.eliminate_singletons();
            changed |= self.unify_internal();
            changed |= self.unify_pairwise();
            changed |= self.apply_rules();
            changed |= self.eliminate_duplicates();
            if !changed {
                return self.cfg;
            }
        }
    }

    /// Rule names ordered by ascending body length, stable on ties.
    fn names_by_size(&self) -> Vec<u32> {
        let mut names = self.cfg.names();
        names.sort_by_key(|&n| self.cfg.body(n).len());
        names
    }

    /// R1: a rule used exactly once carries no sharing; inline it.
    fn eliminate_singletons(&mut self) -> bool {
        let mut changed = false;
        loop {
            let counts = self.cfg.counts();
            let victim = self
                .cfg
                .names()
                .into_iter()
                .find(|&n| n != self.cfg.start() && counts.get(&n).copied().unwrap_or(0) == 1);
            match victim {
                Some(name) => {
                    debug!("R1: inlining singleton ~[{name}]");
                    self.cfg.inline(name);
                    changed = true;
                }
                None => return changed,
            }
        }
    }

    /// R2: factor the longest disjoint repeated window within one body into
    /// a rule of its own.
    fn unify_internal(&mut self) -> bool {
        let mut changed = false;
        'restart: loop {
            for name in self.names_by_size() {
                if let Some((start, width)) = longest_disjoint_pair(self.cfg.body(name)) {
                    let window = self.cfg.body(name)[start..start + width].to_vec();
                    let rule = self.cfg.add_rule(window);
                    self.cfg.factor(name, rule);
                    debug!("R2: factored window of {width} in ~[{name}] as ~[{rule}]");
                    changed = true;
                    continue 'restart;
                }
            }
            return changed;
        }
    }

    /// R3: factor the longest common window of two different bodies into a
    /// shared rule.
    fn unify_pairwise(&mut self) -> bool {
        let mut changed = false;
        'restart: loop {
            // Shorter expansion scans first; ties keep insertion order.
            let mut names = self.cfg.names();
            let expansion_len: HashMap<u32, usize> = names
                .iter()
                .map(|&n| (n, self.cfg.expand(n).len()))
                .collect();
            names.sort_by_key(|n| expansion_len[n]);

            for i in 0..names.len() {
                for j in i + 1..names.len() {
                    let (a, b) = (names[i], names[j]);
                    if self.cfg.body(a).len() <= 2 || self.cfg.body(b).len() <= 2 {
                        continue;
                    }
                    if let Some(window) = longest_common_window(self.cfg.body(a), self.cfg.body(b))
                    {
                        let width = window.len();
                        let rule = self.cfg.add_rule(window);
                        self.cfg.factor(a, rule);
                        self.cfg.factor(b, rule);
                        debug!("R3: shared window of {width} between ~[{a}] and ~[{b}] as ~[{rule}]");
                        changed = true;
                        continue 'restart;
                    }
                }
            }
            return changed;
        }
    }

    /// R4: a body that contains another rule's body verbatim gets factored
    /// directly, no new rule needed.
    fn apply_rules(&mut self) -> bool {
        let mut changed = false;
        'restart: loop {
            let names = self.names_by_size();
            for &inner in &names {
                if self.cfg.body(inner).len() < 2 {
                    continue;
                }
                for &outer in &names {
                    if outer == inner {
                        continue;
                    }
                    if contains_window(self.cfg.body(outer), self.cfg.body(inner)) {
                        self.cfg.factor(outer, inner);
                        debug!("R4: applied ~[{inner}] inside ~[{outer}]");
                        changed = true;
                        continue 'restart;
                    }
                }
            }
            return changed;
        }
    }

    /// R5: two rules with identical bodies are one rule.
    fn eliminate_duplicates(&mut self) -> bool {
        let mut changed = false;
        'restart: loop {
            let names = self.names_by_size();
            for i in 0..names.len() {
                for j in i + 1..names.len() {
                    if self.cfg.body(names[i]) != self.cfg.body(names[j]) {
                        continue;
                    }
                    // The earlier rule survives, unless the later one is
                    // the start rule, which must never be deleted.
                    let (keep, drop) = if names[j] == self.cfg.start() {
                        (names[j], names[i])
                    } else {
                        (names[i], names[j])
                    };
                    debug!("R5: merging duplicate ~[{drop}] into ~[{keep}]");
                    self.cfg.replace(drop, keep);
                    changed = true;
                    continue 'restart;
                }
            }
            return changed;
        }
    }
}

/// Finds the longest window that occurs twice, disjointly, in one body.
/// Searched by decreasing width, then increasing left start, then increasing
/// right start; returns the left occurrence `(start, width)`.
fn longest_disjoint_pair<T: PartialEq>(body: &[CfgSymbol<T>]) -> Option<(usize, usize)> {
    let n = body.len();
    let mut width = n / 2;
    while width >= 2 {
        for i in 0..=n - 2 * width {
            for j in i + width..=n - width {
                if body[i..i + width] == body[j..j + width] {
                    return Some((i, width));
                }
            }
        }
        width -= 1;
    }
    None
}

/// Longest common contiguous window of two bodies (symbol-level DP), if it
/// spans at least two symbols.
fn longest_common_window<T: Clone + PartialEq>(
    a: &[CfgSymbol<T>],
    b: &[CfgSymbol<T>],
) -> Option<Vec<CfgSymbol<T>>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    let mut longest = 0;
    let mut end = 0;

    for x in 1..=a.len() {
        for y in 1..=b.len() {
            if a[x - 1] == b[y - 1] {
                table[x][y] = table[x - 1][y - 1] + 1;
                if table[x][y] > longest {
                    longest = table[x][y];
                    end = x;
                }
            }
        }
    }

    if longest >= 2 {
        Some(a[end - longest..end].to_vec())
    } else {
        None
    }
}

/// Whether `needle` occurs contiguously inside `haystack`.
fn contains_window<T: PartialEq>(haystack: &[CfgSymbol<T>], needle: &[CfgSymbol<T>]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}
