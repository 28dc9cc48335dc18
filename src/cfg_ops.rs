//! Structural edits on a finalized grammar.
//!
//! Every edit here invalidates the expansion cache. Destructive forms
//! mutate in place; each has a copy-then-mutate twin for callers that need
//! to keep the original.

use crate::cfg::{Cfg, CfgSymbol};
use log::trace;

impl<T: Clone> Cfg<T> {
    /// Registers `body` under a fresh, grammar-unique name and returns it.
    pub fn add_rule(&mut self, body: Vec<CfgSymbol<T>>) -> u32 {
        let name = self.next_name;
        self.next_name += 1;
        self.rules.insert(name, body);
        self.cache.clear();
        name
    }

    /// Rewrites every occurrence of `find` to `repl`, in every body.
    fn subst(&mut self, find: u32, repl: u32) {
        for body in self.rules.values_mut() {
            for sym in body.iter_mut() {
                if sym.as_nonterminal() == Some(find) {
                    *sym = CfgSymbol::Nonterminal(repl);
                }
            }
        }
    }

    /// Unifies two nonterminals: deletes `find` and redirects all its
    /// occurrences to `repl`.
    ///
    /// When `repl`'s own body references `find`, those occurrences are
    /// first inlined with `find`'s body; redirecting them instead would
    /// make `repl` reference itself. One level suffices: the grammar is
    /// acyclic beforehand, so `find`'s body cannot lead back to `repl`.
    pub fn replace(&mut self, find: u32, repl: u32) {
        assert_ne!(find, self.start, "cannot replace away the start rule");
        if find == repl {
            return;
        }
        trace!("replace ~[{find}] -> ~[{repl}]");

        let find_body = self
            .rules
            .shift_remove(&find)
            .unwrap_or_else(|| panic!("no rule named {find}"));

        let repl_body = self
            .rules
            .get_mut(&repl)
            .unwrap_or_else(|| panic!("no rule named {repl}"));

        if repl_body.iter().any(|s| s.as_nonterminal() == Some(find)) {
            let mut inlined = Vec::with_capacity(repl_body.len() + find_body.len());
            for sym in repl_body.drain(..) {
                if sym.as_nonterminal() == Some(find) {
                    inlined.extend(find_body.iter().cloned());
                } else {
                    inlined.push(sym);
                }
            }
            *repl_body = inlined;
        }

        self.subst(find, repl);
        self.cache.clear();
    }

    /// Deletes a rule and splices its body in place of every occurrence.
    pub fn inline(&mut self, name: u32) {
        assert_ne!(name, self.start, "cannot inline the start rule");
        trace!("inline ~[{name}]");

        let body = self
            .rules
            .shift_remove(&name)
            .unwrap_or_else(|| panic!("no rule named {name}"));

        for rule_body in self.rules.values_mut() {
            if !rule_body.iter().any(|s| s.as_nonterminal() == Some(name)) {
                continue;
            }
            let mut spliced = Vec::with_capacity(rule_body.len() + body.len());
            for sym in rule_body.drain(..) {
                if sym.as_nonterminal() == Some(name) {
                    spliced.extend(body.iter().cloned());
                } else {
                    spliced.push(sym);
                }
            }
            *rule_body = spliced;
        }

        self.cache.clear();
    }

    /// Non-destructive [`replace`](Self::replace).
    pub fn replacing(&self, find: u32, repl: u32) -> Cfg<T> {
        let mut copy = self.clone();
        copy.replace(find, repl);
        copy
    }

    /// Non-destructive [`inline`](Self::inline).
    pub fn inlining(&self, name: u32) -> Cfg<T> {
        let mut copy = self.clone();
        copy.inline(name);
        copy
    }
}

impl<T: Clone + PartialEq> Cfg<T> {
    /// Replaces each whole occurrence of `rule`'s current body inside
    /// `target`'s body with a single reference to `rule`.
    ///
    /// Matching is symbol-for-symbol, leftmost-first and non-overlapping: a
    /// match at position `i` skips the next `len - 1` positions. Returns
    /// whether anything changed; no match (or `target == rule`) is a no-op.
    pub fn factor(&mut self, target: u32, rule: u32) -> bool {
        if target == rule {
            return false;
        }

        let pattern = self
            .rules
            .get(&rule)
            .unwrap_or_else(|| panic!("no rule named {rule}"))
            .clone();
        if pattern.is_empty() {
            return false;
        }

        let body = self
            .rules
            .get(&target)
            .unwrap_or_else(|| panic!("no rule named {target}"));

        let mut rewritten = Vec::with_capacity(body.len());
        let mut changed = false;
        let mut i = 0;
        while i < body.len() {
            if i + pattern.len() <= body.len() && body[i..i + pattern.len()] == pattern[..] {
                rewritten.push(CfgSymbol::Nonterminal(rule));
                i += pattern.len();
                changed = true;
            } else {
                rewritten.push(body[i].clone());
                i += 1;
            }
        }

        if changed {
            trace!("factor ~[{rule}] into ~[{target}]");
            *self.rules.get_mut(&target).expect("target checked above") = rewritten;
            self.cache.clear();
        }
        changed
    }

    /// Non-destructive [`factor`](Self::factor).
    pub fn factoring(&self, target: u32, rule: u32) -> Cfg<T> {
        let mut copy = self.clone();
        copy.factor(target, rule);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn t(c: char) -> CfgSymbol<char> {
        CfgSymbol::Terminal(c)
    }

    fn nt(name: u32) -> CfgSymbol<char> {
        CfgSymbol::Nonterminal(name)
    }

    fn cfg_from(rules: Vec<(u32, Vec<CfgSymbol<char>>)>) -> Cfg<char> {
        Cfg::from_parts(0, rules.into_iter().collect::<IndexMap<_, _>>())
    }

    #[test]
    fn add_rule_names_are_fresh_and_monotone() {
        let mut cfg = cfg_from(vec![(0, vec![t('a')]), (5, vec![t('b')])]);
        let first = cfg.add_rule(vec![t('x')]);
        let second = cfg.add_rule(vec![t('y')]);
        assert_eq!(first, 6);
        assert_eq!(second, 7);
        assert_eq!(cfg.body(6), &[t('x')]);
    }

    #[test]
    fn replace_redirects_all_occurrences() {
        let mut cfg = cfg_from(vec![
            (0, vec![nt(1), nt(2), nt(1)]),
            (1, vec![t('a'), t('b')]),
            (2, vec![t('a'), t('c')]),
        ]);
        cfg.replace(2, 1);
        assert!(!cfg.rules().contains_key(&2));
        assert_eq!(cfg.body(0), &[nt(1), nt(1), nt(1)]);
        assert_eq!(cfg.expand_start(), "ababab".chars().collect::<Vec<_>>());
    }

    #[test]
    fn replace_inlines_to_avoid_self_reference() {
        // repl's body mentions find; a blind substitution would make rule 1
        // reference itself.
        let mut cfg = cfg_from(vec![
            (0, vec![nt(1), nt(2)]),
            (1, vec![nt(2), t('x')]),
            (2, vec![t('a'), t('b')]),
        ]);
        cfg.replace(2, 1);
        assert_eq!(cfg.body(1), &[t('a'), t('b'), t('x')]);
        assert_eq!(cfg.body(0), &[nt(1), nt(1)]);
        assert!(cfg
            .body(1)
            .iter()
            .all(|s| s.as_nonterminal() != Some(1)));
    }

    #[test]
    fn replace_clears_the_expansion_cache() {
        let mut cfg = cfg_from(vec![
            (0, vec![nt(1), nt(2)]),
            (1, vec![t('a')]),
            (2, vec![t('b')]),
        ]);
        assert_eq!(cfg.expand_start(), vec!['a', 'b']);
        cfg.replace(2, 1);
        assert_eq!(cfg.expand_start(), vec!['a', 'a']);
    }

    #[test]
    fn inline_splices_every_occurrence() {
        let mut cfg = cfg_from(vec![
            (0, vec![nt(1), t('c'), nt(1)]),
            (1, vec![t('a'), t('b')]),
        ]);
        cfg.inline(1);
        assert_eq!(cfg.body(0), &[t('a'), t('b'), t('c'), t('a'), t('b')]);
        assert!(!cfg.rules().contains_key(&1));
    }

    #[test]
    fn factor_replaces_disjoint_occurrences() {
        let mut cfg = cfg_from(vec![
            (0, vec![t('a'), t('b'), t('c'), t('a'), t('b')]),
            (1, vec![t('a'), t('b')]),
        ]);
        assert!(cfg.factor(0, 1));
        assert_eq!(cfg.body(0), &[nt(1), t('c'), nt(1)]);
    }

    #[test]
    fn factor_is_leftmost_and_non_overlapping() {
        // "aaa" against pattern "aa": only the leftmost pair matches, the
        // skip window rules out the overlapping start at index 1.
        let mut cfg = cfg_from(vec![
            (0, vec![t('a'), t('a'), t('a')]),
            (1, vec![t('a'), t('a')]),
        ]);
        assert!(cfg.factor(0, 1));
        assert_eq!(cfg.body(0), &[nt(1), t('a')]);
    }

    #[test]
    fn factor_without_match_is_a_noop() {
        let mut cfg = cfg_from(vec![
            (0, vec![t('x'), t('y')]),
            (1, vec![t('a'), t('b')]),
        ]);
        assert!(!cfg.factor(0, 1));
        assert_eq!(cfg.body(0), &[t('x'), t('y')]);
    }

    #[test]
    fn factor_of_rule_into_itself_is_refused() {
        let mut cfg = cfg_from(vec![(0, vec![t('a')]), (1, vec![t('a'), t('b')])]);
        assert!(!cfg.factor(1, 1));
    }

    #[test]
    fn non_destructive_forms_leave_the_original_alone() {
        let cfg = cfg_from(vec![
            (0, vec![nt(1), nt(2)]),
            (1, vec![t('a')]),
            (2, vec![t('a')]),
        ]);
        let merged = cfg.replacing(2, 1);
        assert!(cfg.rules().contains_key(&2));
        assert!(!merged.rules().contains_key(&2));

        let flattened = cfg.inlining(1);
        assert!(cfg.rules().contains_key(&1));
        assert!(!flattened.rules().contains_key(&1));
    }

    #[test]
    #[should_panic(expected = "cannot replace away the start rule")]
    fn start_rule_is_protected() {
        let mut cfg = cfg_from(vec![(0, vec![t('a')]), (1, vec![t('a')])]);
        cfg.replace(0, 1);
    }
}
