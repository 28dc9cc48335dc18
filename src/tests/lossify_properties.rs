use crate::{Cfg, Cluster, Error, Similarity, Strategy, Sequitur};
use proptest::prelude::*;

fn induce(input: &[u8]) -> Cfg<u8> {
    let mut seq = Sequitur::new();
    seq.extend(input.iter().copied());
    seq.into_cfg().expect("nonempty input must induce")
}

fn normalized_distance(a: &Vec<u8>, b: &Vec<u8>) -> f64 {
    let norm = a.len().max(b.len());
    strsim::generic_levenshtein(a, b) as f64 / norm as f64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After a Similarity run, no surviving ordered pair is still within
    /// the threshold under the run's own distance definition.
    #[test]
    fn prop_similarity_converges(input in prop::collection::vec(0u8..4, 4..120)) {
        let threshold = 0.45;
        let cfg = induce(&input);
        let mut out = Similarity::new(cfg, threshold).unwrap().run();

        let names = out.names();
        for &a in &names {
            for &b in &names {
                if a == b {
                    continue;
                }
                let ea = out.expand(a);
                let eb = out.expand(b);
                if ea.len() > eb.len() || eb.is_empty() {
                    continue;
                }
                prop_assert!(normalized_distance(&ea, &eb) >= threshold);
            }
        }
    }

    /// Merging only ever removes rules and symbols.
    #[test]
    fn prop_similarity_is_monotone(input in prop::collection::vec(0u8..4, 1..120)) {
        let cfg = induce(&input);
        let rules_before = cfg.rules().len();
        let symbols_before = cfg.symbol_count();

        let out = Similarity::new(cfg, 0.45).unwrap().run();
        prop_assert!(out.rules().len() <= rules_before);
        prop_assert!(out.symbol_count() <= symbols_before);
    }

    /// Cluster output is structurally sound and still expandable.
    #[test]
    fn prop_cluster_output_is_well_formed(input in prop::collection::vec(0u8..4, 1..120)) {
        let cfg = induce(&input);
        let mut out = Cluster::new(cfg, 0.4).unwrap().run();

        for body in out.rules().values() {
            for sym in body {
                if let Some(name) = sym.as_nonterminal() {
                    prop_assert!(out.rules().contains_key(&name));
                }
            }
        }
        prop_assert!(out.rules().contains_key(&out.start()));
        prop_assert!(!out.expand_start().is_empty());
    }

    /// A vanishingly small threshold is lossless: only rules at distance
    /// zero, i.e. with identical expansions, can still merge.
    #[test]
    fn prop_tiny_threshold_is_lossless(input in prop::collection::vec(any::<u8>(), 1..100)) {
        let cfg = induce(&input);
        let mut out = Similarity::new(cfg, 1e-12).unwrap().run();
        prop_assert_eq!(out.expand_start(), input);
    }
}

#[test]
fn invalid_parameters_are_rejected_before_mutation() {
    let cfg = induce(b"abab");

    assert_eq!(
        Similarity::new(cfg.clone(), 0.0).err(),
        Some(Error::InvalidThreshold(0.0))
    );
    assert_eq!(
        Similarity::new(cfg.clone(), -0.3).err(),
        Some(Error::InvalidThreshold(-0.3))
    );
    assert_eq!(
        Cluster::new(cfg.clone(), 1.01).err(),
        Some(Error::InvalidEpsilon(1.01))
    );
    assert_eq!(
        Strategy::Cluster { epsilon: 2.0 }.run(cfg).err(),
        Some(Error::InvalidEpsilon(2.0))
    );
}

#[test]
fn similarity_lossy_merge_changes_expansion_but_shrinks_grammar() {
    // Two near-identical repeated phrases induce near-identical rules.
    let input = b"abcdabcdabceabce";
    let cfg = induce(input);
    let symbols_before = cfg.symbol_count();

    let mut out = Similarity::new(cfg, 0.5).unwrap().run();

    assert!(out.symbol_count() <= symbols_before);
    // Reconstruction is approximate, but length is preserved in spirit:
    // the output is a string over the same alphabet.
    let expanded = out.expand_start();
    assert!(!expanded.is_empty());
    assert!(expanded.iter().all(|t| input.contains(t)));
}

#[test]
fn cluster_and_similarity_can_disagree() {
    // Both are valid simplifications; they just follow different scan
    // policies, so their outputs need not match.
    let input = b"xxabcabcxxabdabd";
    let cfg = induce(input);

    let similarity = Strategy::Similarity { threshold: 0.45 }
        .run(cfg.clone())
        .unwrap();
    let cluster = Strategy::Cluster { epsilon: 0.45 }.run(cfg).unwrap();

    assert!(similarity.rules().contains_key(&similarity.start()));
    assert!(cluster.rules().contains_key(&cluster.start()));
}
