//! Lossy grammar simplification.
//!
//! Both strategies merge nonterminals whose *expansions* are close in
//! normalized edit distance, trading exact reconstruction for a smaller
//! grammar. Determinism comes from scanning rules in insertion order and
//! restarting after every merge.

use crate::cfg::Cfg;
use crate::error::Error;
use log::debug;

/// Default similarity threshold for [`Similarity`].
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default cluster radius for [`Cluster`].
pub const DEFAULT_EPSILON: f64 = 0.4;

/// Which lossifier to run, with its parameter. The configuration surface
/// for callers that pick a strategy by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Similarity { threshold: f64 },
    Cluster { epsilon: f64 },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Similarity {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Strategy {
    /// Runs the chosen strategy, consuming the grammar.
    pub fn run<T: Clone + PartialEq>(self, cfg: Cfg<T>) -> Result<Cfg<T>, Error> {
        match self {
            Strategy::Similarity { threshold } => Ok(Similarity::new(cfg, threshold)?.run()),
            Strategy::Cluster { epsilon } => Ok(Cluster::new(cfg, epsilon)?.run()),
        }
    }
}

/// Normalized edit distance between two expansions, in `[0, 1]`.
fn distance<T: PartialEq>(a: &Vec<T>, b: &Vec<T>, norm: usize) -> f64 {
    debug_assert!(norm > 0, "normalizing by an empty expansion");
    strsim::generic_levenshtein(a, b) as f64 / norm as f64
}

fn check_unit_interval(value: f64, err: fn(f64) -> Error) -> Result<f64, Error> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}

/// Pairwise merging: repeatedly find the first pair of rules whose
/// expansions are within the threshold and merge the less-referenced one
/// into the more-referenced one.
pub struct Similarity<T> {
    cfg: Cfg<T>,
    threshold: f64,
}

impl<T: Clone + PartialEq> Similarity<T> {
    /// Rejects thresholds outside `(0, 1]` before touching the grammar.
    pub fn new(cfg: Cfg<T>, threshold: f64) -> Result<Self, Error> {
        let threshold = check_unit_interval(threshold, Error::InvalidThreshold)?;
        Ok(Self { cfg, threshold })
    }

    /// Merges until no pair is within the threshold, then returns the
    /// simplified grammar.
    pub fn run(mut self) -> Cfg<T> {
        while self.cfg.rules().len() >= 2 {
            match self.eliminate() {
                Some((find, repl)) => debug!("similarity: merged ~[{find}] into ~[{repl}]"),
                None => break,
            }
        }
        self.cfg
    }

    /// One scan over all ordered pairs; applies the first merge found.
    /// Merging invalidates expansions and use counts, so the caller
    /// restarts the scan from the top.
    fn eliminate(&mut self) -> Option<(u32, u32)> {
        let names = self.cfg.names();

        for &a in &names {
            let expansion_a = self.cfg.expand(a);

            for &b in &names {
                if a == b {
                    continue;
                }

                let expansion_b = self.cfg.expand(b);
                // Only compare against the longer side; halves the scan.
                if expansion_a.len() > expansion_b.len() {
                    continue;
                }

                let dist = distance(&expansion_a, &expansion_b, expansion_b.len());
                if dist >= self.threshold {
                    continue;
                }

                let counts = self.cfg.counts();
                let count_a = counts.get(&a).copied().unwrap_or(0);
                let count_b = counts.get(&b).copied().unwrap_or(0);

                // The less-referenced rule is merged away; ties keep the
                // first operand. The start rule always survives.
                let (mut find, mut repl) = if count_a >= count_b { (b, a) } else { (a, b) };
                if find == self.cfg.start() {
                    std::mem::swap(&mut find, &mut repl);
                }

                self.cfg.replace(find, repl);
                return Some((find, repl));
            }
        }

        None
    }
}

/// Greedy clustering: partition rules into clusters by expansion distance
/// to each cluster's first member, then collapse every cluster onto a
/// representative.
pub struct Cluster<T> {
    cfg: Cfg<T>,
    epsilon: f64,
}

impl<T: Clone + PartialEq> Cluster<T> {
    /// Rejects epsilons outside `(0, 1]` before touching the grammar.
    pub fn new(cfg: Cfg<T>, epsilon: f64) -> Result<Self, Error> {
        let epsilon = check_unit_interval(epsilon, Error::InvalidEpsilon)?;
        Ok(Self { cfg, epsilon })
    }

    /// Builds the clusters and collapses each multi-member one.
    pub fn run(mut self) -> Cfg<T> {
        for cluster in self.clusters() {
            if cluster.len() < 2 {
                continue;
            }

            // Representative: maximal use count, first member on ties; the
            // start rule always wins outright.
            let counts = self.cfg.counts();
            let mut representative = cluster[0];
            for &name in &cluster[1..] {
                let best = counts.get(&representative).copied().unwrap_or(0);
                if counts.get(&name).copied().unwrap_or(0) > best {
                    representative = name;
                }
            }
            if cluster.contains(&self.cfg.start()) {
                representative = self.cfg.start();
            }

            for &find in &cluster {
                if find != representative {
                    debug!("cluster: merged ~[{find}] into ~[{representative}]");
                    self.cfg.replace(find, representative);
                }
            }
        }
        self.cfg
    }

    /// Single greedy pass: each rule joins the first cluster whose
    /// representative is within epsilon, else opens a new one.
    fn clusters(&mut self) -> Vec<Vec<u32>> {
        let names = self.cfg.names();
        let mut clusters: Vec<Vec<u32>> = Vec::new();

        for name in names {
            if clusters.is_empty() {
                clusters.push(vec![name]);
                continue;
            }

            let expansion = self.cfg.expand(name);
            let mut placed = false;

            for cluster in clusters.iter_mut() {
                let rep_expansion = self.cfg.expand(cluster[0]);
                let norm = expansion.len().max(rep_expansion.len());
                if norm == 0 {
                    continue;
                }
                if distance(&expansion, &rep_expansion, norm) < self.epsilon {
                    cluster.push(name);
                    placed = true;
                    break;
                }
            }

            if !placed {
                clusters.push(vec![name]);
            }
        }

        clusters
    }
}
