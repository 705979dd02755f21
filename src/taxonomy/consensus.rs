//! Priority-ordered consensus over normalized lineages.
//!
//! The first source seeds the consensus; each later source may only extend
//! resolution past the current frontier, and only after reproducing the
//! frontier value exactly.

use log::warn;

use super::{Lineage, Rank};

/// Merges a priority-ordered list of normalized lineages into one consensus.
///
/// Candidates are visited in order. A candidate is accepted iff the running
/// consensus is still fully empty, or the candidate holds the exact same
/// value as the consensus at the frontier rank (the deepest rank the
/// consensus has fixed so far). An accepted candidate overwrites every rank
/// from the frontier down to species; a rejected candidate leaves the
/// consensus untouched. Disagreement at the frontier rejects the whole
/// candidate, never a partial merge.
///
/// When the consensus was seeded but every lower-priority candidate was
/// rejected, a warning is logged; this is an expected outcome, not an
/// error.
///
/// # Arguments
///
/// * `cluster_id` - Identifier used in the disagreement log line.
/// * `candidates` - Normalized lineages, highest-priority first.
///
/// # Returns
///
/// * `Lineage` - The consensus lineage (possibly fully empty).
pub fn merge_lineages(cluster_id: &str, candidates: &[Lineage]) -> Lineage {
    let mut consensus = Lineage::new();
    let mut extended = false;
    let mut rejected = 0usize;

    for candidate in candidates {
        match consensus.deepest_valid() {
            // An empty consensus takes the next candidate unconditionally.
            None => fill_from(&mut consensus, candidate, Rank::Phylum),
            Some(frontier) if candidate.get(frontier) == consensus.get(frontier) => {
                fill_from(&mut consensus, candidate, frontier);
                extended = true;
            }
            Some(_) => rejected += 1,
        }
    }

    if rejected > 0 && !extended {
        warn!(
            "{}: every lower-priority source disagreed at the consensus frontier; \
             keeping the seed lineage at its own resolution",
            cluster_id
        );
    }

    consensus
}

/// Copies candidate values into the consensus for every rank from `start`
/// through species.
fn fill_from(consensus: &mut Lineage, candidate: &Lineage, start: Rank) {
    for rank in &Rank::ALL[start.index()..] {
        consensus.set(*rank, candidate.get(*rank).clone());
    }
}
