//! The two watched literal scheme.
//!
//! A clause only forces an assignment or becomes a conflict once all but at most one of its
//! literals are false. To notice that moment it is enough to track two literals per clause: as
//! long as both tracked literals are non-false, nothing can happen yet. So every stored clause
//! nominates two of its literals as watched, and for each literal a watchlist records which
//! clauses currently watch it. The watched literals always sit in clause positions 0 and 1, with
//! the rest of the clause permuted behind them.
//!
//! Only the falsification of a watched literal requires work. The propagation loop then walks
//! the affected watchlist and rescans each clause for a non-false substitute literal. Finding
//! one moves the watch there; finding none means the clause is now unit (when the remaining
//! watched literal is unassigned, it gets propagated and stays in position 0) or a conflict
//! (when it is false). Backtracking never falsifies anything, so watchlists stay untouched
//! during backjumps. Chapter 4 of the Handbook of Satisfiability covers the scheme and its
//! history in detail.
//!
//! Each watch additionally carries a blocking literal taken from the same clause. A single read
//! of the watch entry then often suffices: when the blocking literal is currently true the
//! clause is satisfied and the clause storage is never touched. Blocking literals appeared in
//! MiniSat 2.1 (Sörensson and Eén, SAT Race 2008 solver descriptions).

use crate::clause::ClauseRef;
use crate::lit::Lit;

/// A single watch, stored in the watchlist of the watched literal.
#[derive(Copy, Clone)]
pub struct Watch {
    /// The watching clause; the watched literal is in position 0 or 1 of it.
    pub cref: ClauseRef,
    /// Some other literal of the same clause, checked before the clause itself is read.
    pub blocking: Lit,
}

/// Per-literal lists of watches.
#[derive(Default)]
pub struct Watchlists {
    /// The watches on clauses that contain the negation of the indexing literal.
    ///
    /// Scanning `watches[lit.code()]` visits every clause whose watched literal was falsified by
    /// assigning `lit` true.
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Grow the per-literal lists to the given variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Watch a clause on its first two literals, each blocking for the other.
    ///
    /// `lits` must be the literals in positions 0 and 1 of the clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// The watches whose watched literal gets falsified by assigning `lit` true.
    pub fn watched_by(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Same as [`watched_by`](Watchlists::watched_by), mutable for in-place compaction.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Register a watch for a newly watched literal of a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[(!lit).code()].push(watch)
    }
}
