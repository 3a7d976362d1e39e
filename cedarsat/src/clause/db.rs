//! Database for stored clauses.
use partial_ref::{partial, PartialRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, WatchlistsP};
use crate::lit::Lit;

use super::{ClauseHeader, ClauseRef};

/// Database for stored clauses.
///
/// Tracks all clauses allocated in the [`ClauseAlloc`](super::ClauseAlloc), in insertion order.
/// The database is append only: this solver never deletes clauses.
#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<ClauseRef>,
}

impl ClauseDb {
    /// All stored clauses in insertion order.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    /// The number of stored clauses.
    pub fn count(&self) -> usize {
        self.clauses().len()
    }
}

/// Add a clause to the database and watch it.
///
/// The clause is watched on its first two literals, so the caller has to establish the watch
/// invariant for those positions. The clause may not be unit or empty.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    ctx.part_mut(ClauseDbP).clauses.push(cref);

    ctx.part_mut(WatchlistsP)
        .watch_clause(cref, [lits[0], lits[1]]);

    cref
}
