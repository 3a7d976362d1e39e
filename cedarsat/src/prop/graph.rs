//! Antecedent tracking, the implicit form of the implication graph.
use partial_ref::{partial, PartialRef};

use cedarsat_formula::lit::LitIdx;

use crate::clause::ClauseRef;
use crate::context::{ClauseAllocP, Context};
use crate::lit::{Lit, Var};

/// Why a variable has its current value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// A decision or a top-level unit clause; there is no antecedent clause.
    Decision,
    /// A clause that became unit and forced the assignment.
    Clause(ClauseRef),
}

impl Reason {
    /// Whether the assignment was made without an antecedent clause.
    pub fn is_decision(&self) -> bool {
        matches!(self, Reason::Decision)
    }

    /// The falsified literals of the antecedent, i.e. the assignment's predecessors in the
    /// implication graph.
    pub fn lits<'out, 'a, 'b>(&'a self, ctx: &'b partial!('b Context, ClauseAllocP)) -> &'out [Lit]
    where
        'a: 'out,
        'b: 'out,
    {
        match self {
            Reason::Decision => &[],
            // A propagating clause keeps the propagated literal in position 0
            Reason::Clause(cref) => &ctx.part(ClauseAllocP).clause(*cref).lits()[1..],
        }
    }
}

/// A clause found to be falsified by the current assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    pub cref: ClauseRef,
}

impl Conflict {
    /// The literals of the conflicting clause.
    pub fn lits<'out, 'a, 'b>(&'a self, ctx: &'b partial!('b Context, ClauseAllocP)) -> &'out [Lit]
    where
        'a: 'out,
        'b: 'out,
    {
        ctx.part(ClauseAllocP).clause(self.cref).lits()
    }
}

/// What is known about one assigned variable: its antecedent and its decision level.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
}

/// The implication graph, stored implicitly.
///
/// Conceptually the assigned variables form a DAG whose sources are decisions and top-level
/// units, with edges from the falsified literals of each antecedent clause to the assignment it
/// forced. Rather than materializing edge lists, this type keeps one [`ImplNode`] per variable;
/// conflict analysis combines it with the trail order to walk the graph backwards.
#[derive(Default)]
pub struct ImplGraph {
    /// Entries of unassigned variables are stale leftovers and must not be read.
    nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Grow the node table to the given variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                reason: Reason::Decision,
                level: 0,
            },
        );
    }

    /// The antecedent of a variable. Only meaningful while the variable is assigned.
    pub fn reason(&self, var: Var) -> &Reason {
        &self.nodes[var.index()].reason
    }

    /// The decision level of a variable. Only meaningful while the variable is assigned.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    /// Record the reason and decision level of a newly assigned variable.
    pub fn assign(&mut self, var: Var, reason: Reason, level: usize) {
        self.nodes[var.index()] = ImplNode {
            reason,
            level: level as LitIdx,
        };
    }
}
