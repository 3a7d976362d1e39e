//! Reusable scratch buffers.
use crate::lit::Lit;

/// Two literal buffers reused by clause loading, kept around to avoid reallocating for every
/// added clause. Their contents are only meaningful within a single `load_clause` call.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
    pub lits_2: Vec<Lit>,
}
