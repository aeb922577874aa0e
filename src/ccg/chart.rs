//! The chart: per-span, per-category bests plus dominated alternatives.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ccg::category::Category;
use crate::ccg::edge::{Edge, EdgeId};

/// Result of offering an edge to a [`Chart`] cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No edge of an alpha-equivalent category existed yet at this span, or
    /// the new edge strictly improved on the existing one's `in_score`. It
    /// becomes (or stays) the cell's primary edge.
    Admitted,
    /// An alpha-equivalent, equal-or-better edge was already primary at this
    /// span; the candidate is kept as an alternative for N-best extraction
    /// but does not become primary (spec §5's dominance rule).
    Dominated,
}

#[derive(Debug, Default)]
struct Cell {
    primary: HashMap<String, (EdgeId, Arc<Category>)>,
    alternatives: HashMap<String, Vec<EdgeId>>,
}

/// A CKY-style chart indexed by `(i, j)` span. Within a span, categories are
/// bucketed by `Category::erase_variables().to_string()` so that
/// alpha-equivalent categories (identical once feature variables are
/// erased) share a bucket regardless of which variable names they happen
/// to carry; the raw `Display` string is not used as the key, since two
/// feature variables with different names would otherwise fall into
/// distinct buckets despite being alpha-equivalent.
#[derive(Debug)]
pub struct Chart {
    n: usize,
    cells: Vec<Cell>,
}

impl Chart {
    pub fn new(n: usize) -> Self {
        let num_cells = if n == 0 { 0 } else { n * (n + 1) / 2 };
        Chart {
            n,
            cells: (0..num_cells).map(|_| Cell::default()).collect(),
        }
    }

    fn cell_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j <= self.n);
        // Triangular packing: cells for span-length L start at offset
        // L*(L-1)/2... here indexed directly by (i, len).
        let len = j - i;
        (len - 1) * self.n - (len - 1) * (len - 2) / 2 + i
    }

    fn bucket_key(cat: &Category) -> String {
        cat.erase_variables().to_string()
    }

    /// Offer a candidate edge at `(i, j)` for admission. `edges` is the
    /// arena the candidate (and any existing primary it's compared against)
    /// lives in.
    pub fn try_admit(
        &mut self,
        i: usize,
        j: usize,
        edge_id: EdgeId,
        category: Arc<Category>,
        edges: &crate::ccg::edge::EdgeArena,
    ) -> Admission {
        let idx = self.cell_index(i, j);
        let key = Self::bucket_key(&category);
        let cell = &mut self.cells[idx];

        match cell.primary.get(&key).copied() {
            None => {
                cell.primary.insert(key, (edge_id, category));
                Admission::Admitted
            }
            Some((existing_id, _)) => {
                let existing: &Edge = edges.get(existing_id);
                let candidate: &Edge = edges.get(edge_id);
                if candidate.in_score > existing.in_score {
                    cell.primary.insert(key.clone(), (edge_id, category));
                    cell.alternatives.entry(key).or_default().push(existing_id);
                    Admission::Admitted
                } else {
                    cell.alternatives.entry(key).or_default().push(edge_id);
                    Admission::Dominated
                }
            }
        }
    }

    /// The primary edge at `(i, j)` for a category bucket, if any.
    pub fn primary(&self, i: usize, j: usize, category: &Category) -> Option<EdgeId> {
        let idx = self.cell_index(i, j);
        self.cells[idx]
            .primary
            .get(&Self::bucket_key(category))
            .map(|(id, _)| *id)
    }

    /// Every primary edge at `(i, j)`, across all category buckets.
    pub fn primaries(&self, i: usize, j: usize) -> Vec<EdgeId> {
        let idx = self.cell_index(i, j);
        self.cells[idx].primary.values().map(|(id, _)| *id).collect()
    }

    /// Primary plus dominated alternatives at `(i, j)` for a category
    /// bucket, primary edge first, used by N-best extraction.
    pub fn all_with_alternatives(&self, i: usize, j: usize, category: &Category) -> Vec<EdgeId> {
        let idx = self.cell_index(i, j);
        let key = Self::bucket_key(category);
        let mut result = Vec::new();
        if let Some((primary_id, _)) = self.cells[idx].primary.get(&key) {
            result.push(*primary_id);
        }
        if let Some(alts) = self.cells[idx].alternatives.get(&key) {
            result.extend(alts.iter().copied());
        }
        result
    }

    pub fn sentence_len(&self) -> usize {
        self.n
    }
}
