/// One row of a diffusion table: b-value and gradient direction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DiffusionEntry {
    pub bval: f64,
    pub bvec: [f64; 3],
}

impl DiffusionEntry {
    pub fn new(bval: f64, bvec: [f64; 3]) -> Self {
        Self { bval, bvec }
    }

    /// Row used for volumes without usable diffusion metadata
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the b-value and every vector component are zero
    pub fn is_zero(&self) -> bool {
        self.bval == 0.0 && self.bvec.iter().all(|c| *c == 0.0)
    }
}

/// Ordered diffusion rows, one per volume along the time axis
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DiffusionTable {
    entries: Vec<DiffusionEntry>,
    post_processed: bool,
}

impl DiffusionTable {
    pub fn new(entries: Vec<DiffusionEntry>) -> Self {
        Self {
            entries,
            post_processed: false,
        }
    }

    pub fn entries(&self) -> &[DiffusionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&DiffusionEntry> {
        self.entries.last()
    }

    /// True when no row carries any diffusion weighting
    pub fn is_all_zero(&self) -> bool {
        self.entries.iter().all(DiffusionEntry::is_zero)
    }

    /// Whether the trailing-volume correction already ran on this table
    pub fn is_post_processed(&self) -> bool {
        self.post_processed
    }

    /// Copy of the table marked as post-processed
    pub fn mark_post_processed(mut self) -> Self {
        self.post_processed = true;
        self
    }

    /// Copy of the table without its last row, marked as post-processed
    pub fn without_last(&self) -> Self {
        let keep = self.entries.len().saturating_sub(1);
        Self {
            entries: self.entries[..keep].to_vec(),
            post_processed: true,
        }
    }

    pub fn bvals(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.bval)
    }

    pub fn bvecs(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.entries.iter().map(|e| e.bvec)
    }
}

impl From<Vec<(f64, [f64; 3])>> for DiffusionTable {
    fn from(rows: Vec<(f64, [f64; 3])>) -> Self {
        DiffusionTable::new(
            rows.into_iter()
                .map(|(bval, bvec)| DiffusionEntry::new(bval, bvec))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero() {
        let table = DiffusionTable::from(vec![(0.0, [0.0; 3]), (0.0, [0.0; 3])]);
        assert!(table.is_all_zero());

        let table = DiffusionTable::from(vec![(0.0, [0.0; 3]), (0.0, [0.0, 0.0, 1.0])]);
        assert!(!table.is_all_zero());
    }

    #[test]
    fn test_without_last() {
        let table = DiffusionTable::from(vec![(1000.0, [1.0, 0.0, 0.0]), (0.0, [0.0; 3])]);
        let trimmed = table.without_last();
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed.entries()[0], DiffusionEntry::new(1000.0, [1.0, 0.0, 0.0]));
        assert!(trimmed.is_post_processed());
        assert!(!table.is_post_processed());
    }

    #[test]
    fn test_columns() {
        let table = DiffusionTable::from(vec![(0.0, [0.0; 3]), (800.0, [0.0, 1.0, 0.0])]);
        assert_eq!(table.bvals().collect::<Vec<_>>(), vec![0.0, 800.0]);
        assert_eq!(table.bvecs().nth(1), Some([0.0, 1.0, 0.0]));
    }
}
