//! Raw CSV rows

/// One row of raw cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Cell text in column order
    pub cells: Vec<String>,
    /// Line the row starts on in the source (1-indexed)
    pub line: u64,
}

impl Row {
    pub fn new(cells: Vec<String>, line: u64) -> Self {
        Self { cells, line }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}
