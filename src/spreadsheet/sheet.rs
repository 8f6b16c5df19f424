use crate::error::TranscriptError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::Grid;

/// Largest grid a sheet may expand to.
pub(crate) const MAX_GRID_CELLS: usize = 1 << 20;

/// Cells collected from one worksheet, with the bounds of the used area.
pub(crate) struct Sheet {
    /// Sheet name from the workbook
    pub(crate) name: String,
    /// All non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the used-range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Lays the cells out as a grid anchored at the top-left of the used range.
    /// Each row ends at its last cell; gaps before it become `RawCell::Empty`.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::UnreadableInput`] when the grid would hold more than
    /// [`MAX_GRID_CELLS`] cells.
    pub(crate) fn into_grid(self, shared_strings: &[String]) -> Result<Grid, TranscriptError> {
        let (row_lower, row_upper, col_lower) =
            match (self.row_lower_bound, self.row_upper_bound, self.col_lower_bound) {
                (Some(row_lower), Some(row_upper), Some(col_lower)) => (row_lower, row_upper, col_lower),
                _ => return Ok(Grid::new()),
            };
        let mut widths = vec![0usize; row_upper - row_lower + 1];
        for cell in &self.cells {
            let width = &mut widths[cell.row - row_lower];
            *width = (*width).max(cell.col - col_lower + 1);
        }
        let total = widths.iter().sum::<usize>();
        if total > MAX_GRID_CELLS {
            return Err(TranscriptError::UnreadableInput(format!(
                "sheet '{}' spans {} cells, more than {}",
                self.name, total, MAX_GRID_CELLS
            )));
        }
        let mut grid: Grid = widths.iter().map(|width| vec![RawCell::Empty; *width]).collect();
        for cell in &self.cells {
            grid[cell.row - row_lower][cell.col - col_lower] = cell.resolve(shared_strings)?;
        }
        Ok(grid)
    }
}
