//! Cell list to grid reshaping.

use crate::model::{Cell, Grid};

/// Group cells into rows.
///
/// A new row starts whenever the row index changes from one cell to the next.
/// Cells are not reordered, so the input must already be grouped by row; within
/// a row, values keep their arrival order.
///
/// ```
/// use cellfeed_core::{reshape, Cell};
///
/// let grid = reshape(vec![
///     Cell::new(1, 1, "Colour"),
///     Cell::new(1, 2, "Count"),
///     Cell::new(2, 1, "red"),
///     Cell::new(2, 2, "123"),
/// ]);
/// assert_eq!(grid, vec![vec!["Colour", "Count"], vec!["red", "123"]]);
/// ```
pub fn reshape(cells: impl IntoIterator<Item = Cell>) -> Grid {
    let mut grid: Grid = Vec::new();
    let mut current_row = None;

    for cell in cells {
        if current_row != Some(cell.row) {
            current_row = Some(cell.row);
            grid.push(Vec::new());
        }
        // A row was pushed above on the first cell
        if let Some(row) = grid.last_mut() {
            row.push(cell.value);
        }
    }

    grid
}

/// Sort cells by row, then column, and group them with [`reshape`].
///
/// For feeds that do not guarantee row-major delivery. The sort is stable, so
/// duplicate coordinates keep their arrival order.
pub fn reshape_sorted(cells: impl IntoIterator<Item = Cell>) -> Grid {
    let mut cells: Vec<Cell> = cells.into_iter().collect();
    cells.sort_by_key(|c| (c.row, c.col));
    reshape(cells)
}
