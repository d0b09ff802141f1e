//! Plain-text rendering of grids and headers.

use folio::metrics::{GridMode, Pivot};
use folio::output::{format_change, format_number, format_price};

/// Boxed section header.
pub(crate) fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// What grid cells hold, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    /// Amounts in millions
    Amount,
    /// Prices
    Price,
}

fn format_cell(value: Option<f64>, mode: GridMode, kind: CellKind) -> String {
    match (mode, kind) {
        (GridMode::Change, _) => {
            let text = format_change(value);
            if text.is_empty() { "-".to_string() } else { text }
        }
        (GridMode::Normalized, _) => value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
        (GridMode::Values, CellKind::Amount) => format_number(value),
        (GridMode::Values, CellKind::Price) => format_price(value),
    }
}

/// Print `grid` as an aligned table.
pub(crate) fn print_grid(grid: &Pivot, mode: GridMode, kind: CellKind) {
    if grid.is_empty() || grid.is_all_null() {
        println!("No data for the selected filters.");
        return;
    }

    let cells: Vec<Vec<String>> = grid
        .values()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| format_cell(*v, mode, kind)).collect())
        .collect();

    let label_width = grid.rows().iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let widths: Vec<usize> = grid
        .columns()
        .iter()
        .enumerate()
        .map(|(c, name)| {
            cells
                .iter()
                .map(|row| row[c].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    print!("{:<label_width$}", "");
    for (name, width) in grid.columns().iter().zip(&widths) {
        print!("  {name:>width$}");
    }
    println!();
    for (label, row) in grid.rows().iter().zip(&cells) {
        print!("{label:<label_width$}");
        for (cell, width) in row.iter().zip(&widths) {
            print!("  {cell:>width$}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(Some(1500.0), GridMode::Values, CellKind::Amount), "1.5B");
        assert_eq!(format_cell(Some(12.5), GridMode::Values, CellKind::Price), "$12.50");
        assert_eq!(format_cell(None, GridMode::Change, CellKind::Amount), "-");
        assert_eq!(format_cell(Some(4.0), GridMode::Change, CellKind::Price), "+4.0%");
        assert_eq!(format_cell(Some(0.5), GridMode::Normalized, CellKind::Amount), "0.50");
    }
}
