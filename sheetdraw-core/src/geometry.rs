//! Row and column position tables for one sheet
//!
//! Built in a single pass over the row and column definitions before any cell
//! is drawn, since spans reach forward to rows and columns not yet visited.

use crate::diagnostic::{DiagnosticKind, DiagnosticScope, Diagnostics};
use crate::reader::Element;
use crate::reader::units::parse_count;
use crate::style::StyleRegistry;
use serde::{Deserialize, Serialize};

/// Upper bound on column slots produced by `table:number-columns-repeated`
pub const MAX_COLUMN_SLOTS: usize = 16_384;

const ROW_TAG: &str = "table:table-row";
const ROW_CONTAINERS: [&str; 3] = ["table:table-header-rows", "table:table-rows", "table:table-row-group"];
const COLUMN_TAG: &str = "table:table-column";
const COLUMN_CONTAINERS: [&str; 3] = [
    "table:table-header-columns",
    "table:table-columns",
    "table:table-column-group",
];

/// Rows owned by a table, in document order. Rows of tables nested inside
/// cells belong to those tables and are not included.
pub fn sheet_rows(table: &Element) -> Vec<&Element> {
    let mut found = Vec::new();
    collect_tracks(table, ROW_TAG, &ROW_CONTAINERS, &mut found);
    found
}

/// Column definitions owned by a table, in document order
pub fn sheet_columns(table: &Element) -> Vec<&Element> {
    let mut found = Vec::new();
    collect_tracks(table, COLUMN_TAG, &COLUMN_CONTAINERS, &mut found);
    found
}

fn collect_tracks<'a>(parent: &'a Element, tag: &str, containers: &[&str], found: &mut Vec<&'a Element>) {
    for child in parent.children() {
        if child.tag() == tag {
            found.push(child);
        } else if containers.contains(&child.tag()) {
            // Groups nest
            collect_tracks(child, tag, containers, found);
        }
    }
}

/// Offset and extent of a row or column, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPosition {
    pub offset_mm: f64,
    pub extent_mm: f64,
}

pub type RowPosition = TrackPosition;
pub type ColumnPosition = TrackPosition;

#[derive(Debug, Clone, Default)]
pub struct SheetGeometry {
    rows: Vec<RowPosition>,
    columns: Vec<ColumnPosition>,
    column_default_styles: Vec<Option<String>>,
}

impl SheetGeometry {
    /// Walk the rows and columns of a `table:table` element.
    ///
    /// Each row element is one slot. A column element is as many slots as its
    /// repeat count.
    pub fn compute(
        table: &Element,
        styles: &StyleRegistry,
        sheet_name: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut rows = Vec::new();
        let mut y = 0.0;
        for (index, row) in sheet_rows(table).into_iter().enumerate() {
            let height = match row.attribute("table:style-name").filter(|s| !s.is_empty()) {
                Some(name) => styles.row_height_mm(name).unwrap_or_else(|| {
                    diagnostics.push(
                        DiagnosticKind::StyleUnresolved,
                        DiagnosticScope::Sheet(sheet_name.to_string()),
                        format!("row {}: row style '{}' not found", index + 1, name),
                    );
                    0.0
                }),
                None => 0.0,
            };
            rows.push(RowPosition {
                offset_mm: y,
                extent_mm: height,
            });
            y += height;
        }

        let mut columns = Vec::new();
        let mut column_default_styles = Vec::new();
        let mut x = 0.0;
        'columns: for column in sheet_columns(table) {
            let width = match column.attribute("table:style-name").filter(|s| !s.is_empty()) {
                Some(name) => styles.column_width_mm(name).unwrap_or_else(|| {
                    diagnostics.push(
                        DiagnosticKind::StyleUnresolved,
                        DiagnosticScope::Sheet(sheet_name.to_string()),
                        format!("column {}: column style '{}' not found", columns.len() + 1, name),
                    );
                    0.0
                }),
                None => 0.0,
            };
            let default_style = column
                .attribute("table:default-cell-style-name")
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());

            let repeat = parse_count(column.attribute("table:number-columns-repeated"));
            for _ in 0..repeat {
                if columns.len() >= MAX_COLUMN_SLOTS {
                    log::warn!("Sheet '{}' has more than {} columns; ignoring the rest", sheet_name, MAX_COLUMN_SLOTS);
                    break 'columns;
                }
                columns.push(ColumnPosition {
                    offset_mm: x,
                    extent_mm: width,
                });
                column_default_styles.push(default_style.clone());
                x += width;
            }
        }

        log::debug!(
            "Sheet '{}': {} rows ({:.2}mm), {} columns ({:.2}mm)",
            sheet_name,
            rows.len(),
            y,
            columns.len(),
            x
        );

        Self {
            rows,
            columns,
            column_default_styles,
        }
    }

    /// Geometry from bare extents, without default cell styles
    pub fn from_extents(row_heights: &[f64], column_widths: &[f64]) -> Self {
        Self {
            rows: accumulate(row_heights),
            columns: accumulate(column_widths),
            column_default_styles: vec![None; column_widths.len()],
        }
    }

    pub fn rows(&self) -> &[RowPosition] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnPosition] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a row; past the last row it is zero-sized at the bottom edge
    pub fn row(&self, index: usize) -> RowPosition {
        position_at(&self.rows, index)
    }

    /// Position of a column; past the last column it is zero-sized at the right edge
    pub fn column(&self, index: usize) -> ColumnPosition {
        position_at(&self.columns, index)
    }

    /// Summed height of `[start, start + span)`, clamped to the defined rows
    pub fn row_span_extent(&self, start: usize, span: u32) -> f64 {
        span_extent(&self.rows, start, span)
    }

    /// Summed width of `[start, start + span)`, clamped to the defined columns
    pub fn column_span_extent(&self, start: usize, span: u32) -> f64 {
        span_extent(&self.columns, start, span)
    }

    /// `table:default-cell-style-name` of the column owning a slot
    pub fn default_cell_style(&self, column: usize) -> Option<&str> {
        self.column_default_styles
            .get(column)
            .and_then(|s| s.as_deref())
    }
}

fn accumulate(extents: &[f64]) -> Vec<TrackPosition> {
    let mut offset = 0.0;
    extents
        .iter()
        .map(|&extent| {
            let position = TrackPosition {
                offset_mm: offset,
                extent_mm: extent,
            };
            offset += extent;
            position
        })
        .collect()
}

fn position_at(track: &[TrackPosition], index: usize) -> TrackPosition {
    match track.get(index) {
        Some(position) => *position,
        None => TrackPosition {
            offset_mm: track.last().map(|p| p.offset_mm + p.extent_mm).unwrap_or(0.0),
            extent_mm: 0.0,
        },
    }
}

fn span_extent(track: &[TrackPosition], start: usize, span: u32) -> f64 {
    let span = span.max(1) as usize;
    let end = start.saturating_add(span).min(track.len());
    if start >= end {
        return 0.0;
    }
    track[start..end].iter().map(|p| p.extent_mm).sum()
}
