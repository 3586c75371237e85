//! Sheet rendering: page resolution, geometry and the cell walk

pub mod cell;
pub mod command;

pub use cell::{SheetRenderer, cell_text};
pub use command::{CommandKind, DeviceRect, DrawCommand, count_by_kind};

use crate::config::RenderConfig;
use crate::diagnostic::{DiagnosticKind, DiagnosticScope, Diagnostics};
use crate::geometry::{SheetGeometry, sheet_rows};
use crate::page::{PageLayoutRegistry, PageLayoutStyle};
use crate::reader::Element;
use crate::style::StyleRegistry;
use serde::{Deserialize, Serialize};

/// Commands of one sheet, relative to its page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRender {
    pub name: String,
    pub page: PageLayoutStyle,
    pub commands: Vec<DrawCommand>,
}

/// Sheet name from `table:name`, or a positional name when it is missing
pub fn sheet_name(table: &Element, index: usize) -> String {
    table
        .attribute("table:name")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Sheet{}", index + 1))
}

/// Page layout of a sheet with the configured margin overrides applied.
/// A sheet with no layout gets the fallback page and a diagnostic.
pub fn resolve_page(
    name: &str,
    table: &Element,
    styles: &StyleRegistry,
    pages: &PageLayoutRegistry,
    config: &RenderConfig,
    diagnostics: &mut Diagnostics,
) -> PageLayoutStyle {
    let table_style = table
        .attribute("table:style-name")
        .and_then(|s| styles.table_style(s));

    let mut page = match pages.resolve(name, table_style) {
        Some(layout) => layout.clone(),
        None => {
            diagnostics.push(
                DiagnosticKind::PageLayoutMissing,
                DiagnosticScope::Sheet(name.to_string()),
                "no page layout bound; using zero margins".to_string(),
            );
            PageLayoutStyle::fallback(config.default_page)
        }
    };

    if let Some(overrides) = config.sheet(name) {
        if let Some(top) = overrides.margin_top_mm {
            page.margin_top_mm = top;
        }
        if let Some(bottom) = overrides.margin_bottom_mm {
            page.margin_bottom_mm = bottom;
        }
        if let Some(left) = overrides.margin_left_mm {
            page.margin_left_mm = left;
        }
        if let Some(right) = overrides.margin_right_mm {
            page.margin_right_mm = right;
        }
    }
    page
}

/// Sheets of a content tree: the `table:table` children of
/// `office:spreadsheet`. Tables nested inside cells are part of their cell.
pub fn sheet_tables(content: &Element) -> Vec<&Element> {
    content
        .first_child_by_tag("office:body")
        .and_then(|body| body.first_child_by_tag("office:spreadsheet"))
        .map(|spreadsheet| {
            spreadsheet
                .children()
                .filter(|child| child.tag() == "table:table")
                .collect()
        })
        .unwrap_or_default()
}

/// Render one `table:table` element
pub fn render_sheet(
    name: String,
    table: &Element,
    styles: &StyleRegistry,
    pages: &PageLayoutRegistry,
    config: &RenderConfig,
    diagnostics: &mut Diagnostics,
) -> SheetRender {
    let page = resolve_page(&name, table, styles, pages, config, diagnostics);
    let geometry = SheetGeometry::compute(table, styles, &name, diagnostics);
    let rows = sheet_rows(table);

    let renderer = SheetRenderer {
        sheet_name: &name,
        styles,
        geometry: &geometry,
        page: &page,
        resolution_dpi: config.resolution_dpi,
        elide_empty_text: config.elide_empty_text,
    };
    let (commands, row_diagnostics) = renderer.render_rows(&rows, config.parallel_rows);
    diagnostics.extend(row_diagnostics);

    let (fills, texts, lines) = count_by_kind(&commands);
    log::debug!(
        "Sheet '{}': {} commands ({} fills, {} texts, {} lines)",
        name,
        commands.len(),
        fills,
        texts,
        lines
    );

    SheetRender {
        name,
        page,
        commands,
    }
}
