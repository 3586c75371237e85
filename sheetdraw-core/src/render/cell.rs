//! Cell walk: rows in document order, cells left to right

use super::command::{DeviceRect, DrawCommand};
use crate::diagnostic::{CellReference, DiagnosticKind, DiagnosticScope, Diagnostics};
use crate::geometry::SheetGeometry;
use crate::page::PageLayoutStyle;
use crate::reader::units::{parse_count, to_device_units};
use crate::reader::{Element, dom::Node};
use crate::style::{CellStyle, StyleRegistry};
use rayon::prelude::*;

const CELL_TAG: &str = "table:table-cell";
const COVERED_CELL_TAG: &str = "table:covered-table-cell";

/// Emits the draw commands of one sheet
pub struct SheetRenderer<'a> {
    pub sheet_name: &'a str,
    pub styles: &'a StyleRegistry,
    pub geometry: &'a SheetGeometry,
    pub page: &'a PageLayoutStyle,
    pub resolution_dpi: f64,
    pub elide_empty_text: bool,
}

impl<'a> SheetRenderer<'a> {
    /// Render all rows. With `parallel`, rows are emitted on the rayon pool
    /// and concatenated in row order, so the output is the same.
    pub fn render_rows(&self, rows: &[&Element], parallel: bool) -> (Vec<DrawCommand>, Diagnostics) {
        let per_row: Vec<(Vec<DrawCommand>, Diagnostics)> = if parallel {
            rows.par_iter()
                .enumerate()
                .map(|(index, row)| self.render_row(index, row))
                .collect()
        } else {
            rows.iter()
                .enumerate()
                .map(|(index, row)| self.render_row(index, row))
                .collect()
        };

        let mut commands = Vec::new();
        let mut diagnostics = Diagnostics::new();
        for (row_commands, row_diagnostics) in per_row {
            commands.extend(row_commands);
            diagnostics.extend(row_diagnostics);
        }
        (commands, diagnostics)
    }

    pub fn render_row(&self, row_index: usize, row: &Element) -> (Vec<DrawCommand>, Diagnostics) {
        let mut commands = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut col = 0usize;

        for cell in row.children() {
            let repeat = parse_count(cell.attribute("table:number-columns-repeated"));
            match cell.tag() {
                COVERED_CELL_TAG => {
                    // Placeholder inside a merged region: occupies slots, draws nothing
                    col = col.saturating_add(repeat as usize);
                    continue;
                }
                CELL_TAG => {}
                _ => continue,
            }

            let content = cell_text(cell);
            let row_span = parse_count(cell.attribute("table:number-rows-spanned"));
            let col_span = parse_count(cell.attribute("table:number-columns-spanned"));

            // Style and text are read once and shared by every repeated slot
            let style_name = cell
                .attribute("table:style-name")
                .filter(|s| !s.is_empty())
                .or_else(|| self.geometry.default_cell_style(col));
            let style = self.resolve_style(style_name, row_index, col, &mut diagnostics);

            for iteration in 0..repeat {
                // Repeats stop where the defined columns end
                if iteration > 0 && col >= self.geometry.column_count() {
                    col = col.saturating_add((repeat - iteration) as usize);
                    break;
                }
                let rect = self.cell_rect(row_index, col, row_span, col_span);
                self.emit_cell(rect, style, &content, &mut commands);
                col += 1;
            }
        }

        (commands, diagnostics)
    }

    fn resolve_style(
        &self,
        name: Option<&str>,
        row: usize,
        col: usize,
        diagnostics: &mut Diagnostics,
    ) -> &'a CellStyle {
        let Some(name) = name else {
            return self.styles.default_cell_style();
        };
        match self.styles.cell_style(name) {
            Some(style) => style,
            None => {
                diagnostics.push(
                    DiagnosticKind::StyleUnresolved,
                    DiagnosticScope::Cell(
                        self.sheet_name.to_string(),
                        CellReference::new(row as u32, col as u32),
                    ),
                    format!("cell style '{}' not found", name),
                );
                self.styles.default_cell_style()
            }
        }
    }

    /// Device rectangle of a cell, spans included, shifted by the page margins
    pub fn cell_rect(&self, row: usize, col: usize, row_span: u32, col_span: u32) -> DeviceRect {
        let row_pos = self.geometry.row(row);
        let col_pos = self.geometry.column(col);
        let height = self.geometry.row_span_extent(row, row_span);
        let width = self.geometry.column_span_extent(col, col_span);
        let dpi = self.resolution_dpi;

        DeviceRect {
            x: to_device_units(col_pos.offset_mm + self.page.margin_left_mm, dpi),
            y: to_device_units(row_pos.offset_mm + self.page.margin_top_mm, dpi),
            w: to_device_units(width, dpi),
            h: to_device_units(height, dpi),
        }
    }

    fn emit_cell(&self, rect: DeviceRect, style: &CellStyle, content: &str, out: &mut Vec<DrawCommand>) {
        if !style.background_color_hex.is_empty() {
            out.push(DrawCommand::fill(rect, &style.background_color_hex));
        }

        if !(self.elide_empty_text && content.is_empty()) {
            out.push(DrawCommand::Text {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                alignment: style.alignment,
                font_name: style.font_name.clone(),
                font_size_pt: style.font_size_pt,
                content: content.to_string(),
            });
        }

        let borders = &style.borders;
        if borders.left.is_visible() {
            out.push(DrawCommand::line(rect.x, rect.y, rect.x, rect.bottom(), &borders.left));
        }
        if borders.right.is_visible() {
            out.push(DrawCommand::line(rect.right(), rect.y, rect.right(), rect.bottom(), &borders.right));
        }
        if borders.top.is_visible() {
            out.push(DrawCommand::line(rect.x, rect.y, rect.right(), rect.y, &borders.top));
        }
        if borders.bottom.is_visible() {
            out.push(DrawCommand::line(rect.x, rect.bottom(), rect.right(), rect.bottom(), &borders.bottom));
        }
    }
}

/// Text of a cell: its paragraphs joined by newlines
pub fn cell_text(cell: &Element) -> String {
    cell.children()
        .filter(|c| c.tag() == "text:p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Paragraph text with ODF whitespace elements expanded
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    push_inline_text(paragraph, &mut out);
    out
}

fn push_inline_text(element: &Element, out: &mut String) {
    for node in element.nodes() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => match child.tag() {
                "text:s" => {
                    let count = parse_count(child.attribute("text:c"));
                    out.extend(std::iter::repeat_n(' ', count as usize));
                }
                "text:tab" => out.push('\t'),
                "text:line-break" => out.push('\n'),
                // Annotations belong to the cell, not its text
                "office:annotation" => {}
                _ => push_inline_text(child, out),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::reader::dom;
    use crate::style::{Alignment, BorderSpec, StyleDefinition};

    fn page_with_margins(left: f64, top: f64) -> PageLayoutStyle {
        let mut page = PageLayoutStyle::fallback(PageSize::default());
        page.margin_left_mm = left;
        page.margin_top_mm = top;
        page
    }

    fn styled_registry() -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        registry.insert(
            "D",
            StyleDefinition::Cell(CellStyle {
                alignment: Alignment::Center,
                background_color_hex: "#eeeeee".to_string(),
                ..Default::default()
            }),
        );
        registry.insert(
            "boxed",
            StyleDefinition::Cell(CellStyle {
                borders: crate::style::CellBorders {
                    left: BorderSpec {
                        width_mm: 0.5,
                        stroke_kind: "solid".to_string(),
                        color_hex: "#000000".to_string(),
                    },
                    right: BorderSpec::none(),
                    top: BorderSpec {
                        width_mm: 1.0,
                        stroke_kind: "solid".to_string(),
                        color_hex: "#000000".to_string(),
                    },
                    bottom: BorderSpec::none(),
                },
                ..Default::default()
            }),
        );
        registry
    }

    fn renderer<'a>(
        styles: &'a StyleRegistry,
        geometry: &'a SheetGeometry,
        page: &'a PageLayoutStyle,
    ) -> SheetRenderer<'a> {
        SheetRenderer {
            sheet_name: "Sheet1",
            styles,
            geometry,
            page,
            resolution_dpi: 96.0,
            elide_empty_text: false,
        }
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(f64, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, content, .. } => Some((*x, content.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_repeated_cell_fills_consecutive_slots() {
        let styles = StyleRegistry::new();
        let geometry = SheetGeometry::from_extents(&[10.0], &[10.0, 20.0, 30.0, 40.0]);
        let page = page_with_margins(0.0, 0.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = dom::parse(
            r#"<table:table-row><table:table-cell table:number-columns-repeated="4"><text:p>x</text:p></table:table-cell></table:table-row>"#,
        )
        .unwrap();

        let (commands, diagnostics) = renderer.render_row(0, &row);
        assert!(diagnostics.is_empty());
        let texts = texts(&commands);
        assert_eq!(texts.len(), 4);
        let dpi = renderer.resolution_dpi;
        let expected_x: Vec<f64> = [0.0, 10.0, 30.0, 60.0].iter().map(|mm| to_device_units(*mm, dpi)).collect();
        for (i, (x, content)) in texts.iter().enumerate() {
            assert_eq!(content, "x");
            assert_eq!(*x, expected_x[i]);
        }
    }

    #[test]
    fn test_repeat_stops_at_last_column() {
        let styles = StyleRegistry::new();
        let geometry = SheetGeometry::from_extents(&[10.0], &[10.0, 10.0]);
        let page = page_with_margins(0.0, 0.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = dom::parse(
            r#"<table:table-row><table:table-cell table:number-columns-repeated="1024"/></table:table-row>"#,
        )
        .unwrap();
        let (commands, _) = renderer.render_row(0, &row);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_covered_cells_occupy_slots() {
        let styles = StyleRegistry::new();
        let geometry = SheetGeometry::from_extents(&[10.0], &[10.0, 10.0, 10.0, 10.0]);
        let page = page_with_margins(0.0, 0.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = dom::parse(
            r#"<table:table-row>
<table:table-cell table:number-columns-spanned="3"><text:p>wide</text:p></table:table-cell>
<table:covered-table-cell table:number-columns-repeated="2"/>
<table:table-cell><text:p>last</text:p></table:table-cell>
</table:table-row>"#,
        )
        .unwrap();

        let (commands, _) = renderer.render_row(0, &row);
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            DrawCommand::Text { w, content, .. } => {
                assert_eq!(content, "wide");
                assert_eq!(*w, to_device_units(30.0, renderer.resolution_dpi));
            }
            other => panic!("unexpected command {:?}", other),
        }
        match &commands[1] {
            DrawCommand::Text { x, content, .. } => {
                assert_eq!(content, "last");
                assert_eq!(*x, to_device_units(30.0, renderer.resolution_dpi));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_column_default_style_applies() {
        let content = dom::parse(
            r#"<table:table>
<table:table-column table:default-cell-style-name="D"/>
<table:table-row><table:table-cell table:style-name=""><text:p>a</text:p></table:table-cell></table:table-row>
</table:table>"#,
        )
        .unwrap();
        let styles = styled_registry();
        let mut diagnostics = Diagnostics::new();
        let geometry = SheetGeometry::compute(&content, &styles, "Sheet1", &mut diagnostics);
        let page = page_with_margins(0.0, 0.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = content.find_all_by_tag("table:table-row")[0];

        let (commands, diagnostics) = renderer.render_row(0, row);
        assert!(diagnostics.is_empty());
        assert!(matches!(&commands[0], DrawCommand::FillRect { color_hex, .. } if color_hex == "#eeeeee"));
        assert!(matches!(&commands[1], DrawCommand::Text { alignment: Alignment::Center, .. }));
    }

    #[test]
    fn test_unresolved_style_is_zero_sized_default() {
        let styles = StyleRegistry::new();
        let geometry = SheetGeometry::from_extents(&[], &[]);
        let page = page_with_margins(0.0, 0.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = dom::parse(
            r#"<table:table-row><table:table-cell table:style-name="ghost"><text:p>?</text:p></table:table-cell></table:table-row>"#,
        )
        .unwrap();

        let (commands, diagnostics) = renderer.render_row(0, &row);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            commands,
            vec![DrawCommand::Text {
                x: 0.0,
                y: 0.0,
                w: 0.0,
                h: 0.0,
                alignment: Alignment::Start,
                font_name: String::new(),
                font_size_pt: 0.0,
                content: "?".to_string(),
            }]
        );
    }

    #[test]
    fn test_borders_and_margins() {
        let styles = styled_registry();
        let geometry = SheetGeometry::from_extents(&[10.0], &[20.0]);
        let page = page_with_margins(5.0, 7.0);
        let renderer = renderer(&styles, &geometry, &page);
        let row = dom::parse(
            r#"<table:table-row><table:table-cell table:style-name="boxed"/></table:table-row>"#,
        )
        .unwrap();

        let (commands, _) = renderer.render_row(0, &row);
        let dpi = renderer.resolution_dpi;
        let rect = renderer.cell_rect(0, 0, 1, 1);
        assert_eq!(rect.x, to_device_units(5.0, dpi));
        assert_eq!(rect.y, to_device_units(7.0, dpi));
        assert_eq!(rect.w, to_device_units(20.0, dpi));
        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[0], DrawCommand::Text { content, .. } if content.is_empty()));
        assert_eq!(commands[1], DrawCommand::line(rect.x, rect.y, rect.x, rect.bottom(), &styles.cell_style("boxed").unwrap().borders.left));
        assert_eq!(commands[2], DrawCommand::line(rect.x, rect.y, rect.right(), rect.y, &styles.cell_style("boxed").unwrap().borders.top));
    }

    #[test]
    fn test_elide_empty_text() {
        let styles = StyleRegistry::new();
        let geometry = SheetGeometry::from_extents(&[10.0], &[10.0, 10.0]);
        let page = page_with_margins(0.0, 0.0);
        let mut renderer = renderer(&styles, &geometry, &page);
        renderer.elide_empty_text = true;
        let row = dom::parse(
            r#"<table:table-row><table:table-cell/><table:table-cell><text:p>b</text:p></table:table-cell></table:table-row>"#,
        )
        .unwrap();
        let (commands, _) = renderer.render_row(0, &row);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_cell_text_expands_whitespace_elements() {
        let cell = dom::parse(
            r#"<table:table-cell><office:annotation><text:p>note</text:p></office:annotation><text:p>a<text:s text:c="3"/>b<text:tab/>c</text:p><text:p><text:span>second</text:span><text:line-break/>line</text:p></table:table-cell>"#,
        )
        .unwrap();
        assert_eq!(cell_text(&cell), "a   b\tc\nsecond\nline");
    }
}
