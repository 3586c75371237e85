//! Style registry: `style:style` definitions resolved into per-family records

use crate::diagnostic::{DiagnosticKind, DiagnosticScope, Diagnostics};
use crate::reader::Element;
use crate::reader::units::{parse_length_mm, parse_stripped};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod border;

pub use border::{BorderSpec, CellBorders, parse_border};

/// Structural role a style applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleFamily {
    Table,
    Row,
    Column,
    Cell,
}

impl StyleFamily {
    /// Parse the `style:family` attribute. Non-table families are `None`.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "table" => Some(Self::Table),
            "table-row" => Some(Self::Row),
            "table-column" => Some(Self::Column),
            "table-cell" => Some(Self::Cell),
            _ => None,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Start,
    End,
    Center,
}

impl Alignment {
    pub fn from_text_align(value: &str) -> Self {
        match value {
            "end" | "right" => Self::End,
            "center" => Self::Center,
            _ => Self::Start,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStyleInfo {
    /// Master page the sheet prints with, when the style names one
    pub master_page_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowStyleInfo {
    pub height_mm: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStyleInfo {
    pub width_mm: f64,
}

/// Resolved cell style. The default value is what unresolved names get.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub font_name: String,
    pub font_size_pt: f64,
    pub alignment: Alignment,
    /// Empty when the cell has no fill
    pub background_color_hex: String,
    pub borders: CellBorders,
}

/// One style definition, tagged by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleDefinition {
    Table(TableStyleInfo),
    Row(RowStyleInfo),
    Column(ColumnStyleInfo),
    Cell(CellStyle),
}

impl StyleDefinition {
    pub fn family(&self) -> StyleFamily {
        match self {
            StyleDefinition::Table(_) => StyleFamily::Table,
            StyleDefinition::Row(_) => StyleFamily::Row,
            StyleDefinition::Column(_) => StyleFamily::Column,
            StyleDefinition::Cell(_) => StyleFamily::Cell,
        }
    }
}

/// Lookup from style name to definition, built once per render pass
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, StyleDefinition>,
    default_cell: CellStyle,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the content tree. Common styles from `styles.xml` are read
    /// first so that content definitions take precedence on a name clash.
    pub fn build(content: &Element, styles: Option<&Element>, diagnostics: &mut Diagnostics) -> Self {
        let mut registry = Self::new();
        for tree in styles.into_iter().chain(std::iter::once(content)) {
            for element in tree.find_all_by_tag("style:style") {
                registry.add_element(element, diagnostics);
            }
        }
        log::debug!("Style registry holds {} definitions", registry.len());
        registry
    }

    fn add_element(&mut self, element: &Element, diagnostics: &mut Diagnostics) {
        let Some(name) = element.attribute("style:name") else {
            return;
        };
        let Some(family) = element.attribute("style:family").and_then(StyleFamily::from_attr) else {
            return;
        };
        let definition = parse_definition(name, family, element, diagnostics);
        self.insert(name, definition);
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: StyleDefinition) {
        self.styles.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// `None` when the name is missing or is not a row style
    pub fn row_height_mm(&self, name: &str) -> Option<f64> {
        match self.styles.get(name) {
            Some(StyleDefinition::Row(info)) => Some(info.height_mm),
            _ => None,
        }
    }

    /// `None` when the name is missing or is not a column style
    pub fn column_width_mm(&self, name: &str) -> Option<f64> {
        match self.styles.get(name) {
            Some(StyleDefinition::Column(info)) => Some(info.width_mm),
            _ => None,
        }
    }

    pub fn table_style(&self, name: &str) -> Option<&TableStyleInfo> {
        match self.styles.get(name) {
            Some(StyleDefinition::Table(info)) => Some(info),
            _ => None,
        }
    }

    pub fn cell_style(&self, name: &str) -> Option<&CellStyle> {
        match self.styles.get(name) {
            Some(StyleDefinition::Cell(style)) => Some(style),
            _ => None,
        }
    }

    /// Zero-extent, no-border, start-aligned style for unresolved names
    pub fn default_cell_style(&self) -> &CellStyle {
        &self.default_cell
    }
}

fn parse_definition(
    name: &str,
    family: StyleFamily,
    element: &Element,
    diagnostics: &mut Diagnostics,
) -> StyleDefinition {
    let mut malformed = |what: &str, token: &str| {
        diagnostics.push(
            DiagnosticKind::NumericMalformed,
            DiagnosticScope::Document,
            format!("style '{}': {} '{}' is not a number", name, what, token),
        );
    };

    match family {
        StyleFamily::Table => StyleDefinition::Table(TableStyleInfo {
            master_page_name: element
                .attribute("style:master-page-name")
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        }),
        StyleFamily::Row => {
            let height = structural_properties(element, "style:table-row-properties")
                .and_then(|p| p.attribute("style:row-height"))
                .map(|token| parse_length_mm(token).unwrap_or_else(|t| {
                    malformed("row height", &t);
                    0.0
                }))
                .unwrap_or(0.0);
            StyleDefinition::Row(RowStyleInfo { height_mm: height })
        }
        StyleFamily::Column => {
            let width = structural_properties(element, "style:table-column-properties")
                .and_then(|p| p.attribute("style:column-width"))
                .map(|token| parse_length_mm(token).unwrap_or_else(|t| {
                    malformed("column width", &t);
                    0.0
                }))
                .unwrap_or(0.0);
            StyleDefinition::Column(ColumnStyleInfo { width_mm: width })
        }
        StyleFamily::Cell => {
            let text = element.first_child_by_tag("style:text-properties");
            let cell = element.first_child_by_tag("style:table-cell-properties");
            let paragraph = element.first_child_by_tag("style:paragraph-properties");

            let font_size_pt = text
                .and_then(|t| t.attribute("fo:font-size"))
                .map(|token| parse_stripped(token).unwrap_or_else(|t| {
                    malformed("font size", &t);
                    0.0
                }))
                .unwrap_or(0.0);

            let borders = CellBorders::from_properties(cell, |attr, token| {
                malformed(attr, token);
            });

            StyleDefinition::Cell(CellStyle {
                font_name: text
                    .and_then(|t| t.attribute("style:font-name"))
                    .unwrap_or_default()
                    .to_string(),
                font_size_pt,
                alignment: paragraph
                    .and_then(|p| p.attribute("fo:text-align"))
                    .map(Alignment::from_text_align)
                    .unwrap_or_default(),
                background_color_hex: cell
                    .and_then(|c| c.attribute("fo:background-color"))
                    .filter(|c| !c.eq_ignore_ascii_case("transparent"))
                    .unwrap_or_default()
                    .to_string(),
                borders,
            })
        }
    }
}

/// The properties child of a row/column style, falling back to the first
/// child whatever its tag
fn structural_properties<'a>(element: &'a Element, tag: &str) -> Option<&'a Element> {
    element
        .first_child_by_tag(tag)
        .or_else(|| element.first_child())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::dom;

    const CONTENT: &str = r##"<office:document-content>
<office:automatic-styles>
  <style:style style:name="co1" style:family="table-column">
    <style:table-column-properties style:column-width="22.58mm"/>
  </style:style>
  <style:style style:name="co2" style:family="table-column">
    <style:table-column-properties style:column-width="2cm"/>
  </style:style>
  <style:style style:name="ro1" style:family="table-row">
    <style:table-row-properties style:row-height="4.52mm"/>
  </style:style>
  <style:style style:name="ro2" style:family="table-row">
    <style:table-row-properties style:row-height="tall"/>
  </style:style>
  <style:style style:name="ta1" style:family="table" style:master-page-name="Report">
    <style:table-properties table:display="true"/>
  </style:style>
  <style:style style:name="ce1" style:family="table-cell">
    <style:table-cell-properties fo:background-color="#ffcc00" fo:border="0.5pt solid #000000" fo:border-right="none"/>
    <style:paragraph-properties fo:text-align="center"/>
    <style:text-properties style:font-name="Liberation Sans" fo:font-size="10pt"/>
  </style:style>
  <style:style style:name="ce2" style:family="table-cell">
    <style:table-cell-properties fo:background-color="transparent"/>
    <style:paragraph-properties fo:text-align="end"/>
  </style:style>
  <style:style style:name="P1" style:family="paragraph"/>
</office:automatic-styles>
</office:document-content>"##;

    fn build(xml: &str) -> (StyleRegistry, Vec<crate::diagnostic::Diagnostic>) {
        let tree = dom::parse(xml).unwrap();
        let mut diagnostics = Diagnostics::new();
        let registry = StyleRegistry::build(&tree, None, &mut diagnostics);
        (registry, diagnostics.into_sorted())
    }

    #[test]
    fn test_geometry_families() {
        let (registry, _) = build(CONTENT);
        assert_eq!(registry.column_width_mm("co1"), Some(22.58));
        assert_eq!(registry.column_width_mm("co2"), Some(20.0));
        assert_eq!(registry.row_height_mm("ro1"), Some(4.52));
        assert_eq!(registry.get("ta1").map(|s| s.family()), Some(StyleFamily::Table));
        assert_eq!(
            registry.table_style("ta1").and_then(|t| t.master_page_name.as_deref()),
            Some("Report")
        );
        // Wrong family is not a row style
        assert_eq!(registry.row_height_mm("co1"), None);
    }

    #[test]
    fn test_malformed_size_recovers_as_zero() {
        let (registry, diagnostics) = build(CONTENT);
        assert_eq!(registry.row_height_mm("ro2"), Some(0.0));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::NumericMalformed);
        assert!(diagnostics[0].message.contains("ro2"));
    }

    #[test]
    fn test_cell_style() {
        let (registry, _) = build(CONTENT);
        let ce1 = registry.cell_style("ce1").unwrap();
        assert_eq!(ce1.font_name, "Liberation Sans");
        assert_eq!(ce1.font_size_pt, 10.0);
        assert_eq!(ce1.alignment, Alignment::Center);
        assert_eq!(ce1.background_color_hex, "#ffcc00");
        assert_eq!(ce1.borders.left.width_mm, 0.5);
        assert_eq!(ce1.borders.top.color_hex, "#000000");
        assert!(!ce1.borders.right.is_visible());

        let ce2 = registry.cell_style("ce2").unwrap();
        assert_eq!(ce2.alignment, Alignment::End);
        assert!(ce2.background_color_hex.is_empty());
        assert_eq!(ce2.font_size_pt, 0.0);
    }

    #[test]
    fn test_unrecognized_family_dropped() {
        let (registry, _) = build(CONTENT);
        assert!(registry.get("P1").is_none());
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_default_cell_style() {
        let registry = StyleRegistry::new();
        assert!(registry.cell_style("missing").is_none());
        let default = registry.default_cell_style();
        assert_eq!(default.alignment, Alignment::Start);
        assert!(default.background_color_hex.is_empty());
        assert!(!default.borders.left.is_visible());
    }

    #[test]
    fn test_content_overrides_common_styles() {
        let common = dom::parse(
            r#"<office:document-styles><office:styles>
<style:style style:name="Default" style:family="table-cell"><style:text-properties style:font-name="Arial"/></style:style>
<style:style style:name="ce1" style:family="table-cell"><style:text-properties style:font-name="Arial"/></style:style>
</office:styles></office:document-styles>"#,
        )
        .unwrap();
        let content = dom::parse(CONTENT).unwrap();
        let mut diagnostics = Diagnostics::new();
        let registry = StyleRegistry::build(&content, Some(&common), &mut diagnostics);

        assert_eq!(registry.cell_style("Default").unwrap().font_name, "Arial");
        assert_eq!(registry.cell_style("ce1").unwrap().font_name, "Liberation Sans");
    }
}
