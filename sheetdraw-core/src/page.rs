//! Page layouts from `styles.xml` and their binding to sheets
//!
//! A sheet is bound to a layout through a master page whose display name is
//! the sheet name behind a marker token (`PageStyle_Sheet1`). This is a naming
//! convention of the producing application, not something ODF guarantees, so
//! a table style naming a master page is honoured as a fallback.

use crate::config::PageSize;
use crate::diagnostic::{DiagnosticKind, DiagnosticScope, Diagnostics};
use crate::reader::Element;
use crate::reader::units::parse_length_mm;
use crate::style::TableStyleInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Absent means portrait; any token other than `portrait` is landscape
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("portrait") => Orientation::Portrait,
            Some(_) => Orientation::Landscape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayoutStyle {
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: Orientation,
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub margin_right_mm: f64,
}

impl PageLayoutStyle {
    /// Zero margins, portrait, at the given size
    pub fn fallback(size: PageSize) -> Self {
        Self {
            width_mm: size.width_mm,
            height_mm: size.height_mm,
            orientation: Orientation::Portrait,
            margin_top_mm: 0.0,
            margin_bottom_mm: 0.0,
            margin_left_mm: 0.0,
            margin_right_mm: 0.0,
        }
    }
}

/// Page layouts by name plus the sheet and master-page bindings
#[derive(Debug, Clone, Default)]
pub struct PageLayoutRegistry {
    layouts: HashMap<String, PageLayoutStyle>,
    /// sheet name -> page layout name
    sheet_bindings: HashMap<String, String>,
    /// master page name -> page layout name
    master_pages: HashMap<String, String>,
}

impl PageLayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        styles: Option<&Element>,
        marker: &str,
        default_size: PageSize,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut registry = Self::new();
        let Some(styles) = styles else {
            return registry;
        };

        for layout in styles.find_all_by_tag("style:page-layout") {
            let Some(name) = layout.attribute("style:name") else {
                continue;
            };
            for props in layout.find_all_by_tag("style:page-layout-properties") {
                let style = parse_layout_properties(name, props, default_size, diagnostics);
                registry.layouts.insert(name.to_string(), style);
            }
        }

        for master in styles.find_all_by_tag("style:master-page") {
            let Some(layout_name) = master.attribute("style:page-layout-name") else {
                continue;
            };
            if let Some(name) = master.attribute("style:name") {
                registry
                    .master_pages
                    .insert(name.to_string(), layout_name.to_string());
            }
            let display = master
                .attribute("style:display-name")
                .or_else(|| master.attribute("style:name"))
                .unwrap_or_default();
            if let Some(sheet) = sheet_name_from_master(display, marker) {
                registry
                    .sheet_bindings
                    .insert(sheet, layout_name.to_string());
            }
        }

        log::debug!(
            "Page layouts: {} layouts, {} sheet bindings",
            registry.layouts.len(),
            registry.sheet_bindings.len()
        );
        registry
    }

    pub fn layout(&self, name: &str) -> Option<&PageLayoutStyle> {
        self.layouts.get(name)
    }

    /// Page layout name bound to a sheet through the marker convention
    pub fn binding(&self, sheet_name: &str) -> Option<&str> {
        self.sheet_bindings.get(sheet_name).map(|s| s.as_str())
    }

    /// Layout for a sheet: marker binding first, then the master page named
    /// by the sheet's table style.
    pub fn resolve(
        &self,
        sheet_name: &str,
        table_style: Option<&TableStyleInfo>,
    ) -> Option<&PageLayoutStyle> {
        if let Some(layout) = self.binding(sheet_name).and_then(|name| self.layout(name)) {
            return Some(layout);
        }
        table_style
            .and_then(|t| t.master_page_name.as_deref())
            .and_then(|master| self.master_pages.get(master))
            .and_then(|name| self.layout(name))
    }
}

/// Strip the marker to get the sheet name; `None` when the marker is absent
pub fn sheet_name_from_master(display_name: &str, marker: &str) -> Option<String> {
    if marker.is_empty() || !display_name.contains(marker) {
        return None;
    }
    Some(display_name.replacen(marker, "", 1))
}

fn parse_layout_properties(
    name: &str,
    props: &Element,
    default_size: PageSize,
    diagnostics: &mut Diagnostics,
) -> PageLayoutStyle {
    let mut length = |attr: &str| -> Option<f64> {
        let token = props.attribute(attr)?;
        Some(parse_length_mm(token).unwrap_or_else(|t| {
            diagnostics.push(
                DiagnosticKind::NumericMalformed,
                DiagnosticScope::Document,
                format!("page layout '{}': {} '{}' is not a number", name, attr, t),
            );
            0.0
        }))
    };

    PageLayoutStyle {
        width_mm: length("fo:page-width").unwrap_or(default_size.width_mm),
        height_mm: length("fo:page-height").unwrap_or(default_size.height_mm),
        margin_top_mm: length("fo:margin-top").unwrap_or(0.0),
        margin_bottom_mm: length("fo:margin-bottom").unwrap_or(0.0),
        margin_left_mm: length("fo:margin-left").unwrap_or(0.0),
        margin_right_mm: length("fo:margin-right").unwrap_or(0.0),
        orientation: Orientation::from_attr(props.attribute("style:print-orientation")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::dom;

    const STYLES: &str = r#"<office:document-styles>
<office:automatic-styles>
  <style:page-layout style:name="pm1">
    <style:page-layout-properties fo:page-width="297mm" fo:page-height="210mm" style:print-orientation="landscape"
        fo:margin-top="10mm" fo:margin-bottom="12mm" fo:margin-left="2cm" fo:margin-right="15mm"/>
  </style:page-layout>
  <style:page-layout style:name="pm2">
    <style:page-layout-properties style:print-orientation="portrait" fo:margin-top="abc"/>
  </style:page-layout>
</office:automatic-styles>
<office:master-styles>
  <style:master-page style:name="PageStyle_5f_Sheet1" style:display-name="PageStyle_Sheet1" style:page-layout-name="pm1"/>
  <style:master-page style:name="Report" style:page-layout-name="pm2"/>
  <style:master-page style:name="Default" style:page-layout-name="pm2"/>
</office:master-styles>
</office:document-styles>"#;

    fn build() -> (PageLayoutRegistry, Diagnostics) {
        let tree = dom::parse(STYLES).unwrap();
        let mut diagnostics = Diagnostics::new();
        let registry =
            PageLayoutRegistry::build(Some(&tree), "PageStyle_", PageSize::default(), &mut diagnostics);
        (registry, diagnostics)
    }

    #[test]
    fn test_layout_properties() {
        let (registry, _) = build();
        let pm1 = registry.layout("pm1").unwrap();
        assert_eq!(pm1.width_mm, 297.0);
        assert_eq!(pm1.height_mm, 210.0);
        assert_eq!(pm1.orientation, Orientation::Landscape);
        assert_eq!(pm1.margin_top_mm, 10.0);
        assert_eq!(pm1.margin_bottom_mm, 12.0);
        assert_eq!(pm1.margin_left_mm, 20.0);
        assert_eq!(pm1.margin_right_mm, 15.0);
    }

    #[test]
    fn test_malformed_margin_and_default_size() {
        let (registry, diagnostics) = build();
        let pm2 = registry.layout("pm2").unwrap();
        assert_eq!(pm2.margin_top_mm, 0.0);
        assert_eq!(pm2.width_mm, 210.0);
        assert_eq!(pm2.orientation, Orientation::Portrait);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_marker_binding() {
        let (registry, _) = build();
        assert_eq!(registry.binding("Sheet1"), Some("pm1"));
        assert_eq!(registry.binding("Report"), None);
        assert_eq!(registry.resolve("Sheet1", None).unwrap().margin_left_mm, 20.0);
        assert!(registry.resolve("Sheet2", None).is_none());
    }

    #[test]
    fn test_table_style_fallback() {
        let (registry, _) = build();
        let table_style = TableStyleInfo {
            master_page_name: Some("Report".to_string()),
        };
        let layout = registry.resolve("Other", Some(&table_style)).unwrap();
        assert_eq!(layout, registry.layout("pm2").unwrap());

        // Marker binding wins over the table style
        let layout = registry.resolve("Sheet1", Some(&table_style)).unwrap();
        assert_eq!(layout.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_sheet_name_from_master() {
        assert_eq!(sheet_name_from_master("PageStyle_Sheet1", "PageStyle_"), Some("Sheet1".to_string()));
        assert_eq!(sheet_name_from_master("Default", "PageStyle_"), None);
        assert_eq!(sheet_name_from_master("PageStyle_", "PageStyle_"), Some(String::new()));
    }

    #[test]
    fn test_orientation() {
        assert_eq!(Orientation::from_attr(None), Orientation::Portrait);
        assert_eq!(Orientation::from_attr(Some("portrait")), Orientation::Portrait);
        assert_eq!(Orientation::from_attr(Some("landscape")), Orientation::Landscape);
        assert_eq!(Orientation::from_attr(Some("sideways")), Orientation::Landscape);
    }

    #[test]
    fn test_missing_styles_tree() {
        let mut diagnostics = Diagnostics::new();
        let registry = PageLayoutRegistry::build(None, "PageStyle_", PageSize::default(), &mut diagnostics);
        assert!(registry.resolve("Sheet1", None).is_none());
        assert!(diagnostics.is_empty());
    }
}
