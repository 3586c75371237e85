//! sheetdraw-core: layout and style resolution for ODF spreadsheets
//!
//! Reads the content and styles trees of an `.ods` package, resolves cell,
//! row, column and page styles, and emits an ordered stream of
//! device-independent draw commands per sheet. Painting is left to the caller.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod geometry;
pub mod page;
pub mod reader;
pub mod render;
pub mod style;

use serde::Serialize;
use std::path::Path;

pub use config::{PageSize, RenderConfig, SheetConfig};
pub use diagnostic::{CellReference, Diagnostic, DiagnosticKind, DiagnosticScope, Diagnostics, Severity};
pub use error::{RenderError, Result};
pub use page::{Orientation, PageLayoutStyle};
pub use reader::{DocumentKind, DocumentTrees, MemoryPackage, PackageSource, ZipPackage};
pub use render::{DrawCommand, SheetRender};
pub use style::{Alignment, BorderSpec, CellStyle};

/// Output of one render pass
#[derive(Debug, Clone, Serialize)]
pub struct Rendering {
    pub kind: DocumentKind,
    pub sheets: Vec<SheetRender>,
    /// Recovered conditions, sorted by scope
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendering {
    pub fn sheet(&self, name: &str) -> Option<&SheetRender> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// All commands of all sheets, in sheet order
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.sheets.iter().flat_map(|s| s.commands.iter())
    }
}

/// Main renderer interface
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with default configuration
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    /// Create a new renderer with custom configuration
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render an `.ods` package on disk
    pub fn render_file<P: AsRef<Path>>(&self, path: P) -> Result<Rendering> {
        let path = path.as_ref();
        log::info!("Rendering {}", path.display());
        let mut package = ZipPackage::open(path)?;
        self.render_package(&mut package)
    }

    /// Render from any package source. Only `content.xml` is mandatory.
    pub fn render_package(&self, package: &mut impl PackageSource) -> Result<Rendering> {
        let trees = reader::load_trees(package)?;
        Ok(self.render_trees(&trees))
    }

    /// Render already-extracted `content.xml` and `styles.xml` text
    pub fn render_xml(&self, content: &str, styles: Option<&str>) -> Result<Rendering> {
        let mut package = MemoryPackage::new().with_entry(reader::CONTENT_ENTRY, content);
        if let Some(styles) = styles {
            package.insert(reader::STYLES_ENTRY, styles);
        }
        self.render_package(&mut package)
    }

    /// Render parsed trees. Registries and geometry are rebuilt on every call.
    pub fn render_trees(&self, trees: &DocumentTrees) -> Rendering {
        let kind = DocumentKind::detect(&trees.content);
        if kind != DocumentKind::Spreadsheet {
            log::warn!("Document is not a spreadsheet ({:?}); nothing to render", kind);
            return Rendering {
                kind,
                sheets: Vec::new(),
                diagnostics: Vec::new(),
            };
        }

        let mut diagnostics = Diagnostics::new();
        let styles = style::StyleRegistry::build(&trees.content, trees.styles.as_ref(), &mut diagnostics);
        let pages = page::PageLayoutRegistry::build(
            trees.styles.as_ref(),
            &self.config.master_page_marker,
            self.config.default_page,
            &mut diagnostics,
        );
        if trees.styles.is_none() {
            diagnostics.push(
                DiagnosticKind::PageLayoutMissing,
                DiagnosticScope::Document,
                format!("package has no {}", reader::STYLES_ENTRY),
            );
        }

        let mut sheets = Vec::new();
        for (index, table) in render::sheet_tables(&trees.content).into_iter().enumerate() {
            let name = render::sheet_name(table, index);
            if !self.config.is_sheet_enabled(&name) {
                log::debug!("Skipping sheet '{}'", name);
                continue;
            }
            sheets.push(render::render_sheet(
                name,
                table,
                &styles,
                &pages,
                &self.config,
                &mut diagnostics,
            ));
        }

        Rendering {
            kind,
            sheets,
            diagnostics: diagnostics.into_sorted(),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
