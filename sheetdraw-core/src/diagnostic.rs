//! Recovered-condition reporting with hierarchical scopes

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// Kind of recovered condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A row, column or cell referenced a style missing from the registry
    StyleUnresolved,
    /// A size, margin or border-width token was not a number
    NumericMalformed,
    /// No page layout is bound to a sheet, or `styles.xml` is absent
    PageLayoutMissing,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::StyleUnresolved => Severity::Warning,
            DiagnosticKind::NumericMalformed => Severity::Warning,
            DiagnosticKind::PageLayoutMissing => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::StyleUnresolved => "style-unresolved",
            DiagnosticKind::NumericMalformed => "numeric-malformed",
            DiagnosticKind::PageLayoutMissing => "page-layout-missing",
        };
        f.write_str(label)
    }
}

/// Scope of a diagnostic (document, sheet, or cell level)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticScope {
    /// Document-level (style definitions, page layouts)
    Document,
    /// Sheet-level
    Sheet(String),
    /// Cell-level
    Cell(String, CellReference),
}

impl DiagnosticScope {
    /// Get the sheet name if this is a sheet or cell scope
    pub fn sheet_name(&self) -> Option<&str> {
        match self {
            DiagnosticScope::Document => None,
            DiagnosticScope::Sheet(name) => Some(name),
            DiagnosticScope::Cell(name, _) => Some(name),
        }
    }
}

impl fmt::Display for DiagnosticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticScope::Document => f.write_str("document"),
            DiagnosticScope::Sheet(name) => f.write_str(name),
            DiagnosticScope::Cell(name, cell) => write!(f, "{}!{}", name, cell),
        }
    }
}

impl PartialOrd for DiagnosticScope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosticScope {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DiagnosticScope::Document, DiagnosticScope::Document) => Ordering::Equal,
            (DiagnosticScope::Document, _) => Ordering::Less,
            (_, DiagnosticScope::Document) => Ordering::Greater,
            (DiagnosticScope::Sheet(a), DiagnosticScope::Sheet(b)) => a.cmp(b),
            (DiagnosticScope::Sheet(_), DiagnosticScope::Cell(_, _)) => Ordering::Less,
            (DiagnosticScope::Cell(_, _), DiagnosticScope::Sheet(_)) => Ordering::Greater,
            (DiagnosticScope::Cell(sheet_a, cell_a), DiagnosticScope::Cell(sheet_b, cell_b)) => {
                sheet_a.cmp(sheet_b).then_with(|| cell_a.cmp(cell_b))
            }
        }
    }
}

/// Cell reference (e.g., A1, B2), 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to spreadsheet-style reference (e.g., "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row + 1)
    }

    /// Convert column number to letter (0 -> A, 1 -> B, etc.)
    fn col_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

impl PartialOrd for CellReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// A condition the pipeline recovered from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub scope: DiagnosticScope,
    /// Human-readable message
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, scope: DiagnosticScope, message: impl Into<String>) -> Self {
        Self {
            kind,
            scope,
            message: message.into(),
            severity: kind.severity(),
        }
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scope
            .cmp(&other.scope)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.message.cmp(&other.message))
    }
}

/// Collector threaded through one render pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, scope: DiagnosticScope, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, scope, message);
        log::debug!("{} ({:?}): {}", diagnostic.kind, diagnostic.scope, diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sorted by scope, duplicates removed
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items.sort();
        self.items.dedup();
        self.items
    }
}
