//! Output formatters for renderings

use anyhow::Result;
use colored::*;
use sheetdraw_core::render::count_by_kind;
use sheetdraw_core::{Diagnostic, DiagnosticScope, DocumentKind, Orientation, Rendering, Severity};
use std::collections::BTreeMap;
use std::path::Path;

/// Print a per-sheet summary with colors, then the diagnostics grouped by scope
pub fn print_human(file_path: &Path, rendering: &Rendering) {
    println!("{}", format!("Rendering: {}", file_path.display()).bold());
    println!();

    if rendering.kind != DocumentKind::Spreadsheet {
        println!(
            "{}",
            format!("Not a spreadsheet ({:?}); nothing rendered", rendering.kind)
                .yellow()
                .bold()
        );
        return;
    }

    for sheet in &rendering.sheets {
        let page = &sheet.page;
        let orientation = match page.orientation {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        };
        println!("{} {}", "Sheet:".bold(), sheet.name.cyan().bold());
        println!(
            "  {} {:.1} x {:.1} mm, {}",
            "Page:".bold(),
            page.width_mm,
            page.height_mm,
            orientation
        );
        println!(
            "  {} top {:.1}, bottom {:.1}, left {:.1}, right {:.1} mm",
            "Margins:".bold(),
            page.margin_top_mm,
            page.margin_bottom_mm,
            page.margin_left_mm,
            page.margin_right_mm
        );
        let (fills, texts, lines) = count_by_kind(&sheet.commands);
        println!(
            "  {} {} ({} fills, {} texts, {} lines)",
            "Commands:".bold(),
            sheet.commands.len(),
            fills,
            texts,
            lines
        );
        println!();
    }

    print_diagnostics(&rendering.diagnostics);
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("{}", "✓ No diagnostics".green().bold());
        return;
    }

    // Group diagnostics by scope for hierarchical display
    let mut document_diagnostics = Vec::new();
    let mut sheet_diagnostics: BTreeMap<String, Vec<&Diagnostic>> = BTreeMap::new();
    let mut cell_diagnostics: BTreeMap<String, Vec<&Diagnostic>> = BTreeMap::new();

    for diagnostic in diagnostics {
        match &diagnostic.scope {
            DiagnosticScope::Document => document_diagnostics.push(diagnostic),
            DiagnosticScope::Sheet(sheet) => {
                sheet_diagnostics
                    .entry(sheet.clone())
                    .or_default()
                    .push(diagnostic);
            }
            DiagnosticScope::Cell(sheet, _) => {
                cell_diagnostics
                    .entry(sheet.clone())
                    .or_default()
                    .push(diagnostic);
            }
        }
    }

    if !document_diagnostics.is_empty() {
        println!("{}", "Document diagnostics:".bold().underline());
        for diagnostic in document_diagnostics {
            print_diagnostic(diagnostic, 1);
        }
        println!();
    }

    for (sheet_name, diagnostics) in &sheet_diagnostics {
        println!("{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for diagnostic in diagnostics {
            print_diagnostic(diagnostic, 1);
        }
        println!();
    }

    // Cells keep the row-major order of the sorted input
    for (sheet_name, diagnostics) in &cell_diagnostics {
        println!("{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for diagnostic in diagnostics {
            if let DiagnosticScope::Cell(_, cell) = &diagnostic.scope {
                println!("  {} {}", "Cell:".bold(), cell.to_string().yellow());
            }
            print_diagnostic(diagnostic, 2);
        }
        println!();
    }

    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    let info_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Info)
        .count();

    println!("{}", "Summary:".bold().underline());
    if warning_count > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), warning_count);
    }
    if info_count > 0 {
        println!("  {} {}", "Info:".blue().bold(), info_count);
    }
}

fn print_diagnostic(diagnostic: &Diagnostic, indent: usize) {
    let indent_str = "  ".repeat(indent);
    let severity_str = match diagnostic.severity {
        Severity::Warning => "WARN".yellow().bold(),
        Severity::Info => "INFO".blue().bold(),
    };

    println!(
        "{}{} [{}] {}",
        indent_str,
        severity_str,
        diagnostic.kind.to_string().bright_black(),
        diagnostic.message
    );
}

/// Print the full rendering in JSON format
pub fn print_json(file_path: &Path, rendering: &Rendering) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "kind": rendering.kind,
        "sheets": rendering.sheets,
        "diagnostics": rendering.diagnostics,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
