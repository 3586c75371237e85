//! Configuration for a render pass

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Marker LibreOffice puts in front of the sheet name of a master page
pub const DEFAULT_MASTER_PAGE_MARKER: &str = "PageStyle_";

/// Main render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Device pixels per inch of the target surface
    #[serde(default = "default_resolution_dpi")]
    pub resolution_dpi: f64,
    /// Token stripped from master-page display names to get the sheet name
    #[serde(default = "default_master_page_marker")]
    pub master_page_marker: String,
    /// Drop zero-length text commands
    #[serde(default)]
    pub elide_empty_text: bool,
    /// Emit rows on the rayon pool
    #[serde(default)]
    pub parallel_rows: bool,
    /// Page size used when a sheet has no page layout bound
    #[serde(default)]
    pub default_page: PageSize,
    #[serde(default)]
    pub sheets: HashMap<String, SheetConfig>,
}

impl RenderConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RenderConfig =
            toml::from_str(content).map_err(|e| RenderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.resolution_dpi.is_finite() || self.resolution_dpi <= 0.0 {
            return Err(RenderError::Config(format!(
                "resolution_dpi must be a positive number, got {}",
                self.resolution_dpi
            )));
        }
        if self.master_page_marker.is_empty() {
            return Err(RenderError::Config(
                "master_page_marker must not be empty".to_string(),
            ));
        }
        if self.default_page.width_mm <= 0.0 || self.default_page.height_mm <= 0.0 {
            return Err(RenderError::Config(
                "default_page dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sheet(&self, sheet_name: &str) -> Option<&SheetConfig> {
        self.sheets.get(sheet_name)
    }

    /// Check if a sheet should be rendered
    pub fn is_sheet_enabled(&self, sheet_name: &str) -> bool {
        !self.sheet(sheet_name).map(|s| s.skip).unwrap_or(false)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resolution_dpi: default_resolution_dpi(),
            master_page_marker: default_master_page_marker(),
            elide_empty_text: false,
            parallel_rows: false,
            default_page: PageSize::default(),
            sheets: HashMap::new(),
        }
    }
}

fn default_resolution_dpi() -> f64 {
    96.0
}

fn default_master_page_marker() -> String {
    DEFAULT_MASTER_PAGE_MARKER.to_string()
}

/// Page dimensions in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Default for PageSize {
    /// A4
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }
}

/// Sheet-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Leave this sheet out of the output
    #[serde(default)]
    pub skip: bool,
    pub margin_top_mm: Option<f64>,
    pub margin_bottom_mm: Option<f64>,
    pub margin_left_mm: Option<f64>,
    pub margin_right_mm: Option<f64>,
}
