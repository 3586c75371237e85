//! Cell border parsing: `<width><unit> <stroke-kind> <color>`

use crate::reader::Element;
use crate::reader::units::parse_stripped;
use serde::{Deserialize, Serialize};

const BORDER_DEFAULT_ATTR: &str = "fo:border";
const BORDER_LEFT_ATTR: &str = "fo:border-left";
const BORDER_RIGHT_ATTR: &str = "fo:border-right";
const BORDER_TOP_ATTR: &str = "fo:border-top";
const BORDER_BOTTOM_ATTR: &str = "fo:border-bottom";

/// One edge of a cell border. The default value draws nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    /// Declared width with its unit suffix stripped
    pub width_mm: f64,
    pub stroke_kind: String,
    pub color_hex: String,
}

impl BorderSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.width_mm > 0.0
    }
}

/// Parse a border attribute value.
///
/// Returns `Err(token)` when the width is not a number; callers recover with
/// [`BorderSpec::none`].
pub fn parse_border(value: &str) -> Result<BorderSpec, String> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.is_empty() || tokens.iter().any(|t| t.eq_ignore_ascii_case("none")) {
        return Ok(BorderSpec::none());
    }

    let width = parse_stripped(tokens[0])?;
    if width <= 0.0 {
        return Ok(BorderSpec::none());
    }

    Ok(BorderSpec {
        width_mm: width,
        stroke_kind: tokens.get(1).map(|s| s.to_string()).unwrap_or_default(),
        color_hex: tokens.get(2).map(|s| s.to_string()).unwrap_or_default(),
    })
}

/// Borders of the four edges of a cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellBorders {
    pub left: BorderSpec,
    pub right: BorderSpec,
    pub top: BorderSpec,
    pub bottom: BorderSpec,
}

impl CellBorders {
    /// Resolve the four edges from a `style:table-cell-properties` element.
    ///
    /// An edge attribute wins over `fo:border`; an edge with neither has no
    /// border. Malformed tokens are passed to `on_malformed` and resolve to
    /// no border.
    pub fn from_properties(
        properties: Option<&Element>,
        mut on_malformed: impl FnMut(&str, &str),
    ) -> Self {
        let Some(properties) = properties else {
            return Self::default();
        };

        let mut parse_attr = |attr: &str| -> Option<BorderSpec> {
            let value = properties.attribute(attr)?;
            Some(parse_border(value).unwrap_or_else(|token| {
                on_malformed(attr, &token);
                BorderSpec::none()
            }))
        };

        let default = parse_attr(BORDER_DEFAULT_ATTR).unwrap_or_default();
        let left = parse_attr(BORDER_LEFT_ATTR);
        let right = parse_attr(BORDER_RIGHT_ATTR);
        let top = parse_attr(BORDER_TOP_ATTR);
        let bottom = parse_attr(BORDER_BOTTOM_ATTR);

        Self {
            left: left.unwrap_or_else(|| default.clone()),
            right: right.unwrap_or_else(|| default.clone()),
            top: top.unwrap_or_else(|| default.clone()),
            bottom: bottom.unwrap_or(default),
        }
    }
}
