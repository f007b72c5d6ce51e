//! Line-oriented `X Y ANGLE` minutiae text.
//!
//! ```text
//! 12 40 90
//! 30 41 270 78
//! ```
//!
//! Fields are separated by whitespace. Columns after the third (such as the
//! quality column written by minutiae detectors) are ignored, and blank
//! lines are skipped.

use crate::error::TemplateError;
use crate::minutia::Minutia;
use crate::template::Template;

impl Template {
    /// Parses `text` and builds a template with `num_neighbors` descriptors
    /// per minutia.
    ///
    /// At most `max_minutiae` records are read; the rest of the input is not
    /// inspected.
    pub fn from_xyt(text: &str, max_minutiae: usize, num_neighbors: usize) -> Result<Self, TemplateError> {
        if num_neighbors == 0 {
            return Err(TemplateError::InvalidParameter(
                "num_neighbors must be positive".into(),
            ));
        }
        let minutiae = parse_xyt(text, max_minutiae)?;
        Self::build(minutiae, num_neighbors)
    }
}

/// Parses up to `max_minutiae` records. Ids follow input order.
pub fn parse_xyt(text: &str, max_minutiae: usize) -> Result<Vec<Minutia>, TemplateError> {
    if max_minutiae == 0 {
        return Err(TemplateError::InvalidParameter(
            "max_minutiae must be positive".into(),
        ));
    }

    let mut minutiae = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if minutiae.len() >= max_minutiae {
            break;
        }
        let line_no = index + 1;
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };

        let x = parse_value(first, line_no, "x")?;
        let y = parse_value(next_field(&mut fields, line_no, "y")?, line_no, "y")?;
        let angle = parse_value(next_field(&mut fields, line_no, "angle")?, line_no, "angle")?;
        if angle > 359 {
            return Err(TemplateError::Parser {
                line: line_no,
                reason: format!("angle {angle} exceeds 359"),
            });
        }

        minutiae.push(Minutia::new(minutiae.len() as u32, x, y, angle));
    }

    if minutiae.is_empty() {
        return Err(TemplateError::Parser {
            line: 0,
            reason: "no minutiae found".into(),
        });
    }
    tracing::trace!(count = minutiae.len(), "parsed xyt minutiae");
    Ok(minutiae)
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    line: usize,
    name: &str,
) -> Result<&'a str, TemplateError> {
    fields.next().ok_or_else(|| TemplateError::Parser {
        line,
        reason: format!("missing {name}"),
    })
}

fn parse_value(field: &str, line: usize, name: &str) -> Result<u32, TemplateError> {
    let value: i64 = field.parse().map_err(|_| TemplateError::Parser {
        line,
        reason: format!("{name}: {field:?} is not an integer"),
    })?;
    if value < 0 {
        return Err(TemplateError::Parser {
            line,
            reason: format!("{name}: negative value {value}"),
        });
    }
    u32::try_from(value).map_err(|_| TemplateError::Parser {
        line,
        reason: format!("{name}: value {value} too large"),
    })
}
