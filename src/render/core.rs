use std::io::Write;

use unicode_width::UnicodeWidthChar;

use crate::error::Result;
use crate::geometry::{GridPosition, columns_f64};
use crate::projection::DisplayLayout;
use crate::widget::Widget;

use super::width::clip_to_width;

const OVERLAP: &str = "#";

/// Character-grid sketch of a layout, for terminals and test output.
///
/// Each grid unit is `chars_per_unit` characters wide and `lines_per_unit`
/// lines tall; half units are rounded outward so every widget keeps at
/// least its full extent. Cells claimed by more than one widget are drawn
/// as `#`. Output stops after [`TextPreview::MAX_LINES`] lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPreview {
    chars_per_unit: usize,
    lines_per_unit: usize,
}

impl Default for TextPreview {
    fn default() -> Self {
        Self {
            chars_per_unit: 2,
            lines_per_unit: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    glyph: String,
    owner: Option<usize>,
}

impl TextPreview {
    pub const MAX_LINES: usize = 2048;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(chars_per_unit: usize, lines_per_unit: usize) -> Self {
        Self {
            chars_per_unit: chars_per_unit.max(1),
            lines_per_unit: lines_per_unit.max(1),
        }
    }

    pub fn render(&self, widgets: &[Widget], columns: u32) -> String {
        self.render_lines(widgets, columns).join("\n")
    }

    pub fn render_display(&self, display: &DisplayLayout) -> String {
        self.render(&display.widgets(), display.columns)
    }

    pub fn write_to(&self, writer: &mut impl Write, widgets: &[Widget], columns: u32) -> Result<()> {
        for line in self.render_lines(widgets, columns) {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn render_lines(&self, widgets: &[Widget], columns: u32) -> Vec<String> {
        let width = (columns_f64(columns) * self.chars_per_unit as f64).ceil() as usize;
        let spans: Vec<_> = widgets
            .iter()
            .map(|widget| self.span(&widget.position.finite_or_default(), width))
            .collect();
        let height = spans
            .iter()
            .filter(|span| span.bottom > span.top)
            .map(|span| span.bottom)
            .max()
            .unwrap_or(0);

        let blank = Cell {
            glyph: " ".to_string(),
            owner: None,
        };
        let mut grid = vec![vec![blank; width]; height];

        for (index, span) in spans.iter().enumerate() {
            for row in span.top..span.bottom {
                for col in span.left..span.right {
                    let cell = &mut grid[row][col];
                    if cell.owner.is_some() {
                        cell.glyph = OVERLAP.to_string();
                        continue;
                    }
                    cell.owner = Some(index);
                    cell.glyph = frame_glyph(span, row, col).to_string();
                }
            }
        }

        for (index, (widget, span)) in widgets.iter().zip(&spans).enumerate() {
            if span.right - span.left < 3 || span.bottom == span.top {
                continue;
            }
            let label = if widget.title.is_empty() {
                widget.id.as_str()
            } else {
                widget.title.as_str()
            };
            let inner = span.right - span.left - 2;
            let row = &mut grid[span.top];
            let mut col = span.left + 1;
            for ch in clip_to_width(label, inner).chars() {
                let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                if ch_width == 0 {
                    continue;
                }
                let owns_all = (col..col + ch_width).all(|c| row[c].owner == Some(index) && row[c].glyph != OVERLAP);
                if owns_all {
                    row[col].glyph = ch.to_string();
                    for cell in &mut row[col + 1..col + ch_width] {
                        cell.glyph = String::new();
                    }
                }
                col += ch_width;
            }
        }

        grid.into_iter()
            .map(|row| row.into_iter().map(|cell| cell.glyph).collect())
            .collect()
    }

    fn span(&self, position: &GridPosition, width: usize) -> Span {
        let chars = self.chars_per_unit as f64;
        let lines = self.lines_per_unit as f64;
        let to_index = |value: f64, limit: usize| (value.max(0.0) as usize).min(limit);

        let left = to_index((position.x * chars).floor(), width);
        let right = to_index((position.right() * chars).ceil(), width).max(left);
        let top = to_index((position.y * lines).floor(), Self::MAX_LINES);
        let bottom = to_index((position.bottom() * lines).ceil(), Self::MAX_LINES).max(top);
        Span {
            left,
            right,
            top,
            bottom,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    left: usize,
    right: usize,
    top: usize,
    bottom: usize,
}

fn frame_glyph(span: &Span, row: usize, col: usize) -> &'static str {
    let first = col == span.left;
    let last = col + 1 == span.right;
    if row == span.top {
        match (first, last) {
            (true, true) => "|",
            (true, false) => "[",
            (false, true) => "]",
            (false, false) => "-",
        }
    } else if first || last {
        "|"
    } else {
        " "
    }
}
