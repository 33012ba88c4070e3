//! Rendering of [`CategoryTotals`] as a bar chart

use std::io::Write;

use crate::{
    errors::Error,
    types::{CategoryTotals, Total},
};

/// Default number of columns used by the longest bar
pub const DEFAULT_CHART_WIDTH: usize = 40;

const POSITIVE_BAR: char = '█';
const NEGATIVE_BAR: char = '░';

/// Anything that can present per-category totals to the user
pub trait ChartSink {
    /// Renders one bar per category
    fn render(&mut self, totals: &CategoryTotals) -> Result<(), Error>;
}

/// Draws horizontal bars as plain text, one line per category:
/// ```text
/// ██████████████████████████████████████   250000 給与
/// █                                          1200 食費
/// ```
/// Bars are scaled so the largest absolute total spans the full width.
/// Negative totals are drawn with a lighter glyph.
#[derive(Debug)]
pub struct TextBarChart<W> {
    writer: W,
    width: usize,
}

impl<W: Write> TextBarChart<W> {
    /// Creates a chart writing to `writer` with bars at most `width` columns long
    pub fn new(writer: W, width: usize) -> Self {
        Self {
            writer,
            width: width.max(1),
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn bar_len(&self, total: Total, largest: u128) -> usize {
        if total == 0 || largest == 0 {
            return 0;
        }
        let scaled = total.unsigned_abs().saturating_mul(self.width as u128) / largest;
        (scaled as usize).clamp(1, self.width)
    }
}

impl<W: Write> ChartSink for TextBarChart<W> {
    fn render(&mut self, totals: &CategoryTotals) -> Result<(), Error> {
        if totals.is_empty() {
            writeln!(self.writer, "No categories to chart")?;
            return Ok(());
        }
        let largest = totals
            .iter()
            .map(|(_, total)| total.unsigned_abs())
            .max()
            .unwrap_or(0);
        let amount_width = totals
            .iter()
            .map(|(_, total)| total.to_string().len())
            .max()
            .unwrap_or(0);
        for (category, &total) in totals {
            let glyph = if total < 0 { NEGATIVE_BAR } else { POSITIVE_BAR };
            let bar: String = std::iter::repeat(glyph)
                .take(self.bar_len(total, largest))
                .collect();
            writeln!(
                self.writer,
                "{bar:<bar_width$} {total:>amount_width$} {category}",
                bar_width = self.width
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
