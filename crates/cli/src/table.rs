// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table renderer for dimension summaries and journal listings.
//!
//! Widths are measured in chars from the header and the data. Color is
//! applied after padding so escape codes never count toward a width.

use crate::color;

/// Column text alignment.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// How a cell's text is styled after padding.
#[derive(Clone, Copy)]
pub enum CellStyle {
    Plain,
    Muted,
}

pub struct Column {
    name: &'static str,
    align: Align,
    style: CellStyle,
    max_width: Option<usize>,
}

impl Column {
    fn new(name: &'static str, align: Align, style: CellStyle) -> Self {
        Self {
            name,
            align,
            style,
            max_width: None,
        }
    }

    pub fn left(name: &'static str) -> Self {
        Self::new(name, Align::Left, CellStyle::Plain)
    }

    /// Numeric columns.
    pub fn right(name: &'static str) -> Self {
        Self::new(name, Align::Right, CellStyle::Plain)
    }

    pub fn muted(name: &'static str) -> Self {
        Self::new(name, Align::Left, CellStyle::Muted)
    }

    /// Truncate values longer than `max` chars.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }

    fn clip<'a>(&self, value: &'a str) -> &'a str {
        match self.max_width.and_then(|m| value.char_indices().nth(m)) {
            Some((end, _)) => &value[..end],
            None => value,
        }
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

const GUTTER: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self::with_color(columns, color::should_colorize())
    }

    #[cfg(test)]
    pub fn plain(columns: Vec<Column>) -> Self {
        Self::with_color(columns, false)
    }

    #[cfg(test)]
    pub fn colored(columns: Vec<Column>) -> Self {
        Self::with_color(columns, true)
    }

    fn with_color(columns: Vec<Column>, colorize: bool) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            colorize,
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Header plus one line per row. An empty table renders as nothing.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        self.push_line(&mut out, &header, &widths, true);
        for row in &self.rows {
            let cells: Vec<&str> = (0..self.columns.len())
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            self.push_line(&mut out, &cells, &widths, false);
        }
        out
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| col.clip(cell).chars().count())
                    .chain([col.name.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn push_line(&self, out: &mut String, cells: &[&str], widths: &[usize], header: bool) {
        let last = self.columns.len().saturating_sub(1);
        let rendered: Vec<String> = self
            .columns
            .iter()
            .zip(cells.iter().copied())
            .zip(widths)
            .enumerate()
            .map(|(i, ((col, cell), &width))| {
                let text = if header { cell } else { col.clip(cell) };
                // Trailing left-aligned text needs no padding
                let padded = match col.align {
                    Align::Left if i == last => text.to_string(),
                    Align::Left => format!("{text:<width$}"),
                    Align::Right => format!("{text:>width$}"),
                };
                self.style(padded, col.style, header)
            })
            .collect();
        out.push_str(&rendered.join(GUTTER));
        out.push('\n');
    }

    fn style(&self, text: String, style: CellStyle, header: bool) -> String {
        if !self.colorize {
            return text;
        }
        if header {
            return color::apply_header(&text);
        }
        match style {
            CellStyle::Plain => text,
            CellStyle::Muted => color::apply_muted(&text),
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
