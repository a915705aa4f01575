//! Terminal UI utilities.
//!
//! `Table` renders rows inside Unicode box-drawing borders and shrinks the
//! widest columns until the table fits the terminal.
//!
//! ```rust
//! let mut table = kiln::ui::Table::new(&["Requirement", "Status"]);
//! table.add_row(vec!["quill/10.0.1".to_string(), "active".to_string()]);
//! table.print();
//! ```

use colored::*;
use console::{measure_text_width, truncate_str};

const MIN_COLUMN: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }

    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(&flatten(cell)));
            }
        }

        // Indent, outer borders, and one space of padding either side of each cell
        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= MIN_COLUMN {
                break;
            }
            widths[idx] -= 1;
        }

        let line = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, cells.join(mid), right)
        };
        let row_line = |cells: Vec<String>| {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let shown = truncate_str(cell, *width, "...");
                let padding = width.saturating_sub(measure_text_width(&shown));
                s.push_str(&format!(" {}{} │", shown, " ".repeat(padding)));
            }
            s.push('\n');
            s
        };

        let mut out = line("┌", "┬", "┐");
        out.push_str(&row_line(
            self.headers.iter().map(|h| h.bold().to_string()).collect(),
        ));
        out.push_str(&line("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&row_line(row.iter().map(|c| flatten(c)).collect()));
        }
        out.push_str(&line("└", "┴", "┘"));
        out
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
