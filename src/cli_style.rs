use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Color as CtColor, Stylize};
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

use crate::plan::TranscodeTask;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const FRAME: Color = Color::Rgb {
        r: 220,
        g: 60,
        b: 60,
    };
    pub const UPLOAD: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const SKIP: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const TEXT: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

mod box_chars {
    pub const TOP_LEFT: &str = "╭";
    pub const TOP_RIGHT: &str = "╮";
    pub const BOTTOM_LEFT: &str = "╰";
    pub const BOTTOM_RIGHT: &str = "╯";
    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<(String, CtColor)>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        TableBuilder {
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Cells beyond the header count are dropped.
    pub fn add_row(&mut self, row: Vec<(String, CtColor)>) {
        let row: Vec<(String, CtColor)> = row.into_iter().take(self.headers.len()).collect();
        for (i, (cell, _)) in row.iter().enumerate() {
            self.col_widths[i] = self.col_widths[i].max(cell.width());
        }
        self.rows.push(row);
    }

    fn border(&self, out: &mut String, left: &str, mid: &str, right: &str) {
        let _ = write!(out, "{}", left.with(colors::FRAME));
        for (i, width) in self.col_widths.iter().enumerate() {
            let _ = write!(
                out,
                "{}",
                box_chars::HORIZONTAL.repeat(width + 2).with(colors::FRAME)
            );
            if i + 1 < self.col_widths.len() {
                let _ = write!(out, "{}", mid.with(colors::FRAME));
            }
        }
        let _ = writeln!(out, "{}", right.with(colors::FRAME));
    }

    fn line(&self, out: &mut String, cells: &[(String, CtColor)], bold: bool) {
        let _ = write!(out, "{}", box_chars::VERTICAL.with(colors::FRAME));
        for (i, width) in self.col_widths.iter().enumerate() {
            let (text, color) = cells
                .get(i)
                .cloned()
                .unwrap_or_else(|| (String::new(), colors::TEXT));
            let padding = width.saturating_sub(text.width());
            let styled = if bold {
                text.with(color).bold()
            } else {
                text.with(color)
            };
            let _ = write!(out, " {}{} ", styled, " ".repeat(padding));
            let _ = write!(out, "{}", box_chars::VERTICAL.with(colors::FRAME));
        }
        let _ = writeln!(out);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.border(
            &mut out,
            box_chars::TOP_LEFT,
            box_chars::T_TOP,
            box_chars::TOP_RIGHT,
        );
        let header: Vec<(String, CtColor)> = self
            .headers
            .iter()
            .map(|h| (h.clone(), colors::FRAME))
            .collect();
        self.line(&mut out, &header, true);
        self.border(
            &mut out,
            box_chars::T_LEFT,
            box_chars::CROSS,
            box_chars::T_RIGHT,
        );
        for row in &self.rows {
            self.line(&mut out, row, false);
        }
        self.border(
            &mut out,
            box_chars::BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::BOTTOM_RIGHT,
        );
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Plan Summary
// ═══════════════════════════════════════════════════════════════════════════════

pub fn render_plan(tasks: &[TranscodeTask]) -> String {
    let mut table = TableBuilder::new(vec!["#", "Encoding", "Output", "Upload"]);
    for (i, task) in tasks.iter().enumerate() {
        let output = task
            .output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let upload = if task.skip_upload {
            (format!("{} skip", box_chars::CROSS_MARK), colors::SKIP)
        } else {
            (format!("{} yes", box_chars::CHECK), colors::UPLOAD)
        };
        table.add_row(vec![
            ((i + 1).to_string(), colors::DIM),
            (
                format!("{} {}", task.target_format.as_str(), task.bitrate_label),
                colors::TEXT,
            ),
            (output, colors::TEXT),
            upload,
        ]);
    }
    table.render()
}

/// The only direct stdout output of a run.
pub fn print_plan(tasks: &[TranscodeTask]) {
    print!("{}", render_plan(tasks));
}
