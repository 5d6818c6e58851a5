use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

pub fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

pub(crate) fn render_abort_box(lines: &[String]) -> Vec<String> {
    let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let border = "*".repeat(width + 4);
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(border.clone());
    for line in lines {
        out.push(format!("* {line:<width$} *"));
    }
    out.push(border);
    out
}

pub fn print_abort(style: OutputStyle, lines: &[String]) {
    for line in render_abort_box(lines) {
        let rendered = match style {
            OutputStyle::Plain => line,
            OutputStyle::Rich => colorize(abort_style(), &line),
        };
        eprintln!("{rendered}");
    }
}

fn abort_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub struct TerminalProgress {
    total: u64,
    current: u64,
    progress_bar: Option<ProgressBar>,
}

pub fn start_progress(style: OutputStyle, label: &str, total: u64) -> TerminalProgress {
    let progress_bar = if style == OutputStyle::Rich {
        let progress_bar = ProgressBar::new(total.max(1));
        if let Ok(template) = ProgressStyle::with_template(
            "{spinner:.cyan.bold} {msg:<12} [{bar:20.cyan/blue}] {pos:>3}/{len:3}",
        ) {
            progress_bar.set_style(template.progress_chars("=>-"));
        }
        progress_bar.set_message(label.to_string());
        progress_bar.enable_steady_tick(Duration::from_millis(80));
        Some(progress_bar)
    } else {
        None
    };

    TerminalProgress {
        total,
        current: 0,
        progress_bar,
    }
}

impl TerminalProgress {
    pub fn set(&mut self, current: u64) {
        self.current = current.min(self.total);
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_position(self.current);
        }
    }

    pub fn finish(self) {
        if let Some(progress_bar) = self.progress_bar {
            progress_bar.finish_and_clear();
        }
    }
}
