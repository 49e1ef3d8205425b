//! Terminal output: prefixed log lines, the watch-mode status block and the
//! batch progress line.
//!
//! ```text
//! [clean] removed 12 items from dist
//! [build] lib ✓  fonts ✓  html ✓  scripts ·  styles ✓  images ·  sprites ✓
//! [12:04:31] ✓ styles: 2 files written (4.1 kB), 0 unchanged
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("styles"; "{} written", name);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    // Overwrites an unfinished progress line; its next redraw lands below.
    execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" | "reload" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "clean" => prefix.bright_magenta().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch status
// ============================================================================

/// Wall-clock time of day (UTC), `HH:MM:SS`.
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Status block for watch mode. Each message replaces the previous one, so
/// a fixed stylesheet error disappears from the terminal.
struct WatchStatus {
    last_lines: usize,
}

static WATCH_STATUS: Mutex<WatchStatus> = Mutex::new(WatchStatus { last_lines: 0 });

impl WatchStatus {
    fn show(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();
        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines.min(u16::MAX as usize) as u16;
            execute!(stdout, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();
        self.last_lines = line_count(message);
    }
}

/// Show a task success in the watch status block.
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().show("✓".green().to_string(), message);
}

/// Show a task failure (title, then the error) in the watch status block.
pub fn status_error(summary: &str, detail: &str) {
    let message = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    WATCH_STATUS.lock().show("✗".red().to_string(), &message);
}

// ============================================================================
// Progress line
// ============================================================================

/// One line listing the groups of the initial batch, each marked done as
/// its task finishes. Safe to update from rayon workers.
pub struct ProgressLine {
    steps: Vec<(&'static str, AtomicBool)>,
    redraw: Mutex<()>,
}

impl ProgressLine {
    pub fn new(names: &[&'static str]) -> Self {
        let progress = Self {
            steps: names.iter().map(|n| (*n, AtomicBool::new(false))).collect(),
            redraw: Mutex::new(()),
        };
        progress.draw(false);
        progress
    }

    /// Mark `name` done. The redraw is skipped while another worker draws.
    pub fn done(&self, name: &str) {
        if let Some((_, flag)) = self.steps.iter().find(|(n, _)| *n == name) {
            flag.store(true, Ordering::SeqCst);
        }
        if let Some(_guard) = self.redraw.try_lock() {
            self.draw(false);
        }
    }

    /// Redraw with final state and leave the line in place.
    pub fn finish(self) {
        let _guard = self.redraw.lock();
        self.draw(true);
    }

    fn render(&self) -> String {
        self.steps
            .iter()
            .map(|(name, flag)| {
                if flag.load(Ordering::SeqCst) {
                    format!("{name} {}", "✓".green())
                } else {
                    format!("{name} {}", "·".dimmed())
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn draw(&self, newline: bool) {
        let line = format!("{} {}", colorize_prefix("build"), self.render());
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(stdout, "{line}").ok();
        } else {
            write!(stdout, "{line}").ok();
        }
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("styles: 2 files written"), 1);
        assert_eq!(line_count("Stylesheet error\nmain.scss: expected \"}\"\n  --> 5:1"), 3);
    }

    #[test]
    fn test_prefix_keeps_module_name() {
        assert!(colorize_prefix("clean").contains("[clean]"));
        assert!(colorize_prefix("Styles").contains("[Styles]"));
    }

    #[test]
    fn test_now_format() {
        let time = now();
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn test_progress_marks_groups_done() {
        let progress = ProgressLine::new(&["lib", "styles"]);
        progress.done("styles");
        progress.done("unknown");

        let line = progress.render();
        assert!(line.starts_with("lib "));
        assert!(line.contains("styles"));
        assert!(progress.steps[1].1.load(Ordering::SeqCst));
        assert!(!progress.steps[0].1.load(Ordering::SeqCst));
        progress.finish();
    }
}
