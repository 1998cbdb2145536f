//! Terminal output utilities: notes, ANSI formatting, record tables.

use platelog_core::{SessionLog, EXPORT_COLUMNS};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Render rows under `headers` as left-aligned, space-padded columns.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = line(headers.to_vec());
    out.push_str(&line(separator.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

/// The session log as a table with the export's column headers.
pub fn records_table(log: &SessionLog) -> String {
    let rows: Vec<Vec<String>> = log
        .iter()
        .map(|r| {
            vec![
                r.id().to_string(),
                r.plate_text().to_string(),
                r.detected_at_display(),
            ]
        })
        .collect();
    render_table(&EXPORT_COLUMNS, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platelog_core::DetectionRecord;

    #[test]
    fn renders_aligned_table() {
        let rows = vec![
            vec!["Alice".to_string(), "42".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        let table = render_table(&["Name", "Count"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "  Name   Count");
        assert_eq!(lines[1], "  -----  -----");
        assert_eq!(lines[2], "  Alice  42");
        assert_eq!(lines[3], "  Bob    7");
    }

    #[test]
    fn records_table_lists_each_record() {
        let mut log = SessionLog::new();
        log.append(DetectionRecord::new("ABC1234").unwrap());
        log.append(DetectionRecord::new("ABC1234").unwrap());
        let table = records_table(&log);
        assert!(table.starts_with("  GUID"));
        assert_eq!(table.matches("ABC1234").count(), 2);
    }
}
