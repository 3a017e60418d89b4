//! Report formatting

use prettytable::{format, Cell, Row, Table};

use crate::engine::ScanResultFile;

/// Two-column key/value table in prettytable's clean format, indented by two spaces
pub fn format_settings_table(rows: &[(&str, String)]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    for (key, value) in rows {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{}:", key)),
            Cell::new(value),
        ]));
    }

    let mut result = String::new();
    for line in table.to_string().lines() {
        result.push_str("  ");
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

/// Group digits in threes with commas
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// `name (N KB)` line for the results summary
pub fn format_file_line(file: &ScanResultFile) -> String {
    format!("  {} ({} KB)", file.name, format_thousands(file.size_kb()))
}
