// redactkit/src/ui/redaction_summary.rs
//! Prints the per-redactor summary table shown after a run.

use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::io::{self, Write};

use redactkit_core::RedactionList;

/// Longest redactor name shown before it is shortened.
const MAX_NAME_WIDTH: usize = 48;

/// Builds the summary table: one row per redactor with its redaction count,
/// characters removed and number of files touched.
pub fn build_summary_table(list: &RedactionList, supports_color: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(if supports_color { UTF8_FULL } else { ASCII_MARKDOWN })
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Redactor", "Redactions", "Chars removed", "Files"]);

    for (name, redactions) in &list.by_redactor {
        let removed: usize = redactions.iter().map(|r| r.characters_removed).sum();
        let mut files: Vec<&str> = redactions.iter().map(|r| r.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();

        table.add_row(vec![
            Cell::new(shorten(name)),
            Cell::new(redactions.len()).set_alignment(CellAlignment::Right),
            Cell::new(removed).set_alignment(CellAlignment::Right),
            Cell::new(files.len()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Writes the summary to `writer`.
pub fn print_summary<W: Write>(list: &RedactionList, writer: &mut W, supports_color: bool) -> io::Result<()> {
    if list.is_empty() {
        writeln!(writer, "No redactions performed.")?;
        return Ok(());
    }
    writeln!(writer, "Redaction summary ({} redactions in {} files):", list.len(), list.by_file.len())?;
    writeln!(writer, "{}", build_summary_table(list, supports_color))?;
    Ok(())
}

/// Writes one line per skipped redactor. Writes nothing when there are no
/// warnings.
pub fn print_warnings<W: Write>(list: &RedactionList, writer: &mut W) -> io::Result<()> {
    for warning in list.warnings.values().flatten() {
        writeln!(
            writer,
            "Warning: redactor '{}' skipped {}: {}",
            warning.redactor_name, warning.file, warning.message
        )?;
    }
    Ok(())
}

fn shorten(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_WIDTH {
        return name.to_string();
    }
    let mut short: String = name.chars().take(MAX_NAME_WIDTH - 3).collect();
    short.push_str("...");
    short
}
