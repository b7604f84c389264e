use std::str::Lines;

/// One table line split into trimmed, non-empty cells.
pub type RawRow = Vec<String>;

const DELIMITER: char = '|';

/// Lazily walk the pipe table of a markdown document.
pub fn table_rows(markdown: &str) -> TableRows<'_> {
    TableRows {
        lines: markdown.lines(),
        header_seen: false,
    }
}

/// Iterator over the body rows of the first pipe table. The header line is
/// consumed silently, separator lines are skipped and lines without a `|`
/// are ignored wherever they appear.
pub struct TableRows<'a> {
    lines: Lines<'a>,
    header_seen: bool,
}

impl Iterator for TableRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        for line in self.lines.by_ref() {
            if !line.contains(DELIMITER) {
                continue;
            }
            if !self.header_seen {
                self.header_seen = true;
                continue;
            }
            if is_separator(line) {
                continue;
            }
            return Some(split_cells(line));
        }
        None
    }
}

/// `| --- | :---: |` style lines: only delimiters, dashes, colons and blanks.
fn is_separator(line: &str) -> bool {
    line.contains('-')
        && line
            .chars()
            .all(|c| c == DELIMITER || c == '-' || c == ':' || c.is_whitespace())
}

fn split_cells(line: &str) -> RawRow {
    line.split(DELIMITER)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ──
