use types::Row;

use crate::Column;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn separator(self) -> char {
        match self {
            Self::Csv => ',',
            Self::Tsv => '\t',
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

/// Serialized table contents, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub extension: &'static str,
}

impl Export {
    pub fn as_str(&self) -> &str {
        // Only ever built from a `String`.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

pub(crate) fn export<'a, R: Row + 'a>(
    columns: &[Column],
    rows: impl IntoIterator<Item = &'a R>,
    format: ExportFormat,
) -> Export {
    let sep = format.separator();
    let mut out = String::new();

    write_line(&mut out, columns.iter().map(|c| c.label.clone()), sep);
    for row in rows {
        write_line(
            &mut out,
            columns.iter().map(|c| row.field(&c.key).to_string()),
            sep,
        );
    }

    Export {
        bytes: out.into_bytes(),
        mime: format.mime(),
        extension: format.extension(),
    }
}

fn write_line(out: &mut String, cells: impl Iterator<Item = String>, sep: char) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(sep);
        }
        push_escaped(out, &cell, sep);
    }
    out.push('\n');
}

fn push_escaped(out: &mut String, cell: &str, sep: char) {
    let needs_quotes = cell.contains(sep) || cell.contains(['"', '\n', '\r']);
    if !needs_quotes {
        out.push_str(cell);
        return;
    }
    out.push('"');
    out.push_str(&cell.replace('"', "\"\""));
    out.push('"');
}
