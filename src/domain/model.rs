use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Column headers, in output order.
pub const COLUMNS: [&str; 7] = [
    "Symbol",
    "Name",
    "Price",
    "Change",
    "Change %",
    "Volume",
    "Market Cap",
];

pub const NOT_AVAILABLE: &str = "N/A";

/// One listing row, kept as the display text scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Change")]
    pub change: String,
    #[serde(rename = "Change %")]
    pub change_percent: String,
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "Market Cap")]
    pub market_cap: String,
}

impl StockRow {
    /// Field values in `COLUMNS` order.
    pub fn fields(&self) -> [&str; 7] {
        [
            self.symbol.as_str(),
            self.name.as_str(),
            self.price.as_str(),
            self.change.as_str(),
            self.change_percent.as_str(),
            self.volume.as_str(),
            self.market_cap.as_str(),
        ]
    }
}

/// Rows extracted from a single run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockTable {
    rows: Vec<StockRow>,
}

impl StockTable {
    /// Rows without a symbol are discarded.
    pub fn new(rows: Vec<StockRow>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|row| !row.symbol.trim().is_empty())
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.symbol.as_str()).collect()
    }

    /// Character width of each column: header or longest value, whichever is wider.
    pub fn display_widths(&self) -> [usize; 7] {
        let mut widths = COLUMNS.map(|header| header.chars().count());
        for row in &self.rows {
            for (width, value) in widths.iter_mut().zip(row.fields()) {
                *width = (*width).max(value.chars().count());
            }
        }
        widths
    }
}

fn write_aligned(f: &mut fmt::Formatter<'_>, values: [&str; 7], widths: &[usize; 7]) -> fmt::Result {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect();
    writeln!(f, "{}", cells.join("  ").trim_end())
}

impl fmt::Display for StockTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.display_widths();

        write_aligned(f, COLUMNS, &widths)?;
        let total = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        writeln!(f, "{}", "=".repeat(total))?;
        for row in &self.rows {
            write_aligned(f, row.fields(), &widths)?;
        }
        Ok(())
    }
}

/// Files written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub csv_path: PathBuf,
    pub spreadsheet_path: PathBuf,
}

impl ReportArtifacts {
    /// Attachment order for the report email.
    pub fn attachment_paths(&self) -> Vec<PathBuf> {
        vec![self.spreadsheet_path.clone(), self.csv_path.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

/// An attachment loaded into memory, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}
