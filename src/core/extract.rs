use crate::config::ReportConfig;
use crate::domain::model::{StockRow, StockTable, NOT_AVAILABLE};
use crate::domain::ports::Storage;
use crate::utils::error::{ReportError, Result};
use scraper::{ElementRef, Html, Selector};

/// Why a page did not yield a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableProblem {
    Missing,
    Empty,
}

pub struct Extractor<S: Storage> {
    storage: S,
    table_selector: Selector,
    debug_file: String,
}

impl<S: Storage> Extractor<S> {
    pub fn new(storage: S, config: &ReportConfig) -> Result<Self> {
        let table_selector = Selector::parse(&config.source.table_selector).map_err(|e| {
            ReportError::InvalidConfigValueError {
                field: "source.table_selector".to_string(),
                value: config.source.table_selector.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            storage,
            table_selector,
            debug_file: config.output.debug_file.clone(),
        })
    }

    pub async fn extract(&self, html: &str) -> Result<StockTable> {
        // Html 不是 Send，解析完才能 await
        let outcome = parse_stock_table(html, &self.table_selector);

        match outcome {
            Ok(table) => {
                tracing::info!("📋 Extracted {} stock rows", table.len());
                Ok(table)
            }
            Err(problem) => {
                match problem {
                    TableProblem::Missing => tracing::error!(
                        "❌ Could not locate the stock table, page structure may have changed"
                    ),
                    TableProblem::Empty => {
                        tracing::error!("❌ Stock table found but no row could be extracted")
                    }
                }

                let debug_path = self.dump_page(html).await;
                Err(match problem {
                    TableProblem::Missing => ReportError::TableNotFoundError { debug_path },
                    TableProblem::Empty => ReportError::EmptyTableError { debug_path },
                })
            }
        }
    }

    /// A failed dump is logged and does not replace the extraction error.
    async fn dump_page(&self, html: &str) -> String {
        match self.storage.write_file(&self.debug_file, html.as_bytes()).await {
            Ok(()) => {
                let debug_path = self.storage.locate(&self.debug_file).display().to_string();
                tracing::info!("💾 Saved raw HTML to {} for debugging", debug_path);
                debug_path
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not save debug HTML to {}: {}", self.debug_file, e);
                format!("{} (not saved)", self.debug_file)
            }
        }
    }
}

/// Marker table first, otherwise the first table on the page.
pub fn parse_stock_table(
    html: &str,
    table_selector: &Selector,
) -> std::result::Result<StockTable, TableProblem> {
    let document = Html::parse_document(html);

    let table = match document.select(table_selector).next() {
        Some(table) => table,
        None => {
            let fallback = Selector::parse("table").map_err(|_| TableProblem::Missing)?;
            let table = document.select(&fallback).next().ok_or(TableProblem::Missing)?;
            tracing::warn!("⚠️ Marker table not found, falling back to the first table on the page");
            table
        }
    };

    let rows: Vec<StockRow> = data_rows(table).into_iter().filter_map(parse_row).collect();
    let table = StockTable::new(rows);

    if table.is_empty() {
        return Err(TableProblem::Empty);
    }
    Ok(table)
}

fn child_elements<'a>(element: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// Body rows of `table`. Without a `<thead>` the first row is the header by position.
fn data_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    let mut has_head = false;

    for section in table.children().filter_map(ElementRef::wrap) {
        match section.value().name() {
            "thead" => has_head = true,
            "tbody" => rows.extend(child_elements(section, "tr")),
            "tr" => rows.push(section),
            _ => {}
        }
    }

    if !has_head && !rows.is_empty() {
        rows.remove(0);
    }
    rows
}

fn parse_row(row: ElementRef<'_>) -> Option<StockRow> {
    let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
    if cells.len() < 6 {
        return None;
    }

    let required = |value: String| if value.is_empty() { None } else { Some(value) };

    Some(StockRow {
        symbol: required(cell_text(cells[0]))?,
        name: required(name_text(cells[1]))?,
        price: required(cell_text(cells[2]))?,
        change: required(cell_text(cells[3]))?,
        change_percent: required(cell_text(cells[4]))?,
        volume: required(cell_text(cells[5]))?,
        // 只有欄位不存在時才用 N/A
        market_cap: cells
            .get(6)
            .map(|cell| cell_text(*cell))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

/// Trimmed text nodes joined without separators.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Link text when the cell holds a link, otherwise the cell text.
pub fn name_text(cell: ElementRef<'_>) -> String {
    cell.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "a")
        .map(cell_text)
        .unwrap_or_else(|| cell_text(cell))
}
