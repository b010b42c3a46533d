use crate::domain::model::{StockTable, COLUMNS};
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

pub const TITLE_ROW: u32 = 0;
pub const TIMESTAMP_ROW: u32 = 1;
pub const HEADER_ROW: u32 = 2;
pub const FIRST_DATA_ROW: u32 = 3;

const PRICE_COL: usize = 2;
const CHANGE_COL: usize = 3;
const VOLUME_COL: usize = 5;

/// Sheet naming for the workbook.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub title: String,
}

/// Parses scraped display text such as `+1.23`, `$1,234.50` or `-0.45`.
pub fn parse_display_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Change value used for coloring; anything unparseable counts as zero.
pub fn parse_change_value(value: &str) -> f64 {
    parse_display_number(value).unwrap_or(0.0)
}

/// Header length + 2, or the longest value if wider.
pub fn column_widths(table: &StockTable) -> [usize; 7] {
    let mut widths = COLUMNS.map(|header| header.chars().count() + 2);
    for row in table.rows() {
        for (width, value) in widths.iter_mut().zip(row.fields()) {
            *width = (*width).max(value.chars().count());
        }
    }
    widths
}

/// Renders the styled workbook into memory.
pub fn render_spreadsheet(
    table: &StockTable,
    layout: &SheetLayout,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>> {
    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_background_color(Color::RGB(0xD7E4BC))
        .set_border(FormatBorder::Thin);
    let price_format = Format::new().set_num_format("$#,##0.00");
    let volume_format = Format::new().set_num_format("#,##0");
    let positive_format = Format::new().set_font_color(Color::Green);
    let negative_format = Format::new().set_font_color(Color::Red);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&layout.sheet_name)?;

    worksheet.write_string_with_format(TITLE_ROW, 0, &layout.title, &title_format)?;
    worksheet.write_string(
        TIMESTAMP_ROW,
        0,
        format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    )?;

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, col as u16, *header, &header_format)?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let sheet_row = FIRST_DATA_ROW + index as u32;

        for (col, value) in row.fields().into_iter().enumerate() {
            let sheet_col = col as u16;
            match col {
                PRICE_COL => match parse_display_number(value) {
                    Some(price) => {
                        worksheet.write_number_with_format(sheet_row, sheet_col, price, &price_format)?;
                    }
                    None => {
                        worksheet.write_string(sheet_row, sheet_col, value)?;
                    }
                },
                VOLUME_COL => match parse_display_number(value) {
                    Some(volume) => {
                        worksheet.write_number_with_format(
                            sheet_row,
                            sheet_col,
                            volume,
                            &volume_format,
                        )?;
                    }
                    None => {
                        worksheet.write_string(sheet_row, sheet_col, value)?;
                    }
                },
                CHANGE_COL => {
                    let change = parse_change_value(value);
                    if change > 0.0 {
                        worksheet.write_number_with_format(sheet_row, sheet_col, change, &positive_format)?;
                    } else if change < 0.0 {
                        worksheet.write_number_with_format(sheet_row, sheet_col, change, &negative_format)?;
                    } else {
                        worksheet.write_string(sheet_row, sheet_col, value)?;
                    }
                }
                _ => {
                    worksheet.write_string(sheet_row, sheet_col, value)?;
                }
            }
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}
