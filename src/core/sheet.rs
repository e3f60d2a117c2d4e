use crate::core::estimate::{format_amount, format_rate};
use crate::domain::model::{Estimate, EstimateRow, Totals};
use crate::utils::error::{EstimateError, Result};

pub const TABLE_HEADERS: [&str; 6] = ["Sl.No", "Item Name", "Rate", "Unit", "Qty", "Total"];

/// 表尾的小計、稅金與總計列
pub fn summary_rows(estimate: &Estimate, totals: &Totals) -> Vec<(String, String)> {
    vec![
        ("Subtotal".to_string(), format_amount(totals.subtotal)),
        (
            format!("GST ({})", format_rate(estimate.markups.gst_rate)),
            format_amount(totals.gst),
        ),
        (
            format!("Contingency ({})", format_rate(estimate.markups.contingency_rate)),
            format_amount(totals.contingency),
        ),
        ("Grand Total".to_string(), format_amount(totals.grand_total)),
    ]
}

/// 表格內容列（不含表頭），每列六欄
pub fn table_cells(row: &EstimateRow<'_>) -> [String; 6] {
    match row {
        EstimateRow::Priced {
            serial,
            name,
            unit,
            rate,
            quantity,
            cost,
        } => [
            serial.to_string(),
            name.to_string(),
            format_amount(*rate),
            unit.to_string(),
            format_amount(*quantity),
            format_amount(*cost),
        ],
        EstimateRow::Subheading { title } => [
            String::new(),
            title.to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

/// 輸出試算表用的 CSV
pub fn render_csv(estimate: &Estimate, totals: &Totals) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([estimate.heading.as_str()])?;
    writer.write_record([format!("Date: {}", estimate.date.format("%d-%m-%Y"))])?;
    writer.write_record(TABLE_HEADERS)?;

    for row in estimate.numbered_rows() {
        writer.write_record(table_cells(&row))?;
    }

    for (label, value) in summary_rows(estimate, totals) {
        writer.write_record(["", label.as_str(), "", "", "", value.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| EstimateError::processing(format!("Failed to flush CSV output: {}", e)))
}
