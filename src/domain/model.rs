use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 目錄中的一筆可選項目（唯讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "Item Name")]
    pub name: String,
    #[serde(rename = "Main Category", default)]
    pub main_category: String,
    #[serde(rename = "Sub Category 1", default)]
    pub sub_category_1: String,
    #[serde(rename = "Sub Category 2", default)]
    pub sub_category_2: String,
    #[serde(rename = "Unit Price")]
    pub unit_price: f64,
    #[serde(rename = "Unit", default)]
    pub unit: String,
}

impl CatalogItem {
    pub fn new(
        name: impl Into<String>,
        main_category: impl Into<String>,
        sub_category_1: impl Into<String>,
        sub_category_2: impl Into<String>,
        unit_price: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            main_category: main_category.into(),
            sub_category_1: sub_category_1.into(),
            sub_category_2: sub_category_2.into(),
            unit_price,
            unit: unit.into(),
        }
    }
}

/// 估價單中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    /// 由目錄帶入的項目
    Standard {
        name: String,
        unit: String,
        rate: f64,
        quantity: f64,
    },
    /// 手動輸入的項目
    Custom {
        name: String,
        unit: String,
        rate: f64,
        quantity: f64,
    },
    Subheading { title: String },
}

impl LineItem {
    pub fn cost(&self) -> Option<f64> {
        match self {
            LineItem::Standard { rate, quantity, .. } | LineItem::Custom { rate, quantity, .. } => {
                Some(rate * quantity)
            }
            LineItem::Subheading { .. } => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LineItem::Standard { name, .. } | LineItem::Custom { name, .. } => name,
            LineItem::Subheading { title } => title,
        }
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, LineItem::Subheading { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markups {
    pub gst_rate: f64,
    pub contingency_rate: f64,
}

impl Default for Markups {
    fn default() -> Self {
        Self {
            gst_rate: 0.18,
            contingency_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub gst: f64,
    pub contingency: f64,
    pub grand_total: f64,
}

/// 估價單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub heading: String,
    pub date: NaiveDate,
    pub items: Vec<LineItem>,
    pub markups: Markups,
}

/// 表格中的一列，已編好序號
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateRow<'a> {
    Priced {
        serial: usize,
        name: &'a str,
        unit: &'a str,
        rate: f64,
        quantity: f64,
        cost: f64,
    },
    Subheading { title: &'a str },
}

/// 匯出檔案格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Pdf,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "pdf" => Some(OutputFormat::Pdf),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }
}

/// PDF 版面設定，長度單位為 mm
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayoutOptions {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub bottom_margin: f32,
    pub line_height: f32,
    pub summary_row_height: f32,
    pub font_size: f32,
    pub heading_size: f32,
    pub column_widths: [f32; 6],
    pub watermark: Option<String>,
}

impl Default for PdfLayoutOptions {
    fn default() -> Self {
        // A4
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 10.0,
            bottom_margin: 15.0,
            line_height: 6.0,
            summary_row_height: 8.0,
            font_size: 10.0,
            heading_size: 16.0,
            column_widths: [10.0, 70.0, 20.0, 20.0, 20.0, 20.0],
            watermark: None,
        }
    }
}

/// 匯出階段的產出
#[derive(Debug, Clone)]
pub struct RenderedEstimate {
    pub estimate: Estimate,
    pub totals: Totals,
    pub documents: Vec<RenderedDocument>,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
