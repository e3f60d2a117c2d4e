use crate::core::sheet::{summary_rows, table_cells, TABLE_HEADERS};
pub use crate::domain::model::PdfLayoutOptions;
use crate::domain::model::{Estimate, EstimateRow, Totals};
use crate::utils::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Helvetica 字寬（千分之一 em），ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }
}

/// 字串在指定字級下的寬度（mm）
pub fn text_width(text: &str, size_pt: f32, style: FontStyle) -> f32 {
    let table = match style {
        FontStyle::Regular => &HELVETICA_WIDTHS,
        FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize] as u32,
            _ => FALLBACK_WIDTH as u32,
        })
        .sum();
    units as f32 / 1000.0 * size_pt / MM_TO_PT
}

/// 以字為單位折行；單一個過長的字自成一行
pub fn wrap_text(text: &str, max_width: f32, size_pt: f32, style: FontStyle) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(&candidate, size_pt, style) < max_width - 2.0 || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl PdfLayoutOptions {
    fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    fn column_x(&self, column: usize) -> f32 {
        self.margin + self.column_widths[..column].iter().sum::<f32>()
    }

    fn page_break_at(&self) -> f32 {
        self.page_height - self.bottom_margin
    }
}

/// 版面上的繪圖指令，座標單位為 mm，原點在左上角
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        size: f32,
        style: FontStyle,
        gray: f32,
    },
    RotatedText {
        x: f32,
        baseline: f32,
        degrees: f32,
        text: String,
        size: f32,
        gray: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPage {
    pub ops: Vec<DrawOp>,
}

impl PdfPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfLayout {
    pub pages: Vec<PdfPage>,
}

struct LayoutCursor<'o> {
    options: &'o PdfLayoutOptions,
    pages: Vec<PdfPage>,
    y: f32,
}

impl<'o> LayoutCursor<'o> {
    fn new(options: &'o PdfLayoutOptions) -> Self {
        let mut cursor = Self {
            options,
            pages: Vec::new(),
            y: options.margin,
        };
        cursor.add_page();
        cursor
    }

    fn add_page(&mut self) {
        let mut page = PdfPage::default();
        if let Some(watermark) = &self.options.watermark {
            page.ops.push(DrawOp::RotatedText {
                x: 30.0,
                baseline: 180.0,
                degrees: 45.0,
                text: watermark.clone(),
                size: 60.0,
                gray: 0.8,
            });
        }
        self.pages.push(page);
        self.y = self.options.margin;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// 放不下時換頁並重畫表頭；剛換頁的位置不再換頁，避免超高列無限換頁
    fn ensure_room(&mut self, height: f32, repeat_header: bool) {
        let top_of_table = self.options.margin + self.options.line_height;
        if self.y + height > self.options.page_break_at() && self.y > top_of_table {
            self.add_page();
            if repeat_header {
                self.table_header();
            }
        }
    }

    fn text_line(&mut self, x: f32, top: f32, width: f32, height: f32, line: &TextLine) {
        let width_mm = text_width(&line.text, line.size, line.style);
        let x = match line.align {
            Align::Left => x + 1.0,
            Align::Center => x + (width - width_mm) / 2.0,
            Align::Right => x + width - 1.0 - width_mm,
        };
        // 基線：行高一半再往下 0.3 倍字高
        let baseline = top + height / 2.0 + 0.3 * line.size / MM_TO_PT;
        self.push(DrawOp::Text {
            x,
            baseline,
            text: line.text.clone(),
            size: line.size,
            style: line.style,
            gray: 0.0,
        });
    }

    fn heading(&mut self, heading: &str, date_label: &str) {
        let options = self.options;
        let width = options.page_width - 2.0 * options.margin;
        let y = self.y;
        self.text_line(
            options.margin,
            y,
            width,
            10.0,
            &TextLine::new(heading, options.heading_size, FontStyle::Bold, Align::Center),
        );
        self.text_line(
            options.margin,
            y + 10.0,
            width,
            options.line_height,
            &TextLine::new(date_label, options.font_size, FontStyle::Regular, Align::Right),
        );
        self.y = y + 20.0;
    }

    fn table_header(&mut self) {
        let cells: Vec<Vec<TextLine>> = TABLE_HEADERS
            .iter()
            .map(|header| {
                vec![TextLine::new(
                    header,
                    self.options.font_size,
                    FontStyle::Bold,
                    Align::Center,
                )]
            })
            .collect();
        let spans: Vec<(usize, usize)> = (0..TABLE_HEADERS.len()).map(|c| (c, c + 1)).collect();
        self.row(&spans, &cells, self.options.line_height);
    }

    /// 畫一列：每格先畫外框，再把文字垂直置中
    fn row(&mut self, spans: &[(usize, usize)], cells: &[Vec<TextLine>], min_height: f32) {
        let options = self.options;
        let line_height = options.line_height;
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let row_height = (line_height * max_lines as f32).max(min_height);
        let top = self.y;

        for (&(first, last), lines) in spans.iter().zip(cells) {
            let x = options.column_x(first);
            let width: f32 = options.column_widths[first..last].iter().sum();
            self.push(DrawOp::Rect {
                x,
                y: top,
                width,
                height: row_height,
            });

            let offset = (row_height - line_height * lines.len() as f32) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let line_top = top + offset + line_height * i as f32;
                self.text_line(x, line_top, width, line_height, line);
            }
        }

        self.y = top + row_height;
    }

    fn wrapped_cells(
        &self,
        spans: &[(usize, usize)],
        texts: &[String],
        style: FontStyle,
        align: Align,
    ) -> Vec<Vec<TextLine>> {
        spans
            .iter()
            .zip(texts)
            .map(|(&(first, last), text)| {
                let width: f32 = self.options.column_widths[first..last].iter().sum();
                wrap_text(text, width, self.options.font_size, style)
                    .into_iter()
                    .map(|line| TextLine::new(&line, self.options.font_size, style, align))
                    .collect()
            })
            .collect()
    }

    fn estimate_row(&mut self, row: &EstimateRow<'_>) {
        let (spans, texts, style, align): (Vec<(usize, usize)>, Vec<String>, _, _) = match row {
            EstimateRow::Priced { .. } => (
                (0..6).map(|c| (c, c + 1)).collect(),
                table_cells(row).to_vec(),
                FontStyle::Regular,
                Align::Center,
            ),
            // 小標題橫跨整個表格
            EstimateRow::Subheading { title } => (
                vec![(0, 6)],
                vec![title.to_string()],
                FontStyle::Bold,
                Align::Left,
            ),
        };
        let cells = self.wrapped_cells(&spans, &texts, style, align);
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        self.ensure_room(self.options.line_height * max_lines as f32, true);
        self.row(&spans, &cells, self.options.line_height);
    }

    fn summary_row(&mut self, label: &str, value: &str, style: FontStyle) {
        let options = self.options;
        let spans = [(0, 5), (5, 6)];
        let cells = self.wrapped_cells(
            &spans,
            &[label.to_string(), value.to_string()],
            style,
            Align::Center,
        );
        self.ensure_room(options.summary_row_height, false);
        self.row(&spans, &cells, options.summary_row_height);
    }
}

#[derive(Debug, Clone)]
struct TextLine {
    text: String,
    size: f32,
    style: FontStyle,
    align: Align,
}

impl TextLine {
    fn new(text: &str, size: f32, style: FontStyle, align: Align) -> Self {
        Self {
            text: text.to_string(),
            size,
            style,
            align,
        }
    }
}

/// 排版估價單：標題、表頭、各列、小計
pub fn layout_estimate(estimate: &Estimate, totals: &Totals, options: &PdfLayoutOptions) -> PdfLayout {
    let mut cursor = LayoutCursor::new(options);

    cursor.heading(
        &estimate.heading,
        &format!("Date: {}", estimate.date.format("%d-%m-%Y")),
    );
    cursor.table_header();

    for row in estimate.numbered_rows() {
        cursor.estimate_row(&row);
    }

    let summary = summary_rows(estimate, totals);
    let last = summary.len().saturating_sub(1);
    for (index, (label, value)) in summary.iter().enumerate() {
        let style = if index == last {
            FontStyle::Bold
        } else {
            FontStyle::Regular
        };
        cursor.summary_row(label, value, style);
    }

    debug_assert!(cursor.options.table_width() <= options.page_width);
    PdfLayout {
        pages: cursor.pages,
    }
}

/// WinAnsi 只能表示 Latin-1，其餘字元以 '?' 代替
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn page_operations(page: &PdfPage, options: &PdfLayoutOptions) -> Vec<Operation> {
    let page_height_pt = options.page_height * MM_TO_PT;
    let mut operations = vec![Operation::new("w", vec![real(0.2 * MM_TO_PT)])];

    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
            } => {
                operations.push(Operation::new(
                    "re",
                    vec![
                        real(x * MM_TO_PT),
                        real(page_height_pt - (y + height) * MM_TO_PT),
                        real(width * MM_TO_PT),
                        real(height * MM_TO_PT),
                    ],
                ));
                operations.push(Operation::new("S", vec![]));
            }
            DrawOp::Text {
                x,
                baseline,
                text,
                size,
                style,
                gray,
            } => {
                operations.extend([
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![style.resource_name().into(), real(*size)]),
                    Operation::new("g", vec![real(*gray)]),
                    Operation::new(
                        "Td",
                        vec![real(x * MM_TO_PT), real(page_height_pt - baseline * MM_TO_PT)],
                    ),
                    Operation::new(
                        "Tj",
                        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                ]);
            }
            DrawOp::RotatedText {
                x,
                baseline,
                degrees,
                text,
                size,
                gray,
            } => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                operations.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            real(cos),
                            real(sin),
                            real(-sin),
                            real(cos),
                            real(x * MM_TO_PT),
                            real(page_height_pt - baseline * MM_TO_PT),
                        ],
                    ),
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![FontStyle::Regular.resource_name().into(), real(*size)],
                    ),
                    Operation::new("g", vec![real(*gray)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                    Operation::new("Q", vec![]),
                ]);
            }
        }
    }

    operations
}

fn font(document: &mut Document, base_font: &str) -> ObjectId {
    document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// 把排好的版面寫成 PDF 位元組
pub fn write_pdf(layout: &PdfLayout, options: &PdfLayoutOptions, title: &str) -> Result<Vec<u8>> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let regular_id = font(&mut document, "Helvetica");
    let bold_id = font(&mut document, "Helvetica-Bold");
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(page, options),
        };
        let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(options.page_width * MM_TO_PT),
                real(options.page_height * MM_TO_PT),
            ],
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = document.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("estimate-draft"),
    });
    document.trailer.set("Root", catalog_id);
    document.trailer.set("Info", info_id);
    document.compress();

    let mut bytes = Vec::new();
    document.save_to(&mut bytes)?;
    Ok(bytes)
}

pub fn render_pdf(estimate: &Estimate, totals: &Totals, options: &PdfLayoutOptions) -> Result<Vec<u8>> {
    let layout = layout_estimate(estimate, totals, options);
    tracing::debug!(
        "Laid out '{}' on {} PDF page(s)",
        estimate.heading,
        layout.pages.len()
    );
    write_pdf(&layout, options, &estimate.heading)
}
