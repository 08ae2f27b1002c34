// Cursor-based PDF report writer
use crate::application::shaping;
use crate::application::variable_repository::FetchError;
use crate::domain::variable::{parse_timestamp, DataType, DecodedValue, VariableRecord};
use crate::infrastructure::chart_image::RenderedChart;
use chrono::{Local, TimeZone, Utc};
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::io::Cursor;
use thiserror::Error;

// A4 portrait geometry, in millimeters.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;

// Approximate Helvetica advance at 9pt; column truncation budgets assume it.
const MM_PER_CHAR_AT_9PT: f32 = 2.2;

const EMBED_DPI: f32 = 300.0;
const PX_TO_MM_AT_EMBED_DPI: f32 = 25.4 / EMBED_DPI;

pub const PRODUCT_NAME: &str = "PLC Telemetry";

const TABLE_COLUMNS: [(&str, f32); 6] = [
    ("Address", 22.0),
    ("Symbol", 28.0),
    ("Data Type", 18.0),
    ("Value", 18.0),
    ("Module", 28.0),
    ("Timestamp", 36.0),
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no variable data available for the report")]
    NoData,
    #[error("failed to build report document: {0}")]
    Document(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The finished downloadable document.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

enum FontKind {
    Regular,
    Bold,
    Italic,
}

/// Sequential writer over a paginated document. The cursor tracks the next
/// baseline measured from the top edge; every operation advances it and
/// wraps to a fresh page when it would leave the printable area.
pub struct ReportWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl ReportWriter {
    pub fn new(document_title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(
            document_title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "content",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Document(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Document(e.to_string()))?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| ReportError::Document(e.to_string()))?;
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            y: MARGIN_MM,
            pages: 1,
        })
    }

    fn write_at(&self, text: &str, size: f32, x: f32, y_from_top: f32, font: FontKind) {
        let font = match font {
            FontKind::Regular => &self.regular,
            FontKind::Bold => &self.bold,
            FontKind::Italic => &self.italic,
        };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT_MM - y_from_top), font);
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_MM;
        self.pages += 1;
    }

    fn break_page_if_needed(&mut self) {
        if self.y > PAGE_HEIGHT_MM - MARGIN_MM {
            self.new_page();
        }
    }

    /// Extra vertical whitespace between sections.
    pub fn advance(&mut self, mm: f32) {
        self.y += mm;
    }

    pub fn add_title(&mut self, title: &str) {
        let size = 20.0;
        let x = ((PAGE_WIDTH_MM - approx_text_width(title, size)) / 2.0).max(MARGIN_MM);
        self.write_at(title, size, x, self.y, FontKind::Bold);
        self.y += LINE_HEIGHT_MM * 2.0;
    }

    pub fn add_subtitle(&mut self, subtitle: &str) {
        self.break_page_if_needed();
        self.write_at(subtitle, 14.0, MARGIN_MM, self.y, FontKind::Bold);
        self.y += LINE_HEIGHT_MM * 1.5;
    }

    pub fn add_text(&mut self, text: &str) {
        let size = 12.0;
        let budget = ((PAGE_WIDTH_MM - MARGIN_MM * 2.0) / mm_per_char(size)) as usize;
        for line in wrap_text(text, budget) {
            self.break_page_if_needed();
            self.write_at(&line, size, MARGIN_MM, self.y, FontKind::Regular);
            self.y += LINE_HEIGHT_MM;
        }
    }

    /// Counts by total, data type and module over the given collection.
    /// The input is read once and never mutated.
    pub fn add_statistics(&mut self, records: &[VariableRecord]) {
        if records.is_empty() {
            return;
        }
        let stats = shaping::statistics(records);

        self.add_subtitle("General Statistics");
        self.add_text(&format!("Total variables: {}", stats.total));
        self.add_text(&format!("BOOL variables: {}", stats.bool_count));
        self.add_text(&format!("WORD variables: {}", stats.word_count));
        self.add_text(&format!("Distinct modules: {}", stats.modules.len()));
        self.add_text(&format!("Modules: {}", stats.modules.join(", ")));

        self.add_subtitle("Variables per Module");
        for module in &stats.per_module {
            self.add_text(&format!("{}: {} variables", module.module, module.count));
        }
    }

    /// Fixed six-column table. Emits an explicit "no data" line instead of
    /// an empty table.
    pub fn add_variables_table(&mut self, records: &[VariableRecord], caption: &str) {
        self.add_subtitle(caption);

        if records.is_empty() {
            self.add_text("No variables available");
            return;
        }

        let header_size = 10.0;
        let mut x = MARGIN_MM;
        for (header, width) in TABLE_COLUMNS {
            let budget = column_char_budget(width);
            self.write_at(
                &truncate_to(header, budget),
                header_size,
                x + 2.0,
                self.y,
                FontKind::Bold,
            );
            x += width;
        }
        self.y += 8.0;

        let row_size = 9.0;
        for record in records {
            if self.y > PAGE_HEIGHT_MM - MARGIN_MM - 10.0 {
                self.new_page();
                self.y = MARGIN_MM + 10.0;
            }

            let cells = [
                record.address.clone(),
                record.symbol.clone().unwrap_or_default(),
                record.data_type.to_string(),
                value_cell(record),
                record.module.clone(),
                timestamp_cell(&record.timestamp),
            ];

            let mut x = MARGIN_MM;
            for (cell, (_, width)) in cells.iter().zip(TABLE_COLUMNS) {
                let budget = column_char_budget(width);
                self.write_at(
                    &truncate_to(cell, budget),
                    row_size,
                    x + 1.0,
                    self.y,
                    FontKind::Regular,
                );
                x += width;
            }
            self.y += 6.0;
        }

        self.y += 10.0;
    }

    /// Scale a pre-rendered chart bitmap to the printable width and embed
    /// it, breaking the page first when it would not fit. Embedding
    /// failures become an inline warning line instead of aborting the
    /// report.
    pub fn add_chart_image(&mut self, chart: &RenderedChart, caption: &str) {
        self.add_subtitle(caption);
        if let Err(error) = self.embed_chart(chart) {
            tracing::warn!("failed to embed chart '{}': {}", caption, error);
            self.add_text(&format!("Failed to render chart: {caption}"));
        }
    }

    fn embed_chart(&mut self, chart: &RenderedChart) -> Result<(), ReportError> {
        let target_width = PAGE_WIDTH_MM - MARGIN_MM * 2.0;
        let target_height = chart.height_px as f32 * target_width / chart.width_px as f32;

        if self.y + target_height > PAGE_HEIGHT_MM - MARGIN_MM {
            self.new_page();
        }

        let decoder = PngDecoder::new(Cursor::new(chart.png.as_slice()))
            .map_err(|e| ReportError::Document(e.to_string()))?;
        let image = Image::try_from(decoder).map_err(|e| ReportError::Document(e.to_string()))?;

        let native_width = chart.width_px as f32 * PX_TO_MM_AT_EMBED_DPI;
        let native_height = chart.height_px as f32 * PX_TO_MM_AT_EMBED_DPI;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - self.y - target_height)),
                scale_x: Some(target_width / native_width),
                scale_y: Some(target_height / native_height),
                dpi: Some(EMBED_DPI),
                ..ImageTransform::default()
            },
        );
        self.y += target_height + 10.0;
        Ok(())
    }

    /// Append the footer to the final page and emit the document bytes.
    pub fn finalize(self, filename: &str) -> Result<ReportArtifact, ReportError> {
        let size = 8.0;
        let footer = format!(
            "Generated {} - {}",
            Local::now().format("%d/%m/%Y %H:%M:%S"),
            PRODUCT_NAME
        );
        let x = ((PAGE_WIDTH_MM - approx_text_width(&footer, size)) / 2.0).max(MARGIN_MM);
        self.write_at(&footer, size, x, PAGE_HEIGHT_MM - 10.0, FontKind::Italic);

        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| ReportError::Document(e.to_string()))?;
        Ok(ReportArtifact {
            filename: filename.to_string(),
            bytes,
        })
    }
}

fn mm_per_char(font_size: f32) -> f32 {
    MM_PER_CHAR_AT_9PT * font_size / 9.0
}

fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * mm_per_char(font_size) * 0.5
}

fn column_char_budget(width_mm: f32) -> usize {
    ((width_mm - 2.0) / MM_PER_CHAR_AT_9PT) as usize
}

fn truncate_to(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let keep = max_chars.saturating_sub(3);
        format!("{}...", text.chars().take(keep).collect::<String>())
    } else {
        text.to_string()
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        let mut word = word;
        while word.chars().count() > max_chars {
            let head: String = word.chars().take(max_chars).collect();
            let head_len = head.len();
            lines.push(head);
            word = &word[head_len..];
        }
        if current.is_empty() {
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Value column rendering: booleans as True/False, analog words with two
/// decimals, anything else as the raw upstream text.
fn value_cell(record: &VariableRecord) -> String {
    match record.decode() {
        DecodedValue::Bool(true) => "True".to_string(),
        DecodedValue::Bool(false) => "False".to_string(),
        DecodedValue::Numeric(n) if record.data_type == DataType::Word => format!("{:.2}", n),
        _ => record.value.to_string(),
    }
}

/// Timestamps are stored as UTC and displayed in local time.
fn timestamp_cell(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(naive) => Utc
            .from_utc_datetime(&naive)
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
            .to_string(),
        None => raw.to_string(),
    }
}
