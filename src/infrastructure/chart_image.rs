// Bitmap rendering for per-symbol chart images
use crate::domain::series::SymbolSeries;
use crate::domain::variable::DataType;
use printpdf::image_crate::codecs::png::PngEncoder;
use printpdf::image_crate::{ColorType, ImageEncoder, Rgb, RgbImage};
use thiserror::Error;

pub const CHART_WIDTH_PX: u32 = 900;
pub const CHART_HEIGHT_PX: u32 = 480;

const PLOT_MARGIN_PX: u32 = 24;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([120, 120, 120]);
const SERIES: Rgb<u8> = Rgb([37, 99, 235]);

#[derive(Debug, Error)]
pub enum ChartRenderError {
    #[error("series has no points")]
    EmptySeries,
    #[error("failed to encode chart image: {0}")]
    Encode(String),
}

/// A chart rasterized to a PNG bitmap, ready for report embedding.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub caption: String,
    pub width_px: u32,
    pub height_px: u32,
    pub png: Vec<u8>,
}

/// Rasterize one symbol series: bars for boolean series, a line path for
/// numeric ones. Points are spaced evenly along the x axis in timestamp
/// order, matching the on-screen charts.
pub fn render_series_chart(series: &SymbolSeries) -> Result<RenderedChart, ChartRenderError> {
    if series.points.is_empty() {
        return Err(ChartRenderError::EmptySeries);
    }

    let mut image = RgbImage::from_pixel(CHART_WIDTH_PX, CHART_HEIGHT_PX, BACKGROUND);

    let left = PLOT_MARGIN_PX;
    let right = CHART_WIDTH_PX - PLOT_MARGIN_PX;
    let top = PLOT_MARGIN_PX;
    let bottom = CHART_HEIGHT_PX - PLOT_MARGIN_PX;

    draw_line(&mut image, (left, top), (left, bottom), AXIS);
    draw_line(&mut image, (left, bottom), (right, bottom), AXIS);

    let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
    let (min, max) = value_range(&values, &series.data_type);
    let span = max - min;

    let x_at = |index: usize| -> u32 {
        if values.len() == 1 {
            return (left + right) / 2;
        }
        let fraction = index as f64 / (values.len() - 1) as f64;
        left + (fraction * (right - left) as f64).round() as u32
    };
    let y_at = |value: f64| -> u32 {
        let normalized = (value - min) / span;
        bottom - (normalized * (bottom - top) as f64).round() as u32
    };

    if series.data_type == DataType::Bool {
        let bar_width = (((right - left) as usize / values.len()).saturating_sub(2)).clamp(1, 40) as u32;
        for (i, value) in values.iter().enumerate() {
            let x = x_at(i);
            let x0 = x.saturating_sub(bar_width / 2).max(left);
            let x1 = (x + bar_width / 2).min(right);
            fill_rect(&mut image, x0, y_at(*value), x1, bottom, SERIES);
        }
    } else {
        for window in (0..values.len()).collect::<Vec<_>>().windows(2) {
            let (a, b) = (window[0], window[1]);
            draw_line(
                &mut image,
                (x_at(a), y_at(values[a])),
                (x_at(b), y_at(values[b])),
                SERIES,
            );
        }
        for (i, value) in values.iter().enumerate() {
            let (x, y) = (x_at(i), y_at(*value));
            fill_rect(
                &mut image,
                x.saturating_sub(2),
                y.saturating_sub(2),
                (x + 2).min(CHART_WIDTH_PX - 1),
                (y + 2).min(CHART_HEIGHT_PX - 1),
                SERIES,
            );
        }
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            CHART_WIDTH_PX,
            CHART_HEIGHT_PX,
            ColorType::Rgb8,
        )
        .map_err(|e| ChartRenderError::Encode(e.to_string()))?;

    Ok(RenderedChart {
        caption: series.symbol.clone(),
        width_px: CHART_WIDTH_PX,
        height_px: CHART_HEIGHT_PX,
        png,
    })
}

/// Boolean charts always span the 0..1 domain; flat numeric series are
/// padded so the line sits mid-plot instead of dividing by zero.
fn value_range(values: &[f64], data_type: &DataType) -> (f64, f64) {
    if *data_type == DataType::Bool {
        return (0.0, 1.0);
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn fill_rect(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for x in x0..=x1.min(image.width() - 1) {
        for y in y0..=y1.min(image.height() - 1) {
            image.put_pixel(x, y, color);
        }
    }
}

fn draw_line(image: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (mut x0, mut y0) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < image.width() && (y0 as u32) < image.height() {
            image.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shaping::group_by_symbol;
    use crate::domain::variable::{RawValue, VariableRecord};

    fn records(data_type: &str, values: &[&str]) -> Vec<VariableRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| VariableRecord {
                id: None,
                address: "%IW64".to_string(),
                symbol: Some("Tank_Level".to_string()),
                comment: None,
                data_type: DataType::from(data_type.to_string()),
                value: RawValue::Text(value.to_string()),
                module: "AI8x13Bit".to_string(),
                timestamp: format!("2025-01-15T10:0{}:00", i),
            })
            .collect()
    }

    #[test]
    fn numeric_series_renders_a_png() {
        let series = group_by_symbol(&records("WORD", &["10.5", "12.0", "11.0"]));
        let chart = render_series_chart(&series[0]).unwrap();
        assert_eq!(chart.caption, "Tank_Level");
        assert!(chart.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn boolean_series_renders_a_png() {
        let series = group_by_symbol(&records("BOOL", &["True", "False", "True"]));
        let chart = render_series_chart(&series[0]).unwrap();
        assert!(chart.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn flat_series_does_not_panic() {
        let series = group_by_symbol(&records("WORD", &["5", "5", "5"]));
        assert!(render_series_chart(&series[0]).is_ok());
    }

    #[test]
    fn empty_series_is_rejected() {
        let mut series = group_by_symbol(&records("WORD", &["5"]));
        series[0].points.clear();
        assert!(matches!(
            render_series_chart(&series[0]),
            Err(ChartRenderError::EmptySeries)
        ));
    }
}
