//! Chart rasterization.
//!
//! Both operations are pure functions from numeric data to PNG bytes:
//! identical input produces identical pixels. Charts are drawn with
//! [plotters] into an in-memory RGB buffer and PNG-encoded with [image].

use crate::error::PanelError;
use crate::stats::{NormalFit, PairFit};

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use plotters::prelude::*;
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::panic::{self, AssertUnwindSafe};

/// Chart width in pixels.
pub const CHART_WIDTH: u32 = 1000;

/// Chart height in pixels.
pub const CHART_HEIGHT: u32 = 600;

/// Number of histogram bins.
const HISTOGRAM_BINS: usize = 20;

/// Bar fill colour for histograms.
const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);

/// Render a density-normalized histogram with the fitted curve overlaid.
///
/// # Arguments
///
/// * `name`: Variable name used for the title and x axis
/// * `values`: The measurement series. Must be the series the fit was
///   computed from, so the value range is non-degenerate.
/// * `fit`: Fitted distribution whose density curve is overlaid
pub fn render_histogram(
    name: &str,
    values: &[f64],
    fit: &NormalFit,
) -> Result<Vec<u8>, PanelError> {
    let (min, max) = bounds(values);
    let bin_width = (max - min) / HISTOGRAM_BINS as f64;
    if !(bin_width > 0.0) {
        return Err(PanelError::Render {
            reason: format!("value range of {} is empty", name),
        });
    }

    // Density normalization: bar areas sum to one.
    let mut densities = [0.0_f64; HISTOGRAM_BINS];
    let weight = 1.0 / (values.len() as f64 * bin_width);
    for &value in values {
        let bin = (((value - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        densities[bin] += weight;
    }
    let peak = densities
        .iter()
        .chain(fit.curve.iter().map(|(_, density)| density))
        .fold(0.0_f64, |acc, &d| acc.max(d));

    let mut buffer = vec![0_u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let backend = FontFallbackBackend::new(BitMapBackend::with_buffer(
            &mut buffer,
            (CHART_WIDTH, CHART_HEIGHT),
        ));
        let root = backend.into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Histograma de {} con Ajuste Gaussiano", name),
                ("sans-serif", 28),
            )
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(min..max, 0.0..peak * 1.05)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc(name)
            .y_desc("Densidad")
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series((0..HISTOGRAM_BINS).map(|bin| {
                let x0 = min + bin_width * bin as f64;
                Rectangle::new(
                    [(x0, 0.0), (x0 + bin_width, densities[bin])],
                    BAR_COLOR.mix(0.6).filled(),
                )
            }))
            .map_err(draw_error)?;
        // Bar outlines.
        chart
            .draw_series((0..HISTOGRAM_BINS).map(|bin| {
                let x0 = min + bin_width * bin as f64;
                Rectangle::new([(x0, 0.0), (x0 + bin_width, densities[bin])], &BLACK)
            }))
            .map_err(draw_error)?;

        chart
            .draw_series(LineSeries::new(
                fit.curve.iter().copied(),
                BLACK.stroke_width(2),
            ))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    encode_png(&buffer)
}

/// Render a scatter of standardized pairs with the regression segment.
///
/// # Arguments
///
/// * `x_label`: First variable name, used for the title and x axis
/// * `y_label`: Second variable name, used for the title and y axis
/// * `pair`: Standardized series and fitted segment
pub fn render_scatter_fit(
    x_label: &str,
    y_label: &str,
    pair: &PairFit,
) -> Result<Vec<u8>, PanelError> {
    let (x_min, x_max) = bounds(&pair.z_x);
    let (y_min, y_max) = bounds(&pair.z_y);
    // Standardized series always have spread; pad so edge markers stay visible.
    let x_pad = (x_max - x_min) * 0.05;
    let y_pad = (y_max - y_min) * 0.05;

    let mut buffer = vec![0_u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let backend = FontFallbackBackend::new(BitMapBackend::with_buffer(
            &mut buffer,
            (CHART_WIDTH, CHART_HEIGHT),
        ));
        let root = backend.into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Correlación entre {} y {}", x_label, y_label),
                ("sans-serif", 28),
            )
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_min - x_pad..x_max + x_pad, y_min - y_pad..y_max + y_pad)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(
                pair.z_x
                    .iter()
                    .zip(&pair.z_y)
                    .map(|(&x, &y)| Circle::new((x, y), 3, BAR_COLOR.filled())),
            )
            .map_err(draw_error)?;

        chart
            .draw_series(LineSeries::new(
                pair.line.iter().copied(),
                RED.stroke_width(2),
            ))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    encode_png(&buffer)
}

/// PNG-encode an RGB pixel buffer of chart dimensions.
fn encode_png(buffer: &[u8]) -> Result<Vec<u8>, PanelError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        buffer,
        CHART_WIDTH,
        CHART_HEIGHT,
        ExtendedColorType::Rgb8,
    )?;
    Ok(png)
}

/// Map a drawing error into a [PanelError].
///
/// Drawing errors borrow the pixel buffer through their backend type
/// parameter, so they are flattened to their message here.
fn draw_error<E: std::error::Error>(error: E) -> PanelError {
    PanelError::Render {
        reason: error.to_string(),
    }
}

/// Returns the minimum and maximum of a series.
fn bounds(values: &[f64]) -> (f64, f64) {
    values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), &v| (min.min(v), max.max(v)),
    )
}

/// A [DrawingBackend] wrapper that degrades text drawing instead of failing.
///
/// Font discovery depends on the host environment; a headless container may
/// have no usable system font. Data marks always render, and text is
/// skipped when the font machinery errors or panics underneath.
struct FontFallbackBackend<DB> {
    inner: DB,
}

impl<DB> FontFallbackBackend<DB> {
    fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for FontFallbackBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        }));
        match result {
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => Ok(()),
            Ok(other) => other,
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        }));
        match result {
            Ok(Ok(size)) => Ok(size),
            // Fixed approximation so label areas are still reserved.
            Ok(Err(_)) | Err(_) => Ok((text.chars().count() as u32 * 8, 16)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::stats;

    const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    fn sample_series() -> Vec<f64> {
        (0..200).map(|i| (i as f64 * 0.13).sin() * 5.0 + 12.0).collect()
    }

    #[test]
    fn histogram_is_valid_png() {
        let values = sample_series();
        let fit = stats::fit_normal(&values).unwrap();
        let png = render_histogram("temperaturaaire", &values, &fit).unwrap();
        assert!(png.len() > PNG_SIGNATURE.len());
        assert_eq!(PNG_SIGNATURE, png[..8]);
    }

    #[test]
    fn histogram_is_deterministic() {
        let values = sample_series();
        let fit = stats::fit_normal(&values).unwrap();
        let first = render_histogram("humedadaire", &values, &fit).unwrap();
        let second = render_histogram("humedadaire", &values, &fit).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn histogram_varies_with_input() {
        let values = sample_series();
        let fit = stats::fit_normal(&values).unwrap();
        let first = render_histogram("indiceuv", &values, &fit).unwrap();
        let shifted: Vec<f64> = values.iter().map(|v| v * 2.0).collect();
        let shifted_fit = stats::fit_normal(&shifted).unwrap();
        let second = render_histogram("indiceuv", &shifted, &shifted_fit).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn histogram_rejects_empty_range() {
        let fit = NormalFit {
            mean: 1.0,
            std_dev: 1.0,
            curve: vec![(1.0, 0.4)],
        };
        let result = render_histogram("indiceuv", &[1.0, 1.0], &fit);
        assert!(matches!(result, Err(PanelError::Render { .. })));
    }

    #[test]
    fn scatter_is_valid_png_and_deterministic() {
        let x = sample_series();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| v + (i % 11) as f64).collect();
        let pair = stats::standardize_and_fit(&x, &y).unwrap();
        let first = render_scatter_fit("velocidadviento", "direccionviento", &pair).unwrap();
        let second = render_scatter_fit("velocidadviento", "direccionviento", &pair).unwrap();
        assert_eq!(PNG_SIGNATURE, first[..8]);
        assert_eq!(first, second);
    }
}
