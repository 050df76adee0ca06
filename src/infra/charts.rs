// ============================================================
// Layer 6 — Chart Renderer
// ============================================================
// Renders every chart as an SVG file with plotters. File names
// are fixed so repeated runs overwrite the same outputs:
//
//   churn.svg            pie, churned vs retained
//   sex-churn.svg        grouped bars, male/female per label
//   senior-churn.svg     grouped bars, senior/non-senior per label
//   tenure.svg           overlaid histograms
//   monthly-charges.svg  overlaid histograms
//   total-charges.svg    overlaid histograms
//   loss.svg             loss / accuracy curves (re-drawn every epoch)
//   confusion-matrix.svg heatmap, actual x predicted

use anyhow::{Context, Result};
use plotters::prelude::*;
use std::{
    f64::consts::PI,
    fs,
    path::{Path, PathBuf},
};

use crate::data::summary::{histogram, shared_range, GroupedCounts, Histogram};
use crate::domain::record::ChurnLabel;
use crate::domain::traits::TrainingObserver;
use crate::ml::evaluator::ConfusionMatrix;
use crate::ml::trainer::EpochMetrics;

pub const CHURN_PIE:        &str = "churn.svg";
pub const SEX_CHURN:        &str = "sex-churn.svg";
pub const SENIOR_CHURN:     &str = "senior-churn.svg";
pub const TENURE:           &str = "tenure.svg";
pub const MONTHLY_CHARGES:  &str = "monthly-charges.svg";
pub const TOTAL_CHARGES:    &str = "total-charges.svg";
pub const TRAINING_CURVES:  &str = "loss.svg";
pub const CONFUSION_MATRIX: &str = "confusion-matrix.svg";

const CHURNED_COLOR:  RGBColor = RGBColor(199, 21, 133); // mediumvioletred
const RETAINED_COLOR: RGBColor = RGBColor(30, 144, 255); // dodgerblue
const FONT: &str = "sans-serif";
const SIZE: (u32, u32) = (900, 600);
const HISTOGRAM_BINS: usize = 30;

fn label_color(label: ChurnLabel) -> RGBColor {
    match label {
        ChurnLabel::Churned  => CHURNED_COLOR,
        ChurnLabel::Retained => RETAINED_COLOR,
    }
}

/// Axis formatter for categories centred on integer positions
fn category_label(names: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Titles for an overlaid histogram chart
pub struct HistogramSpec<'a> {
    pub file:    &'a str,
    pub title:   &'a str,
    pub x_label: &'a str,
}

pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Cannot create output dir '{}'", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }

    // ── Pie ───────────────────────────────────────────────────────────────────
    /// "Churned vs Retained" pie, slices drawn as polygons
    pub fn churn_pie(&self, churned: usize, retained: usize) -> Result<PathBuf> {
        let path = self.path(CHURN_PIE);
        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled("Churned vs Retained", (FONT, 28.0))?;

        let (w, h)   = area.dim_in_pixel();
        let center   = (w as f64 / 2.0, h as f64 / 2.0);
        let radius   = (w.min(h) as f64) * 0.38;
        let total    = (churned + retained).max(1) as f64;
        let slices   = [
            (ChurnLabel::Churned, churned),
            (ChurnLabel::Retained, retained),
        ];

        let mut start = -PI / 2.0;
        for (label, count) in slices {
            if count == 0 {
                continue;
            }
            let sweep = 2.0 * PI * count as f64 / total;
            let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;

            let mut points = vec![(center.0 as i32, center.1 as i32)];
            points.extend((0..=steps).map(|i| {
                let a = start + sweep * i as f64 / steps as f64;
                ((center.0 + radius * a.cos()) as i32, (center.1 + radius * a.sin()) as i32)
            }));
            area.draw(&Polygon::new(points, label_color(label).mix(0.6).filled()))?;

            let mid = start + sweep / 2.0;
            let text = format!("{} {:.1}%", label.display_name(), 100.0 * count as f64 / total);
            area.draw(&Text::new(
                text,
                (
                    (center.0 + radius * 0.55 * mid.cos()) as i32 - 50,
                    (center.1 + radius * 0.55 * mid.sin()) as i32,
                ),
                (FONT, 20.0),
            ))?;
            start += sweep;
        }

        root.present()?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path.clone())
    }

    // ── Grouped bars ──────────────────────────────────────────────────────────
    /// One group per category (e.g. Male/Female), one bar per label
    pub fn grouped_bars(
        &self,
        file:       &str,
        title:      &str,
        categories: [&str; 2],
        counts:     &[GroupedCounts],
    ) -> Result<PathBuf> {
        let path = self.path(file);
        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let names: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        let y_max = counts
            .iter()
            .map(|c| c.matching.max(c.other))
            .max()
            .unwrap_or(0)
            .max(1) as f64
            * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 28.0))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..1.5f64, 0f64..y_max)?;

        let formatter = |v: &f64| category_label(&names, *v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(5)
            .x_label_formatter(&formatter)
            .y_desc("Count")
            .draw()?;

        let bar_width = 0.35;
        for (slot, group) in counts.iter().enumerate() {
            let color  = label_color(group.label);
            let offset = if slot == 0 { -bar_width } else { 0.0 };
            let values = [group.matching, group.other];

            chart
                .draw_series(values.iter().enumerate().map(move |(i, &v)| {
                    let x0 = i as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, v as f64)], color.mix(0.6).filled())
                }))?
                .label(group.label.display_name())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.6).filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path.clone())
    }

    // ── Overlaid histograms ───────────────────────────────────────────────────
    pub fn overlaid_histogram(
        &self,
        spec:     &HistogramSpec<'_>,
        churned:  &[f64],
        retained: &[f64],
    ) -> Result<PathBuf> {
        let path  = self.path(spec.file);
        let range = shared_range(&[churned, retained]);
        let series: [(ChurnLabel, Histogram); 2] = [
            (ChurnLabel::Churned,  histogram(churned,  HISTOGRAM_BINS, range)),
            (ChurnLabel::Retained, histogram(retained, HISTOGRAM_BINS, range)),
        ];
        let y_max = series
            .iter()
            .map(|(_, h)| h.max_count())
            .max()
            .unwrap_or(0)
            .max(1) as f64
            * 1.1;

        let root = SVGBackend::new(&path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (FONT, 28.0))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(range.0..range.1, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc("Count")
            .draw()?;

        for (label, hist) in &series {
            let color = label_color(*label);
            chart
                .draw_series(hist.bins().map(move |(lo, hi, count)| {
                    Rectangle::new([(lo, 0.0), (hi, count as f64)], color.mix(0.35).filled())
                }))?
                .label(label.display_name())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.35).filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path.clone())
    }

    // ── Training curves ───────────────────────────────────────────────────────
    /// Two panels: loss/val_loss and acc/val_acc per epoch
    pub fn training_curves(&self, history: &[EpochMetrics]) -> Result<PathBuf> {
        let path = self.path(TRAINING_CURVES);
        let root = SVGBackend::new(&path, (SIZE.0, SIZE.1 * 2)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 1));

        let epochs = history.len().max(2) as f64;
        let loss_series: [(&str, Vec<(f64, f64)>, RGBColor); 2] = [
            ("loss",     points(history, |m| m.loss),     RETAINED_COLOR),
            ("val_loss", points(history, |m| m.val_loss), CHURNED_COLOR),
        ];
        let acc_series: [(&str, Vec<(f64, f64)>, RGBColor); 2] = [
            ("acc",     points(history, |m| m.accuracy),     RETAINED_COLOR),
            ("val_acc", points(history, |m| m.val_accuracy), CHURNED_COLOR),
        ];
        let loss_max = loss_series
            .iter()
            .flat_map(|(_, p, _)| p.iter().map(|&(_, y)| y))
            .fold(0.0f64, f64::max)
            .max(0.1)
            * 1.1;

        for (panel, (title, series, y_max)) in panels.iter().zip([
            ("Loss", &loss_series, loss_max),
            ("Accuracy", &acc_series, 1.0),
        ]) {
            let mut chart = ChartBuilder::on(panel)
                .caption(title, (FONT, 26.0))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(1f64..epochs, 0f64..y_max)?;

            chart.configure_mesh().x_desc("Epoch").draw()?;

            for (name, pts, color) in series.iter() {
                let color = *color;
                chart
                    .draw_series(LineSeries::new(pts.iter().copied(), &color))?
                    .label(*name)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &color));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(path.clone())
    }

    // ── Confusion matrix ──────────────────────────────────────────────────────
    /// Heatmap with actual classes on the y axis, predicted on the x axis
    pub fn confusion_matrix(&self, matrix: &ConfusionMatrix, tick_labels: &[String]) -> Result<PathBuf> {
        let path = self.path(CONFUSION_MATRIX);
        let root = SVGBackend::new(&path, (700, 650)).into_drawing_area();
        root.fill(&WHITE)?;

        let k   = matrix.num_classes().max(1) as f64;
        let max = matrix.counts.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption("Confusion matrix", (FONT, 28.0))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(k - 0.5), -0.5f64..(k - 0.5))?;

        let formatter = |v: &f64| category_label(tick_labels, *v);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(2 * matrix.num_classes() + 1)
            .y_labels(2 * matrix.num_classes() + 1)
            .x_label_formatter(&formatter)
            .y_label_formatter(&formatter)
            .x_desc("Predicted")
            .y_desc("Actual")
            .draw()?;

        let cells: Vec<(usize, usize, usize)> = matrix
            .counts
            .iter()
            .enumerate()
            .flat_map(|(a, row)| row.iter().enumerate().map(move |(p, &c)| (a, p, c)))
            .collect();

        chart.draw_series(cells.iter().map(|&(a, p, c)| {
            let t = c as f64 / max;
            let shade = RGBColor(
                (255.0 - 225.0 * t) as u8,
                (255.0 - 111.0 * t) as u8,
                255,
            );
            let (x, y) = (p as f64, a as f64);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], shade.filled())
        }))?;

        chart.draw_series(cells.iter().map(|&(a, p, c)| {
            Text::new(c.to_string(), (p as f64 - 0.05, a as f64), (FONT, 24.0))
        }))?;

        root.present()?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(path.clone())
    }
}

fn points<F>(history: &[EpochMetrics], value: F) -> Vec<(f64, f64)>
where
    F: Fn(&EpochMetrics) -> f64,
{
    history
        .iter()
        .map(|m| (m.epoch as f64, value(m)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

// ─── LiveCurves ───────────────────────────────────────────────────────────────
/// Re-renders loss.svg at the end of every epoch
pub struct LiveCurves<'a> {
    renderer: &'a ChartRenderer,
}

impl<'a> LiveCurves<'a> {
    pub fn new(renderer: &'a ChartRenderer) -> Self {
        Self { renderer }
    }
}

impl TrainingObserver for LiveCurves<'_> {
    fn on_epoch_end(&mut self, _metrics: &EpochMetrics, history: &[EpochMetrics]) -> Result<()> {
        self.renderer.training_curves(history)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(epoch: usize, loss: f64) -> EpochMetrics {
        EpochMetrics { epoch, loss, val_loss: loss + 0.1, accuracy: 0.7, val_accuracy: f64::NAN }
    }

    fn is_svg(path: &Path) -> bool {
        fs::read_to_string(path).map(|s| s.contains("<svg")).unwrap_or(false)
    }

    #[test]
    fn test_category_label() {
        let names = vec!["Male".to_string(), "Female".to_string()];
        assert_eq!(category_label(&names, 0.0), "Male");
        assert_eq!(category_label(&names, 1.0), "Female");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 2.0), "");
        assert_eq!(category_label(&names, -1.0), "");
    }

    #[test]
    fn test_descriptive_charts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("charts")).unwrap();

        assert!(is_svg(&renderer.churn_pie(30, 70).unwrap()));

        let counts = vec![
            GroupedCounts { label: ChurnLabel::Churned,  matching: 10, other: 12 },
            GroupedCounts { label: ChurnLabel::Retained, matching: 40, other: 38 },
        ];
        let path = renderer
            .grouped_bars(SEX_CHURN, "Sex vs Churn Status", ["Male", "Female"], &counts)
            .unwrap();
        assert!(is_svg(&path));

        let spec = HistogramSpec { file: TENURE, title: "Tenure duration", x_label: "Tenure (months)" };
        let path = renderer.overlaid_histogram(&spec, &[1.0, 2.0, 3.0], &[10.0, 40.0]).unwrap();
        assert!(is_svg(&path));
        assert_eq!(path.file_name().unwrap(), TENURE);
    }

    #[test]
    fn test_pie_with_single_class() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path()).unwrap();
        assert!(is_svg(&renderer.churn_pie(0, 5).unwrap()));
    }

    #[test]
    fn test_training_and_confusion_charts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path()).unwrap();

        let mut live = LiveCurves::new(&renderer);
        let history = vec![metrics(1, 0.7), metrics(2, 0.5)];
        live.on_epoch_end(&history[1], &history).unwrap();
        assert!(is_svg(&dir.path().join(TRAINING_CURVES)));

        let cm = ConfusionMatrix { counts: vec![vec![50, 5], vec![8, 12]] };
        let labels = vec!["Retained".to_string(), "Churned".to_string()];
        assert!(is_svg(&renderer.confusion_matrix(&cm, &labels).unwrap()));
    }
}
