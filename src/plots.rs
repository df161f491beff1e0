//! PNG charts for the evaluation report
//!
//! Charts are drawn with plain geometry (no text rendering): the ROC curve
//! against the chance diagonal, a horizontal bar per feature importance, and
//! a 2x2 heat map of the confusion matrix.

use crate::core::{OncoError, Result};
use crate::evaluation::{ConfusionMatrix, EvaluationReport, FeatureImportance, RocCurve};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const ROC_FILE: &str = "roc_curve.png";
pub const IMPORTANCE_FILE: &str = "feature_importance.png";
pub const CONFUSION_FILE: &str = "confusion_matrix.png";

const SIZE: u32 = 480;
const MARGIN: u32 = 40;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GREY: Rgb<u8> = Rgb([160, 160, 160]);
const ORANGE: Rgb<u8> = Rgb([230, 126, 34]);
const BLUE: Rgb<u8> = Rgb([52, 101, 164]);

fn canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

fn save(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path)
        .map_err(|e| OncoError::Plot(format!("{}: {e}", path.display())))
}

/// ROC curve in the unit square, with the chance diagonal
pub fn render_roc(roc: &RocCurve) -> RgbImage {
    let mut img = canvas(SIZE, SIZE);
    let span = (SIZE - 2 * MARGIN) as f32;
    let to_px = |fpr: f64, tpr: f64| {
        (
            MARGIN as f32 + fpr as f32 * span,
            (SIZE - MARGIN) as f32 - tpr as f32 * span,
        )
    };

    draw_hollow_rect_mut(
        &mut img,
        Rect::at(MARGIN as i32, MARGIN as i32).of_size(SIZE - 2 * MARGIN, SIZE - 2 * MARGIN),
        BLACK,
    );
    draw_line_segment_mut(&mut img, to_px(0.0, 0.0), to_px(1.0, 1.0), GREY);

    for pair in roc.points.windows(2) {
        let start = to_px(pair[0].fpr, pair[0].tpr);
        let end = to_px(pair[1].fpr, pair[1].tpr);
        // Two passes offset by a pixel for a thicker stroke
        draw_line_segment_mut(&mut img, start, end, ORANGE);
        draw_line_segment_mut(&mut img, (start.0 + 1.0, start.1), (end.0 + 1.0, end.1), ORANGE);
    }

    img
}

/// One horizontal bar per feature, longest first, scaled to the largest value
pub fn render_importances(importances: &[FeatureImportance]) -> RgbImage {
    let bar_height = 32u32;
    let gap = 12u32;
    let n = importances.len().max(1) as u32;
    let height = 2 * MARGIN + n * bar_height + (n - 1) * gap;
    let mut img = canvas(SIZE, height);

    let span = (SIZE - 2 * MARGIN) as f64;
    let max = importances
        .iter()
        .map(|f| f.importance)
        .fold(0.0_f64, f64::max);

    for (i, feature) in importances.iter().enumerate() {
        let width = if max > 0.0 {
            (feature.importance / max * span).round() as u32
        } else {
            0
        };
        if width == 0 {
            continue;
        }
        let y = MARGIN + i as u32 * (bar_height + gap);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(MARGIN as i32, y as i32).of_size(width, bar_height),
            BLUE,
        );
    }

    draw_line_segment_mut(
        &mut img,
        (MARGIN as f32, MARGIN as f32 / 2.0),
        (MARGIN as f32, (height - MARGIN / 2) as f32),
        BLACK,
    );

    img
}

/// 2x2 heat map: rows actual, columns predicted; darker means more samples
pub fn render_confusion(cm: &ConfusionMatrix) -> RgbImage {
    let mut img = canvas(SIZE, SIZE);
    let cell = (SIZE - 2 * MARGIN) / 2;
    let max = cm.counts.iter().flatten().copied().max().unwrap_or(0);

    for (row, counts) in cm.counts.iter().enumerate() {
        for (col, &count) in counts.iter().enumerate() {
            let shade = if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            };
            let color = blend(WHITE, BLUE, shade);
            let rect = Rect::at(
                (MARGIN + col as u32 * cell) as i32,
                (MARGIN + row as u32 * cell) as i32,
            )
            .of_size(cell, cell);
            draw_filled_rect_mut(&mut img, rect, color);
            draw_hollow_rect_mut(&mut img, rect, BLACK);
        }
    }

    img
}

fn blend(from: Rgb<u8>, to: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb([
        mix(from[0], to[0]),
        mix(from[1], to[1]),
        mix(from[2], to[2]),
    ])
}

/// Write the three report charts into `dir`, creating it if needed
pub fn save_report_plots<P: AsRef<Path>>(report: &EvaluationReport, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let charts = [
        (ROC_FILE, render_roc(&report.roc)),
        (IMPORTANCE_FILE, render_importances(&report.importances)),
        (CONFUSION_FILE, render_confusion(&report.confusion)),
    ];

    let mut written = Vec::with_capacity(charts.len());
    for (name, img) in &charts {
        let path = dir.join(name);
        save(img, &path)?;
        info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}
