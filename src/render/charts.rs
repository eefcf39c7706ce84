//! Chart drawing, generic over the plotters backend.

use super::palette::Palette;
use super::{ensure_font, RenderError, FONT_FAMILY};
use crate::analysis::{channel_range, group_by_chunk, time_range};
use crate::models::{AgentId, Channel, LogRow};
use crate::phase::RelativePhase;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeSet;
use std::f64::consts::PI;

const LINE_WIDTH: u32 = 2;
const LEGEND_WIDTH: i32 = 20;
/// -1π, -0.5π, 0π, 0.5π, 1π
const Y_TICKS: usize = 5;

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Pad a value range so lines do not touch the frame.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span < 1e-6 { 0.5 } else { span * 0.05 };
    (min - pad, max + pad)
}

/// Label a multiple of π, e.g. `-1π`, `0.5π`.
pub fn format_pi_multiple(multiple: f64) -> String {
    let rounded = multiple.round();
    if (multiple - rounded).abs() < 1e-9 {
        format!("{}π", rounded as i64)
    } else {
        format!("{:.1}π", multiple)
    }
}

/// Split a polyline into runs of finite points.
///
/// Gap markers (NaN) end the current run and are dropped.
pub fn split_at_gaps(points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for &(x, y) in points {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Draw the three stacked a0/a1/a2 panels.
pub fn draw_traces<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: &[LogRow],
    palette: &Palette,
) -> Result<(), RenderError> {
    let (t_min, t_max) = time_range(rows).ok_or(RenderError::Empty)?;
    ensure_font()?;
    let (x_min, x_max) = if t_max > t_min {
        (t_min, t_max)
    } else {
        padded_range(t_min, t_max)
    };

    root.fill(&WHITE).map_err(backend_err)?;
    let panels = root.split_evenly((Channel::ALL.len(), 1));
    let chunks = group_by_chunk(rows);

    for (panel_index, (panel, channel)) in panels.iter().zip(Channel::ALL).enumerate() {
        let (y_min, y_max) = channel_range(rows, channel)
            .map(|(lo, hi)| padded_range(lo, hi))
            .unwrap_or((-1.0, 1.0));
        let is_top = panel_index == 0;
        let is_bottom = panel_index + 1 == Channel::ALL.len();

        let mut builder = ChartBuilder::on(panel);
        builder
            .margin(10)
            .x_label_area_size(if is_bottom { 40 } else { 20 })
            .y_label_area_size(60);
        if is_top {
            builder.caption("Agent channel traces", (FONT_FAMILY, 20));
        }
        let mut chart = builder
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(backend_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.y_desc(channel.column());
        if is_bottom {
            mesh.x_desc("PC time (sec)");
        }
        mesh.draw().map_err(backend_err)?;

        let mut labelled: BTreeSet<AgentId> = BTreeSet::new();
        for ((agent, _chunk), chunk_rows) in &chunks {
            let color = palette.color(*agent);
            let points: Vec<(f64, f64)> = chunk_rows
                .iter()
                .map(|row| (row.time_pc_sec_abs, row.channel(channel)))
                .collect();

            for segment in split_at_gaps(&points) {
                let anno = chart
                    .draw_series(LineSeries::new(segment, color.stroke_width(LINE_WIDTH)))
                    .map_err(backend_err)?;
                if is_top && labelled.insert(*agent) {
                    anno.label(format!("Agent {}", agent)).legend(move |(x, y)| {
                        PathElement::new(
                            vec![(x, y), (x + LEGEND_WIDTH, y)],
                            color.stroke_width(LINE_WIDTH),
                        )
                    });
                }
            }
        }

        if is_top && !labelled.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT_FAMILY, 12))
                .draw()
                .map_err(backend_err)?;
        }
    }

    Ok(())
}

/// Draw relative phase against the reference agent.
///
/// The y axis is in units of π so that the five default ticks land on
/// multiples of π/2.
pub fn draw_relative_phase<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    phase: &RelativePhase,
    palette: &Palette,
) -> Result<(), RenderError> {
    if phase.grid.is_empty() {
        return Err(RenderError::Empty);
    }
    ensure_font()?;
    let x_max = if phase.grid.len() > 1 {
        phase.grid.display_time(phase.grid.len() - 1)
    } else {
        phase.grid.step()
    };
    root.fill(&WHITE).map_err(backend_err)?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Relative Phase (reference: Agent {})", phase.reference),
            (FONT_FAMILY, 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, -1.0..1.0)
        .map_err(backend_err)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Phase Diff (radians)")
        .y_labels(Y_TICKS)
        .y_label_formatter(&|y| format_pi_multiple(*y))
        .draw()
        .map_err(backend_err)?;

    let mut labelled = 0;
    for &agent in phase.series.keys() {
        let color = palette.color(agent);
        let label = format!("Agent {} - Agent {}", agent, phase.reference);

        let points: Vec<(f64, f64)> = phase
            .points(agent)
            .into_iter()
            .map(|(t, radians)| (t, radians / PI))
            .collect();

        for (index, segment) in split_at_gaps(&points).into_iter().enumerate() {
            let anno = chart
                .draw_series(LineSeries::new(segment, color.stroke_width(LINE_WIDTH)))
                .map_err(backend_err)?;
            if index == 0 {
                anno.label(label.clone()).legend(move |(x, y)| {
                    PathElement::new(
                        vec![(x, y), (x + LEGEND_WIDTH, y)],
                        color.stroke_width(LINE_WIDTH),
                    )
                });
                labelled += 1;
            }
        }
    }

    if labelled > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT_FAMILY, 12))
            .draw()
            .map_err(backend_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pi_multiple() {
        assert_eq!(format_pi_multiple(0.0), "0π");
        assert_eq!(format_pi_multiple(-0.0), "0π");
        assert_eq!(format_pi_multiple(1.0), "1π");
        assert_eq!(format_pi_multiple(-1.0), "-1π");
        assert_eq!(format_pi_multiple(0.5), "0.5π");
        assert_eq!(format_pi_multiple(-0.5), "-0.5π");
        assert_eq!(format_pi_multiple(0.5000000001), "0.5π");
    }

    #[test]
    fn test_split_at_gaps() {
        let points = [
            (0.0, 1.0),
            (1.0, 2.0),
            (2.0, f64::NAN),
            (3.0, 4.0),
            (4.0, f64::NAN),
            (5.0, f64::NAN),
        ];
        let segments = split_at_gaps(&points);
        assert_eq!(segments, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
        assert!(split_at_gaps(&[(0.0, f64::NAN)]).is_empty());
        assert!(split_at_gaps(&[]).is_empty());
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(0.0, 0.0), (-0.5, 0.5));
        let (lo, hi) = padded_range(0.0, 100.0);
        assert_eq!((lo, hi), (-5.0, 105.0));
    }
}
