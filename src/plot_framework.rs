// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::combinators::IntoLogRange;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use crate::constants::{
    FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND, FONT_SIZE_MAIN_TITLE,
    FONT_SIZE_MESSAGE, LINE_WIDTH_LEGEND, MARKER_SIZE,
};

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Tick label formatter for frequency axes: whole hertz without a decimal
/// point, sub-hertz values as written.
pub fn format_log_tick(value: &f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    panel_name: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    // Approximate character metrics used to center the message.
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (
        (x_range.end - x_range.start) as u32,
        (y_range.end - y_range.start) as u32,
    );
    let message = format!("{panel_name} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;

    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let center_x = width as i32 / 2 - estimated_text_width / 2;
    let center_y = height as i32 / 2 - estimated_text_height / 2;

    let text_style = ("sans-serif", FONT_SIZE_MESSAGE).into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))?;
    Ok(())
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
    /// Draw point markers instead of a connected line.
    pub markers: bool,
}

#[derive(Clone)]
pub struct PanelConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    /// Use a logarithmic x axis (frequency panels).
    pub log_x: bool,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
}

/// Creates a grid plot image with `rows` x `cols` subplots.
///
/// The closure supplies the panel at each grid index, row-major; `None`
/// panels get a placeholder message. The file is written even when every
/// panel is a placeholder, so a broken measurement still leaves a trace in
/// the output folder.
pub fn draw_grid_plot<F>(
    output_path: &Path,
    root_name: &str,
    plot_type_name: &str,
    dimensions: (u32, u32),
    grid: (usize, usize),
    mut get_panel: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(usize) -> Option<PanelConfig>,
{
    let (rows, cols) = grid;
    let root_area = BitMapBackend::new(output_path, dimensions).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        ("sans-serif", FONT_SIZE_MAIN_TITLE)
            .into_font()
            .color(&BLACK),
    ))?;
    let margined_root_area = root_area.margin(50, 5, 5, 5);
    let sub_plot_areas = margined_root_area.split_evenly((rows, cols));
    let mut any_panel_plotted = false;

    for (panel_index, area) in sub_plot_areas.iter().enumerate() {
        match get_panel(panel_index) {
            Some(panel) => {
                let has_data = panel.series.iter().any(|s| !s.data.is_empty());
                let valid_ranges = panel.x_range.end > panel.x_range.start
                    && panel.y_range.end > panel.y_range.start;
                if has_data && valid_ranges {
                    draw_single_panel(area, &panel)?;
                    any_panel_plotted = true;
                } else {
                    let reason = if !has_data {
                        "No data points"
                    } else {
                        "Invalid ranges"
                    };
                    draw_unavailable_message(area, plot_type_name, reason)?;
                }
            }
            None => {
                draw_unavailable_message(area, plot_type_name, "Calculation Failed")?;
            }
        }
    }

    root_area.present()?;
    if any_panel_plotted {
        println!("  Plot saved as '{}'.", output_path.display());
    } else {
        println!(
            "  Plot '{}' contains only placeholder panels: no data was available.",
            output_path.display()
        );
    }
    Ok(())
}

/// Draws one sub-chart, branching on the x-axis scale.
fn draw_single_panel(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    panel: &PanelConfig,
) -> Result<(), Box<dyn Error>> {
    if panel.log_x {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
            .margin(5)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(panel.x_range.clone().log_scale(), panel.y_range.clone())?;

        chart
            .configure_mesh()
            .x_desc(&panel.x_label)
            .y_desc(&panel.y_label)
            .x_label_formatter(&format_log_tick)
            .x_labels(10)
            .y_labels(5)
            .light_line_style(WHITE.mix(0.7))
            .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
            .draw()?;

        let mut legend_entries = 0;
        for s in &panel.series {
            if s.data.is_empty() {
                continue;
            }
            if s.markers {
                let color = s.color;
                let drawn = chart.draw_series(
                    s.data
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), MARKER_SIZE, color.filled())),
                )?;
                if !s.label.is_empty() {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        Circle::new((x + 10, y), MARKER_SIZE, color.filled())
                    });
                    legend_entries += 1;
                }
            } else {
                let color = s.color;
                let drawn = chart.draw_series(LineSeries::new(
                    s.data.iter().cloned(),
                    color.stroke_width(s.stroke_width),
                ))?;
                if !s.label.is_empty() {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(
                            vec![(x, y), (x + 20, y)],
                            color.stroke_width(LINE_WIDTH_LEGEND),
                        )
                    });
                    legend_entries += 1;
                }
            }
        }
        if legend_entries > 0 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", FONT_SIZE_LEGEND))
                .draw()?;
        }
    } else {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
            .margin(5)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(panel.x_range.clone(), panel.y_range.clone())?;

        chart
            .configure_mesh()
            .x_desc(&panel.x_label)
            .y_desc(&panel.y_label)
            .x_labels(10)
            .y_labels(5)
            .light_line_style(WHITE.mix(0.7))
            .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
            .draw()?;

        let mut legend_entries = 0;
        for s in &panel.series {
            if s.data.is_empty() {
                continue;
            }
            if s.markers {
                let color = s.color;
                let drawn = chart.draw_series(
                    s.data
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), MARKER_SIZE, color.filled())),
                )?;
                if !s.label.is_empty() {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        Circle::new((x + 10, y), MARKER_SIZE, color.filled())
                    });
                    legend_entries += 1;
                }
            } else {
                let color = s.color;
                let drawn = chart.draw_series(LineSeries::new(
                    s.data.iter().cloned(),
                    color.stroke_width(s.stroke_width),
                ))?;
                if !s.label.is_empty() {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(
                            vec![(x, y), (x + 20, y)],
                            color.stroke_width(LINE_WIDTH_LEGEND),
                        )
                    });
                    legend_entries += 1;
                }
            }
        }
        if legend_entries > 0 {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", FONT_SIZE_LEGEND))
                .draw()?;
        }
    }

    Ok(())
}

// src/plot_framework.rs
