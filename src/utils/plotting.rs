// src/utils/plotting.rs

use std::ops::Range;

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot")]
    NoData,
    #[error("chart rendering failed: {0}")]
    Draw(String),
}

/// One line on a date-indexed chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: Option<String>,
    pub color: RGBColor,
    pub line_width: f64,
    pub points: Vec<(NaiveDate, f64)>,
}

impl Series {
    pub fn new(points: Vec<(NaiveDate, f64)>, color: RGBColor) -> Self {
        Series { label: None, color, line_width: 1.0, points }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }
}

/// Labels and appearance for [`plot_series`].
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub size: (u32, u32),
    pub xlabel: String,
    pub ylabel: String,
    /// Falls back to "{ylabel} of {symbol} Data".
    pub title: Option<String>,
    pub symbol: String,
    pub grid: bool,
    pub max_x_ticks: usize,
    /// Shared by the x and y axis descriptions.
    pub axis_label_fontsize: u32,
    pub title_fontsize: u32,
    pub tick_label_fontsize: u32,
}

impl ChartOptions {
    pub fn new(symbol: impl Into<String>, ylabel: impl Into<String>) -> Self {
        ChartOptions {
            size: (1500, 600),
            xlabel: "Date".to_string(),
            ylabel: ylabel.into(),
            title: None,
            symbol: symbol.into(),
            grid: true,
            max_x_ticks: 7,
            axis_label_fontsize: 18,
            title_fontsize: 24,
            tick_label_fontsize: 14,
        }
    }

    pub fn resolved_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} of {} Data", self.ylabel, self.symbol),
        }
    }
}

// matplotlib's default colour cycle, used for multi-series charts.
pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);
pub const TAB_GREEN: RGBColor = RGBColor(44, 160, 44);

/// Plots one or more series against a shared date axis and returns the SVG.
pub fn plot_series(series: &[Series], options: &ChartOptions) -> Result<String, RenderError> {
    let points = series.iter().flat_map(|s| s.points.iter());
    let (mut first, mut last) = (NaiveDate::MAX, NaiveDate::MIN);
    let (mut min_value, mut max_value) = (f64::MAX, f64::MIN);
    let mut any = false;
    for (date, value) in points {
        any = true;
        first = first.min(*date);
        last = last.max(*date);
        min_value = min_value.min(*value);
        max_value = max_value.max(*value);
    }
    if !any {
        return Err(RenderError::NoData);
    }

    if first == last {
        last = first + Duration::days(1);
    }
    let y_range = if (max_value - min_value).abs() < f64::EPSILON {
        (min_value - 1.0)..(max_value + 1.0)
    } else {
        min_value..max_value
    };

    let mut svg = String::new();
    draw_chart(&mut svg, series, options, first..last, y_range)
        .map_err(|e| RenderError::Draw(e.to_string()))?;
    Ok(svg)
}

/// Largest label hint whose date key points fit in `max_ticks`, with those points.
///
/// plotters treats the hint as approximate and can return one extra date.
fn date_ticks(range: &Range<NaiveDate>, max_ticks: usize) -> (usize, Vec<NaiveDate>) {
    let coord = RangedDate::from(range.clone());
    let mut hint = max_ticks.max(1);
    loop {
        let ticks = coord.key_points(hint);
        if ticks.len() <= max_ticks || hint == 1 {
            return (hint, ticks.into_iter().take(max_ticks).collect());
        }
        hint -= 1;
    }
}

fn draw_chart(
    svg: &mut String,
    series: &[Series],
    options: &ChartOptions,
    x_range: Range<NaiveDate>,
    y_range: Range<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (hint, ticks) = date_ticks(&x_range, options.max_x_ticks);
    let root = SVGBackend::with_string(svg, options.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(options.resolved_title(), ("sans-serif", options.title_fontsize))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    let tick_font = ("sans-serif", options.tick_label_fontsize);
    let date_format = |d: &NaiveDate| {
        if ticks.contains(d) {
            d.format("%Y-%m-%d").to_string()
        } else {
            String::new()
        }
    };
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(hint)
        .x_label_formatter(&date_format)
        .x_desc(options.xlabel.as_str())
        .y_desc(options.ylabel.as_str())
        .label_style(tick_font)
        .axis_desc_style(("sans-serif", options.axis_label_fontsize));
    if !options.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let mut has_legend = false;
    for s in series {
        let style = s.color.stroke_width(s.line_width.round().max(1.0) as u32);
        let drawn = chart.draw_series(LineSeries::new(s.points.iter().copied(), style))?;
        if let Some(label) = &s.label {
            has_legend = true;
            let color = s.color;
            drawn
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    if has_legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
