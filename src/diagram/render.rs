// src/diagram/render.rs

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::layout::DiagramLayout;
use crate::utils::plotting::RenderError;

/// Pixel size of the diagram surface (a 10x5 inch figure at 100 dpi).
pub const DIAGRAM_SIZE: (u32, u32) = (1000, 500);

/// Draws a computed layout as an SVG document.
///
/// Node centres are in the unit square; the axes are not drawn.
pub fn render_diagram_svg(layout: &DiagramLayout) -> Result<String, RenderError> {
    let mut svg = String::new();
    draw_diagram(&mut svg, layout).map_err(|e| RenderError::Draw(e.to_string()))?;
    Ok(svg)
}

fn draw_diagram(svg: &mut String, layout: &DiagramLayout) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::with_string(svg, DIAGRAM_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0f64..1f64, 0f64..1f64)?;
    let (_, height_px) = chart.plotting_area().dim_in_pixel();

    // Edges go first so the filled circles cover the line ends.
    chart.draw_series(layout.edges.iter().map(|edge| {
        PathElement::new(
            vec![(edge.source.x, edge.source.y), (edge.target.x, edge.target.y)],
            BLACK.stroke_width(1),
        )
    }))?;

    let radius_px = |r: f64| (r * height_px as f64).round().max(1.0) as i32;
    chart.draw_series(
        layout
            .nodes
            .iter()
            .map(|node| Circle::new((node.x, node.y), radius_px(node.radius), WHITE.filled())),
    )?;
    chart.draw_series(
        layout
            .nodes
            .iter()
            .map(|node| Circle::new((node.x, node.y), radius_px(node.radius), BLACK.stroke_width(1))),
    )?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let number_style = TextStyle::from(("sans-serif", 10).into_font()).pos(centered);
    chart.draw_series(
        layout
            .nodes
            .iter()
            .map(|node| Text::new(node.label(), (node.x, node.y), number_style.clone())),
    )?;

    let caption_style = TextStyle::from(("sans-serif", 12).into_font()).pos(centered);
    chart.draw_series(layout.annotations.iter().map(|note| {
        // Pixel y grows downwards, so an upward offset is negated.
        let (dx, dy) = note.offset_px;
        EmptyElement::at((note.x, note.y))
            + Text::new(note.text.clone(), (dx, -dy), caption_style.clone())
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::layout::{compute_layout, Bounds, LayerSpec};

    #[test]
    fn svg_contains_captions_and_node_numbers() {
        let layout =
            compute_layout(Bounds::default(), &LayerSpec::new(vec![1, 3, 1]).unwrap()).unwrap();
        let svg = render_diagram_svg(&layout).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Input"));
        assert!(svg.contains("Output"));
        assert!(svg.contains(">3<"));
    }
}
