// src/diagram/mod.rs

pub mod layout;
pub mod render;

pub use layout::{
    compute_layout, Bounds, DiagramLayout, EdgeSegment, LayerAnnotation, LayerSpec, LayoutError,
    NodePosition,
};
pub use render::render_diagram_svg;
