// src/diagram/layout.rs

use serde::Serialize;
use thiserror::Error;

/// Errors raised when a diagram cannot be laid out.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("a network needs at least 2 layers, got {0}")]
    TooFewLayers(usize),
    #[error("layer {0} has no nodes")]
    EmptyLayer(usize),
    #[error("invalid bounds: right must exceed left and top must exceed bottom")]
    InvalidBounds,
}

/// Node counts per layer, input first and output last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec(Vec<usize>);

impl LayerSpec {
    /// Validates that there are at least two layers and no empty one.
    pub fn new(sizes: Vec<usize>) -> Result<Self, LayoutError> {
        if sizes.len() < 2 {
            return Err(LayoutError::TooFewLayers(sizes.len()));
        }
        if let Some(idx) = sizes.iter().position(|&s| s == 0) {
            return Err(LayoutError::EmptyLayer(idx));
        }
        Ok(LayerSpec(sizes))
    }

    /// Wraps hidden layer sizes with the single-node input and output layers.
    pub fn with_hidden(hidden: &[usize]) -> Result<Self, LayoutError> {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(1);
        sizes.extend_from_slice(hidden);
        sizes.push(1);
        Self::new(sizes)
    }

    pub fn sizes(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn widest(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(1)
    }
}

/// Region the node centres are spread over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Bounds {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Result<Self, LayoutError> {
        if !(right > left && top > bottom) {
            return Err(LayoutError::InvalidBounds);
        }
        Ok(Bounds { left, right, bottom, top })
    }

    pub fn midline(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds { left: 0.1, right: 0.9, bottom: 0.1, top: 0.9 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodePosition {
    pub layer: usize,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl NodePosition {
    /// 1-based number drawn inside the circle.
    pub fn label(&self) -> String {
        format!("{}", self.index + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub source: NodePosition,
    pub target: NodePosition,
}

/// Layer caption anchored on the midline, shifted by a pixel offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerAnnotation {
    pub layer: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub offset_px: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLayout {
    pub bounds: Bounds,
    pub v_spacing: f64,
    pub h_spacing: f64,
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgeSegment>,
    pub annotations: Vec<LayerAnnotation>,
}

impl DiagramLayout {
    pub fn nodes_in_layer(&self, layer: usize) -> impl Iterator<Item = &NodePosition> {
        self.nodes.iter().filter(move |n| n.layer == layer)
    }
}

fn layer_top(bounds: &Bounds, v_spacing: f64, size: usize) -> f64 {
    v_spacing * (size as f64 - 1.0) / 2.0 + bounds.midline()
}

/// Computes node centres, edges and captions for a layered network diagram.
///
/// Spacing is global: every layer uses the vertical step of the widest layer
/// and is centred on the midline of `bounds`.
pub fn compute_layout(bounds: Bounds, spec: &LayerSpec) -> Result<DiagramLayout, LayoutError> {
    let bounds = Bounds::new(bounds.left, bounds.right, bounds.bottom, bounds.top)?;
    let spec = LayerSpec::new(spec.sizes().to_vec())?;

    let v_spacing = (bounds.top - bounds.bottom) / spec.widest() as f64;
    let h_spacing = (bounds.right - bounds.left) / (spec.len() - 1) as f64;
    let last = spec.len() - 1;

    let mut layers: Vec<Vec<NodePosition>> = Vec::with_capacity(spec.len());
    let mut annotations = Vec::new();

    for (n, &size) in spec.sizes().iter().enumerate() {
        let x = n as f64 * h_spacing + bounds.left;
        let top = layer_top(&bounds, v_spacing, size);
        let layer = (0..size)
            .map(|m| NodePosition {
                layer: n,
                index: m,
                x,
                y: top - m as f64 * v_spacing,
                radius: v_spacing / 4.0,
            })
            .collect();
        layers.push(layer);

        let caption = if n == 0 {
            Some(("Input", (-20, 20)))
        } else if n == last {
            Some(("Output", (20, 20)))
        } else {
            None
        };
        if let Some((text, offset_px)) = caption {
            annotations.push(LayerAnnotation {
                layer: n,
                text: text.to_string(),
                x,
                y: bounds.midline(),
                offset_px,
            });
        }
    }

    let edges = layers
        .windows(2)
        .flat_map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            a.iter().flat_map(move |source| {
                b.iter().map(move |target| EdgeSegment { source: *source, target: *target })
            })
        })
        .collect();

    Ok(DiagramLayout {
        bounds,
        v_spacing,
        h_spacing,
        nodes: layers.into_iter().flatten().collect(),
        edges,
        annotations,
    })
}
