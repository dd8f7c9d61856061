// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pages and the content layers drawn on them.

use pagewerk_core::{PageSize, Rotation};

use super::transform::Transform;

/// Index of a loaded source document inside a [`super::Document`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) usize);

/// Index of an embedded image inside a [`super::Document`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub(crate) usize);

/// What a layer draws. Handles are only meaningful inside the document that
/// owns the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSource {
    /// The vector content of page `page` (0-based) of a loaded source file,
    /// normalised so its media box starts at the origin.
    SourcePage { source: SourceId, page: usize },
    /// An embedded raster image occupying the unit square.
    Image(ImageHandle),
}

/// One piece of content placed on a page through a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub content: ContentSource,
    pub transform: Transform,
}

impl Layer {
    pub fn new(content: ContentSource, transform: Transform) -> Self {
        Self { content, transform }
    }

    /// An image stretched to cover a `width` × `height` page exactly.
    pub fn full_page_image(image: ImageHandle, width_pt: f64, height_pt: f64) -> Self {
        Self::new(
            ContentSource::Image(image),
            Transform::scale_xy(width_pt, height_pt),
        )
    }
}

/// A page of a [`super::Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 0-based position in the owning document.
    pub index: u32,
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation: Rotation,
    layers: Vec<Layer>,
}

impl Page {
    /// A blank page of the given size.
    pub fn new(index: u32, width_pt: f64, height_pt: f64, rotation: Rotation) -> Self {
        Self {
            index,
            width_pt,
            height_pt,
            rotation,
            layers: Vec::new(),
        }
    }

    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.layers = layers;
        self
    }

    pub fn size(&self) -> PageSize {
        PageSize::new(self.width_pt, self.height_pt)
    }

    pub fn set_size(&mut self, size: PageSize) {
        self.width_pt = size.width_pt;
        self.height_pt = size.height_pt;
    }

    /// Layers in painting order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Post-multiply every layer's transform, moving the whole page content.
    pub fn transform_content(&mut self, transform: &Transform) {
        for layer in &mut self.layers {
            layer.transform = layer.transform.then(transform);
        }
    }
}
