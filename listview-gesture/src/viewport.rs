use listview::Orientation;

use crate::GestureKind;

/// Scroll positions closer than this to an edge count as being at the edge.
const EDGE_TOLERANCE: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Coordinate along the scroll axis.
    pub fn main_axis(self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Vertical => self.y,
            Orientation::Horizontal => self.x,
        }
    }
}

/// A snapshot of the scroll container along its main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub offset: f32,
    /// Full content size.
    pub content: f32,
    /// Visible size.
    pub viewport: f32,
}

impl ScrollMetrics {
    pub fn new(offset: f32, content: f32, viewport: f32) -> Self {
        Self {
            offset,
            content,
            viewport,
        }
    }

    pub fn max_offset(&self) -> f32 {
        (self.content - self.viewport).max(0.0)
    }

    pub fn at_start(&self) -> bool {
        self.offset <= EDGE_TOLERANCE
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.max_offset() - EDGE_TOLERANCE
    }

    /// Scrolled fraction of the scrollable extent; `1.0` when nothing scrolls.
    pub fn progress(&self) -> f32 {
        let max = self.max_offset();
        if max <= 0.0 {
            return 1.0;
        }
        (self.offset / max).clamp(0.0, 1.0)
    }
}

/// The visual side of the loader, implemented by the adapter.
pub trait Viewport {
    /// Drag distance needed to trigger `kind`: the extent of its indicator.
    fn indicator_extent(&self, kind: GestureKind) -> f32;

    /// Translates the content along the main axis. Positive values pull it towards the trailing
    /// edge.
    fn set_offset(&mut self, offset: f32);

    fn set_indicator(&mut self, kind: GestureKind, visible: bool);

    /// Marks the indicator as armed: releasing now triggers the callback.
    fn set_ready(&mut self, kind: GestureKind, ready: bool);

    /// Shows or hides the waiting indicator of an infinite-scroll request.
    fn set_infinite_progress(&mut self, visible: bool);
}
