//! Click regions.
//!
//! While tracking is enabled, the renderer records one [`ClickRegion`] per
//! clickable node it emits, in document order, using absolute terminal
//! coordinates. Regions with an empty area are never recorded.

use tracing::trace;

/// A rectangular hit area for one clickable node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRegion {
    pub component_id: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Tree depth of the node, root children at depth 1.
    pub depth: usize,
    pub node_type: String,
}

impl ClickRegion {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && y >= self.y
            && (x as u32) < self.x as u32 + self.width as u32
            && (y as u32) < self.y as u32 + self.height as u32
    }

    /// Re-express an absolute region relative to an origin.
    pub(crate) fn relative_to(&self, x: u16, y: u16, depth: usize) -> Self {
        Self {
            x: self.x.saturating_sub(x),
            y: self.y.saturating_sub(y),
            depth: self.depth.saturating_sub(depth),
            ..self.clone()
        }
    }

    /// Inverse of [`relative_to`](Self::relative_to).
    pub(crate) fn offset_by(&self, x: u16, y: u16, depth: usize) -> Self {
        Self {
            x: self.x.saturating_add(x),
            y: self.y.saturating_add(y),
            depth: self.depth + depth,
            ..self.clone()
        }
    }
}

/// Records regions during a render pass.
#[derive(Debug, Default)]
pub struct ClickTracker {
    active: bool,
    regions: Vec<ClickRegion>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear previous regions and begin recording.
    pub fn start_tracking(&mut self) {
        self.regions.clear();
        self.active = true;
    }

    /// Stop recording and hand back everything recorded since the start.
    pub fn stop_tracking(&mut self) -> Vec<ClickRegion> {
        self.active = false;
        std::mem::take(&mut self.regions)
    }

    pub fn is_tracking(&self) -> bool {
        self.active
    }

    /// Record a region. Returns `false` when not tracking or the region has
    /// no area.
    pub fn register_region(&mut self, region: ClickRegion) -> bool {
        let at = self.regions.len();
        self.insert_region(at, region)
    }

    /// Record a region at `index`, before anything recorded after
    /// [`mark`](Self::mark) returned `index`.
    pub fn insert_region(&mut self, index: usize, region: ClickRegion) -> bool {
        if !self.active || region.width == 0 || region.height == 0 {
            return false;
        }
        trace!(id = %region.component_id, x = region.x, y = region.y, "click region");
        let index = index.min(self.regions.len());
        self.regions.insert(index, region);
        true
    }

    /// Position to pass to [`since`](Self::since) or
    /// [`insert_region`](Self::insert_region).
    pub fn mark(&self) -> usize {
        self.regions.len()
    }

    /// Regions recorded after `mark`.
    pub fn since(&self, mark: usize) -> &[ClickRegion] {
        self.regions.get(mark..).unwrap_or(&[])
    }

    pub fn regions(&self) -> &[ClickRegion] {
        &self.regions
    }
}

/// Deepest region containing the point. Among equally deep regions the one
/// recorded last wins.
pub fn hit_test(regions: &[ClickRegion], x: u16, y: u16) -> Option<&ClickRegion> {
    regions
        .iter()
        .filter(|r| r.contains(x, y))
        .fold(None, |best: Option<&ClickRegion>, r| match best {
            Some(b) if b.depth > r.depth => Some(b),
            _ => Some(r),
        })
}
