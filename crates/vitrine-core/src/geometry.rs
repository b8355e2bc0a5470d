/// One laid-out item along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Item {
    /// Index of the real item this entry depicts. Boundary clones carry the
    /// index of the item they duplicate.
    pub index: usize,
    pub offset: f64,
    pub extent: f64,
}

impl Item {
    pub fn new(index: usize, offset: f64, extent: f64) -> Self {
        Self {
            index,
            offset,
            extent,
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.offset + self.extent / 2.0
    }

    /// `count` items of equal `extent` placed back to back from offset zero.
    pub fn contiguous(count: usize, extent: f64) -> Vec<Self> {
        (0..count)
            .map(|i| Self::new(i, i as f64 * extent, extent))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub position: f64,
    pub extent: f64,
}

impl Viewport {
    pub fn new(position: f64, extent: f64) -> Self {
        Self { position, extent }
    }

    pub fn midpoint(&self) -> f64 {
        self.position + self.extent / 2.0
    }
}

/// Index (into `items`) of the item whose midpoint is closest to the viewport
/// midpoint. Ties go to the lowest index. `None` only for an empty slice.
pub fn centered_index(items: &[Item], viewport: Viewport) -> Option<usize> {
    let center = viewport.midpoint();
    items
        .iter()
        .map(|item| (center - item.midpoint()).abs())
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

/// Scroll offset that puts `item` in the middle of a viewport of
/// `viewport_extent`, rounded to whole scroll units.
pub fn centering_offset(item: &Item, viewport_extent: f64) -> f64 {
    (item.offset - (viewport_extent - item.extent) / 2.0).round()
}
