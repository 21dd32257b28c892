use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::image::{Gray16Image, Rect};

/// Summary of one labeled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub label: u16,
    pub pixel_count: usize,
    pub bounds: Rect,
}

/// Heap entry: larger regions first, ties broken by lower label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByPixelCount(Component);

impl Ord for ByPixelCount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .pixel_count
            .cmp(&other.0.pixel_count)
            .then_with(|| other.0.label.cmp(&self.0.label))
    }
}

impl PartialOrd for ByPixelCount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Largest-first ordering of components, extracted from a heap on demand.
///
/// Asking for rank `n` pops until `n + 1` components have been ranked; later
/// queries at or below that rank are served from the ranked list.
#[derive(Debug, Clone)]
pub struct ComponentRanking {
    heap: BinaryHeap<ByPixelCount>,
    ranked: Vec<Component>,
}

impl ComponentRanking {
    pub fn new(components: impl IntoIterator<Item = Component>) -> Self {
        Self {
            heap: components.into_iter().map(ByPixelCount).collect(),
            ranked: Vec::new(),
        }
    }

    /// Collects pixel counts and bounding boxes from a label image.
    pub fn from_labels(labels: &Gray16Image, count: usize) -> Self {
        let mut stats: Vec<Component> = (0..=count)
            .map(|label| Component {
                label: label as u16,
                pixel_count: 0,
                bounds: Rect::default(),
            })
            .collect();
        let w = labels.width();
        for (idx, &label) in labels.read().iter().enumerate() {
            if label <= 0 || label as usize > count {
                continue;
            }
            let (x, y) = ((idx % w) as i32, (idx / w) as i32);
            let c = &mut stats[label as usize];
            if c.pixel_count == 0 {
                c.bounds = Rect::from_point(x, y);
            } else {
                c.bounds.add_point(x, y);
            }
            c.pixel_count += 1;
        }
        Self::new(stats.into_iter().skip(1).filter(|c| c.pixel_count > 0))
    }

    /// Total number of components, ranked or not.
    pub fn len(&self) -> usize {
        self.heap.len() + self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many components have been moved from the heap into rank order.
    pub fn extracted(&self) -> usize {
        self.ranked.len()
    }

    /// The component of rank `index` (0 = largest).
    pub fn get(&mut self, index: usize) -> Option<&Component> {
        while self.ranked.len() <= index {
            let ByPixelCount(next) = self.heap.pop()?;
            self.ranked.push(next);
        }
        self.ranked.get(index)
    }
}
