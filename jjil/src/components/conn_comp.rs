use glam::IVec2;

use super::labeling::{label_components, Labeling};
use super::ranking::{Component, ComponentRanking};
use crate::error::{Error, Result};
use crate::image::{Gray16Image, Gray8Image, Image, Pixels, Rect};
use crate::pipeline::Transform;

/// State of the last successful labeling pass.
#[derive(Debug, Clone)]
struct Analysis {
    labels: Gray16Image,
    count: usize,
    ranking: ComponentRanking,
    /// Perimeter per label, filled for every component on first request.
    perimeters: Option<Vec<usize>>,
}

/// 8-connected component analysis of a Gray8 image.
///
/// Samples equal to `i8::MIN` are background. Pushing replaces the image with
/// its Gray16 label map (background `0`) and keeps a private copy for the
/// component queries, which rank components largest first.
#[derive(Debug, Clone, Default)]
pub struct Gray8ConnComp {
    analysis: Option<Analysis>,
}

impl Gray8ConnComp {
    pub fn new() -> Self {
        Self::default()
    }

    fn analysis(&self) -> Result<&Analysis> {
        self.analysis
            .as_ref()
            .ok_or(Error::Empty { stage: Self::NAME })
    }

    fn analysis_mut(&mut self) -> Result<&mut Analysis> {
        self.analysis
            .as_mut()
            .ok_or(Error::Empty { stage: Self::NAME })
    }

    pub fn component_count(&self) -> Result<usize> {
        Ok(self.analysis()?.count)
    }

    /// Component of rank `index`, 0 being the largest.
    pub fn component(&mut self, index: usize) -> Result<Component> {
        let analysis = self.analysis_mut()?;
        let count = analysis.count;
        analysis
            .ranking
            .get(index)
            .copied()
            .ok_or(Error::OutOfBounds {
                what: "component",
                index,
                count,
            })
    }

    pub fn bounding_rect(&mut self, index: usize) -> Result<Rect> {
        Ok(self.component(index)?.bounds)
    }

    pub fn pixel_count(&mut self, index: usize) -> Result<usize> {
        Ok(self.component(index)?.pixel_count)
    }

    /// Number of pixel edges between the component and anything else,
    /// including the image border.
    pub fn perimeter(&mut self, index: usize) -> Result<usize> {
        let label = self.component(index)?.label as usize;
        let analysis = self.analysis_mut()?;
        if analysis.perimeters.is_none() {
            analysis.perimeters = Some(perimeters(&analysis.labels, analysis.count));
        }
        Ok(analysis
            .perimeters
            .as_ref()
            .map_or(0, |p| p[label]))
    }

    /// Binary image of one component cropped to its bounding box.
    ///
    /// Component pixels are `i8::MAX`, everything else `i8::MIN`; the offset
    /// records the box origin in the labeled image.
    pub fn component_image(&mut self, index: usize) -> Result<Image> {
        let component = self.component(index)?;
        let analysis = self.analysis()?;
        let bounds = component.bounds;
        let label = component.label as i16;
        let labels = analysis.labels.read();
        let stride = analysis.labels.width();

        let plane = Gray8Image::from_fn(bounds.width as usize, bounds.height as usize, |x, y| {
            let sx = bounds.x as usize + x;
            let sy = bounds.y as usize + y;
            if labels[sy * stride + sx] == label {
                i8::MAX
            } else {
                i8::MIN
            }
        })?;

        Ok(Image::from(plane).with_offset(IVec2::new(bounds.x, bounds.y)))
    }
}

/// Counts, per label, the 4-neighbour transitions to a different label or the border.
fn perimeters(labels: &Gray16Image, count: usize) -> Vec<usize> {
    let (w, h) = (labels.width(), labels.height());
    let data = labels.read();
    let mut out = vec![0usize; count + 1];

    for y in 0..h {
        for x in 0..w {
            let label = data[y * w + x];
            if label <= 0 {
                continue;
            }
            let differs = |nx: isize, ny: isize| {
                nx < 0
                    || ny < 0
                    || nx >= w as isize
                    || ny >= h as isize
                    || data[ny as usize * w + nx as usize] != label
            };
            let (xi, yi) = (x as isize, y as isize);
            let edges = [
                differs(xi - 1, yi),
                differs(xi + 1, yi),
                differs(xi, yi - 1),
                differs(xi, yi + 1),
            ];
            out[label as usize] += edges.iter().filter(|&&e| e).count();
        }
    }
    out
}

impl Transform for Gray8ConnComp {
    const NAME: &'static str = "Gray8ConnComp";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let Labeling { labels, count } = label_components(image.as_gray8(Self::NAME)?)?;
        let ranking = ComponentRanking::from_labels(&labels, count);

        tracing::debug!("{}: {} components", Self::NAME, count);

        let output = image.replace_pixels(Pixels::Gray16(labels.clone()))?;
        self.analysis = Some(Analysis {
            labels,
            count,
            ranking,
            perimeters: None,
        });
        Ok(output)
    }
}
