use glam::IVec2;

use super::resample::crop_plane;
use crate::error::{Error, Result};
use crate::image::{Gray8Image, Image, Rect, Size, MASK_ACTIVE};
use crate::pipeline::PipelineStage;

/// Window geometry shared by both generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grid {
    window: Size,
    step_x: usize,
    step_y: usize,
}

impl Grid {
    fn new(stage: &'static str, window: Size, step_x: usize, step_y: usize) -> Result<Self> {
        if window.width == 0 || window.height == 0 {
            return Err(Error::parameter(stage, "window", window));
        }
        if step_x == 0 || step_y == 0 {
            return Err(Error::parameter(
                stage,
                "step",
                format!("{}x{}", step_x, step_y),
            ));
        }
        Ok(Self {
            window,
            step_x,
            step_y,
        })
    }

    /// Window columns and rows that fit in `size`.
    fn layout(&self, stage: &'static str, size: Size) -> Result<(usize, usize)> {
        if !size.contains(self.window) {
            return Err(Error::ImageTooSmall {
                stage,
                size,
                required: self.window,
            });
        }
        Ok((
            (size.width - self.window.width) / self.step_x + 1,
            (size.height - self.window.height) / self.step_y + 1,
        ))
    }
}

/// The image being cut up and the next window to emit.
#[derive(Debug, Clone)]
struct Cursor {
    source: Gray8Image,
    origin: IVec2,
    mask: Option<Gray8Image>,
    cols: usize,
    rows: usize,
    next: usize,
}

impl Cursor {
    fn rect(&self, grid: &Grid, index: usize) -> Rect {
        Rect::new(
            ((index % self.cols) * grid.step_x) as i32,
            ((index / self.cols) * grid.step_y) as i32,
            grid.window.width as i32,
            grid.window.height as i32,
        )
    }

    fn remaining(&self) -> usize {
        self.cols * self.rows - self.next
    }

    fn window(&self, grid: &Grid, index: usize, stage: &'static str) -> Result<Image> {
        let rect = self.rect(grid, index);
        let plane = crop_plane(&self.source, rect, stage)?;
        Ok(Image::from(plane).with_offset(self.origin + IVec2::new(rect.x, rect.y)))
    }

    /// True when the window's centre pixel is masked.
    fn centre_masked(&self, grid: &Grid, index: usize) -> bool {
        let Some(mask) = &self.mask else {
            return false;
        };
        let rect = self.rect(grid, index);
        let cx = rect.x as usize + grid.window.width / 2;
        let cy = rect.y as usize + grid.window.height / 2;
        mask.get(cx, cy) != MASK_ACTIVE
    }
}

/// Emits evenly spaced fixed-size windows of a Gray8 image, one per `front`.
///
/// Windows run left to right, top to bottom; each carries its position in the
/// pushed image (plus that image's own offset) as its offset.
#[derive(Debug, Clone)]
pub struct Gray8SubImageGenerator {
    grid: Grid,
    cursor: Option<Cursor>,
}

impl Gray8SubImageGenerator {
    pub const NAME: &'static str = "Gray8SubImageGenerator";

    pub fn new(window: Size, step_x: usize, step_y: usize) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(Self::NAME, window, step_x, step_y)?,
            cursor: None,
        })
    }

    /// Windows not yet emitted for the current image.
    pub fn remaining(&self) -> usize {
        self.cursor.as_ref().map_or(0, Cursor::remaining)
    }
}

impl PipelineStage for Gray8SubImageGenerator {
    fn push(&mut self, image: Image) -> Result<()> {
        let source = image.as_gray8(Self::NAME)?;
        let (cols, rows) = self.grid.layout(Self::NAME, source.size())?;
        self.cursor = Some(Cursor {
            source: source.share(),
            origin: image.offset().unwrap_or(IVec2::ZERO),
            mask: None,
            cols,
            rows,
            next: 0,
        });
        Ok(())
    }

    fn front(&mut self) -> Result<Image> {
        let grid = self.grid;
        let cursor = self
            .cursor
            .as_mut()
            .filter(|c| c.remaining() > 0)
            .ok_or(Error::Empty { stage: Self::NAME })?;
        let index = cursor.next;
        cursor.next += 1;
        cursor.window(&grid, index, Self::NAME)
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Like [`Gray8SubImageGenerator`], but skips windows whose centre pixel is
/// masked in the pushed image's mask.
///
/// The mask is shared, not copied: pixels masked after the push, for example
/// around a detection, suppress windows that have not been emitted yet.
#[derive(Debug, Clone)]
pub struct Gray8MaskedSubImageGenerator {
    grid: Grid,
    cursor: Option<Cursor>,
}

impl Gray8MaskedSubImageGenerator {
    pub const NAME: &'static str = "Gray8MaskedSubImageGenerator";

    pub fn new(window: Size, step_x: usize, step_y: usize) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(Self::NAME, window, step_x, step_y)?,
            cursor: None,
        })
    }

    fn next_unmasked(&self) -> Option<usize> {
        let cursor = self.cursor.as_ref()?;
        (cursor.next..cursor.cols * cursor.rows).find(|&i| !cursor.centre_masked(&self.grid, i))
    }
}

impl PipelineStage for Gray8MaskedSubImageGenerator {
    fn push(&mut self, image: Image) -> Result<()> {
        let source = image.as_gray8(Self::NAME)?;
        let (cols, rows) = self.grid.layout(Self::NAME, source.size())?;
        self.cursor = Some(Cursor {
            source: source.share(),
            origin: image.offset().unwrap_or(IVec2::ZERO),
            mask: image.mask().map(Gray8Image::share),
            cols,
            rows,
            next: 0,
        });
        Ok(())
    }

    fn front(&mut self) -> Result<Image> {
        let index = self
            .next_unmasked()
            .ok_or(Error::Empty { stage: Self::NAME })?;
        let grid = self.grid;
        let cursor = self
            .cursor
            .as_mut()
            .ok_or(Error::Empty { stage: Self::NAME })?;
        cursor.next = index + 1;
        cursor.window(&grid, index, Self::NAME)
    }

    fn is_empty(&self) -> bool {
        self.next_unmasked().is_none()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
