use super::equivalence::LabelingSession;
use crate::error::{Error, Result};
use crate::image::{Gray16Image, Gray8Image};

/// Gray8 sample value treated as background.
pub const BACKGROUND: i8 = i8::MIN;

/// An already-visited 8-connected neighbour of the current pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Neighbor {
    Left,
    UpLeft,
    Up,
    UpRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    New,
    Copy(Neighbor),
    Merge(Neighbor, Neighbor),
}

const LEFT: usize = 1;
const UP_LEFT: usize = 2;
const UP: usize = 4;
const UP_RIGHT: usize = 8;

/// Action per neighbour-presence pattern (bit set = neighbour is foreground).
///
/// Left, up-left and up are mutually 8-adjacent and up touches up-right, so
/// those pairs already share a class; only up-right against left or up-left
/// can join two different sets, and only when up is background.
const ACTIONS: [Action; 16] = {
    use Action::*;
    use Neighbor::*;
    [
        New,                    // ----
        Copy(Left),             // L
        Copy(UpLeft),           // UL
        Copy(Left),             // L UL
        Copy(Up),               // U
        Copy(Up),               // L U
        Copy(Up),               // UL U
        Copy(Up),               // L UL U
        Copy(UpRight),          // UR
        Merge(Left, UpRight),   // L UR
        Merge(UpLeft, UpRight), // UL UR
        Merge(Left, UpRight),   // L UL UR
        Copy(Up),               // U UR
        Copy(Up),               // L U UR
        Copy(Up),               // UL U UR
        Copy(Up),               // L UL U UR
    ]
};

const NO_CLASS: u32 = u32::MAX;

/// Result of one labeling pass.
#[derive(Debug, Clone)]
pub struct Labeling {
    /// Per-pixel label, `0` for background and `1..=count` otherwise.
    pub labels: Gray16Image,
    pub count: usize,
}

/// Labels the 8-connected foreground regions of `plane` in a single raster pass.
///
/// Labels follow the raster order of each region's first pixel. Fails with
/// [`Error::Overflow`] when there are more regions than a 16-bit label holds.
pub fn label_components(plane: &Gray8Image) -> Result<Labeling> {
    let (w, h) = (plane.width(), plane.height());
    let src = plane.read();
    let mut classes = vec![NO_CLASS; w * h];
    let mut session = LabelingSession::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if src[idx] == BACKGROUND {
                continue;
            }

            let neighbor = |n: Neighbor| -> u32 {
                let (nx, ny) = match n {
                    Neighbor::Left => (x as isize - 1, y as isize),
                    Neighbor::UpLeft => (x as isize - 1, y as isize - 1),
                    Neighbor::Up => (x as isize, y as isize - 1),
                    Neighbor::UpRight => (x as isize + 1, y as isize - 1),
                };
                if nx < 0 || ny < 0 || nx >= w as isize {
                    NO_CLASS
                } else {
                    classes[ny as usize * w + nx as usize]
                }
            };

            let present = |n: Neighbor| neighbor(n) != NO_CLASS;
            let mut pattern = 0;
            if present(Neighbor::Left) {
                pattern |= LEFT;
            }
            if present(Neighbor::UpLeft) {
                pattern |= UP_LEFT;
            }
            if present(Neighbor::Up) {
                pattern |= UP;
            }
            if present(Neighbor::UpRight) {
                pattern |= UP_RIGHT;
            }

            let class = match ACTIONS[pattern] {
                Action::New => session.make_class(),
                Action::Copy(n) => neighbor(n),
                Action::Merge(a, b) => {
                    let (a, b) = (neighbor(a), neighbor(b));
                    session.union(a, b)
                }
            };
            classes[idx] = class;
        }
    }
    drop(src);

    let (final_labels, count) = session.finalize();
    if count > i16::MAX as usize {
        return Err(Error::overflow(format!(
            "{} components exceed the 16-bit label range",
            count
        )));
    }

    let labels: Vec<i16> = classes
        .iter()
        .map(|&c| {
            if c == NO_CLASS {
                0
            } else {
                final_labels[c as usize] as i16
            }
        })
        .collect();

    tracing::debug!("labeled {} components in {}x{} image", count, w, h);

    Ok(Labeling {
        labels: Gray16Image::from_vec(w, h, labels)?,
        count,
    })
}
