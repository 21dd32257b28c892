use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::math::{cos_deg, round_shift, sin_deg, SCALE_BITS};
use crate::pipeline::Transform;

/// Accumulator layout for [`LinefitHough`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// First angle examined, in degrees.
    pub min_theta: i32,
    /// One past the last angle examined, in degrees.
    pub max_theta: i32,
    pub theta_step: i32,
    /// Width of a rho bin, in pixels.
    pub rho_step: i32,
    /// Lines with fewer votes are not reported.
    pub min_votes: usize,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            min_theta: 0,
            max_theta: 180,
            theta_step: 1,
            rho_step: 1,
            min_votes: 2,
        }
    }
}

impl HoughConfig {
    pub fn validate(&self) -> Result<()> {
        let stage = LinefitHough::NAME;
        if self.min_theta < 0 || self.max_theta > 180 || self.min_theta >= self.max_theta {
            return Err(Error::parameter(
                stage,
                "theta range",
                format!("{}..{}", self.min_theta, self.max_theta),
            ));
        }
        if self.theta_step <= 0 {
            return Err(Error::parameter(stage, "theta_step", self.theta_step));
        }
        if self.rho_step <= 0 {
            return Err(Error::parameter(stage, "rho_step", self.rho_step));
        }
        Ok(())
    }
}

/// A line `x·cos(theta) + y·sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Angle of the normal, in degrees.
    pub theta: i32,
    /// Signed distance from the origin, in pixels.
    pub rho: i32,
    /// Points that voted for this line.
    pub votes: usize,
}

impl Line {
    /// Rounded signed distance from `p` to the line.
    pub fn distance(&self, p: IVec2) -> i32 {
        let projected =
            p.x as i64 * cos_deg(self.theta) as i64 + p.y as i64 * sin_deg(self.theta) as i64;
        round_shift(projected, SCALE_BITS) as i32 - self.rho
    }
}

/// Hough-transform line fit over a point set.
///
/// As a stage, the non-background pixels of a Gray8 image (anything other
/// than `i8::MIN`) are the points; the image passes through unchanged and the
/// best line is kept for [`LinefitHough::line`].
#[derive(Debug, Clone, Default)]
pub struct LinefitHough {
    config: HoughConfig,
    line: Option<Line>,
}

impl LinefitHough {
    pub fn new(config: HoughConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, line: None })
    }

    pub fn config(&self) -> &HoughConfig {
        &self.config
    }

    /// Best line of the last push.
    pub fn line(&self) -> Option<Line> {
        self.line
    }

    /// The most-voted line; ties go to the lowest angle, then the lowest rho.
    pub fn fit(&self, points: &[IVec2]) -> Option<Line> {
        let cfg = &self.config;
        let reach = points
            .iter()
            .map(|p| p.x.abs() + p.y.abs())
            .max()?;
        let rho_bins = (2 * reach / cfg.rho_step + 1) as usize;
        let thetas: Vec<i32> = (cfg.min_theta..cfg.max_theta)
            .step_by(cfg.theta_step as usize)
            .collect();

        let mut votes = vec![0usize; thetas.len() * rho_bins];
        for p in points {
            for (t, &theta) in thetas.iter().enumerate() {
                let projected =
                    p.x as i64 * cos_deg(theta) as i64 + p.y as i64 * sin_deg(theta) as i64;
                let rho = round_shift(projected, SCALE_BITS) as i32;
                let bin = (rho + reach).div_euclid(cfg.rho_step) as usize;
                votes[t * rho_bins + bin.min(rho_bins - 1)] += 1;
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (idx, &count) in votes.iter().enumerate() {
            match best {
                Some((_, c)) if count <= c => {}
                _ => best = Some((idx, count)),
            }
        }
        let (idx, count) = best?;
        if count < cfg.min_votes {
            return None;
        }

        let (t, bin) = (idx / rho_bins, idx % rho_bins);
        Some(Line {
            theta: thetas[t],
            rho: bin as i32 * cfg.rho_step - reach + cfg.rho_step / 2,
            votes: count,
        })
    }
}

impl Transform for LinefitHough {
    const NAME: &'static str = "LinefitHough";

    fn apply(&mut self, image: Image) -> Result<Image> {
        let plane = image.as_gray8(Self::NAME)?;
        let w = plane.width();
        let points: Vec<IVec2> = plane
            .read()
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != i8::MIN)
            .map(|(i, _)| IVec2::new((i % w) as i32, (i / w) as i32))
            .collect();

        self.line = self.fit(&points);
        match self.line {
            Some(line) => tracing::debug!(
                "{}: theta {} rho {} with {} of {} points",
                Self::NAME,
                line.theta,
                line.rho,
                line.votes,
                points.len()
            ),
            None => tracing::warn!("{}: no line among {} points", Self::NAME, points.len()),
        }
        Ok(image)
    }
}
