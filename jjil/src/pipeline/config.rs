use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::copy::CopyStage;
use super::sequence::Sequence;
use super::stage::{PipelineStage, Transform};
use crate::components::Gray8ConnComp;
use crate::error::{Error, Result};
use crate::fft::{
    Complex32Deconvolve, Complex32IFft, Complex32Magnitude, DeconvolutionConfig, Gray8Fft,
    OutputMode,
};
use crate::filters::{
    Gray16Gray8, Gray32Gray8, Gray8Convolve, Gray8GaussSmooth, Gray8Gray32, Gray8HistEq,
    Gray8Histogram, Gray8IntegralImage, Gray8Lookup, Gray8Mpy, Gray8Negate, Gray8OtsuThreshold,
    Gray8Rgb, Gray8Statistics, Gray8Threshold, RgbAvgGray, RgbSelectGray,
};
use crate::geometry::{
    Gray8Crop, Gray8QuadMap, Gray8RectStretch, Gray8Shrink, Gray8TriangleMap, HoughConfig,
    Interpolation, LinefitHough, MaskPolygon,
};
use crate::haar::{Gray8DetectHaarMultiScale, HaarCascade, HaarDetectorConfig};
use crate::image::{Gray8Image, Rect, RgbChannel, Size};

fn yes() -> bool {
    true
}

/// Serialisable description of one single-image stage.
///
/// Tagged by the stage name, e.g. `{ stage: Gray8Threshold, threshold: 10 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage")]
pub enum StageConfig {
    Copy {
        #[serde(default)]
        deep: bool,
    },
    Gray8Threshold {
        threshold: i32,
        #[serde(default)]
        inverted: bool,
    },
    Gray8OtsuThreshold,
    Gray8Histogram,
    Gray8HistEq,
    Gray8Negate,
    Gray8Mpy {
        factor: i32,
    },
    Gray8Lookup {
        table: Vec<i8>,
    },
    Gray8Convolve {
        kernel: Vec<i32>,
        width: usize,
        height: usize,
        divisor: i32,
    },
    Gray8GaussSmooth {
        /// Hundredths of a pixel.
        sigma: u32,
    },
    RgbAvgGray,
    RgbSelectGray {
        channel: RgbChannel,
    },
    Gray8Rgb,
    Gray8Gray32,
    Gray32Gray8,
    Gray16Gray8,
    Gray8IntegralImage,
    Gray8Statistics,
    Gray8Fft {
        max_len: usize,
    },
    Complex32IFft {
        max_len: usize,
        #[serde(default)]
        mode: OutputMode,
    },
    Complex32Magnitude {
        #[serde(default)]
        mode: OutputMode,
    },
    Complex32Deconvolve {
        /// Side of the square point spread function.
        psf_size: usize,
        psf: Vec<i8>,
        #[serde(default)]
        config: DeconvolutionConfig,
    },
    Gray8ConnComp,
    Gray8Shrink {
        width: usize,
        height: usize,
    },
    Gray8RectStretch {
        width: usize,
        height: usize,
        #[serde(default)]
        interpolation: Interpolation,
    },
    Gray8Crop {
        rect: Rect,
    },
    Gray8TriangleMap {
        from: [IVec2; 3],
        to: [IVec2; 3],
        output: Size,
    },
    Gray8QuadMap {
        quad: [IVec2; 4],
        output: Size,
    },
    LinefitHough {
        #[serde(default)]
        config: HoughConfig,
    },
    MaskPolygon {
        vertices: Vec<IVec2>,
        #[serde(default = "yes")]
        inside: bool,
    },
    MaskRect {
        rect: Rect,
        #[serde(default = "yes")]
        inside: bool,
    },
    Gray8DetectHaarMultiScale {
        cascade: HaarCascade,
        #[serde(default)]
        detector: HaarDetectorConfig,
    },
}

impl StageConfig {
    /// Constructs the stage, validating its parameters.
    pub fn build(&self) -> Result<Box<dyn PipelineStage>> {
        Ok(match self {
            StageConfig::Copy { deep } => {
                let copy = if *deep {
                    CopyStage::deep()
                } else {
                    CopyStage::shallow()
                };
                boxed(copy)
            }
            StageConfig::Gray8Threshold {
                threshold,
                inverted,
            } => {
                let stage = Gray8Threshold::new(*threshold)?;
                boxed(if *inverted { stage.inverted() } else { stage })
            }
            StageConfig::Gray8OtsuThreshold => boxed(Gray8OtsuThreshold::new()),
            StageConfig::Gray8Histogram => boxed(Gray8Histogram::new()),
            StageConfig::Gray8HistEq => boxed(Gray8HistEq),
            StageConfig::Gray8Negate => boxed(Gray8Negate),
            StageConfig::Gray8Mpy { factor } => boxed(Gray8Mpy::new(*factor)),
            StageConfig::Gray8Lookup { table } => boxed(Gray8Lookup::from_slice(table)?),
            StageConfig::Gray8Convolve {
                kernel,
                width,
                height,
                divisor,
            } => boxed(Gray8Convolve::new(kernel.clone(), *width, *height, *divisor)?),
            StageConfig::Gray8GaussSmooth { sigma } => boxed(Gray8GaussSmooth::new(*sigma)?),
            StageConfig::RgbAvgGray => boxed(RgbAvgGray),
            StageConfig::RgbSelectGray { channel } => boxed(RgbSelectGray::new(*channel)),
            StageConfig::Gray8Rgb => boxed(Gray8Rgb),
            StageConfig::Gray8Gray32 => boxed(Gray8Gray32),
            StageConfig::Gray32Gray8 => boxed(Gray32Gray8),
            StageConfig::Gray16Gray8 => boxed(Gray16Gray8),
            StageConfig::Gray8IntegralImage => boxed(Gray8IntegralImage),
            StageConfig::Gray8Statistics => boxed(Gray8Statistics::new()),
            StageConfig::Gray8Fft { max_len } => boxed(Gray8Fft::new(*max_len)?),
            StageConfig::Complex32IFft { max_len, mode } => {
                boxed(Complex32IFft::new(*max_len, *mode)?)
            }
            StageConfig::Complex32Magnitude { mode } => boxed(Complex32Magnitude::new(*mode)),
            StageConfig::Complex32Deconvolve {
                psf_size,
                psf,
                config,
            } => {
                let psf = Gray8Image::from_vec(*psf_size, *psf_size, psf.clone())?;
                boxed(Complex32Deconvolve::new(&psf, *config)?)
            }
            StageConfig::Gray8ConnComp => boxed(Gray8ConnComp::new()),
            StageConfig::Gray8Shrink { width, height } => boxed(Gray8Shrink::new(*width, *height)?),
            StageConfig::Gray8RectStretch {
                width,
                height,
                interpolation,
            } => boxed(Gray8RectStretch::new(*width, *height, *interpolation)?),
            StageConfig::Gray8Crop { rect } => boxed(Gray8Crop::new(*rect)?),
            StageConfig::Gray8TriangleMap { from, to, output } => {
                boxed(Gray8TriangleMap::new(*from, *to, *output)?)
            }
            StageConfig::Gray8QuadMap { quad, output } => boxed(Gray8QuadMap::new(*quad, *output)?),
            StageConfig::LinefitHough { config } => boxed(LinefitHough::new(*config)?),
            StageConfig::MaskPolygon { vertices, inside } => {
                boxed(MaskPolygon::new(vertices.clone(), *inside)?)
            }
            StageConfig::MaskRect { rect, inside } => boxed(MaskPolygon::rect(
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                *inside,
            )?),
            StageConfig::Gray8DetectHaarMultiScale { cascade, detector } => {
                cascade.validate()?;
                boxed(Gray8DetectHaarMultiScale::new(cascade.clone(), *detector)?)
            }
        })
    }
}

fn boxed<T: Transform + 'static>(transform: T) -> Box<dyn PipelineStage> {
    Box::new(transform.into_stage())
}

/// Serialisable stage chain, built into a [`Sequence`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<StageConfig>,
}

impl PipelineConfig {
    pub const NAME: &'static str = "PipelineConfig";

    pub fn build(&self) -> Result<Sequence> {
        if self.stages.is_empty() {
            return Err(Error::parameter(Self::NAME, "stages", "none"));
        }

        let mut sequence = Sequence::new();
        for stage in &self.stages {
            sequence.add_boxed(stage.build()?);
        }
        tracing::debug!("built pipeline: {:?}", sequence.stage_names());
        Ok(sequence)
    }
}
