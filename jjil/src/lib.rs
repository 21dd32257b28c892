//! JJIL - fixed-point image processing pipeline.
//!
//! Images flow one at a time through chains of stages. Each stage accepts an
//! image with `push`, and hands back its single pending result with `front`.
//! The library covers:
//! - Thresholding, histograms, convolution and format conversion
//! - Integer FFT and Wiener deconvolution
//! - 8-connected component labeling with ranked components
//! - Resampling, affine warps, Hough line fitting and polygon masks
//! - Multi-scale Haar-cascade detection
//! - EAN-13 check digits
//!
//! All sample arithmetic is integer; 8-bit gray samples are signed (`-128..=127`).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use jjil::prelude::*;
//!
//! let plane = Gray8Image::from_unsigned(width, height, &luma)?;
//! let mut pipeline = Sequence::new()
//!     .with(Gray8GaussSmooth::new(150)?.into_stage())
//!     .with(Gray8OtsuThreshold::new().into_stage());
//! pipeline.push(Image::from(plane))?;
//! let binary = pipeline.front()?;
//! ```

pub mod barcode;
pub mod components;
mod error;
pub mod fft;
pub mod filters;
pub mod geometry;
pub mod haar;
pub mod image;
pub mod math;
pub mod pipeline;

pub mod prelude;

pub use error::{Error, Result};
