use std::path::PathBuf;

use anyhow::{Context, Result};
use jjil::components::Gray8ConnComp;
use jjil::image::{Gray8Image, Image, Rect};
use jjil::pipeline::{PipelineConfig, PipelineStage, Transform};

const WIDTH: usize = 160;
const HEIGHT: usize = 120;

fn main() -> Result<()> {
    common::log_setup::setup_logging("info");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("pipeline.yaml"));

    let config: PipelineConfig = common::load_file(&path)
        .with_context(|| format!("loading pipeline from {}", path.display()))?;
    let mut pipeline = config.build()?;
    tracing::info!("pipeline: {}", pipeline.stage_names().join(" -> "));

    let frame = synthetic_frame()?;
    pipeline.push(Image::from(frame.clone()))?;
    let out = pipeline.front()?;
    tracing::info!("output: {} {} image", out.size(), out.format());

    report_components(&frame)?;
    Ok(())
}

/// Dark frame with a few bright blobs, in the camera's unsigned luma layout.
fn synthetic_frame() -> Result<Gray8Image> {
    let blobs = [
        Rect::new(20, 20, 40, 25),
        Rect::new(90, 30, 15, 15),
        Rect::new(60, 80, 70, 20),
    ];
    let luma: Vec<u8> = (0..HEIGHT as i32)
        .flat_map(|y| (0..WIDTH as i32).map(move |x| (x, y)))
        .map(|(x, y)| {
            let bright = blobs.iter().any(|r| r.contains(x, y));
            let noise = ((x * 7 + y * 13) % 9) as u8;
            if bright {
                200 + noise
            } else {
                40 + noise
            }
        })
        .collect();
    Ok(Gray8Image::from_unsigned(WIDTH, HEIGHT, &luma)?)
}

fn report_components(frame: &Gray8Image) -> Result<()> {
    let binary = jjil::filters::Gray8OtsuThreshold::new().apply(Image::from(frame.clone()))?;
    let mut components = Gray8ConnComp::new().into_stage();
    components.push(binary)?;

    let analysis = components.transform_mut();
    let count = analysis.component_count()?;
    tracing::info!("{} components", count);
    for index in 0..count.min(5) {
        tracing::info!(
            "#{}: {} pixels, bounds {}, perimeter {}",
            index,
            analysis.pixel_count(index)?,
            analysis.bounding_rect(index)?,
            analysis.perimeter(index)?
        );
    }
    Ok(())
}
