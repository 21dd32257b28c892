//! End-to-end runs over the public API.

use jjil::barcode::ean13;
use jjil::components::Gray8ConnComp;
use jjil::fft::OutputMode;
use jjil::geometry::MaskPolygon;
use jjil::haar::{Gray8DetectHaarMultiScale, HaarCascade, HaarDetectorConfig};
use jjil::image::{Gray8Image, Image, Rect, MASK_MASKED};
use jjil::pipeline::{PipelineConfig, PipelineStage, StageConfig, Transform};

/// Dark frame in the collaborators' unsigned layout with two bright rectangles.
fn frame() -> Gray8Image {
    let (width, height) = (64, 48);
    let blobs = [Rect::new(10, 8, 20, 12), Rect::new(40, 30, 10, 10)];
    let luma: Vec<u8> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            if blobs.iter().any(|r| r.contains(x, y)) {
                220
            } else {
                30
            }
        })
        .collect();
    Gray8Image::from_unsigned(width as usize, height as usize, &luma).unwrap()
}

#[test]
fn smooth_threshold_and_rank_components() {
    common::log_setup::setup_test_logging();
    let config: PipelineConfig = serde_yml::from_str(
        r#"
stages:
  - stage: Gray8GaussSmooth
    sigma: 100
  - stage: Gray8OtsuThreshold
"#,
    )
    .unwrap();
    let mut pipeline = config.build().unwrap();
    pipeline.push(Image::from(frame())).unwrap();
    let binary = pipeline.front().unwrap();

    let mut components = Gray8ConnComp::new().into_stage();
    components.push(binary).unwrap();
    let labels = components.front().unwrap();
    assert_eq!(labels.size(), frame().size());

    let analysis = components.transform_mut();
    assert_eq!(analysis.component_count().unwrap(), 2);
    let largest = analysis.bounding_rect(0).unwrap();
    let smaller = analysis.bounding_rect(1).unwrap();
    assert!(largest.contains(20, 14) && !largest.contains(45, 35));
    assert!(smaller.contains(45, 35));
    assert!(analysis.pixel_count(0).unwrap() > analysis.pixel_count(1).unwrap());
}

#[test]
fn fft_round_trip_through_a_sequence() {
    common::log_setup::setup_test_logging();
    let plane = Gray8Image::from_fn(32, 16, |x, y| (((x * 11 + y * 5) % 200) as i32 - 100) as i8).unwrap();
    let config = PipelineConfig {
        stages: vec![
            StageConfig::Gray8Fft { max_len: 8 },
            StageConfig::Complex32IFft {
                max_len: 8,
                mode: OutputMode::Clamp,
            },
        ],
    };
    let mut pipeline = config.build().unwrap();
    pipeline.push(Image::from(plane.clone())).unwrap();
    let back = pipeline.front().unwrap().into_gray8("test").unwrap();

    for (a, b) in back.to_vec().into_iter().zip(plane.to_vec()) {
        assert!((a as i32 - b as i32).abs() <= 1, "{a} vs {b}");
    }
}

#[test]
fn masked_region_is_not_searched() {
    let cascade: HaarCascade = serde_yml::from_str(
        r#"
window: { width: 4, height: 4 }
stages:
  - threshold: 1
    features:
      - threshold: 1
        pass: 1
        fail: 0
        rects:
          - { x: 1, y: 1, width: 2, height: 2, weight: 4 }
          - { x: 0, y: 0, width: 4, height: 4, weight: -1 }
"#,
    )
    .unwrap();
    let config = HaarDetectorConfig {
        min_scale: 100,
        max_scale: 100,
        step: 1,
    };
    let mut detector = Gray8DetectHaarMultiScale::new(cascade, config).unwrap();

    // a bright 2x2 spot on dark ground, centre-surround
    let plane = Gray8Image::from_fn(12, 12, |x, y| {
        if (5..7).contains(&x) && (5..7).contains(&y) {
            100
        } else {
            -100
        }
    })
    .unwrap();
    let mask = detector.detect(&plane).unwrap();
    assert!(!detector.detections().is_empty());
    assert_eq!(mask.get(5, 5), MASK_MASKED);

    // the polygon stage output is a mask the detector output can be checked against
    let outside = MaskPolygon::rect(3, 3, 6, 6, false).unwrap();
    let framed = outside.mask(12, 12).unwrap();
    for d in detector.detections() {
        let (cx, cy) = ((d.x + 2) as usize, (d.y + 2) as usize);
        assert_ne!(framed.get(cx, cy), MASK_MASKED, "hit {d} centred outside the spot area");
    }
}

#[test]
fn barcode_check_digits() {
    assert!(ean13::verify_check_digit("4006381333931"));
    let modules = ean13::encode("400638133393").unwrap();
    assert_eq!(ean13::decode(&modules).unwrap(), "4006381333931");
}
