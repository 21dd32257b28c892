use glam::IVec2;

use super::*;
use crate::error::{Error, Result};
use crate::filters::Statistics;
use crate::image::{Gray8Image, Image, Rect, Size, MASK_ACTIVE, MASK_MASKED};
use crate::pipeline::Transform;

/// Left half bright, right half dark, over a 4x4 window.
fn edge_cascade() -> HaarCascade {
    HaarCascade::new(
        Size::new(4, 4),
        vec![HaarStage {
            threshold: 1,
            features: vec![edge_feature()],
        }],
    )
    .unwrap()
}

fn edge_feature() -> HaarFeature {
    HaarFeature {
        rects: vec![
            HaarRect { x: 0, y: 0, width: 2, height: 4, weight: 1 },
            HaarRect { x: 2, y: 0, width: 2, height: 4, weight: -1 },
        ],
        threshold: 4,
        pass: 1,
        fail: 0,
    }
}

fn halves(left: i8, right: i8) -> Gray8Image {
    Gray8Image::from_fn(4, 4, |x, _| if x < 2 { left } else { right }).unwrap()
}

/// Accepts windows whose mean sample exceeds a level.
#[derive(Debug)]
struct MeanAbove {
    window: Size,
    level: i32,
}

impl Classifier for MeanAbove {
    fn window_size(&self) -> Size {
        self.window
    }

    fn classify(&self, window: &Gray8Image) -> Result<bool> {
        Ok(Statistics::of(window)?.mean > self.level)
    }
}

fn bright_square(size: usize, square: Rect) -> Gray8Image {
    Gray8Image::from_fn(size, size, |x, y| {
        if square.contains(x as i32, y as i32) {
            100
        } else {
            -100
        }
    })
    .unwrap()
}

fn detector(min_scale: u32, max_scale: u32) -> Gray8DetectHaarMultiScale<MeanAbove> {
    let config = HaarDetectorConfig {
        min_scale,
        max_scale,
        step: 1,
    };
    let classifier = MeanAbove {
        window: Size::new(4, 4),
        level: 0,
    };
    Gray8DetectHaarMultiScale::new(classifier, config).unwrap()
}

#[test]
fn cascade_accepts_matching_edge() {
    let cascade = edge_cascade();
    assert!(cascade.classify(&halves(100, -100)).unwrap());
    assert!(!cascade.classify(&halves(-100, 100)).unwrap());
}

#[test]
fn flat_window_is_rejected() {
    // zero spread normalises by one, so the feature value 0 stays below 4
    let flat = Gray8Image::new_filled(4, 4, 50).unwrap();
    assert!(!edge_cascade().classify(&flat).unwrap());
}

#[test]
fn rejecting_stage_reports_first_failure() {
    let cascade = HaarCascade::new(
        Size::new(4, 4),
        vec![
            HaarStage { threshold: 1, features: vec![edge_feature()] },
            HaarStage { threshold: 2, features: vec![edge_feature()] },
        ],
    )
    .unwrap();

    assert_eq!(cascade.stage_count(), 2);
    assert_eq!(cascade.rejecting_stage(&halves(100, -100)).unwrap(), Some(1));
    assert_eq!(cascade.rejecting_stage(&halves(-100, 100)).unwrap(), Some(0));
}

#[test]
fn cascade_rejects_wrong_window_size() {
    let window = Gray8Image::new(5, 4).unwrap();
    assert!(matches!(
        edge_cascade().classify(&window),
        Err(Error::SizeMismatch { .. })
    ));
}

#[test]
fn cascade_validation() {
    let mut feature = edge_feature();
    feature.rects[1].x = 3;
    let stage = HaarStage { threshold: 1, features: vec![feature] };
    assert!(matches!(
        HaarCascade::new(Size::new(4, 4), vec![stage]),
        Err(Error::ParameterOutOfRange { name: "rect", .. })
    ));
    assert!(HaarCascade::new(Size::new(4, 4), vec![]).is_err());
    assert!(HaarCascade::new(Size::new(0, 4), vec![]).is_err());
}

#[test]
fn cascade_loads_from_yaml() {
    let yaml = r#"
window: { width: 4, height: 4 }
stages:
  - threshold: 1
    features:
      - threshold: 4
        pass: 1
        fail: 0
        rects:
          - { x: 0, y: 0, width: 2, height: 4, weight: 1 }
          - { x: 2, y: 0, width: 2, height: 4, weight: -1 }
"#;
    let cascade: HaarCascade = serde_yml::from_str(yaml).unwrap();
    cascade.validate().unwrap();
    assert_eq!(cascade, edge_cascade());
}

#[test]
fn config_validation_and_scales() {
    let config = HaarDetectorConfig::default();
    config.validate().unwrap();
    assert_eq!(config.scales().collect::<Vec<_>>(), vec![400, 266, 177, 118]);

    let below_unit = HaarDetectorConfig { min_scale: 50, ..config };
    assert!(below_unit.validate().is_err());
    let inverted = HaarDetectorConfig { min_scale: 300, max_scale: 200, ..config };
    assert!(inverted.validate().is_err());
    let no_step = HaarDetectorConfig { step: 0, ..config };
    assert!(no_step.validate().is_err());

    let huge = HaarDetectorConfig { min_scale: 100, max_scale: u32::MAX, step: 1 };
    assert!(matches!(huge.validate(), Err(Error::ParameterOutOfRange { .. })));
    assert_eq!(huge.scales().next(), Some(u32::MAX));
    let scales: Vec<u32> = huge.scales().collect();
    assert!(scales.windows(2).all(|w| w[1] < w[0]));
    assert!(*scales.last().unwrap() >= 100);

    let widest = HaarDetectorConfig { max_scale: MAX_SCALE, ..huge };
    widest.validate().unwrap();
    assert!(widest.scales().all(|s| s >= 100));
}

#[test]
fn detections_mask_only_the_bright_square() {
    let square = Rect::new(8, 8, 8, 8);
    let plane = bright_square(32, square);
    let mut detector = detector(100, 100);
    let mask = detector.detect(&plane).unwrap();

    let detections = detector.detections().to_vec();
    assert!(!detections.is_empty());
    assert!(detections.iter().all(|d| d.overlaps(&square) && d.width == 4));

    // at full resolution the mask is exactly the union of the detections
    for y in 0..32 {
        for x in 0..32 {
            let inside = detections.iter().any(|d| d.contains(x, y));
            assert_eq!(mask.get(x as usize, y as usize) == MASK_MASKED, inside, "({x}, {y})");
        }
    }
    assert_eq!(mask.get(0, 0), MASK_ACTIVE);
    assert_eq!(mask.get(31, 31), MASK_ACTIVE);
}

#[test]
fn windows_centred_on_a_hit_are_skipped() {
    let plane = bright_square(32, Rect::new(8, 8, 8, 8));
    let mut detector = detector(100, 100);
    detector.detect(&plane).unwrap();

    let detections = detector.detections();
    for (i, later) in detections.iter().enumerate() {
        let centre = (later.x + 2, later.y + 2);
        assert!(
            detections[..i].iter().all(|d| !d.contains(centre.0, centre.1)),
            "{later} centred inside an earlier hit"
        );
    }
}

#[test]
fn coarse_rounds_report_input_coordinates() {
    let square = Rect::new(6, 6, 12, 12);
    let plane = bright_square(30, square);
    let mut detector = detector(100, 150);
    let mask = detector.detect(&plane).unwrap();

    let first = detector.detections()[0];
    assert_eq!((first.width, first.height), (6, 6));
    assert!(first.overlaps(&square));
    assert_eq!(
        mask.get((first.x + 3) as usize, (first.y + 3) as usize),
        MASK_MASKED
    );
    assert!(detector
        .detections()
        .iter()
        .all(|d| d.width == 6 || d.width == 4));
}

#[test]
fn rounds_below_window_size_are_skipped() {
    let plane = Gray8Image::new_filled(6, 6, 100).unwrap();
    // 200 shrinks to 3x3 and is skipped; 133 shrinks to 4x4
    let mut detector = detector(100, 200);
    let mask = detector.detect(&plane).unwrap();

    assert!(!detector.detections().is_empty());
    assert!(detector.detections().iter().all(|d| d.width == 5));
    assert_eq!(mask.get(2, 2), MASK_MASKED);
}

#[test]
fn image_smaller_than_window_fails() {
    let plane = Gray8Image::new(3, 8).unwrap();
    assert!(matches!(
        detector(100, 200).detect(&plane),
        Err(Error::ImageTooSmall { .. })
    ));
}

#[test]
fn stage_outputs_mask_with_input_offset() {
    let plane = bright_square(16, Rect::new(4, 4, 8, 8));
    let image = Image::from(plane).with_offset(IVec2::new(3, 5));
    let out = detector(100, 100).apply(image).unwrap();

    assert_eq!(out.size(), Size::new(16, 16));
    assert_eq!(out.offset(), Some(IVec2::new(3, 5)));
    let mask = out.as_gray8("test").unwrap();
    assert_eq!(mask.get(0, 0), MASK_ACTIVE);
    assert!(mask.to_vec().contains(&MASK_MASKED));
}

#[test]
fn edge_cascade_finds_vertical_edge() {
    let plane = Gray8Image::from_fn(16, 8, |x, _| if x < 8 { 90 } else { -90 }).unwrap();
    let config = HaarDetectorConfig { min_scale: 100, max_scale: 100, step: 1 };
    let mut detector = Gray8DetectHaarMultiScale::new(edge_cascade(), config).unwrap();
    detector.detect(&plane).unwrap();

    assert!(!detector.detections().is_empty());
    // only windows straddling the edge see bright left and dark right
    assert!(detector.detections().iter().all(|d| d.x < 8 && d.right() >= 8));
}
