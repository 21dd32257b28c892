use super::*;
use crate::error::{Error, Result};
use crate::filters::{Gray8Add, Gray8Negate, Gray8Subtract, Gray8Threshold};
use crate::image::{Gray8Image, Image, RgbImage, Size};

/// Accepts every push but never produces output.
struct Sink;

impl PipelineStage for Sink {
    fn push(&mut self, _image: Image) -> Result<()> {
        Ok(())
    }

    fn front(&mut self) -> Result<Image> {
        Err(Error::Empty { stage: "Sink" })
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Sink"
    }
}

fn gray(values: &[i8]) -> Image {
    Image::from(Gray8Image::from_vec(values.len(), 1, values.to_vec()).unwrap())
}

fn samples(image: &Image) -> Vec<i8> {
    image.as_gray8("test").unwrap().to_vec()
}

#[test]
fn sequence_runs_stages_in_order() {
    let mut sequence = Sequence::new()
        .with(Gray8Threshold::new(0).unwrap().into_stage())
        .with(Gray8Negate.into_stage());
    assert_eq!(sequence.stage_names(), vec!["Gray8Threshold", "Gray8Negate"]);

    sequence.push(gray(&[10, -10])).unwrap();
    // threshold first: 10 -> 127 -> -127, -10 -> -128 -> 127
    assert_eq!(samples(&sequence.front().unwrap()), vec![-127, 127]);
}

#[test]
fn sequence_reports_stage_without_output() {
    let mut sequence = Sequence::new()
        .with(Gray8Negate.into_stage())
        .with(Sink)
        .with(Gray8Negate.into_stage());

    assert_eq!(
        sequence.push(gray(&[1])),
        Err(Error::Empty { stage: "Sink" })
    );
    assert!(sequence.is_empty());
}

#[test]
fn front_takes_the_output() {
    let mut stage = Gray8Negate.into_stage();
    assert_eq!(stage.front(), Err(Error::Empty { stage: "Gray8Negate" }));

    stage.push(gray(&[5])).unwrap();
    assert!(!stage.is_empty());
    assert_eq!(samples(&stage.front().unwrap()), vec![-5]);
    assert!(stage.is_empty());
}

#[test]
fn failed_push_keeps_previous_output() {
    let mut stage = Gray8Negate.into_stage();
    stage.push(gray(&[3, 4])).unwrap();

    let rgb = Image::from(RgbImage::new(2, 1).unwrap());
    assert!(matches!(
        stage.push(rgb),
        Err(Error::FormatMismatch { stage: "Gray8Negate", .. })
    ));
    assert_eq!(samples(stage.peek().unwrap()), vec![-3, -4]);
}

#[test]
fn ladder_joins_independent_branches() {
    let mut ladder = Ladder::new(
        Gray8Negate.into_stage(),
        CopyStage::shallow().into_stage(),
        Gray8Add,
    );
    assert_eq!(ladder.join_name(), "Gray8Add");

    // the negate branch must not leak into the copy branch
    ladder.push(gray(&[7, -20, 127])).unwrap();
    assert_eq!(samples(&ladder.front().unwrap()), vec![0, 0, 0]);
}

#[test]
fn ladder_over_sequences() {
    let first = Sequence::new().with(Gray8Negate.into_stage());
    let second = Sequence::new()
        .with(Gray8Negate.into_stage())
        .with(Gray8Negate.into_stage());
    let mut ladder = Ladder::new(first, second, Gray8Subtract);

    ladder.push(gray(&[10, 100])).unwrap();
    // -x - x, clamped
    assert_eq!(samples(&ladder.front().unwrap()), vec![-20, -128]);
}

#[test]
fn ladder_reports_empty_branch() {
    let mut ladder = Ladder::new(Gray8Negate.into_stage(), Sink, Gray8Add);
    assert_eq!(ladder.push(gray(&[1])), Err(Error::Empty { stage: "Sink" }));
    assert!(ladder.is_empty());
}

#[test]
fn shallow_copy_aliases_deep_copy_does_not() {
    let input = gray(&[1, 2, 3]);
    let plane = input.as_gray8("test").unwrap().share();

    let mut shallow = CopyStage::shallow().into_stage();
    shallow.push(input.share()).unwrap();
    let aliased = shallow.front().unwrap();
    assert!(aliased.as_gray8("test").unwrap().shares_buffer(&plane));

    let mut deep = CopyStage::deep().into_stage();
    deep.push(input).unwrap();
    let copied = deep.front().unwrap();
    assert!(!copied.as_gray8("test").unwrap().shares_buffer(&plane));

    plane.set(0, 0, 100);
    assert_eq!(samples(&aliased)[0], 100);
    assert_eq!(samples(&copied)[0], 1);
}

#[test]
fn pipeline_builds_from_yaml() {
    let yaml = r#"
stages:
  - stage: Gray8GaussSmooth
    sigma: 150
  - stage: Gray8Threshold
    threshold: 0
    inverted: true
  - stage: Copy
  - stage: Gray8Shrink
    width: 4
    height: 2
"#;
    let config: PipelineConfig = serde_yml::from_str(yaml).unwrap();
    assert_eq!(config.stages[2], StageConfig::Copy { deep: false });

    let mut sequence = config.build().unwrap();
    assert_eq!(
        sequence.stage_names(),
        vec!["Gray8GaussSmooth", "Gray8Threshold", "Copy", "Gray8Shrink"]
    );

    let plane = Gray8Image::new_filled(8, 4, 90).unwrap();
    sequence.push(Image::from(plane)).unwrap();
    let out = sequence.front().unwrap();
    assert_eq!(out.size(), Size::new(4, 2));
    // inverted threshold: everything above 0 becomes -128
    assert!(samples(&out).iter().all(|&v| v == -128));
}

#[test]
fn pipeline_config_rejects_bad_parameters() {
    let config = PipelineConfig {
        stages: vec![StageConfig::Gray8Threshold {
            threshold: 300,
            inverted: false,
        }],
    };
    assert!(matches!(
        config.build(),
        Err(Error::ParameterOutOfRange { name: "threshold", .. })
    ));

    assert!(PipelineConfig::default().build().is_err());

    let lookup = StageConfig::Gray8Lookup { table: vec![0; 10] };
    assert!(lookup.build().is_err());
}

#[test]
fn unknown_stage_does_not_parse() {
    let yaml = "stages:\n  - stage: Gray8Sharpen\n";
    assert!(serde_yml::from_str::<PipelineConfig>(yaml).is_err());
}

#[test]
fn mask_rect_stage_masks_region() {
    let config = StageConfig::MaskRect {
        rect: crate::image::Rect::new(1, 0, 2, 1),
        inside: true,
    };
    let mut stage = config.build().unwrap();
    stage.push(gray(&[0, 0, 0, 0])).unwrap();
    let out = stage.front().unwrap();
    let masked: Vec<bool> = (0..4).map(|x| out.is_masked(x, 0)).collect();
    assert_eq!(masked, vec![false, true, true, false]);
}
