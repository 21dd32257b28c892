use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::error::Error;
use crate::image::{Complex32Image, Gray8Image, Image};
use crate::math::{isqrt, Complex};
use crate::pipeline::Transform;

fn assert_close(actual: &[Complex], expected: &[Complex], tolerance: i32) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a.real - e.real).abs() <= tolerance && (a.imag - e.imag).abs() <= tolerance,
            "bin {}: {} vs {}",
            i,
            a,
            e
        );
    }
}

#[test]
fn roots_are_unit_magnitude() {
    let fft = Fft::new(8).unwrap();
    let one = 1 << ROOT_BITS;
    let delta: Vec<Complex> = (0..8)
        .map(|i| if i == 1 { Complex::real(one >> 10) } else { Complex::ZERO })
        .collect();
    // transform of a shifted impulse enumerates the roots
    let spectrum = fft.forward(&delta).unwrap();
    for c in &spectrum {
        let mag = isqrt(c.square_wide()).unwrap() as i32;
        assert!((mag - (one >> 10)).abs() <= 1, "{}", c);
    }
    assert_eq!(spectrum[2], Complex::new(0, -(one >> 10)));
}

#[test]
fn impulse_transforms_to_constant() {
    let fft = Fft::new(16).unwrap();
    let mut data = vec![Complex::ZERO; 16];
    data[0] = Complex::real(100);
    let spectrum = fft.forward(&data).unwrap();
    assert!(spectrum.iter().all(|&c| c == Complex::real(100)));
}

#[test]
fn constant_transforms_to_dc() {
    let fft = Fft::new(8).unwrap();
    let spectrum = fft.forward(&[Complex::new(3, -1); 8]).unwrap();
    assert_eq!(spectrum[0], Complex::new(24, -8));
    assert!(spectrum[1..].iter().all(|&c| c == Complex::ZERO));
}

#[test]
fn round_trip_random_sequences() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut fft = Fft::new(2).unwrap();

    for bits in 0..=10 {
        let len = 1usize << bits;
        fft.grow_to(len).unwrap();
        let data: Vec<Complex> = (0..len)
            .map(|_| {
                Complex::new(
                    rng.random_range(-32_768..32_768),
                    rng.random_range(-32_768..32_768),
                )
            })
            .collect();

        let spectrum = fft.forward(&data).unwrap();
        let back = fft.inverse(&spectrum).unwrap();
        assert_close(&back, &data, 2);
    }
}

#[test]
fn rejects_bad_lengths() {
    let fft = Fft::new(8).unwrap();
    assert!(matches!(
        fft.forward(&[Complex::ZERO; 6]),
        Err(Error::ParameterOutOfRange { name: "length", .. })
    ));
    assert!(matches!(
        fft.forward(&[Complex::ZERO; 16]),
        Err(Error::ParameterOutOfRange { name: "length", .. })
    ));
    assert!(Fft::new(12).is_err());
    assert!(Fft::new(MAX_LEN_LIMIT * 2).is_err());
}

#[test]
fn cache_never_shrinks() {
    let mut fft = Fft::new(64).unwrap();
    fft.grow_to(16).unwrap();
    assert_eq!(fft.max_len(), 64);
    fft.grow_to(128).unwrap();
    assert_eq!(fft.max_len(), 128);
    assert!(fft.forward(&[Complex::ZERO; 128]).is_ok());
}

#[test]
fn overflow_is_reported() {
    let fft = Fft::new(4).unwrap();
    let err = fft.forward(&[Complex::real(i32::MAX); 4]).unwrap_err();
    assert!(matches!(err, Error::Overflow { .. }));
}

fn random_gray(rng: &mut StdRng, width: usize, height: usize) -> Gray8Image {
    Gray8Image::from_fn(width, height, |_, _| rng.random_range(-128..=127)).unwrap()
}

#[test]
fn gray8_round_trip_through_2d_fft() {
    let mut rng = StdRng::seed_from_u64(11);
    let plane = random_gray(&mut rng, 16, 8);

    let mut forward = Gray8Fft::new(4).unwrap();
    let mut inverse = Complex32IFft::new(4, OutputMode::Clamp).unwrap();

    let spectrum = forward.apply(Image::from(plane.clone())).unwrap();
    assert!(spectrum.as_complex32("test").is_ok());
    assert_eq!(forward.fft().max_len(), 16);

    let back = inverse.apply(spectrum).unwrap();
    assert_eq!(back.as_gray8("test").unwrap(), &plane);
}

#[test]
fn fft_2d_matches_row_column_definition() {
    let fft = Fft::new(4).unwrap();
    let data: Vec<Complex> = (0..16).map(|i| Complex::real(i % 4 * 10)).collect();
    let plane = Complex32Image::from_vec(4, 4, data).unwrap();

    let spectrum = fft_2d(&fft, &plane).unwrap().to_vec();
    // every row identical: only the first spectral row is non-zero
    assert_eq!(spectrum[0], Complex::real(240));
    assert!(spectrum[4..].iter().all(|&c| c == Complex::ZERO));

    let back = ifft_2d(&fft, &Complex32Image::from_vec(4, 4, spectrum).unwrap()).unwrap();
    assert_eq!(back, plane);
}

#[test]
fn fft_stage_rejects_non_power_of_two_sides() {
    let mut stage = Gray8Fft::new(8).unwrap();
    let err = stage
        .apply(Image::from(Gray8Image::new(6, 8).unwrap()))
        .unwrap_err();
    assert!(matches!(err, Error::ParameterOutOfRange { stage: "Gray8Fft", .. }));
}

#[test]
fn rescale_mode_spans_full_range() {
    let plane = Gray8Image::from_fn(8, 8, |x, _| (x as i8) * 4 - 20).unwrap();

    let spectrum = Gray8Fft::new(8).unwrap().apply(Image::from(plane)).unwrap();
    let back = Complex32IFft::new(8, OutputMode::Rescale)
        .unwrap()
        .apply(spectrum)
        .unwrap();
    let samples = back.as_gray8("test").unwrap().to_vec();
    assert_eq!(*samples.iter().min().unwrap(), -128);
    assert_eq!(*samples.iter().max().unwrap(), 127);
}

#[test]
fn magnitude_of_dc_only_spectrum() {
    let plane = Gray8Image::new_filled(4, 4, 1).unwrap();
    let spectrum = Gray8Fft::new(4).unwrap().apply(Image::from(plane)).unwrap();
    let magnitude = Complex32Magnitude::new(OutputMode::Clamp)
        .apply(spectrum)
        .unwrap();
    let samples = magnitude.as_gray8("test").unwrap().to_vec();
    // DC = 16 samples * (1 << FFT_SCALE), shifted back by FFT_SCALE
    assert_eq!(samples[0], 16);
    assert!(samples[1..].iter().all(|&v| v == 0));
}

fn psf(weights: &[(usize, usize, i32)], size: usize) -> Gray8Image {
    let plane = Gray8Image::new_filled(size, size, i8::MIN).unwrap();
    for &(x, y, w) in weights {
        plane.set(x, y, (w - 128) as i8);
    }
    plane
}

#[test]
fn deconvolution_by_impulse_is_identity() {
    let mut rng = StdRng::seed_from_u64(5);
    let plane = random_gray(&mut rng, 8, 8);
    let config = DeconvolutionConfig {
        noise: 0,
        min_response: 1,
    };

    let mut forward = Gray8Fft::new(8).unwrap();
    let mut deconvolve = Complex32Deconvolve::new(&psf(&[(0, 0, 200)], 8), config).unwrap();
    let mut inverse = Complex32IFft::new(8, OutputMode::Clamp).unwrap();

    let spectrum = forward.apply(Image::from(plane.clone())).unwrap();
    let restored = deconvolve.apply(spectrum).unwrap();
    let back = inverse.apply(restored).unwrap();
    assert_eq!(back.as_gray8("test").unwrap(), &plane);
}

#[test]
fn deconvolution_undoes_known_blur() {
    let mut rng = StdRng::seed_from_u64(9);
    let n = 16;
    let sharp = random_gray(&mut rng, n, n);

    // circular blur: 3/4 of the pixel plus 1/4 of its left neighbour
    let blurred = Gray8Image::from_fn(n, n, |x, y| {
        let here = sharp.get(x, y) as i32;
        let left = sharp.get((x + n - 1) % n, y) as i32;
        ((3 * here + left) as f64 / 4.0).round() as i8
    })
    .unwrap();

    let config = DeconvolutionConfig {
        noise: 0,
        min_response: 1,
    };
    let kernel = psf(&[(0, 0, 96), (1, 0, 32)], n);
    let mut deconvolve = Complex32Deconvolve::new(&kernel, config).unwrap();
    let spectrum = Gray8Fft::new(n).unwrap().apply(Image::from(blurred)).unwrap();
    let restored = deconvolve.apply(spectrum).unwrap();
    let back = Complex32IFft::new(n, OutputMode::Clamp)
        .unwrap()
        .apply(restored)
        .unwrap();

    let back = back.as_gray8("test").unwrap();
    for y in 0..n {
        for x in 0..n {
            let diff = (back.get(x, y) as i32 - sharp.get(x, y) as i32).abs();
            assert!(diff <= 2, "({}, {}) off by {}", x, y, diff);
        }
    }
}

#[test]
fn deconvolution_validates_inputs() {
    let config = DeconvolutionConfig::default();
    assert!(Complex32Deconvolve::new(&Gray8Image::new(4, 8).unwrap(), config).is_err());
    let blank = Gray8Image::new_filled(4, 4, i8::MIN).unwrap();
    assert!(Complex32Deconvolve::new(&blank, config).is_err());
    assert!(DeconvolutionConfig {
        noise: 0,
        min_response: 0
    }
    .validate()
    .is_err());

    let mut stage = Complex32Deconvolve::new(&psf(&[(0, 0, 1)], 4), config).unwrap();
    let wrong = Image::from(Complex32Image::new(8, 8).unwrap());
    assert!(matches!(
        stage.apply(wrong),
        Err(Error::SizeMismatch { .. })
    ));
}
