use ndarray::{s, Array1, Array3};
use ndrustfft::{ndfft, ndfft_r2c, ndifft, ndifft_r2c, Complex, FftHandler, FftNum, R2cFftHandler};
use num::traits::FloatConst;
use num::{Float, FromPrimitive};

/// Number of real-space y points for `nky` non-negative ky modes.
///
/// The grid is odd so that there is no unpaired Nyquist mode. `nky` must be nonzero.
pub fn real_ny(nky: usize) -> usize {
    assert!(nky > 0, "need at least the ky = 0 mode");
    2 * nky - 1
}

/// Transforms a `(t, kx, ky)` mode array into a `(t, x, y)` real array.
///
/// Only non-negative ky are stored; the negative ones are implied by the
/// reality condition. The output is the plain mode sum (no `1/n` factor).
pub fn inverse_2d<T>(spectral: &Array3<Complex<T>>) -> Array3<T>
where
    T: FftNum + Float + FloatConst + FromPrimitive,
{
    let (nt, nkx, nky) = spectral.dim();
    let ny = real_ny(nky);

    let mut handler_x: FftHandler<T> = FftHandler::new(nkx);
    let mut handler_y: R2cFftHandler<T> = R2cFftHandler::new(ny);

    // Complex transform along kx
    let mut along_x = Array3::<Complex<T>>::zeros((nt, nkx, nky));
    ndifft(spectral, &mut along_x, &mut handler_x, 1);

    // The ky = 0 column must be real before the c2r step
    along_x
        .slice_mut(s![.., .., 0])
        .mapv_inplace(|z| Complex::new(z.re, T::zero()));

    // Complex-to-real transform along ky
    let mut real = Array3::<T>::zeros((nt, nkx, ny));
    ndifft_r2c(&along_x, &mut real, &mut handler_y, 2);

    // Undo the 1/n normalization of the inverse transforms
    let norm = T::from_usize(nkx * ny).unwrap();
    real.mapv_inplace(|v| v * norm);
    real
}

/// Transforms a `(t, x, y)` real array into `(t, kx, ky)` modes; inverse of [`inverse_2d`].
pub fn forward_2d<T>(real: &Array3<T>) -> Array3<Complex<T>>
where
    T: FftNum + Float + FloatConst + FromPrimitive,
{
    let (nt, nx, ny) = real.dim();
    assert!(ny % 2 == 1, "real-space y grid must be odd, got {ny}");
    let nky = ny / 2 + 1;

    let mut handler_x: FftHandler<T> = FftHandler::new(nx);
    let mut handler_y: R2cFftHandler<T> = R2cFftHandler::new(ny);

    let mut along_y = Array3::<Complex<T>>::zeros((nt, nx, nky));
    ndfft_r2c(real, &mut along_y, &mut handler_y, 2);

    let mut spectral = Array3::<Complex<T>>::zeros((nt, nx, nky));
    ndfft(&along_y, &mut spectral, &mut handler_x, 1);

    let norm = T::from_usize(nx * ny).unwrap();
    spectral.mapv_inplace(|z| z / norm);
    spectral
}

/// Builds the real-space grid (in units of the k normalization length) spanned by the
/// wavenumbers `k`, stored in fft order so that `k[1]` is the smallest positive mode.
pub fn real_space_grid<T>(k: &Array1<T>, n: usize) -> Array1<T>
where
    T: Float + FromPrimitive,
{
    assert!(k.len() >= 2, "need at least two wavenumbers to define a box");

    let two_pi = T::from_f64(2.0 * std::f64::consts::PI).unwrap();
    let box_length = two_pi / k[1];
    let dx = box_length / T::from_usize(n).unwrap();

    Array1::from_iter((0..n).map(|i| T::from_usize(i).unwrap() * dx))
}

#[test]
fn test_single_ky_mode_is_cosine() {
    use approx::assert_abs_diff_eq;

    // One kx, two ky (0 and 1) → 3 real-space y points
    let mut spectral = Array3::<Complex<f64>>::zeros((1, 1, 2));
    spectral[[0, 0, 1]] = Complex::new(1.0, 0.0);

    let real = inverse_2d(&spectral);
    assert_eq!(real.dim(), (1, 1, 3));

    // 2 cos(2πj/3)
    assert_abs_diff_eq!(real[[0, 0, 0]], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(real[[0, 0, 1]], -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(real[[0, 0, 2]], -1.0, epsilon = 1e-12);
}

#[test]
fn test_single_precision_transform() {
    use approx::assert_abs_diff_eq;

    let mut spectral = Array3::<Complex<f32>>::zeros((1, 3, 2));
    spectral[[0, 0, 1]] = Complex::new(0.5, 0.0);

    let real = inverse_2d(&spectral);
    assert_eq!(real.dim(), (1, 3, 3));
    assert_abs_diff_eq!(real[[0, 2, 0]], 1.0_f32, epsilon = 1e-5);

    let back = forward_2d(&real);
    assert_abs_diff_eq!(back[[0, 0, 1]].re, 0.5_f32, epsilon = 1e-5);
}

#[test]
fn test_zero_mode_is_constant() {
    use approx::assert_abs_diff_eq;

    let mut spectral = Array3::<Complex<f64>>::zeros((2, 4, 3));
    spectral[[1, 0, 0]] = Complex::new(0.5, 0.0);

    let real = inverse_2d(&spectral);
    assert_eq!(real.dim(), (2, 4, 5));
    real.slice(s![0, .., ..])
        .iter()
        .for_each(|&v| assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12));
    real.slice(s![1, .., ..])
        .iter()
        .for_each(|&v| assert_abs_diff_eq!(v, 0.5, epsilon = 1e-12));
}

#[test]
fn test_real_space_grid() {
    use approx::assert_abs_diff_eq;

    let pi = std::f64::consts::PI;
    let k = Array1::from(vec![0.0, 2.0 * pi / 8.0, 2.0 * 2.0 * pi / 8.0, -2.0 * pi / 8.0]);
    let x = real_space_grid(&k, 4);

    assert_eq!(x.len(), 4);
    for (i, &xi) in x.iter().enumerate() {
        assert_abs_diff_eq!(xi, 2.0 * i as f64, epsilon = 1e-12);
    }
}
