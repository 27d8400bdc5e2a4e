//! Complex 2D FFT wrappers around rustfft.
//!
//! Convention matches numpy:
//! - Forward FFT (fft2): unnormalized
//! - Inverse FFT (ifft2): normalized by 1/(n_rows*n_cols)

use ndarray::{Array1, Array2, ArrayBase, DataMut, Ix2};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// In-place forward 2D FFT of a complex array. Matches `numpy.fft.fft2()`.
pub fn fft2<S: DataMut<Elem = Complex64>>(data: &mut ArrayBase<S, Ix2>) {
    let mut planner = FftPlanner::new();
    transform_2d(data, &mut planner, true);
}

/// In-place inverse 2D FFT. Matches `numpy.fft.ifft2()`, including the
/// 1/(n_rows*n_cols) normalization.
pub fn ifft2<S: DataMut<Elem = Complex64>>(data: &mut ArrayBase<S, Ix2>) {
    let mut planner = FftPlanner::new();
    transform_2d(data, &mut planner, false);
    let norm = 1.0 / (data.nrows() * data.ncols()) as f64;
    data.mapv_inplace(|v| v * norm);
}

fn transform_2d<S: DataMut<Elem = Complex64>>(
    data: &mut ArrayBase<S, Ix2>,
    planner: &mut FftPlanner<f64>,
    forward: bool,
) {
    let (nrows, ncols) = data.dim();

    // FFT along each row (axis 1, contiguous in standard layout)
    let fft_row = if forward {
        planner.plan_fft_forward(ncols)
    } else {
        planner.plan_fft_inverse(ncols)
    };
    for mut row in data.rows_mut() {
        let slice = row.as_slice_mut().expect("row must be contiguous");
        fft_row.process(slice);
    }

    // FFT along each column: transpose, FFT rows, transpose back
    let fft_col = if forward {
        planner.plan_fft_forward(nrows)
    } else {
        planner.plan_fft_inverse(nrows)
    };
    let mut transposed = Array2::zeros((ncols, nrows));
    for i in 0..nrows {
        for j in 0..ncols {
            transposed[[j, i]] = data[[i, j]];
        }
    }
    for mut row in transposed.rows_mut() {
        let slice = row.as_slice_mut().expect("row must be contiguous");
        fft_col.process(slice);
    }
    for i in 0..nrows {
        for j in 0..ncols {
            data[[i, j]] = transposed[[j, i]];
        }
    }
}

/// Swap array quadrants so the zero-frequency bin lands in the center.
/// Matches `numpy.fft.fftshift` on both axes.
pub fn fftshift(data: &Array2<Complex64>) -> Array2<Complex64> {
    let (nrows, ncols) = data.dim();
    Array2::from_shape_fn((nrows, ncols), |(i, j)| {
        data[[(i + (nrows + 1) / 2) % nrows, (j + (ncols + 1) / 2) % ncols]]
    })
}

/// Angular spatial frequencies k_j = 2π·f_j for an n-point axis with spacing
/// d, in FFT bin order (negative frequencies in the upper half). Matches
/// `2π · numpy.fft.fftfreq(n, d)`.
pub fn fftfreq_angular(n: usize, d: f64) -> Array1<f64> {
    let step = 2.0 * std::f64::consts::PI / (n as f64 * d);
    Array1::from_shape_fn(n, |j| {
        let j = j as i64;
        let n = n as i64;
        let signed = if j < (n + 1) / 2 { j } else { j - n };
        signed as f64 * step
    })
}
