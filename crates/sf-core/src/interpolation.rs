//! Piecewise-linear tables.
//!
//! Outside the first/last breakpoint the boundary value is held constant; at an exact breakpoint
//! the stored value is returned without any arithmetic.

use crate::Real;

/// Interpolate `ys` over the breakpoints `xs` at `x`.
///
/// `xs` must be strictly increasing and the same length as `ys`; callers validate this once at
/// construction so the hot path stays branch-light. Returns NaN for an empty table or a NaN input.
pub fn linear_interpolation(x: Real, xs: &[Real], ys: &[Real]) -> Real {
    let n = xs.len().min(ys.len());
    if n == 0 || x.is_nan() {
        return Real::NAN;
    }

    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    // xs[i - 1] <= x < xs[i]
    let i = xs[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);

    if x == x0 {
        return y0;
    }

    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as Real })
                .collect()
        }
    }
}

pub fn is_strictly_increasing(xs: &[Real]) -> bool {
    xs.windows(2).all(|w| w[0] < w[1])
}
