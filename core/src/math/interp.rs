use std::cmp::Ordering;

/// `num` evenly spaced values from `start` to `end`, both included.
///
/// `end` may be smaller than `start`; the sequence then descends. The last
/// element is pinned to `end` so accumulated step error never moves it.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| i as f64 * step + start).collect();
            out[num - 1] = end;
            out
        }
    }
}

/// Piecewise-linear interpolant over samples that need not be sorted.
///
/// Samples are ordered by abscissa at construction time; evaluation picks the
/// segment whose right edge is the first knot not below the query point.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    /// Returns `None` when fewer than two sample pairs are available.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        let len = x.len().min(y.len());
        if len < 2 {
            return None;
        }
        let mut paired: Vec<(f64, f64)> = x[..len]
            .iter()
            .copied()
            .zip(y[..len].iter().copied())
            .collect();
        paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let (xs, ys) = paired.into_iter().unzip();
        Some(Self { xs, ys })
    }

    pub fn eval(&self, x: f64) -> f64 {
        let last = self.xs.len() - 1;
        let hi = self.xs.partition_point(|&knot| knot < x).clamp(1, last);
        let lo = hi - 1;
        let (x0, x1) = (self.xs[lo], self.xs[hi]);
        let (y0, y1) = (self.ys[lo], self.ys[hi]);
        let width = x1 - x0;
        if width == 0.0 {
            return y0;
        }
        (y1 - y0) / width * (x - x0) + y0
    }

    pub fn resample(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&x| self.eval(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_keeps_both_endpoints() {
        let grid = linspace(-0.2, 1.1, 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], -0.2);
        assert_eq!(grid[999], 1.1);
    }

    #[test]
    fn linspace_descends_when_reversed() {
        let grid = linspace(1.0, 0.0, 5);
        assert_eq!(grid, vec![1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn interpolant_handles_unsorted_samples() {
        let f = LinearInterpolant::new(&[2.0, 0.0, 1.0], &[4.0, 0.0, 2.0]).unwrap();
        assert_relative_eq!(f.eval(0.5), 1.0);
        assert_relative_eq!(f.eval(1.5), 3.0);
        assert_relative_eq!(f.eval(2.0), 4.0);
        assert_relative_eq!(f.eval(0.0), 0.0);
    }

    #[test]
    fn interpolant_requires_two_samples() {
        assert!(LinearInterpolant::new(&[1.0], &[1.0]).is_none());
    }

    #[test]
    fn resample_follows_grid_order() {
        let f = LinearInterpolant::new(&[0.0, 1.0], &[10.0, 0.0]).unwrap();
        let values = f.resample(&linspace(1.0, 0.0, 3));
        assert_eq!(values, vec![0.0, 5.0, 10.0]);
    }
}
