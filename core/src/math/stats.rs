/// Least-squares straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Index of the first maximum. NaN entries never win.
    pub fn argmax(samples: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &value) in samples.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, current)| value > current) {
                best = Some((idx, value));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Ordinary least-squares fit of a first-degree polynomial.
    ///
    /// Returns `None` for fewer than two points, zero spread in `x`, or a
    /// non-finite fit.
    pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LineFit> {
        let len = x.len().min(y.len());
        if len < 2 {
            return None;
        }
        let (x, y) = (&x[..len], &y[..len]);
        let mean_x = Self::mean(x);
        let mean_y = Self::mean(y);

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - mean_x;
            sxx += dx * dx;
            sxy += dx * (yi - mean_y);
        }
        if sxx == 0.0 || !sxx.is_finite() {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return None;
        }
        Some(LineFit { slope, intercept })
    }
}
