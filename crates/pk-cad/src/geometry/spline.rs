//! Natural cubic spline interpolation

use glam::DVec2;

use crate::kernel::{CadError, CadResult};

/// Interpolating cubic `y(x)` with zero curvature at both ends
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at the knots
    curvature: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural spline; `xs` must be strictly increasing
    pub fn natural(xs: Vec<f64>, ys: Vec<f64>) -> CadResult<Self> {
        if xs.len() != ys.len() {
            return Err(CadError::InvalidParameter(format!(
                "spline has {} knots but {} values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(CadError::InvalidParameter(
                "spline needs at least 2 knots".to_string(),
            ));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) || xs.iter().chain(&ys).any(|v| !v.is_finite()) {
            return Err(CadError::InvalidParameter(
                "spline knots must be finite and strictly increasing".to_string(),
            ));
        }

        let n = xs.len();
        let mut curvature = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm on the interior knots
            let m = n - 2;
            let mut diag = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![0.0; m];
            for i in 0..m {
                let h0 = xs[i + 1] - xs[i];
                let h1 = xs[i + 2] - xs[i + 1];
                diag[i] = 2.0 * (h0 + h1);
                upper[i] = h1;
                rhs[i] = 6.0 * ((ys[i + 2] - ys[i + 1]) / h1 - (ys[i + 1] - ys[i]) / h0);
                if i > 0 {
                    let w = h0 / diag[i - 1];
                    diag[i] -= w * upper[i - 1];
                    rhs[i] -= w * rhs[i - 1];
                }
            }
            for i in (0..m).rev() {
                let next = if i + 1 < m { curvature[i + 2] } else { 0.0 };
                curvature[i + 1] = (rhs[i] - upper[i] * next) / diag[i];
            }
        }

        Ok(Self { xs, ys, curvature })
    }

    pub fn knots(&self) -> &[f64] {
        &self.xs
    }

    pub fn values(&self) -> &[f64] {
        &self.ys
    }

    /// First and last knot
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    fn span(&self, x: f64) -> usize {
        let last = self.xs.len() - 2;
        match self.xs.binary_search_by(|k| k.total_cmp(&x)) {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let i = self.span(x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.curvature[i] + (b * b * b - b) * self.curvature[i + 1]) * h
                * h
                / 6.0
    }

    pub fn derivative(&self, x: f64) -> f64 {
        let i = self.span(x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (self.ys[i + 1] - self.ys[i]) / h - (3.0 * a * a - 1.0) / 6.0 * h * self.curvature[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.curvature[i + 1]
    }

    /// Knots plus `segments` evenly spaced samples per span, as `(x, y)` pairs
    pub fn sample(&self, segments: usize) -> Vec<(f64, f64)> {
        let segments = segments.max(1);
        let mut out = Vec::with_capacity((self.xs.len() - 1) * segments + 1);
        for w in self.xs.windows(2) {
            for k in 0..segments {
                let x = w[0] + (w[1] - w[0]) * k as f64 / segments as f64;
                out.push((x, self.evaluate(x)));
            }
        }
        let end = self.xs[self.xs.len() - 1];
        out.push((end, self.ys[self.ys.len() - 1]));
        out
    }
}

/// Planar curve through a list of points, parameterised by chord length
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve {
    x: CubicSpline,
    y: CubicSpline,
}

impl SplineCurve {
    pub fn through(points: &[DVec2]) -> CadResult<Self> {
        let mut params = Vec::with_capacity(points.len());
        let mut xs = Vec::with_capacity(points.len());
        let mut ys = Vec::with_capacity(points.len());
        let mut t = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                let chord = p.distance(points[i - 1]);
                if chord <= 1e-12 {
                    return Err(CadError::InvalidProfile(format!(
                        "spline passes through {:?} twice in a row",
                        p
                    )));
                }
                t += chord;
            }
            params.push(t);
            xs.push(p.x);
            ys.push(p.y);
        }
        Ok(Self {
            x: CubicSpline::natural(params.clone(), xs)?,
            y: CubicSpline::natural(params, ys)?,
        })
    }

    /// Total chord length of the interpolated points
    pub fn parameter_length(&self) -> f64 {
        self.x.domain().1
    }

    pub fn point_at(&self, t: f64) -> DVec2 {
        DVec2::new(self.x.evaluate(t), self.y.evaluate(t))
    }

    /// Sampled polyline through every interpolated point, endpoints included
    pub fn sample(&self, segments_per_span: usize) -> Vec<DVec2> {
        let xs = self.x.sample(segments_per_span);
        let ys = self.y.sample(segments_per_span);
        xs.into_iter()
            .zip(ys)
            .map(|((_, x), (_, y))| DVec2::new(x, y))
            .collect()
    }
}
