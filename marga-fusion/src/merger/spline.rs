//! Penalized, heading-constrained B-spline fit.
//!
//! The curve `s(u) = Σ cⱼ Nⱼ,ₖ(u)` is parameterized by cumulative chord length
//! (meters) over a clamped knot vector, so it passes through its first and
//! last control points. Control points minimize
//!
//! ```text
//! J(c, r) = (1-λ2) · [ (1-λ1) · Σᵢ wᵢ ‖s(uᵢ) - pᵢ‖²  +  λ1 · ∫ ‖s''(u)‖² du ]
//!         +  λ2 · ‖s'(uₐ) - r · (cos θₐ, sin θₐ)‖²
//!
//! subject to  c₀ = p₀,  c_{n-1} = p_{m-1}
//! ```
//!
//! where `r` is a free scale, so the heading term only penalizes the component
//! of the tangent at the anchor that is perpendicular to `θₐ`. The second
//! derivative integral is approximated by divided differences of the control
//! polygon over the Greville abscissae, which vanish for straight lines.
//! The equality-constrained quadratic is solved through its KKT system.

use nalgebra::{DMatrix, DVector};

use crate::core::types::{Point2D, PointSequence};
use crate::error::{Error, Result};

/// Knot spacing below which a span is treated as empty.
const KNOT_EPSILON: f64 = 1e-12;

/// Upper bound on resampled output points.
const MAX_SAMPLES: usize = 10_000;

/// Tangent direction imposed at one fit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingAnchor {
    /// Index into the fit points
    pub index: usize,
    /// Heading in radians
    pub heading: f64,
}

/// Points and weights to fit, with an optional heading anchor.
#[derive(Debug, Clone, Default)]
pub struct FitInput {
    /// Ordered points with no consecutive duplicates
    pub points: PointSequence,
    /// Per-point data weight, same length as `points`
    pub weights: Vec<f64>,
    /// Heading constraint
    pub anchor: Option<HeadingAnchor>,
}

/// Fit parameters taken from the merger configuration.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    /// Spline degree
    pub degree: usize,
    /// Smoothness weight in [0, 1)
    pub lambda_1: f64,
    /// Heading weight in [0, 1)
    pub lambda_2: f64,
    /// Control point cap
    pub max_control_points: usize,
}

/// Planar B-spline with a clamped knot vector.
#[derive(Debug, Clone)]
pub struct BSpline2D {
    degree: usize,
    knots: Vec<f64>,
    control: Vec<Point2D>,
}

impl BSpline2D {
    /// Assemble from parts.
    ///
    /// `knots.len()` must equal `control.len() + degree + 1`.
    pub fn new(degree: usize, knots: Vec<f64>, control: Vec<Point2D>) -> Result<Self> {
        if control.len() <= degree || knots.len() != control.len() + degree + 1 {
            return Err(Error::DegenerateFit(format!(
                "{} knots for {} control points of degree {}",
                knots.len(),
                control.len(),
                degree
            )));
        }
        Ok(Self {
            degree,
            knots,
            control,
        })
    }

    /// Parameter domain `[u_min, u_max]`.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control.len()])
    }

    /// Control points.
    pub fn control_points(&self) -> &[Point2D] {
        &self.control
    }

    /// Curve point at `u` (clamped to the domain).
    pub fn evaluate(&self, u: f64) -> Point2D {
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let span = find_span(self.control.len(), self.degree, u, &self.knots);
        let basis = basis_functions(span, u, self.degree, &self.knots);
        self.combine(span, &basis)
    }

    /// First derivative `ds/du` at `u` (clamped to the domain).
    pub fn derivative(&self, u: f64) -> Point2D {
        let (lo, hi) = self.domain();
        let u = u.clamp(lo, hi);
        let span = find_span(self.control.len(), self.degree, u, &self.knots);
        let basis = basis_derivatives(span, u, self.degree, &self.knots);
        self.combine(span, &basis)
    }

    /// Sample the curve every `spacing` along the parameter, always ending
    /// exactly at the domain end.
    pub fn resample(&self, spacing: f64) -> PointSequence {
        let (lo, hi) = self.domain();
        let length = hi - lo;
        let mut step = spacing;
        if !(step.is_finite() && step > 0.0) || length / step > MAX_SAMPLES as f64 {
            step = length / MAX_SAMPLES as f64;
        }
        if length <= 0.0 || step <= 0.0 {
            return PointSequence::from_points(vec![self.evaluate(lo)]);
        }

        let full_steps = (length / step).floor() as usize;
        let mut out = PointSequence::with_capacity(full_steps + 2);
        for i in 0..=full_steps {
            out.push(self.evaluate(lo + i as f64 * step));
        }
        if length - full_steps as f64 * step > step * 1e-6 {
            out.push(self.evaluate(hi));
        }
        out
    }

    fn combine(&self, span: usize, basis: &[f64]) -> Point2D {
        let first = span - self.degree;
        basis
            .iter()
            .enumerate()
            .fold(Point2D::default(), |acc, (r, &n)| {
                let c = self.control[first + r];
                Point2D::new(acc.x + n * c.x, acc.y + n * c.y)
            })
    }
}

/// Fit a smoothing spline to `input`.
///
/// Fails with [`Error::InsufficientPoints`] below `degree + 1` points or for a
/// zero-length point set, and with [`Error::DegenerateFit`] if the system
/// cannot be solved.
pub fn fit(input: &FitInput, params: &FitParams) -> Result<BSpline2D> {
    let points = input.points.points();
    let m = points.len();
    let k = params.degree;
    if m < k + 1 {
        return Err(Error::InsufficientPoints {
            got: m,
            required: k + 1,
        });
    }

    let u = input.points.arc_lengths();
    let total = u[m - 1];
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::InsufficientPoints {
            got: 1,
            required: k + 1,
        });
    }

    let n = m.min(params.max_control_points).max(k + 1);
    let knots = clamped_knots(&u, n, k);
    let greville = greville_abscissae(&knots, n, k);

    // Unknowns: [cx (n) | cy (n) | r]
    let dim = 2 * n + 1;
    let mut a = DMatrix::<f64>::zeros(dim, dim);
    let mut b = DVector::<f64>::zeros(dim);

    let data_weight = (1.0 - params.lambda_2) * (1.0 - params.lambda_1);
    for (i, p) in points.iter().enumerate() {
        let w = data_weight * input.weights.get(i).copied().unwrap_or(1.0);
        if w <= 0.0 {
            continue;
        }
        let span = find_span(n, k, u[i], &knots);
        let basis = basis_functions(span, u[i], k, &knots);
        let first = span - k;
        for (ra, &na) in basis.iter().enumerate() {
            let ia = first + ra;
            for (rb, &nb) in basis.iter().enumerate() {
                let ib = first + rb;
                a[(ia, ib)] += w * na * nb;
                a[(n + ia, n + ib)] += w * na * nb;
            }
            b[ia] += w * na * p.x;
            b[n + ia] += w * na * p.y;
        }
    }

    let smooth_weight = (1.0 - params.lambda_2) * params.lambda_1;
    if smooth_weight > 0.0 {
        let penalty = curvature_penalty(&greville);
        for i in 0..n {
            for j in 0..n {
                let v = smooth_weight * penalty[(i, j)];
                a[(i, j)] += v;
                a[(n + i, n + j)] += v;
            }
        }
    }

    match input.anchor {
        Some(anchor) if params.lambda_2 > 0.0 && anchor.index < m => {
            let ua = u[anchor.index];
            let span = find_span(n, k, ua, &knots);
            let d = basis_derivatives(span, ua, k, &knots);
            let (sin_h, cos_h) = anchor.heading.sin_cos();
            let first = span - k;
            // e = [d | 0 | -cos], f = [0 | d | -sin]
            let mut e = DVector::<f64>::zeros(dim);
            let mut f = DVector::<f64>::zeros(dim);
            for (r, &dr) in d.iter().enumerate() {
                e[first + r] = dr;
                f[n + first + r] = dr;
            }
            e[2 * n] = -cos_h;
            f[2 * n] = -sin_h;
            a += params.lambda_2 * (&e * e.transpose() + &f * f.transpose());
        }
        _ => a[(2 * n, 2 * n)] = 1.0,
    }

    // Clamp both ends through Lagrange multipliers.
    let first_point = points[0];
    let last_point = points[m - 1];
    let constraints = [
        (0, first_point.x),
        (n - 1, last_point.x),
        (n, first_point.y),
        (2 * n - 1, last_point.y),
    ];
    let size = dim + constraints.len();
    let mut kkt = DMatrix::<f64>::zeros(size, size);
    kkt.view_mut((0, 0), (dim, dim)).copy_from(&a);
    let mut rhs = DVector::<f64>::zeros(size);
    rhs.rows_mut(0, dim).copy_from(&b);
    for (row, &(col, value)) in constraints.iter().enumerate() {
        kkt[(dim + row, col)] = 1.0;
        kkt[(col, dim + row)] = 1.0;
        rhs[dim + row] = value;
    }

    let solution = solve(kkt, &rhs)?;
    let control = (0..n)
        .map(|j| Point2D::new(solution[j], solution[n + j]))
        .collect();
    BSpline2D::new(k, knots, control)
}

/// LU first; SVD pseudo-inverse when the system is singular.
fn solve(kkt: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    if let Some(x) = kkt.clone().lu().solve(rhs)
        && x.iter().all(|v| v.is_finite())
    {
        return Ok(x);
    }
    log::debug!("Spline KKT system singular, falling back to pseudo-inverse");
    let x = kkt
        .svd(true, true)
        .solve(rhs, 1e-12)
        .map_err(|e| Error::DegenerateFit(e.to_string()))?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(Error::DegenerateFit("non-finite control points".into()))
    }
}

/// Clamped knot vector of length `n + k + 1` over parameters `u`.
///
/// Interior knots sit at evenly spaced quantiles of `u`.
fn clamped_knots(u: &[f64], n: usize, k: usize) -> Vec<f64> {
    let m = u.len();
    let (lo, hi) = (u[0], u[m - 1]);
    let interior = n - k - 1;

    let mut knots = Vec::with_capacity(n + k + 1);
    knots.extend(std::iter::repeat_n(lo, k + 1));
    for j in 1..=interior {
        let pos = j as f64 * (m - 1) as f64 / (interior + 1) as f64;
        let i = pos.floor() as usize;
        let frac = pos - i as f64;
        let t = if i + 1 < m {
            u[i] + frac * (u[i + 1] - u[i])
        } else {
            u[m - 1]
        };
        knots.push(t);
    }
    knots.extend(std::iter::repeat_n(hi, k + 1));
    knots
}

/// Greville abscissa of each control point: mean of its `k` inner knots.
fn greville_abscissae(knots: &[f64], n: usize, k: usize) -> Vec<f64> {
    (0..n)
        .map(|j| knots[j + 1..=j + k].iter().sum::<f64>() / k as f64)
        .collect()
}

/// `∫ s''²` approximated on the control polygon: `Σ qⱼ (aⱼ · c)²`.
fn curvature_penalty(greville: &[f64]) -> DMatrix<f64> {
    let n = greville.len();
    let mut p = DMatrix::<f64>::zeros(n, n);
    for j in 1..n.saturating_sub(1) {
        let h1 = greville[j] - greville[j - 1];
        let h2 = greville[j + 1] - greville[j];
        if h1 <= KNOT_EPSILON || h2 <= KNOT_EPSILON {
            continue;
        }
        let scale = 2.0 / (h1 + h2);
        let row = [
            (j - 1, scale / h1),
            (j, -scale * (1.0 / h1 + 1.0 / h2)),
            (j + 1, scale / h2),
        ];
        let quad = 0.5 * (h1 + h2);
        for &(ia, va) in &row {
            for &(ib, vb) in &row {
                p[(ia, ib)] += quad * va * vb;
            }
        }
    }
    p
}

/// Knot span index containing `u` for `n` control points of degree `k`.
fn find_span(n: usize, k: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n] {
        return n - 1;
    }
    if u <= knots[k] {
        return k;
    }
    let (mut low, mut high) = (k, n);
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis functions `N_{span-k..=span, k}(u)`.
fn basis_functions(span: usize, u: f64, k: usize, knots: &[f64]) -> Vec<f64> {
    let mut n = vec![0.0; k + 1];
    let mut left = vec![0.0; k + 1];
    let mut right = vec![0.0; k + 1];
    n[0] = 1.0;
    for j in 1..=k {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() > KNOT_EPSILON {
                n[r] / denom
            } else {
                0.0
            };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// First derivatives of the non-zero basis functions at `u`.
///
/// ```text
/// N'ᵢ,ₖ = k · ( Nᵢ,ₖ₋₁ / (tᵢ₊ₖ - tᵢ)  -  Nᵢ₊₁,ₖ₋₁ / (tᵢ₊ₖ₊₁ - tᵢ₊₁) )
/// ```
fn basis_derivatives(span: usize, u: f64, k: usize, knots: &[f64]) -> Vec<f64> {
    let lower = basis_functions(span, u, k - 1, knots);
    let kf = k as f64;
    (0..=k)
        .map(|r| {
            let i = span - k + r;
            let left = if r >= 1 {
                let denom = knots[i + k] - knots[i];
                if denom > KNOT_EPSILON { lower[r - 1] / denom } else { 0.0 }
            } else {
                0.0
            };
            let right = if r < k {
                let denom = knots[i + k + 1] - knots[i + 1];
                if denom > KNOT_EPSILON { lower[r] / denom } else { 0.0 }
            } else {
                0.0
            };
            kf * (left - right)
        })
        .collect()
}
