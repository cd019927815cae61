//! Scattered-data interpolation of the intensity surface
//!
//! Builds a C1 piecewise-cubic interpolant over the lookup-table samples:
//! Delaunay triangulation of the (r, rho) coordinates, per-vertex gradients
//! by weighted least squares over the triangulation neighbors, and a reduced
//! Hsieh-Clough-Tocher macro-element on each triangle (centroid split into
//! three cubic Bezier sub-patches, mid-edge control points closed by a
//! linearly-varying edge-normal derivative). All the data entering a shared
//! edge is symmetric between its two triangles, which is what makes the
//! stitched surface C1 and not merely continuous.

use std::collections::BTreeSet;

use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};

use crate::lut::LookupTable;

#[derive(thiserror::Error, Debug)]
pub enum InterpError {
    #[error("at least 3 samples are needed to triangulate (got {0})")]
    TooFewSamples(usize),
    #[error("the sample coordinates admit no triangulation")]
    Degenerate,
}
type Result<T> = std::result::Result<T, InterpError>;

// R-tree entry: one triangle's bounding box
struct TriangleCell {
    index: usize,
    min: [f64; 2],
    max: [f64; 2],
}
impl RTreeObject for TriangleCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Clough-Tocher interpolant over scattered (r, rho) intensity samples.
///
/// Owns a copy of the sample coordinates and values; immutable once built.
/// Queries outside the convex hull of the samples return `None`.
pub struct CloughTocher2d {
    nodes: Vec<[f64; 2]>,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    index: RTree<TriangleCell>,
}
impl CloughTocher2d {
    /// Builds the interpolant from a lookup table.
    pub fn new(lut: &LookupTable) -> Result<Self> {
        let nodes = lut.samples().iter().map(|s| [s.r, s.rho]).collect();
        let values = lut.samples().iter().map(|s| s.intensity).collect();
        Self::from_scattered(nodes, values)
    }
    /// Builds the interpolant from bare coordinate/value pairs.
    pub fn from_scattered(nodes: Vec<[f64; 2]>, values: Vec<f64>) -> Result<Self> {
        if nodes.len() < 3 {
            return Err(InterpError::TooFewSamples(nodes.len()));
        }
        let delaunay = triangle_rs::Delaunay::builder()
            .add_nodes(
                &nodes
                    .iter()
                    .flat_map(|p| vec![p[0], p[1]])
                    .collect::<Vec<f64>>(),
            )
            .set_switches("Q")
            .build();
        let triangles: Vec<[usize; 3]> = delaunay
            .triangle_iter()
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        if triangles.is_empty() {
            return Err(InterpError::Degenerate);
        }
        let gradients = estimate_gradients(&nodes, &values, &triangles);
        let index = RTree::bulk_load(
            triangles
                .iter()
                .enumerate()
                .map(|(index, t)| {
                    let xs = t.map(|i| nodes[i][0]);
                    let ys = t.map(|i| nodes[i][1]);
                    TriangleCell {
                        index,
                        min: [
                            xs.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
                            ys.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
                        ],
                        max: [
                            xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                            ys.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                        ],
                    }
                })
                .collect(),
        );
        Ok(Self {
            nodes,
            values,
            gradients,
            triangles,
            index,
        })
    }
    /// Number of triangles in the underlying mesh.
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }
    /// Interpolated intensity at `(r, rho)`, or `None` outside the convex
    /// hull of the samples.
    pub fn eval(&self, r: f64, rho: f64) -> Option<f64> {
        let p = [r, rho];
        self.index
            .locate_in_envelope_intersecting(&AABB::from_point(p))
            .find_map(|cell| {
                let tri = self.triangles[cell.index];
                self.barycentric(&tri, p)
                    .map(|lambda| self.eval_in_triangle(&tri, lambda))
            })
    }
    // Barycentric coordinates of p in the triangle, or None when p lies
    // outside it (with a small boundary tolerance so hull and mesh edges
    // remain evaluable).
    fn barycentric(&self, tri: &[usize; 3], p: [f64; 2]) -> Option<[f64; 3]> {
        let [a, b, c] = tri.map(|i| self.nodes[i]);
        let m = Matrix2::new(b[0] - a[0], c[0] - a[0], b[1] - a[1], c[1] - a[1]);
        let lambda = m.try_inverse()? * Vector2::new(p[0] - a[0], p[1] - a[1]);
        let lambda = [1f64 - lambda[0] - lambda[1], lambda[0], lambda[1]];
        lambda.iter().all(|&l| l >= -1e-9).then_some(lambda)
    }
    // Reduced Hsieh-Clough-Tocher element: assemble the 19 Bezier control
    // values of the centroid split, pick the sub-triangle the query falls
    // in, evaluate its cubic patch by de Casteljau.
    fn eval_in_triangle(&self, tri: &[usize; 3], lambda: [f64; 3]) -> f64 {
        let v = tri.map(|i| self.nodes[i]);
        let f = tri.map(|i| self.values[i]);
        let g = tri.map(|i| self.gradients[i]);
        let vc = [
            (v[0][0] + v[1][0] + v[2][0]) / 3f64,
            (v[0][1] + v[1][1] + v[2][1]) / 3f64,
        ];
        // Outer-edge control points (cubic edge restriction is fixed by the
        // endpoint values and gradients) and the first ring around the
        // centroid (C1 fan at each vertex).
        let edge = |i: usize, j: usize| {
            f[i] + (g[i][0] * (v[j][0] - v[i][0]) + g[i][1] * (v[j][1] - v[i][1])) / 3f64
        };
        let ring = |i: usize| {
            f[i] + (g[i][0] * (vc[0] - v[i][0]) + g[i][1] * (vc[1] - v[i][1])) / 3f64
        };
        let (e01, e10, e12, e21, e20, e02) =
            (edge(0, 1), edge(1, 0), edge(1, 2), edge(2, 1), edge(2, 0), edge(0, 2));
        let (r0, r1, r2) = (ring(0), ring(1), ring(2));
        // Mid control point of each sub-triangle, then the interior points
        // shared across the internal edges and the centroid value.
        let ma = mid_control(v[0], v[1], vc, f[0], f[1], e01, e10, r0, r1);
        let mb = mid_control(v[1], v[2], vc, f[1], f[2], e12, e21, r1, r2);
        let mc = mid_control(v[2], v[0], vc, f[2], f[0], e20, e02, r2, r0);
        let s0 = (ma + mc + r0) / 3f64;
        let s1 = (ma + mb + r1) / 3f64;
        let s2 = (mb + mc + r2) / 3f64;
        let center = (s0 + s1 + s2) / 3f64;
        // The query lies in the sub-triangle opposite its smallest
        // barycentric coordinate; the sub-triangle coordinates follow from
        // the macro ones without another solve.
        let k = (0..3).min_by(|&i, &j| lambda[i].total_cmp(&lambda[j])).unwrap_or(0);
        let (i, j) = ((k + 1) % 3, (k + 2) % 3);
        let tau = [lambda[i] - lambda[k], lambda[j] - lambda[k], 3f64 * lambda[k]];
        let controls = match k {
            // sub-triangle (v0, v1, vc)
            2 => [f[0], e01, r0, e10, ma, s0, f[1], r1, s1, center],
            // sub-triangle (v1, v2, vc)
            0 => [f[1], e12, r1, e21, mb, s1, f[2], r2, s2, center],
            // sub-triangle (v2, v0, vc)
            _ => [f[2], e20, r2, e02, mc, s2, f[0], r0, s0, center],
        };
        cubic_bezier(tau, controls)
    }
}

// Vertex gradients by inverse-square-distance weighted least squares over
// the Delaunay neighbors (2x2 normal equations).
fn estimate_gradients(
    nodes: &[[f64; 2]],
    values: &[f64],
    triangles: &[[usize; 3]],
) -> Vec<[f64; 2]> {
    let mut neighbors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); nodes.len()];
    for t in triangles {
        for k in 0..3 {
            neighbors[t[k]].insert(t[(k + 1) % 3]);
            neighbors[t[(k + 1) % 3]].insert(t[k]);
        }
    }
    (0..nodes.len())
        .into_par_iter()
        .map(|i| {
            let mut m = Matrix2::zeros();
            let mut rhs = Vector2::zeros();
            for &j in &neighbors[i] {
                let dx = nodes[j][0] - nodes[i][0];
                let dy = nodes[j][1] - nodes[i][1];
                let w = 1f64 / (dx * dx + dy * dy);
                let df = values[j] - values[i];
                m[(0, 0)] += w * dx * dx;
                m[(0, 1)] += w * dx * dy;
                m[(1, 0)] += w * dx * dy;
                m[(1, 1)] += w * dy * dy;
                rhs[0] += w * df * dx;
                rhs[1] += w * df * dy;
            }
            match m.try_inverse() {
                Some(inv) => {
                    let g = inv * rhs;
                    [g[0], g[1]]
                }
                None => [0f64; 2],
            }
        })
        .collect()
}

// Mid control point b111 of the cubic sub-patch sitting on outer edge
// (a, b): the quadratic Bernstein coefficient of the edge-normal derivative
// must vanish so that the normal derivative varies linearly along the edge.
fn mid_control(
    a: [f64; 2],
    b: [f64; 2],
    vc: [f64; 2],
    fa: f64,
    fb: f64,
    eab: f64,
    eba: f64,
    ra: f64,
    rb: f64,
) -> f64 {
    let n = [-(b[1] - a[1]), b[0] - a[0]];
    let m = Matrix2::new(b[0] - a[0], vc[0] - a[0], b[1] - a[1], vc[1] - a[1]);
    let d = match m.try_inverse() {
        Some(inv) => inv * Vector2::new(n[0], n[1]),
        None => return (eab + eba) / 2f64,
    };
    // Barycentric components of the normal direction wrt (a, b, vc)
    let (d2, d3) = (d[0], d[1]);
    let d1 = -d2 - d3;
    let a0 = d1 * fa + d2 * eab + d3 * ra;
    let a2 = d1 * eba + d2 * fb + d3 * rb;
    (0.5 * (a0 + a2) - d1 * eab - d2 * eba) / d3
}

// Cubic triangular Bezier patch at barycentric tau; control layout
// [b300, b210, b201, b120, b111, b102, b030, b021, b012, b003].
fn cubic_bezier(tau: [f64; 3], c: [f64; 10]) -> f64 {
    let [t1, t2, t3] = tau;
    let q200 = t1 * c[0] + t2 * c[1] + t3 * c[2];
    let q110 = t1 * c[1] + t2 * c[3] + t3 * c[4];
    let q101 = t1 * c[2] + t2 * c[4] + t3 * c[5];
    let q020 = t1 * c[3] + t2 * c[6] + t3 * c[7];
    let q011 = t1 * c[4] + t2 * c[7] + t3 * c[8];
    let q002 = t1 * c[5] + t2 * c[8] + t3 * c[9];
    let p100 = t1 * q200 + t2 * q110 + t3 * q101;
    let p010 = t1 * q110 + t2 * q020 + t3 * q011;
    let p001 = t1 * q101 + t2 * q011 + t3 * q002;
    t1 * p100 + t2 * p010 + t3 * p001
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{intensity::occultation_intensity, lut::GridSpec};

    fn lut_spec() -> GridSpec {
        GridSpec::default()
            .points_per_axis(81)
            .r_max(2f64)
            .rho_range(0.4, 2f64)
    }

    #[test]
    fn too_few_samples() {
        let err = CloughTocher2d::from_scattered(vec![[0f64, 0f64], [1f64, 0f64]], vec![1f64, 2f64]);
        assert!(matches!(err, Err(InterpError::TooFewSamples(2))));
    }

    #[test]
    fn reproduces_linear_data_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        let plane = |x: f64, y: f64| 0.3 + 0.7 * x - 0.2 * y;
        let mut nodes = vec![];
        for i in 0..10 {
            for j in 0..10 {
                // jitter the lattice so the sample set is genuinely scattered
                let x = i as f64 + rng.gen_range(-0.3..0.3);
                let y = j as f64 + rng.gen_range(-0.3..0.3);
                nodes.push([x, y]);
            }
        }
        let values = nodes.iter().map(|p| plane(p[0], p[1])).collect();
        let interp = CloughTocher2d::from_scattered(nodes, values).unwrap();
        for _ in 0..100 {
            let x = rng.gen_range(1f64..8f64);
            let y = rng.gen_range(1f64..8f64);
            let value = interp.eval(x, y).unwrap();
            assert!((value - plane(x, y)).abs() < 1e-9);
        }
    }

    #[test]
    fn reproduces_samples_at_their_coordinates() {
        let lut = crate::lut::LookupTable::build(
            &GridSpec::default()
                .points_per_axis(12)
                .r_max(2f64)
                .rho_range(0.4, 2f64),
        )
        .unwrap();
        let interp = CloughTocher2d::new(&lut).unwrap();
        for sample in lut.samples() {
            let value = interp.eval(sample.r, sample.rho).unwrap();
            assert!(
                (value - sample.intensity).abs() < 1e-9,
                "({}, {}): {} vs {}",
                sample.r,
                sample.rho,
                value,
                sample.intensity
            );
        }
    }

    #[test]
    fn tracks_the_direct_computation() {
        let lut = crate::lut::LookupTable::build(&lut_spec()).unwrap();
        let interp = CloughTocher2d::new(&lut).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let mut worst = 0f64;
        for _ in 0..200 {
            let r = rng.gen_range(0.05..1.95);
            let rho = rng.gen_range(0.45..1.95);
            let approx = interp.eval(r, rho).unwrap();
            let direct = occultation_intensity(r, rho).unwrap();
            worst = worst.max((approx - direct).abs());
        }
        assert!(worst < 1e-2, "worst interpolation error: {}", worst);
    }

    #[test]
    fn undefined_outside_the_hull() {
        let lut = crate::lut::LookupTable::build(
            &GridSpec::default()
                .points_per_axis(12)
                .r_max(2f64)
                .rho_range(0.4, 2f64),
        )
        .unwrap();
        let interp = CloughTocher2d::new(&lut).unwrap();
        assert!(interp.eval(10f64, 1f64).is_none());
        assert!(interp.eval(1f64, 0.01).is_none());
        assert!(interp.eval(-1f64, 1f64).is_none());
    }
}
