//! Deformable-surface brain extraction
//!
//! A tessellated sphere is placed at the intensity centre of gravity and
//! pushed outward or inward at every vertex by three forces:
//!
//! - a tangential force that keeps vertices evenly spaced,
//! - a curvature force whose gain rises sharply once the local radius of
//!   curvature drops from `r_max` towards `r_min`,
//! - an intensity force comparing the minimum intensity found up to `d1`
//!   inward (and the maximum up to `d2`) with the local threshold
//!   `(imax - t2) * bt + t2`.
//!
//! The final surface is rasterized and everything it encloses becomes the
//! brain mask.

use super::icosphere::create_icosphere;
use super::surface::{dot, mean_edge_length, norm, vertex_neighbors, vertex_normals};
use super::{BrainExtractor, Extraction};
use crate::error::{Result, SkullStripError};
use crate::types::{ExtractionParameters, Mesh, SegmentedVolume, Volume};
use log::{debug, info};
use std::collections::VecDeque;

/// Fraction of the equivalent-sphere radius the initial surface starts at
const INITIAL_RADIUS_FRACTION: f64 = 0.5;

/// Intensity force gain: normal max update fraction (0.5) x fit weight (0.1)
const INTENSITY_GAIN: f64 = 0.05;

/// Iterations between mean edge length refreshes
const EDGE_LENGTH_REFRESH: usize = 50;

/// Rasterization step along triangle edges, in voxels
const RASTER_STEP: f64 = 0.5;

/// Robust intensity statistics of the input volume
#[derive(Debug, Clone, Copy, PartialEq)]
struct IntensityStats {
    /// 2nd percentile (robust minimum)
    t2: f64,
    /// 98th percentile (robust maximum)
    t98: f64,
    /// Foreground threshold, t2 + 10% of the robust range
    t: f64,
    /// Median intensity inside the initial brain estimate
    tm: f64,
    /// Centre of gravity in grid millimetres
    cog: [f64; 3],
    /// Radius of the sphere with the foreground volume, in mm
    radius: f64,
}

/// Reference implementation of [`BrainExtractor`] fitting a deformable
/// sphere to the image
///
/// # Example
///
/// ```
/// use skullstrip_core::SurfaceEvolutionExtractor;
///
/// let extractor = SurfaceEvolutionExtractor::new()
///     .with_iterations(500)
///     .with_subdivisions(3);
/// assert_eq!(extractor.iterations(), 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceEvolutionExtractor {
    iterations: usize,
    subdivisions: usize,
}

impl Default for SurfaceEvolutionExtractor {
    fn default() -> Self {
        Self {
            iterations: 1000,
            subdivisions: 4,
        }
    }
}

impl SurfaceEvolutionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surface update iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Icosphere subdivision level of the initial surface
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }
}

impl BrainExtractor for SurfaceEvolutionExtractor {
    fn name(&self) -> &str {
        "surface-evolution"
    }

    fn extract(&self, volume: &Volume, params: &ExtractionParameters) -> Result<Extraction> {
        validate_parameters(params)?;
        let grid = Grid::new(volume);
        // trilinear sampling needs two samples along every axis
        if grid.dims.iter().any(|&n| n < 2) {
            return Err(SkullStripError::Extraction(format!(
                "surface fitting needs a 3D volume, got {} voxels",
                volume.geometry().dims.map(|n| n.to_string()).join("x")
            )));
        }
        let stats = intensity_stats(&grid)?;
        debug!(
            "Intensity stats: t2={:.3} t98={:.3} t={:.3} tm={:.3} radius={:.1}mm cog={:?}",
            stats.t2, stats.t98, stats.t, stats.tm, stats.radius, stats.cog
        );

        let (unit, faces) = create_icosphere(self.subdivisions);
        let start_radius = stats.radius * INITIAL_RADIUS_FRACTION;
        let mut vertices: Vec<[f64; 3]> = unit
            .iter()
            .map(|u| {
                [
                    stats.cog[0] + u[0] * start_radius,
                    stats.cog[1] + u[1] * start_radius,
                    stats.cog[2] + u[2] * start_radius,
                ]
            })
            .collect();

        evolve(&grid, &stats, params, &mut vertices, &faces, self.iterations);

        let mask = rasterize(&grid, &vertices, &faces);
        let segmented = SegmentedVolume::from_mask(volume, mask)?;
        if segmented.brain_voxel_count() == 0 {
            return Err(SkullStripError::Extraction(
                "surface collapsed: no voxels inside the brain surface".to_string(),
            ));
        }

        let mesh = to_world(&grid, vertices, faces);
        info!(
            "Extracted surface with {} vertices enclosing {} voxels",
            mesh.vertex_count(),
            segmented.brain_voxel_count()
        );
        Ok(Extraction { mesh, segmented })
    }
}

fn validate_parameters(params: &ExtractionParameters) -> Result<()> {
    if !(params.r_min > 0.0 && params.r_max > params.r_min) {
        return Err(SkullStripError::Extraction(format!(
            "curvature bounds must satisfy 0 < r_min < r_max, got {} and {}",
            params.r_min, params.r_max
        )));
    }
    if !(params.d1 > 1.0 && params.d2 > 0.0) {
        return Err(SkullStripError::Extraction(format!(
            "search depths must satisfy d1 > 1 and d2 > 0, got {} and {}",
            params.d1, params.d2
        )));
    }
    Ok(())
}

/// Volume view in grid millimetres: voxel (i, j, k) sits at
/// (i * |sx|, j * |sy|, k * |sz|)
struct Grid<'a> {
    data: &'a [f64],
    dims: [usize; 3],
    voxel_size: [f64; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
}

impl<'a> Grid<'a> {
    fn new(volume: &'a Volume) -> Self {
        let g = volume.geometry();
        Self {
            data: volume.data(),
            dims: g.dims,
            voxel_size: g.voxel_size(),
            spacing: g.spacing,
            origin: g.origin,
        }
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.dims[0] + k * self.dims[0] * self.dims[1]
    }

    fn to_voxel(&self, p: [f64; 3]) -> [f64; 3] {
        [
            p[0] / self.voxel_size[0],
            p[1] / self.voxel_size[1],
            p[2] / self.voxel_size[2],
        ]
    }

    /// Strictly inside the interpolation domain
    fn contains(&self, v: [f64; 3]) -> bool {
        (0..3).all(|a| v[a] >= 0.0 && v[a] < (self.dims[a] - 1) as f64)
    }

    /// Trilinear interpolation at a voxel position, clamped to the grid
    fn sample(&self, v: [f64; 3]) -> f64 {
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut frac = [0.0f64; 3];
        for a in 0..3 {
            let max = (self.dims[a] - 1) as f64;
            let x = v[a].clamp(0.0, max);
            lo[a] = x.floor() as usize;
            hi[a] = (lo[a] + 1).min(self.dims[a] - 1);
            frac[a] = x - lo[a] as f64;
        }

        let at = |i, j, k| self.data[self.index(i, j, k)];
        let c00 = at(lo[0], lo[1], lo[2]) * (1.0 - frac[0]) + at(hi[0], lo[1], lo[2]) * frac[0];
        let c10 = at(lo[0], hi[1], lo[2]) * (1.0 - frac[0]) + at(hi[0], hi[1], lo[2]) * frac[0];
        let c01 = at(lo[0], lo[1], hi[2]) * (1.0 - frac[0]) + at(hi[0], lo[1], hi[2]) * frac[0];
        let c11 = at(lo[0], hi[1], hi[2]) * (1.0 - frac[0]) + at(hi[0], hi[1], hi[2]) * frac[0];
        let c0 = c00 * (1.0 - frac[1]) + c10 * frac[1];
        let c1 = c01 * (1.0 - frac[1]) + c11 * frac[1];
        c0 * (1.0 - frac[2]) + c1 * frac[2]
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = (p / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn intensity_stats(grid: &Grid) -> Result<IntensityStats> {
    let mut sorted: Vec<f64> = grid
        .data
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if sorted.is_empty() {
        return Err(SkullStripError::Extraction(
            "volume has no positive intensities".to_string(),
        ));
    }
    sorted.sort_by(f64::total_cmp);

    let t2 = percentile(&sorted, 2.0);
    let t98 = percentile(&sorted, 98.0);
    if t98 <= t2 {
        return Err(SkullStripError::Extraction(format!(
            "no intensity contrast (2nd and 98th percentiles both {})",
            t2
        )));
    }
    let t = t2 + 0.1 * (t98 - t2);

    let [nx, ny, nz] = grid.dims;
    let vs = grid.voxel_size;
    let mut weighted = [0.0f64; 3];
    let mut total_weight = 0.0;
    let mut foreground = 0usize;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let v = grid.data[grid.index(i, j, k)];
                if v > t {
                    let w = (v - t2).min(t98 - t2);
                    weighted[0] += i as f64 * w;
                    weighted[1] += j as f64 * w;
                    weighted[2] += k as f64 * w;
                    total_weight += w;
                    foreground += 1;
                }
            }
        }
    }
    let cog = [
        weighted[0] / total_weight * vs[0],
        weighted[1] / total_weight * vs[1],
        weighted[2] / total_weight * vs[2],
    ];

    let brain_volume = foreground as f64 * vs[0] * vs[1] * vs[2];
    let radius = (3.0 * brain_volume / (4.0 * std::f64::consts::PI)).cbrt();

    let mut inside = Vec::new();
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let v = grid.data[grid.index(i, j, k)];
                if v > t2 && v < t98 {
                    let d = [
                        i as f64 * vs[0] - cog[0],
                        j as f64 * vs[1] - cog[1],
                        k as f64 * vs[2] - cog[2],
                    ];
                    if dot(d, d) < radius * radius {
                        inside.push(v);
                    }
                }
            }
        }
    }
    let tm = if inside.is_empty() {
        (t2 + t98) / 2.0
    } else {
        inside.sort_by(f64::total_cmp);
        inside[inside.len() / 2]
    };

    Ok(IntensityStats {
        t2,
        t98,
        t,
        tm,
        cog,
        radius,
    })
}

/// Minimum intensity up to `d1` and maximum up to `d2` inward along the
/// normal, or `None` when the search leaves the image
fn inward_extrema(
    grid: &Grid,
    stats: &IntensityStats,
    params: &ExtractionParameters,
    point: [f64; 3],
    normal: [f64; 3],
) -> Option<(f64, f64)> {
    let at_depth = |d: f64| {
        grid.to_voxel([
            point[0] - d * normal[0],
            point[1] - d * normal[1],
            point[2] - d * normal[2],
        ])
    };

    let first = at_depth(1.0);
    let far = at_depth(params.d1 - 1.0);
    if !grid.contains(first) || !grid.contains(far) {
        return None;
    }

    let first_value = grid.sample(first);
    let mut i_min = stats.tm.min(first_value).min(grid.sample(far));
    let mut i_max = stats.t.max(first_value);

    let step = grid.voxel_size.iter().copied().fold(1.0, f64::min);
    let mut depth = 1.0 + step;
    while depth < params.d1 {
        let v = at_depth(depth);
        if grid.contains(v) {
            let value = grid.sample(v);
            i_min = i_min.min(value);
            if depth < params.d2 {
                i_max = i_max.max(value);
            }
        }
        depth += step;
    }

    Some((i_min.max(stats.t2), i_max.min(stats.tm)))
}

fn evolve(
    grid: &Grid,
    stats: &IntensityStats,
    params: &ExtractionParameters,
    vertices: &mut [[f64; 3]],
    faces: &[[usize; 3]],
    iterations: usize,
) {
    let neighbors = vertex_neighbors(vertices.len(), faces);
    let e = (1.0 / params.r_min + 1.0 / params.r_max) / 2.0;
    let f = 6.0 / (1.0 / params.r_min - 1.0 / params.r_max);

    let mut edge = mean_edge_length(vertices, faces);
    let mut updates = vec![[0.0f64; 3]; vertices.len()];
    let mut out_of_bounds = 0usize;

    for iteration in 0..iterations {
        let normals = vertex_normals(vertices, faces);

        for (i, update) in updates.iter_mut().enumerate() {
            let v = vertices[i];
            let n = normals[i];

            let count = neighbors[i].len().max(1) as f64;
            let mut mean = [0.0f64; 3];
            for &j in &neighbors[i] {
                for a in 0..3 {
                    mean[a] += vertices[j][a] / count;
                }
            }
            let dv = [mean[0] - v[0], mean[1] - v[1], mean[2] - v[2]];
            let dn = dot(dv, n);
            let sn = [dn * n[0], dn * n[1], dn * n[2]];
            let st = [dv[0] - sn[0], dv[1] - sn[1], dv[2] - sn[2]];

            let rinv = 2.0 * dn.abs() / (edge * edge);
            let f2 = (1.0 + (f * (rinv - e)).tanh()) / 2.0;

            let f3 = match inward_extrema(grid, stats, params, v, n) {
                Some((i_min, i_max)) => {
                    let local = (i_max - stats.t2) * params.bt + stats.t2;
                    let contrast = if i_max - stats.t2 > 0.0 {
                        i_max - stats.t2
                    } else {
                        1.0
                    };
                    2.0 * (i_min - local) / contrast * INTENSITY_GAIN * edge
                }
                None => {
                    out_of_bounds += 1;
                    0.0
                }
            };

            for a in 0..3 {
                update[a] = 0.5 * st[a] + f2 * sn[a] + f3 * n[a];
            }
        }

        for (v, u) in vertices.iter_mut().zip(&updates) {
            for a in 0..3 {
                v[a] += u[a];
            }
        }

        if iteration % EDGE_LENGTH_REFRESH == 0 {
            edge = mean_edge_length(vertices, faces);
        }
    }

    if out_of_bounds > 0 {
        debug!(
            "Intensity search left the image for {} of {} vertex updates",
            out_of_bounds,
            iterations * vertices.len()
        );
    }
}

/// Draws the surface into the grid and returns everything it encloses
///
/// The work grid carries one voxel of padding on every side. Surface
/// points beyond the image are clamped onto that padding, so a surface
/// cut by the field of view still closes and the exterior flood cannot
/// leak into it.
fn rasterize(grid: &Grid, vertices: &[[f64; 3]], faces: &[[usize; 3]]) -> Vec<u8> {
    let [nx, ny, nz] = grid.dims;
    let [px, py, pz] = [nx + 2, ny + 2, nz + 2];
    let idx = |i: usize, j: usize, k: usize| i + j * px + k * px * py;
    let mut surface = vec![false; px * py * pz];

    let padded = |x: f64, n: usize| (x.round() + 1.0).clamp(0.0, (n + 1) as f64) as usize;
    let mut mark = |p: [f64; 3]| {
        surface[idx(padded(p[0], nx), padded(p[1], ny), padded(p[2], nz))] = true;
    };

    let voxel: Vec<[f64; 3]> = vertices.iter().map(|&v| grid.to_voxel(v)).collect();
    for &[a, b, c] in faces {
        let (p0, p1, p2) = (voxel[a], voxel[b], voxel[c]);
        let edge = [p0[0] - p1[0], p0[1] - p1[1], p0[2] - p1[2]];
        let edge_steps = (norm(edge) / RASTER_STEP).ceil() as usize + 1;
        for s in 0..=edge_steps {
            let t = s as f64 / edge_steps as f64;
            let start = [p1[0] + t * edge[0], p1[1] + t * edge[1], p1[2] + t * edge[2]];
            let seg = [p2[0] - start[0], p2[1] - start[1], p2[2] - start[2]];
            let seg_steps = (norm(seg) / RASTER_STEP).ceil() as usize + 1;
            for r in 0..=seg_steps {
                let u = r as f64 / seg_steps as f64;
                mark([start[0] + u * seg[0], start[1] + u * seg[1], start[2] + u * seg[2]]);
            }
        }
    }

    // Flood the exterior from the padding shell
    let mut exterior = vec![false; px * py * pz];
    let mut queue = VecDeque::new();
    for k in 0..pz {
        for j in 0..py {
            for i in 0..px {
                let boundary =
                    i == 0 || j == 0 || k == 0 || i == px - 1 || j == py - 1 || k == pz - 1;
                let n = idx(i, j, k);
                if boundary && !surface[n] {
                    exterior[n] = true;
                    queue.push_back((i, j, k));
                }
            }
        }
    }

    while let Some((i, j, k)) = queue.pop_front() {
        let candidates = [
            (i.wrapping_sub(1), j, k),
            (i + 1, j, k),
            (i, j.wrapping_sub(1), k),
            (i, j + 1, k),
            (i, j, k.wrapping_sub(1)),
            (i, j, k + 1),
        ];
        for (a, b, c) in candidates {
            if a < px && b < py && c < pz {
                let n = idx(a, b, c);
                if !exterior[n] && !surface[n] {
                    exterior[n] = true;
                    queue.push_back((a, b, c));
                }
            }
        }
    }

    let mut mask = Vec::with_capacity(nx * ny * nz);
    for k in 1..=nz {
        for j in 1..=ny {
            for i in 1..=nx {
                mask.push(u8::from(!exterior[idx(i, j, k)]));
            }
        }
    }
    mask
}

/// Converts grid-millimetre vertices to world coordinates, flipping the
/// winding when the axes are mirrored an odd number of times
fn to_world(grid: &Grid, vertices: Vec<[f64; 3]>, mut faces: Vec<[usize; 3]>) -> Mesh {
    let world = vertices
        .into_iter()
        .map(|p| {
            let v = grid.to_voxel(p);
            [
                grid.origin[0] + v[0] * grid.spacing[0],
                grid.origin[1] + v[1] * grid.spacing[1],
                grid.origin[2] + v[2] * grid.spacing[2],
            ]
        })
        .collect();

    let mirrored = grid.spacing.iter().filter(|s| **s < 0.0).count() % 2 == 1;
    if mirrored {
        for face in faces.iter_mut() {
            face.swap(1, 2);
        }
    }
    Mesh::new(world, faces)
}
