//! Intensity lookup table
//!
//! Precomputes [`occultation_intensity`] over a regular (r, rho) grid and
//! persists the samples as a flat CSV record list, one row per grid cell in
//! row-major (r index, rho index) order. Downstream tools rely on that
//! ordering when they re-read the file.

use std::{path::Path, time::Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    intensity::occultation_intensity,
    lommel::LommelError,
};

#[derive(thiserror::Error, Debug)]
pub enum LutError {
    #[error("the grid needs at least one point per axis")]
    EmptyGrid,
    #[error("the rho axis must start above zero (got {0})")]
    NonPositiveRho(f64),
    #[error("the r axis upper bound must be positive (got {0})")]
    NonPositiveRMax(f64),
    #[error("rho upper bound {max} is below the lower bound {min}")]
    InvertedRhoRange { min: f64, max: f64 },
    #[error("the reloaded table holds no samples")]
    EmptyTable,
    #[error("failed to read or write the lookup table")]
    Csv(#[from] csv::Error),
    #[error("failed to access the lookup table file")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lommel(#[from] LommelError),
}
type Result<T> = std::result::Result<T, LutError>;

/// Regular 2D grid specification for the lookup table.
///
/// `r` is sampled uniformly over `[0, r_max]` and `rho` over
/// `[rho_min, rho_max]` with `rho_min > 0`, `points_per_axis` points each.
/// Defaults reproduce the reference table: 400 points per axis, both axes
/// up to 20 Fresnel units, rho starting at 0.01.
#[derive(Debug, Clone)]
pub struct GridSpec {
    points_per_axis: usize,
    r_max: f64,
    rho_min: f64,
    rho_max: f64,
}
impl Default for GridSpec {
    fn default() -> Self {
        Self {
            points_per_axis: 400,
            r_max: 20f64,
            rho_min: 0.01,
            rho_max: 20f64,
        }
    }
}
impl GridSpec {
    pub fn points_per_axis(self, points_per_axis: usize) -> Self {
        Self {
            points_per_axis,
            ..self
        }
    }
    pub fn r_max(self, r_max: f64) -> Self {
        Self { r_max, ..self }
    }
    pub fn rho_range(self, rho_min: f64, rho_max: f64) -> Self {
        Self {
            rho_min,
            rho_max,
            ..self
        }
    }
    pub fn validate(&self) -> Result<()> {
        if self.points_per_axis == 0 {
            return Err(LutError::EmptyGrid);
        }
        if self.rho_min <= 0f64 {
            return Err(LutError::NonPositiveRho(self.rho_min));
        }
        if self.r_max <= 0f64 {
            return Err(LutError::NonPositiveRMax(self.r_max));
        }
        if self.rho_max < self.rho_min {
            return Err(LutError::InvertedRhoRange {
                min: self.rho_min,
                max: self.rho_max,
            });
        }
        Ok(())
    }
    /// Shadow-center distance axis: `points_per_axis` values over `[0, r_max]`
    pub fn r_points(&self) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(linspace(0f64, self.r_max, self.points_per_axis))
    }
    /// Occulter radius axis: `points_per_axis` values over `[rho_min, rho_max]`
    pub fn rho_points(&self) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(linspace(self.rho_min, self.rho_max, self.points_per_axis))
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    // Pin the last point to the bound itself: i*step accumulates rounding.
    (0..n)
        .map(|i| {
            if i == n - 1 {
                end
            } else {
                start + i as f64 * step
            }
        })
        .collect()
}

/// One precomputed grid cell: coordinates in Fresnel units and the intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensitySample {
    pub r: f64,
    pub rho: f64,
    pub intensity: f64,
}

/// Flat, row-major table of intensity samples over a [`GridSpec`] grid
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    samples: Vec<IntensitySample>,
}
impl LookupTable {
    /// Computes the full Cartesian product of the grid axes.
    ///
    /// Every sample is independent; rows of constant `r` are evaluated on
    /// rayon workers and collected in order, so the table comes out
    /// row-major by (r index, rho index). A failed sample aborts the whole
    /// build rather than yielding a truncated table.
    pub fn build(spec: &GridSpec) -> Result<Self> {
        let r_points = spec.r_points()?;
        let rho_points = spec.rho_points()?;
        log::info!(
            "Computing {} x {} intensity samples...",
            r_points.len(),
            rho_points.len()
        );
        let now = Instant::now();
        let rows = r_points
            .par_iter()
            .map(|&r| {
                rho_points
                    .iter()
                    .map(|&rho| {
                        let intensity = occultation_intensity(r, rho)?;
                        Ok(IntensitySample { r, rho, intensity })
                    })
                    .collect::<Result<Vec<IntensitySample>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("... computed in {}s", now.elapsed().as_secs());
        Ok(Self {
            samples: rows.into_iter().flatten().collect(),
        })
    }
    /// Wraps already-computed samples into a table.
    pub fn from_samples(samples: Vec<IntensitySample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(LutError::EmptyTable);
        }
        Ok(Self { samples })
    }
    /// Writes the table as delimited records under a `r,rho,intensity` header.
    ///
    /// Floats are written in shortest round-trip form, so a reload
    /// reproduces the samples exactly.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for sample in &self.samples {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }
    /// Reloads a table persisted by [`LookupTable::to_csv`].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut samples = vec![];
        for record in rdr.deserialize() {
            samples.push(record?);
        }
        Self::from_samples(samples)
    }
    pub fn samples(&self) -> &[IntensitySample] {
        &self.samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Iterator over the shadow-center distance coordinate
    pub fn r_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.r)
    }
    /// Iterator over the occulter radius coordinate
    pub fn rho_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.rho)
    }
    /// Returns the range of the r coordinate
    pub fn r_range(&self) -> (f64, f64) {
        (
            self.r_iter().fold(f64::INFINITY, f64::min),
            self.r_iter().fold(f64::NEG_INFINITY, f64::max),
        )
    }
    /// Returns the range of the rho coordinate
    pub fn rho_range(&self) -> (f64, f64) {
        (
            self.rho_iter().fold(f64::INFINITY, f64::min),
            self.rho_iter().fold(f64::NEG_INFINITY, f64::max),
        )
    }
    /// Returns the range of the tabulated intensity
    pub fn intensity_range(&self) -> (f64, f64) {
        let values = self.samples.iter().map(|s| s.intensity);
        (
            values.clone().fold(f64::INFINITY, f64::min),
            values.fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn small_spec() -> GridSpec {
        GridSpec::default()
            .points_per_axis(8)
            .r_max(2f64)
            .rho_range(0.5, 1.5)
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(matches!(
            GridSpec::default().points_per_axis(0).r_points(),
            Err(LutError::EmptyGrid)
        ));
        assert!(matches!(
            GridSpec::default().rho_range(0f64, 20f64).rho_points(),
            Err(LutError::NonPositiveRho(_))
        ));
        assert!(matches!(
            GridSpec::default().r_max(-1f64).r_points(),
            Err(LutError::NonPositiveRMax(_))
        ));
        assert!(matches!(
            GridSpec::default().rho_range(2f64, 1f64).validate(),
            Err(LutError::InvertedRhoRange { .. })
        ));
    }

    #[test]
    fn row_major_ordering() {
        let spec = small_spec();
        let lut = LookupTable::build(&spec).unwrap();
        let r_points = spec.r_points().unwrap();
        let rho_points = spec.rho_points().unwrap();
        assert_eq!(lut.len(), r_points.len() * rho_points.len());
        for (i, &r) in r_points.iter().enumerate() {
            for (j, &rho) in rho_points.iter().enumerate() {
                let sample = lut.samples()[i * rho_points.len() + j];
                assert_eq!(sample.r, r);
                assert_eq!(sample.rho, rho);
            }
        }
    }

    #[test]
    fn samples_match_direct_computation() {
        let lut = LookupTable::build(&small_spec()).unwrap();
        for sample in lut.samples() {
            let direct = occultation_intensity(sample.r, sample.rho).unwrap();
            assert_eq!(sample.intensity.to_bits(), direct.to_bits());
        }
    }

    #[test]
    fn csv_round_trip() {
        let lut = LookupTable::build(&small_spec()).unwrap();
        let path = std::env::temp_dir().join("tno-occult_lut_round_trip.csv");
        lut.to_csv(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next().unwrap(), "r,rho,intensity");
        let reloaded = LookupTable::from_csv(&path).unwrap();
        assert_eq!(lut, reloaded);
        fs::remove_file(path).ok();
    }

    #[test]
    fn grid_axes_span_their_ranges() {
        let spec = small_spec();
        let lut = LookupTable::build(&spec).unwrap();
        assert_eq!(lut.r_range(), (0f64, 2f64));
        assert_eq!(lut.rho_range(), (0.5, 1.5));
    }
}
