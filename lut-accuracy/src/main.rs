//! Compares interpolated lookups against direct series evaluation on a
//! held-out grid, reporting per-path timing and the discrepancy.

use std::time::Instant;

use indicatif::ProgressIterator;
use itertools::iproduct;
use tno_occult::{occultation_intensity, CloughTocher2d, GridSpec, LookupTable};

fn main() -> anyhow::Result<()> {
    let lut_spec = GridSpec::default().points_per_axis(200);
    let lut = LookupTable::build(&lut_spec)?;
    let interp = CloughTocher2d::new(&lut)?;

    // Held-out queries strictly within the table's coordinate hull
    let eval_spec = GridSpec::default()
        .points_per_axis(100)
        .r_max(10f64)
        .rho_range(0.01, 10f64);
    let points: Vec<(f64, f64)> =
        iproduct!(eval_spec.r_points()?, eval_spec.rho_points()?).collect();

    let now = Instant::now();
    let direct = points
        .iter()
        .progress_count(points.len() as u64)
        .map(|&(r, rho)| occultation_intensity(r, rho))
        .collect::<Result<Vec<f64>, _>>()?;
    let direct_elapsed = now.elapsed();

    let now = Instant::now();
    let approx: Vec<Option<f64>> = points
        .iter()
        .map(|&(r, rho)| interp.eval(r, rho))
        .collect();
    let interp_elapsed = now.elapsed();

    let missed = approx.iter().filter(|value| value.is_none()).count();
    let diffs: Vec<f64> = direct
        .iter()
        .zip(&approx)
        .filter_map(|(direct, approx)| approx.map(|approx| (direct - approx).abs()))
        .collect();
    let max_diff = diffs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean_diff = diffs.iter().sum::<f64>() / diffs.len() as f64;

    println!("ACCURACY & TIMING:");
    println!(" - # of held-out queries: {}", points.len());
    println!(
        " - direct calculation: {:8.3}s ({:8.1}us per query)",
        direct_elapsed.as_secs_f64(),
        direct_elapsed.as_secs_f64() * 1e6 / points.len() as f64
    );
    println!(
        " - interpolation:      {:8.3}s ({:8.1}us per query)",
        interp_elapsed.as_secs_f64(),
        interp_elapsed.as_secs_f64() * 1e6 / points.len() as f64
    );
    println!(" - max abs difference:  {:.3e}", max_diff);
    println!(" - mean abs difference: {:.3e}", mean_diff);
    if missed > 0 {
        println!(" - queries outside the hull: {}", missed);
    }

    Ok(())
}
