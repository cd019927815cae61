use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use structopt::StructOpt;
use tno_occult::{GridSpec, LookupTable};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "tno-occult",
    about = "Builds the TNO occultation diffraction-intensity lookup table"
)]
struct Opt {
    /// Number of grid points per axis
    #[structopt(short = "n", long, default_value = "400")]
    points_per_axis: usize,
    /// Upper bound of the shadow-center distance axis [Fresnel units]
    #[structopt(long, default_value = "20")]
    r_max: f64,
    /// Lower bound of the occulter radius axis [Fresnel units]
    #[structopt(long, default_value = "0.01")]
    rho_min: f64,
    /// Upper bound of the occulter radius axis [Fresnel units]
    #[structopt(long, default_value = "20")]
    rho_max: f64,
    /// Lookup table file
    #[structopt(short, long, default_value = "occultation_intensity_lut.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let spec = GridSpec::default()
        .points_per_axis(opt.points_per_axis)
        .r_max(opt.r_max)
        .rho_range(opt.rho_min, opt.rho_max);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    pb.set_message(format!(
        "Computing {0} x {0} intensity samples",
        opt.points_per_axis
    ));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let lut = LookupTable::build(&spec)?;
    pb.finish_and_clear();

    lut.to_csv(&opt.output)?;

    let (intensity_min, intensity_max) = lut.intensity_range();
    println!("SUMMARY:");
    println!(" - # of samples: {}", lut.len());
    println!(" - r range: [{:6.3}-{:6.3}]", lut.r_range().0, lut.r_range().1);
    println!(
        " - rho range: [{:6.3}-{:6.3}]",
        lut.rho_range().0,
        lut.rho_range().1
    );
    println!(" - intensity range: [{:6.3}-{:6.3}]", intensity_min, intensity_max);
    println!(" - table written to {:?}", opt.output);

    Ok(())
}
