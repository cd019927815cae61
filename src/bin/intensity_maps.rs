//! Side-by-side maps of the direct and the interpolated intensity surface

use plotters::prelude::*;
use tno_occult::{occultation_intensity, CloughTocher2d, GridSpec, LookupTable};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let spec = GridSpec::default()
        .points_per_axis(150)
        .r_max(10f64)
        .rho_range(0.01, 10f64);
    let lut = LookupTable::build(&spec)?;
    let interp = CloughTocher2d::new(&lut)?;

    let n = 100;
    let dr = 10f64 / n as f64;
    let drho = (10f64 - 0.01) / n as f64;
    let mut direct = vec![];
    let mut approx = vec![];
    for i in 0..n {
        for j in 0..n {
            let r = (i as f64 + 0.5) * dr;
            let rho = 0.01 + (j as f64 + 0.5) * drho;
            direct.push((r, rho, occultation_intensity(r, rho)?));
            approx.push((r, rho, interp.eval(r, rho).unwrap_or(0f64)));
        }
    }
    let vmax = direct
        .iter()
        .map(|&(_, _, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot = SVGBackend::new("intensity_maps.svg", (1024, 512)).into_drawing_area();
    plot.fill(&WHITE).unwrap();
    let areas = plot.split_evenly((1, 2));
    for (area, (title, data)) in areas
        .iter()
        .zip([("Direct calculation", &direct), ("Interpolation", &approx)])
    {
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .caption(title, ("sans-serif", 20))
            .set_label_area_size(LabelAreaPosition::Left, 40)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0f64..10f64, 0f64..10f64)
            .unwrap();
        chart
            .configure_mesh()
            .x_desc("r [Fresnel units]")
            .y_desc("rho [Fresnel units]")
            .draw()
            .unwrap();
        chart
            .draw_series(data.iter().map(|&(r, rho, v)| {
                let color = colorous::VIRIDIS.eval_continuous((v / vmax).clamp(0f64, 1f64));
                Rectangle::new(
                    [
                        (r - dr / 2f64, rho - drho / 2f64),
                        (r + dr / 2f64, rho + drho / 2f64),
                    ],
                    RGBColor(color.r, color.g, color.b).filled(),
                )
            }))
            .unwrap();
    }

    Ok(())
}
