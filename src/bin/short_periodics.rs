use std::error::Error;

use plotters::prelude::*;
use rust_orbprop::astro::{HasMass, KeplerianElements, Orbit, SpacecraftState};
use rust_orbprop::gravity::ZonalField;
use rust_orbprop::propagation::{
    BrouwerLyddanePropagator, EcksteinHechlerPropagator, PropagationType, Propagator,
};

const NUM_ORBITS: f64 = 3.0;
const NUM_POINTS: usize = 600;

/// Plots the short-period oscillation of the semi-major axis around its mean
/// value, for both analytical theories, starting from the same mean orbit.
pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let field = ZonalField::earth();
    let mean = KeplerianElements {
        a: 7.0e6,
        e: 1e-3,
        i: 98f64.to_radians(),
        raan: 0.0,
        arg_perigee: 90f64.to_radians(),
        mean_anomaly: 0.0,
    };
    let orbit = Orbit::from_keplerian(mean, 0.0, field.mu())?;
    let state = SpacecraftState::new(orbit);
    let duration = NUM_ORBITS * state.orbit().period();

    let brouwer = BrouwerLyddanePropagator::new(state.clone(), &field, PropagationType::Mean)?;
    let eckstein = EcksteinHechlerPropagator::new(state, &field, PropagationType::Mean)?;

    let brouwer_points = sample(&brouwer, mean.a, duration)?;
    let eckstein_points = sample(&eckstein, mean.a, duration)?;

    std::fs::create_dir_all("plots")?;
    draw_plot(
        "plots/short-periodics.png",
        &[
            ("Brouwer-Lyddane", &brouwer_points, &RED),
            ("Eckstein-Hechler", &eckstein_points, &BLUE),
        ],
    )?;
    log::info!("wrote plots/short-periodics.png");

    Ok(())
}

/// (time in orbits, a_osc - a_mean in meters)
fn sample(
    propagator: &dyn Propagator,
    mean_a: f64,
    duration: f64,
) -> Result<Vec<(f32, f32)>, Box<dyn Error>> {
    let period = duration / NUM_ORBITS;
    (0..=NUM_POINTS)
        .map(|i| {
            let t = duration * i as f64 / NUM_POINTS as f64;
            let state = propagator.propagate(t)?;
            let da = state.orbit().semimajor_axis() - mean_a;
            Ok(((t / period) as f32, da as f32))
        })
        .collect()
}

fn draw_plot(
    name: &str,
    series: &[(&str, &Vec<(f32, f32)>, &RGBColor)],
) -> Result<(), Box<dyn Error>> {
    let y_max = series
        .iter()
        .flat_map(|(_, points, _)| points.iter().map(|(_, y)| y.abs()))
        .fold(1.0f32, f32::max);

    let root = BitMapBackend::new(name, (960, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("a_osc - a_mean (m)", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0f32..NUM_ORBITS as f32, -1.1 * y_max..1.1 * y_max)?;

    chart.configure_mesh().x_desc("orbits").draw()?;

    for &(label, points, color) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}
