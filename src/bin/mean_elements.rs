use std::error::Error;

use clap::{Parser, ValueEnum};
use rust_orbprop::astro::{HasMass, KeplerianElements, Orbit, SpacecraftState};
use rust_orbprop::gravity::ZonalField;
use rust_orbprop::propagation::{
    BrouwerLyddanePropagator, EcksteinHechlerPropagator, PropagationType, Propagator,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Theory {
    BrouwerLyddane,
    EcksteinHechler,
}

/// Converts osculating Keplerian elements around the Earth into mean
/// elements, and propagates them for a while.
#[derive(Debug, Parser)]
struct Args {
    /// Semi-major axis, in km
    a: f64,
    /// Eccentricity
    e: f64,
    /// Inclination, in degrees
    i: f64,
    /// Right ascension of the ascending node, in degrees
    #[arg(long, default_value_t = 0.0)]
    raan: f64,
    /// Argument of perigee, in degrees
    #[arg(long, default_value_t = 0.0)]
    arg_perigee: f64,
    /// Mean anomaly, in degrees
    #[arg(long, default_value_t = 0.0)]
    mean_anomaly: f64,
    #[arg(long, value_enum, default_value_t = Theory::BrouwerLyddane)]
    theory: Theory,
    /// Also print the osculating state this many seconds later
    #[arg(long)]
    propagate: Option<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let field = ZonalField::earth();
    let elements = KeplerianElements {
        a: args.a * 1000.0,
        e: args.e,
        i: args.i.to_radians(),
        raan: args.raan.to_radians(),
        arg_perigee: args.arg_perigee.to_radians(),
        mean_anomaly: args.mean_anomaly.to_radians(),
    };
    let orbit = Orbit::from_keplerian(elements, 0.0, field.mu())?;
    let state = SpacecraftState::new(orbit);

    let propagator: Box<dyn Propagator> = match args.theory {
        Theory::BrouwerLyddane => {
            let propagator =
                BrouwerLyddanePropagator::new(state, field, PropagationType::Osculating)?;
            print_elements("Mean elements", &propagator.mean_orbit()?.to_keplerian());
            Box::new(propagator)
        }
        Theory::EcksteinHechler => {
            let propagator =
                EcksteinHechlerPropagator::new(state, field, PropagationType::Osculating)?;
            print_elements("Mean elements", &propagator.mean_orbit()?.to_keplerian());
            Box::new(propagator)
        }
    };

    if let Some(dt) = args.propagate {
        let state = propagator.propagate(dt)?;
        print_elements(
            &format!("Osculating elements after {} s", dt),
            &state.orbit().to_keplerian(),
        );
    }

    Ok(())
}

fn print_elements(title: &str, elements: &KeplerianElements) {
    println!("{}", title);
    println!("- Semi-major axis: {} km", elements.a / 1000.0);
    println!("- Eccentricity: {}", elements.e);
    println!("- Inclination: {}", elements.i.to_degrees());
    println!("- RAAN: {}", elements.raan.to_degrees());
    println!("- Argument of perigee: {}", elements.arg_perigee.to_degrees());
    println!("- Mean anomaly: {}", elements.mean_anomaly.to_degrees());
    println!();
}
