//! Inviscid Burgers equation on the periodic unit interval.
//!
//! Solves du/dt + d(u²/2)/dx = 0 with u(x, 0) = sin(2πx). The sine steepens
//! into a shock at t = 1/(2π) that then decays. Lax-Friedrichs flux with
//! forward Euler.
//!
//! Usage: `cargo run --example burgers_1d -- [t_end] [output_dir]`

use std::env;

use fv_rs::io::write_components_csv;
use fv_rs::problems::{BurgersProblem, Problem};
use fv_rs::simulation::Simulation;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut args = env::args().skip(1);
    let t_end: f64 = match args.next() {
        Some(s) => s.parse()?,
        None => 1.0,
    };
    let out_dir = args.next().unwrap_or_else(|| "output".to_string());

    let problem = BurgersProblem::default();
    let config = problem.default_config().with_t_end(t_end);

    println!("1D Burgers (finite volume)");
    println!("==========================");
    println!("Cells: {}", problem.n_cells);
    println!("dt: {}", config.dt);
    println!("Final time: {}", t_end);
    println!();

    let result = Simulation::new(problem).with_config(config).run()?;

    let mesh = &result.mesh;
    let mass = result.final_state.integrate(mesh)[0];
    let total_variation: f64 = (0..mesh.n_cells())
        .map(|k| {
            let next = (k + 1) % mesh.n_cells();
            (result.final_state.cell(next)[0] - result.final_state.cell(k)[0]).abs()
        })
        .sum();

    println!("Steps:           {}", result.n_steps);
    println!("Snapshots:       {}", result.trajectory.len());
    println!("max |u|:         {:.4}", result.final_state.max_abs());
    println!("Total variation: {:.4}", total_variation);
    println!("Mass:            {:.3e}", mass);
    println!("{}", result.context.summary_line());

    let paths = write_components_csv(&out_dir, "burgers", mesh, &result.trajectory)?;
    for path in paths {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
