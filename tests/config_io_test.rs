//! Configuration files and CSV export on disk.

use std::fs;

use fv_rs::error::FvError;
use fv_rs::flux::FluxStrategy;
use fv_rs::io::{CsvError, write_components_csv, write_trajectory_csv_file};
use fv_rs::problems::{Problem, TwoBeamsProblem};
use fv_rs::simulation::{Simulation, SimulationConfig};
use fv_rs::solver::SlopeLimiter;
use fv_rs::time::TableauKind;
use tempfile::TempDir;

#[test]
fn test_config_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{
            "t_end": 0.25,
            "dt": 0.002,
            "save_interval": 0.05,
            "tableau": "heun",
            "flux": { "type": "godunov", "limiter": "van_leer" },
            "dt_search": { "initial_dt": 0.01 }
        }"#,
    )
    .unwrap();

    let config = SimulationConfig::from_json_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config.t_end, 0.25);
    assert_eq!(config.save_interval, Some(0.05));
    assert_eq!(config.tableau, TableauKind::Heun);
    assert_eq!(
        config.flux,
        FluxStrategy::Godunov {
            limiter: SlopeLimiter::VanLeer
        }
    );
    let search = config.dt_search.as_ref().unwrap();
    assert_eq!(search.initial_dt, 0.01);
    assert_eq!(search.probe_steps, 500);

    // Writing back and reading again gives the same configuration
    let copy = dir.path().join("copy.json");
    fs::write(&copy, config.to_json_string().unwrap()).unwrap();
    let reread = SimulationConfig::from_json_str(&fs::read_to_string(&copy).unwrap()).unwrap();
    assert_eq!(reread, config);
}

#[test]
fn test_config_rejects_unknown_tableau() {
    let err = SimulationConfig::from_json_str(r#"{ "tableau": "rk45" }"#).unwrap_err();
    assert!(matches!(err, FvError::ConfigParse(_)));
}

#[test]
fn test_run_and_export_components() {
    let problem = TwoBeamsProblem::new(2).unwrap().with_cells(20);
    let config = problem
        .default_config()
        .with_t_end(0.01)
        .with_dt(0.001)
        .with_save_interval(0.005)
        .with_record_initial(true);
    let result = Simulation::new(problem).with_config(config).run().unwrap();
    assert_eq!(result.trajectory.len(), 3);

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let paths = write_components_csv(&out, "beams", &result.mesh, &result.trajectory).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths[2].ends_with("beams_2.csv"));

    for path in &paths {
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Header plus one row per snapshot
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(','));
        assert_eq!(lines[0].split(',').count(), 21);
        assert!(lines[1].starts_with("0,"));
        for row in &lines[1..] {
            let values: Vec<f64> = row.split(',').map(|v| v.parse().unwrap()).collect();
            assert_eq!(values.len(), 21);
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn test_export_to_missing_directory_fails() {
    let problem = TwoBeamsProblem::new(1).unwrap().with_cells(10);
    let config = problem
        .default_config()
        .with_t_end(0.002)
        .with_dt(0.001)
        .with_save_interval(0.001);
    let result = Simulation::new(problem).with_config(config).run().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("u0.csv");
    let err = write_trajectory_csv_file(&path, &result.mesh, &result.trajectory, 0).unwrap_err();
    assert!(matches!(err, CsvError::Io(_)));
}
