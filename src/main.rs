use std::collections::HashMap;

use clap::{App, AppSettings, Arg, SubCommand};

use granular_dem::{
    dimension::DimensionUtils3d,
    floating_type_mod::FT,
    properties::{SceneConfig, SimulationParams},
    simulation::Counter,
    DemSimulation,
};

const CARGO_PKG_AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");
const CARGO_PKG_VERSION: &'static str = env!("CARGO_PKG_VERSION");
const CARGO_PKG_DESCRIPTION: &'static str = env!("CARGO_PKG_DESCRIPTION");

fn main() {
    let matches = App::new("Granular DEM Simulation")
        .version(CARGO_PKG_VERSION)
        .author(CARGO_PKG_AUTHORS)
        .about(CARGO_PKG_DESCRIPTION)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("run")
                .about("Run simulation with given config")
                .arg(
                    Arg::with_name("SIMULATION_CONFIG")
                        .help("Sets the simulation parameters")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("SCENE_CONFIG")
                        .help("Scene setup: initial particles and inlet layers")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("MAX_SECONDS")
                        .long("max-seconds")
                        .short("s")
                        .required(false)
                        .takes_value(true)
                        .help("Stop simulation after the given amount of simulated seconds"),
                )
                .arg(
                    Arg::with_name("OVERWRITE_CONFIG_FILE")
                        .long("overwrite-config-file")
                        .short("c")
                        .required(false)
                        .takes_value(true)
                        .help("Overwrite config"),
                ),
        )
        .get_matches();

    if let Some(run_matches) = matches.subcommand_matches("run") {
        let parameter_file = run_matches
            .value_of("SIMULATION_CONFIG")
            .expect("missing simulation config");
        let params_yaml = std::fs::read_to_string(parameter_file).expect("failed reading parameter file");
        let mut simulation_params_serde: serde_yaml::Value =
            serde_yaml::from_str(&params_yaml).expect("failed parsing simulation config file");

        if let Some(overwrite_value_config) = run_matches.value_of("OVERWRITE_CONFIG_FILE") {
            let overwrite_config_str =
                std::fs::read_to_string(overwrite_value_config).expect("failed reading parameter file");
            let overwrite_config_file: HashMap<String, serde_yaml::Value> =
                serde_yaml::from_str(&overwrite_config_str).expect("failed parsing simulation config file");
            for (k, v) in overwrite_config_file.into_iter() {
                let mapping = simulation_params_serde
                    .as_mapping_mut()
                    .expect("cannot get parsed simulation parameters as mapping");
                *mapping
                    .get_mut(&serde_yaml::Value::String(k.clone()))
                    .unwrap_or_else(|| panic!("not able to find attribute {}", k)) = v;
            }
        }

        let simulation_params: SimulationParams<3> =
            serde_yaml::from_value(simulation_params_serde).expect("failed to unpack SimulationParams");
        println!("{:?}", simulation_params);

        let scene_file_path = run_matches.value_of("SCENE_CONFIG").expect("missing scene config");
        let scene_yaml = std::fs::read_to_string(scene_file_path).expect("failed reading scene file");
        let scene_config: SceneConfig<3> =
            serde_yaml::from_str(&scene_yaml).expect("failed parsing scene config file");
        println!("{:?}", scene_config);

        let max_seconds = run_matches.value_of("MAX_SECONDS").map(|x| x.parse::<FT>().unwrap());

        run(simulation_params, scene_config, max_seconds);
    } else {
        unreachable!()
    }
}

fn run(simulation_params: SimulationParams<3>, scene_config: SceneConfig<3>, max_seconds: Option<FT>) {
    let mut simulation = DemSimulation::<DimensionUtils3d, 3>::new(simulation_params, scene_config)
        .expect("failed to initialize simulation");

    let mut step_msecs = Counter::new();

    loop {
        let a = std::time::Instant::now();
        let report = simulation.single_step().expect("simulation step failed");
        let b = std::time::Instant::now();
        let msecs = (b - a).as_secs_f32() as FT * 1000.;
        step_msecs.add(msecs);

        println!(
            "{:05}: t={:.4} {} particles {} contacts +{} -{} {:.3}msec ({:.3}msec AVG)",
            simulation.step_count(),
            report.time,
            report.num_particles,
            report.num_contacts,
            report.num_injected,
            report.num_erased,
            msecs,
            step_msecs.avg(),
        );

        if let Some(max_seconds) = max_seconds {
            if simulation.time() >= max_seconds {
                break;
            }
        }
    }
}
