use approx::assert_relative_eq;
use sailsim::{
    components::{inflow::FlowField, puff::WindPuff},
    config::{PuffGeneratorConfig, PuffTaper, ScenarioConfig},
    environment::Environment,
};

fn beam_reach() -> ScenarioConfig {
    let mut scenario = ScenarioConfig::default();
    // Wind blowing toward +Y, across a boat heading along +X
    scenario.environment.wind.speed = 6.;
    scenario.environment.wind.direction = -90.;
    scenario.vessels[0].aero_foils[0].trim = -45.;
    scenario
}

fn run(scenario: &ScenarioConfig, n_steps: usize) -> Environment {
    let mut environment = Environment::from_scenario(scenario).unwrap();
    for _ in 0..n_steps {
        environment.update(scenario.time_step);
    }
    environment
}

#[test]
fn test_beam_reach_makes_way() {
    let scenario = beam_reach();
    let environment = run(&scenario, 500);
    let vessel = &environment.vessels()[0];

    let position = vessel.frame().position;
    let velocity = vessel.body().velocity();
    assert!(position.iter().chain(velocity.iter()).all(|v| v.is_finite()));
    assert!(position[0] > 2., "x = {}", position[0]);
    assert!(vessel.speed() > 0.3, "speed = {}", vessel.speed());
    assert!(vessel.heel_deg().abs() < 45., "heel = {}", vessel.heel_deg());

    // Heave and pitch are locked for a surface vessel
    assert_eq!(position[2], 0.);
    assert_eq!(velocity[2], 0.);
}

#[test]
fn test_sail_lift_on_first_tick() {
    let scenario = beam_reach();
    let environment = run(&scenario, 1);
    let vessel = &environment.vessels()[0];
    let sail = &vessel.aero_foils()[0];

    // Trimmed 45 degrees off the wind
    assert_relative_eq!(sail.load().aoa, 45., epsilon = 1e-9);
    assert!(sail.load().force[0] > 0.);
    assert!(sail.load().force[1] > 0.);
    assert!(vessel.body().velocity()[0] > 0.);
}

#[test]
fn test_calm_scenario_is_static() {
    let mut scenario = ScenarioConfig::default();
    scenario.environment.wind.speed = 0.;
    let environment = run(&scenario, 50);
    let vessel = &environment.vessels()[0];
    assert_eq!(vessel.frame().position, [0.; 3]);
    assert_eq!(vessel.body().velocity(), [0.; 3]);
    assert!(vessel.foils().all(|foil| foil.load().force == [0.; 3]));
}

#[test]
fn test_gusty_runs_are_bit_identical() {
    let mut scenario = beam_reach();
    scenario.environment.wind.puffs = Some(PuffGeneratorConfig {
        seed: 42,
        interval: 2.,
        upwind_distance: 30.,
        lateral_spread: 5.,
        ..Default::default()
    });

    let a = run(&scenario, 1000);
    let b = run(&scenario, 1000);
    assert!(!a.wind().puffs().is_empty());

    let (va, vb) = (&a.vessels()[0], &b.vessels()[0]);
    let bits = |values: &[f64]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(
        bits(&va.frame().position),
        bits(&vb.frame().position)
    );
    assert_eq!(
        bits(&va.frame().orientation.as_vec()),
        bits(&vb.frame().orientation.as_vec())
    );
    assert_eq!(bits(&va.body().velocity()), bits(&vb.body().velocity()));
    assert_eq!(
        bits(&va.body().angular_velocity()),
        bits(&vb.body().angular_velocity())
    );
    assert_eq!(a.wind().puffs().len(), b.wind().puffs().len());
}

#[test]
fn test_puff_over_boat_raises_wind() {
    let mut environment = Environment::from_scenario(&beam_reach()).unwrap();
    let mast = [0.5, 0., 2.];
    let before = environment.wind().flow_velocity(&mast);

    // Puff travelling with the wind, leading edge just past the boat
    environment.wind_mut().add_puff(WindPuff::new(
        [0., 5.],
        [0., 2.],
        20.,
        30.,
        20.,
        100.,
        PuffTaper::none(),
    ));
    let after = environment.wind().flow_velocity(&mast);
    assert!(after[1] > before[1]);
}

#[test]
fn test_scenario_from_yaml() {
    let yaml = r#"
environment:
  wind:
    speed: 4.0
    direction: -90.0
  water:
    speed: 0.5
    direction: 180.0
vessels:
  - name: alpha
  - name: bravo
    body:
      position: [0.0, 20.0, 0.0]
time_step: 0.05
duration: 2.0
"#;
    let scenario = ScenarioConfig::from_yaml_str(yaml).unwrap();
    let n_steps = scenario.n_steps().unwrap();
    assert_eq!(n_steps, 40);

    let environment = run(&scenario, n_steps);
    assert_relative_eq!(environment.time(), 2., epsilon = 1e-9);
    assert_eq!(environment.vessels().len(), 2);
    let bravo = environment.vessel_by_name("bravo").unwrap();
    assert!(bravo.frame().position[1] > 15.);
    assert!(environment.vessel_by_name("charlie").is_none());
}
