use approx::assert_relative_eq;
use aquifer_convolve::StressModel;
use aquifer_model::{CONSTANT_NAME, Model, ModelError, ModelSettings};
use aquifer_recharge::Recharge;
use aquifer_rfunc::ResponseFunction;
use aquifer_series::TimeSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

fn regular(start: f64, values: Vec<f64>) -> TimeSeries {
    TimeSeries::regular(start, 1.0, values).unwrap()
}

fn constant_stress_model(warmup: f64) -> Model {
    let obs = regular(0.0, vec![0.0; 50]);
    let stress = regular(0.0, vec![2.0; 50]);
    let sm = StressModel::new("well", stress, ResponseFunction::Exponential).unwrap();
    Model::new(obs)
        .unwrap()
        .with_stress_model(sm)
        .unwrap()
        .with_settings(ModelSettings::new().with_warmup(warmup))
        .unwrap()
}

#[test]
fn warmup_is_filled_with_stress_mean() {
    let p = [1.5, 10.0, 0.0];

    let spun_up = constant_stress_model(3650.0).simulate(&p, 0.0, 49.0).unwrap();
    // Steady state up to the kernel cutoff.
    let first = spun_up.values()[0];
    assert_relative_eq!(first, 3.0, epsilon = 5e-3);
    for v in spun_up.values() {
        assert_relative_eq!(*v, first, epsilon = 1e-12);
    }

    let cold = constant_stress_model(0.0).simulate(&p, 0.0, 49.0).unwrap();
    assert_relative_eq!(
        cold.values()[0],
        3.0 * (1.0 - (-0.1f64).exp()),
        epsilon = 1e-12
    );
    assert!(cold.values()[0] < cold.values()[49]);
}

#[test]
fn gap_before_stress_is_filled_with_mean_not_zero() {
    // Stress starts at day 100 and alternates 1, 5 (mean 3).
    let obs = regular(0.0, vec![0.0; 200]);
    let values: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { 5.0 }).collect();
    let stress = regular(100.0, values);
    let sm = StressModel::new("rain", stress, ResponseFunction::Exponential).unwrap();
    let model = Model::new(obs)
        .unwrap()
        .with_stress_model(sm)
        .unwrap()
        .with_settings(ModelSettings::new().with_warmup(0.0))
        .unwrap();

    let p = [1.0, 20.0, 0.0];
    let h = model.contribution("rain", &p, 0.0, 199.0).unwrap();
    let step = model.step_response("rain", &p).unwrap();
    assert!(step.len() > 100);
    for i in 0..100 {
        assert_relative_eq!(h.values()[i], 3.0 * step[i], epsilon = 1e-9);
    }
    assert!(h.values()[50] > 0.0);
}

#[test]
fn constant_shifts_head() {
    let model = constant_stress_model(365.0);
    let base = model.simulate(&[1.0, 10.0, 0.0], 0.0, 49.0).unwrap();
    let shifted = model.simulate(&[1.0, 10.0, 4.5], 0.0, 49.0).unwrap();
    for (a, b) in base.values().iter().zip(shifted.values()) {
        assert_relative_eq!(b - a, 4.5, epsilon = 1e-12);
    }
}

#[test]
fn nan_parameters_propagate() {
    let model = constant_stress_model(365.0);
    let head = model.simulate(&[1.0, f64::NAN, 0.0], 0.0, 49.0).unwrap();
    assert!(head.values().iter().all(|v| v.is_nan()));
    let sse = model.sse(&[f64::NAN, 10.0, 0.0], None, None, false).unwrap();
    assert!(sse.is_nan());
}

#[test]
fn wrong_parameter_count() {
    let model = constant_stress_model(0.0);
    assert!(matches!(
        model.simulate(&[1.0, 10.0], 0.0, 10.0),
        Err(ModelError::ParameterCount { expected: 3, got: 2 })
    ));
}

fn recharge_model(seed: u64) -> Model {
    let mut rng = StdRng::seed_from_u64(seed);
    let rain = Exp::new(0.5).unwrap();
    let n = 800;
    let precip: Vec<f64> = (0..n)
        .map(|_| if rng.random_range(0.0..1.0) < 0.4 { rain.sample(&mut rng) } else { 0.0 })
        .collect();
    let evap: Vec<f64> = (0..n)
        .map(|i| 2.0 + 1.5 * (2.0 * std::f64::consts::PI * i as f64 / 365.0).sin())
        .collect();
    let times: Vec<f64> = vec![400.0, 402.5, 410.0, 433.25, 500.0, 611.0, 799.0];
    let obs = TimeSeries::new(times, vec![10.0, 10.2, 10.1, 9.8, 9.9, 10.4, 10.0]).unwrap();
    let sm = StressModel::recharge(
        "recharge",
        regular(0.0, precip),
        regular(0.0, evap),
        ResponseFunction::Gamma,
        Recharge::flex(),
    )
    .unwrap();
    Model::new(obs)
        .unwrap()
        .with_stress_model(sm)
        .unwrap()
        .with_settings(ModelSettings::new().with_warmup(365.0))
        .unwrap()
}

#[test]
fn recharge_model_is_deterministic() {
    let model = recharge_model(7);
    let p = model.optimal_values();
    let a = model.simulate(&p, 400.0, 799.0).unwrap();
    let b = model.simulate(&p, 400.0, 799.0).unwrap();
    assert_eq!(a, b);
    assert!(a.values().iter().all(|v| v.is_finite()));
    assert_eq!(
        model.parameters().names().last().copied(),
        Some(CONSTANT_NAME)
    );
}

#[test]
fn residuals_interpolate_between_grid_points() {
    let model = recharge_model(11);
    let p = model.optimal_values();
    let head = model.simulate(&p, 400.0, 799.0).unwrap();
    let r = model.residuals(&p, None, None).unwrap();
    assert_eq!(r.len(), 7);

    let h = head.values();
    // 402.5 lies halfway between grid points 2 and 3.
    let sim = 0.5 * (h[2] + h[3]);
    assert_relative_eq!(r.values()[1], 10.2 - sim, epsilon = 1e-10);
    // 433.25 lies a quarter of the way from 33 to 34.
    let sim = h[33] + 0.25 * (h[34] - h[33]);
    assert_relative_eq!(r.values()[3], 9.8 - sim, epsilon = 1e-10);
    assert_relative_eq!(r.values()[4], 9.9 - h[100], epsilon = 1e-10);
}

#[test]
fn window_restricts_residuals() {
    let model = recharge_model(3);
    let p = model.optimal_values();
    let r = model.residuals(&p, Some(402.5), Some(500.0)).unwrap();
    assert_eq!(r.times(), &[402.5, 410.0, 433.25, 500.0]);
    assert!(matches!(
        model.residuals(&p, Some(100.0), None),
        Err(ModelError::WindowOutsideObservations { which: "tmin", .. })
    ));
}
