//! # Control Loop Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bal_lib::{
    bal_ctrl,
    ctrl_loop::{self, CtrlLoop},
    loco_ctrl::{self, optimise_module, ModuleVel},
};
use comms_if::{eqpt::plant::PlantState, tc::DriveCmd};
use util::module::State;

fn ctrl_loop_benchmark(c: &mut Criterion) {
    // ---- Build a loop with the shipped vehicle constants ----

    let bal_params = bal_ctrl::Params {
        gain_k: vec![-410.72027632491324, -25.802795633812845, -19.99999999999691],
        integrator_limit_ms: None,
        com_height_m: 0.3,
        mass_kg: 16.0,
        gravity_ms2: 9.81,
    };
    let loco_params = loco_ctrl::Params::default();

    let mut ctrl = CtrlLoop::new(
        &bal_params,
        loco_params.clone(),
        ctrl_loop::Params::default()
    ).unwrap();

    let mut state = PlantState::default();
    state.tilt_rad = 0.01;
    state.tilt_rate_rads = -0.05;
    state.vel_ms = [0.4, 0.02];
    state.str_pos_rad = [0.1, -0.1];

    let cmd = DriveCmd {
        fwd: 0.5,
        orth: 0.0,
        head_rate: 0.2,
    };

    let mut time_s = 0.0;

    // Bench a full tick
    c.bench_function("CtrlLoop::proc", |b| {
        b.iter(|| {
            time_s += 1.0 / 240.0;
            ctrl.proc(black_box(&ctrl_loop::InputData { time_s, state, cmd })).unwrap()
        })
    });

    // Bench a single module optimisation
    let vel = ModuleVel { fwd_ms: -0.5, orth_ms: 0.3 };
    c.bench_function("optimise_module", |b| {
        b.iter(|| optimise_module(black_box(&vel), black_box(2.9), &loco_params))
    });
}

criterion_group!(benches, ctrl_loop_benchmark);
criterion_main!(benches);
