/*
    Boids: local flocking rules after Craig Reynolds 1986, see http://www.red3d.com/cwr/
    Every step a boid blends its own velocity with its neighbourhood's average
    velocity and a mild pull towards, or push away from, the neighbourhood centre.
*/
extern crate nannou;

use anyhow::Context;
use boids_core::birdwatcher::Birdwatcher;
use boids_core::boid::Boid;
use boids_core::flock::Flock;
use boids_core::jitter::UniformJitter;
use boids_core::options::{FieldSize, OptionsError, RunOptions};
use clap::Parser;
use nannou::prelude::*;
use nannou_egui::{egui, Egui};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

mod cliargs;
use cliargs::Args;

/// how far back along its velocity a boid's heading line reaches
const HEADING_LENGTH: f64 = 10.;

fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    init_logging(args.debug);

    let config = cliargs::load_config(&mut args)?;
    let run_options = RunOptions::from(&config);
    run_options.validate().context("invalid configuration")?;
    anyhow::ensure!(config.fps > 0, "invalid configuration: fps must be at least 1");

    if args.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    if args.headless > 0 {
        let seed = cliargs::effective_seed(&config);
        log::info!("headless run of {} ticks, seed {}", args.headless, seed);

        let stats = boids_core::run_headless(args.headless, &run_options, seed)?;
        match stats.last() {
            Some(last) => print!("{}", serde_yaml::to_string(last)?),
            None => log::warn!(
                "no statistics sampled, run more ticks than the sample rate ({})",
                run_options.sample_rate
            ),
        }
        return Ok(());
    }

    nannou::app(model).update(update).run();

    Ok(())
}

fn init_logging(debug: bool) {
    if debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
}

struct ControlsState {
    execution_paused: bool,
    controls_open: bool,
}

struct Model {
    egui: Egui,
    flock: Flock,
    run_options: RunOptions,
    jitter: UniformJitter<Xoshiro256PlusPlus>,
    bird_watcher: Birdwatcher,
    seed: u64,
    boid_size: f32,
    fps: u8,
    last_update_micros: u128,
    last_step_micros: u128,
    since_last_update_micros: u128,
    update_ticks: u64,
    control_state: ControlsState,
}

fn model(app: &App) -> Model {
    let mut args = Args::parse();
    let config = match cliargs::load_config(&mut args) {
        Ok(config) => config,
        Err(err) => panic!("Error in configuration file:\n{:#}", err),
    };

    let run_options = RunOptions::from(&config);
    let seed = cliargs::effective_seed(&config);
    log::info!("seed {}, options {:?}", seed, run_options);

    let mut jitter =
        UniformJitter::new(Xoshiro256PlusPlus::seed_from_u64(seed), &run_options.jitter);
    let flock = match Flock::new(&run_options, jitter.rng_mut()) {
        Ok(flock) => flock,
        Err(err) => panic!("Invalid configuration: {}", err),
    };

    let main_window = app
        .new_window()
        .key_pressed(key_pressed)
        .closed(window_closed)
        .size(config.width, config.height)
        .title("boids flocking")
        .raw_event(raw_window_event)
        .view(view)
        .build()
        .expect("failed to build the main window");

    let window = app
        .window(main_window)
        .expect("main window closed before initialisation");

    Model {
        egui: Egui::from_window(&window),
        flock,
        bird_watcher: Birdwatcher::new(run_options.sample_rate),
        run_options,
        jitter,
        seed,
        boid_size: config.boid_size,
        fps: config.fps,
        last_update_micros: 0,
        last_step_micros: 0,
        since_last_update_micros: 0,
        update_ticks: 0,
        control_state: ControlsState {
            execution_paused: false,
            controls_open: false,
        },
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    record_update_timing(app, model);

    {
        let Model {
            ref mut egui,
            ref flock,
            ref bird_watcher,
            ref mut control_state,
            seed,
            update_ticks,
            since_last_update_micros,
            ..
        } = *model;

        // update stats UI
        egui.set_elapsed_time(update.since_start);
        let ctx = egui.begin_frame();
        let paused = control_state.execution_paused;
        egui::Window::new("stats")
            .default_size(egui::vec2(0.0, 200.0))
            .open(&mut control_state.controls_open)
            .show(&ctx, |ui| {
                ui.label(format!("Seed: {}", seed));
                ui.label(format!("No. boids: {n:3.}", n = flock.len()));
                ui.label(format!("No. ticks: {t:3.}", t = update_ticks));
                ui.label(format!(
                    "Time since last update: {t:2.2} ms",
                    t = since_last_update_micros as f64 / 1000.
                ));
                if paused {
                    ui.label("paused");
                }

                ui.separator();

                match bird_watcher.latest() {
                    Some(stats) => {
                        ui.label(format!("Mean speed: {:.3}", stats.mean_speed));
                        ui.label(format!("Velocity variance: {:.4}", stats.velocity_variance));
                        ui.label(format!("Mean neighbours: {:.2}", stats.mean_neighbours));
                        ui.label(format!("Pulled / pushed: {} / {}", stats.pulled, stats.pushed));
                    }
                    None => {
                        ui.label("no sample yet");
                    }
                }
            });
    }

    // update model
    if model.control_state.execution_paused || !should_step(model) {
        return;
    }

    let Model {
        ref mut flock,
        ref run_options,
        ref mut jitter,
        ref mut bird_watcher,
        ..
    } = *model;

    flock.update(run_options, jitter);
    bird_watcher.watch(flock);
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}

fn record_update_timing(app: &App, model: &mut Model) {
    let micros_now = app.duration.since_start.as_micros();
    model.since_last_update_micros = micros_now - model.last_update_micros;
    model.last_update_micros = micros_now;
}

/// Paces the simulation to `fps` steps per second, whatever the refresh rate
fn should_step(model: &mut Model) -> bool {
    let should_step =
        model.last_update_micros - model.last_step_micros >= 1_000_000 / model.fps.max(1) as u128;

    if should_step {
        model.update_ticks += 1;
        model.last_step_micros = model.last_update_micros;
    }

    should_step
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    match key {
        // pause the whole simulation
        Key::Space => {
            model.control_state.execution_paused = !model.control_state.execution_paused;
            log::info!(
                "simulation {}",
                if model.control_state.execution_paused { "paused" } else { "resumed" }
            );
        }
        // show/hide stats
        Key::C => model.control_state.controls_open = !model.control_state.controls_open,
        // restart the flock, not the simulation
        Key::R => {
            let Model {
                ref mut flock,
                ref run_options,
                ref mut jitter,
                ref mut bird_watcher,
                ref mut update_ticks,
                ..
            } = *model;

            match restart(flock, run_options, jitter, bird_watcher, update_ticks) {
                Ok(()) => log::info!("flock restarted"),
                Err(err) => log::error!("could not restart the flock: {}", err),
            }
        }
        Key::Escape => app.quit(),
        _ => {}
    }
}

/// Re-draws the flock and zeroes every tick counter
fn restart(
    flock: &mut Flock,
    run_options: &RunOptions,
    jitter: &mut UniformJitter<Xoshiro256PlusPlus>,
    bird_watcher: &mut Birdwatcher,
    update_ticks: &mut u64,
) -> Result<(), OptionsError> {
    flock.restart(run_options, jitter.rng_mut())?;
    bird_watcher.restart();
    *update_ticks = 0;
    Ok(())
}

fn window_closed(_app: &App, model: &mut Model) {
    match model.bird_watcher.latest() {
        Some(stats) => log::info!(
            "closing after {} ticks, last sample {:?}",
            model.update_ticks,
            stats
        ),
        None => log::info!("closing after {} ticks", model.update_ticks),
    }
}

pub trait Drawable {
    fn draw(&self, draw: &Draw, field: &FieldSize, boid_size: f32);
}

impl Drawable for Flock {
    fn draw(&self, draw: &Draw, field: &FieldSize, boid_size: f32) {
        for b in self.view().iter() {
            b.draw(draw, field, boid_size);
        }
    }
}

impl Drawable for Boid {
    fn draw(&self, draw: &Draw, field: &FieldSize, boid_size: f32) {
        let position = to_screen(self.position.x, self.position.y, field);
        let heading_end = to_screen(
            self.position.x - HEADING_LENGTH * self.velocity.x,
            self.position.y - HEADING_LENGTH * self.velocity.y,
            field,
        );

        draw.ellipse().xy(position).radius(boid_size).color(WHITE);

        draw.line()
            .start(position)
            .end(heading_end)
            .color(WHITE)
            .weight(1.0);
    }
}

/// Field coordinates have their origin in the top left corner with y pointing
/// down, nannou's are centred with y pointing up
fn to_screen(x: f64, y: f64, field: &FieldSize) -> Point2 {
    pt2(
        (x - field.width / 2.) as f32,
        (field.height / 2. - y) as f32,
    )
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();

    draw.background().color(BLACK);

    model.flock.draw(&draw, &model.run_options.field, model.boid_size);

    if let Err(err) = draw.to_frame(app, &frame) {
        log::warn!("failed to draw the flock: {:?}", err);
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        log::warn!("failed to draw the stats window: {:?}", err);
    }
}
