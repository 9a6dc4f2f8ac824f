use std::{fs, path::Path};

use chrono::Local;
use clap_serde_derive::{clap::Parser, ClapSerde};
use log::{error, info, warn};
use murmur_lib::{
    catalog::{render_text, Catalog, CatalogError},
    options::{RunOptions, Variant, Viewport},
    simulation::Simulation,
    transit::Line,
};
use nannou::prelude::*;

mod canvas;
mod cliargs;
use canvas::NannouCanvas;
use cliargs::{Args, Config};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    nannou::app(model).update(update).run();
}

struct Model {
    run_options: RunOptions,
    /// `None` until the window has an area to draw on
    sim: Option<Simulation>,
    card: Option<wgpu::Texture>,
    catalog: Result<Catalog, CatalogError>,
    catalog_line: Line,
    catalog_text: String,
    show_catalog: bool,
    paused: bool,
}

fn load_config(args: &mut Args) -> Config {
    let path = &args.config_path;
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        // no config file, only what was given on the command line
        Err(_) => return Config::from(&mut args.config),
    };

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str::<<Config as ClapSerde>::Opt>(&contents).map_err(|e| e.to_string())
    } else {
        toml::from_str::<<Config as ClapSerde>::Opt>(&contents).map_err(|e| e.to_string())
    };

    match parsed {
        // flags given on the command line win over the file
        Ok(config) => Config::from(config).merge(&mut args.config),
        Err(err) => panic!("Error in configuration file {}:\n{}", path.display(), err),
    }
}

fn run_options(config: &Config) -> RunOptions {
    let variant = config.variant.parse::<Variant>().unwrap_or_else(|e| {
        warn!("{e}, falling back to the baseline variant");
        Variant::Baseline
    });

    let mut run_options = RunOptions::for_variant(variant);
    run_options.boids_per_flock = config.boids;
    run_options.initial_free_fraction = config.free_fraction.clamp(0., 1.);
    run_options.seed = (config.seed != 0).then_some(config.seed);
    run_options
}

fn load_card(app: &App, path: &str) -> Option<wgpu::Texture> {
    if !Path::new(path).exists() {
        info!("no card sprite at {path}, drawing birds");
        return None;
    }
    match wgpu::Texture::from_path(app, path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            warn!("could not load card sprite {path}: {e}, drawing birds");
            None
        }
    }
}

fn window_viewport(app: &App) -> Viewport {
    let rect = app.window_rect();
    Viewport::new(rect.w(), rect.h())
}

fn try_setup(viewport: Viewport, run_options: &RunOptions) -> Option<Simulation> {
    match Simulation::setup(viewport, run_options.clone()) {
        Ok(sim) => Some(sim),
        Err(e) => {
            error!("{e}");
            None
        }
    }
}

fn model(app: &App) -> Model {
    let mut args = Args::parse();
    let config = load_config(&mut args);
    let run_options = run_options(&config);

    app.new_window()
        .size(config.init_width, config.init_height)
        .title("murmuration")
        .key_pressed(key_pressed)
        .view(view)
        .build()
        .unwrap();

    let catalog = Catalog::load(&config.catalog);
    if let Err(e) = &catalog {
        warn!("{e} ({})", config.catalog);
    }
    let catalog_line = config.line.parse::<Line>().unwrap_or_else(|e| {
        warn!("{e}, showing the 1/2/3");
        Line::L123
    });

    Model {
        sim: try_setup(window_viewport(app), &run_options),
        run_options,
        card: load_card(app, &config.card),
        catalog_text: render_text(catalog_line, &catalog),
        catalog,
        catalog_line,
        show_catalog: config.show_catalog,
        paused: false,
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    if model.paused {
        return;
    }

    let viewport = window_viewport(app);
    // a window that started minimised gets its simulation once it has an area
    if model.sim.is_none() && viewport.is_drawable() {
        model.sim = try_setup(viewport, &model.run_options);
    }

    if let Some(sim) = model.sim.as_mut() {
        sim.resize(viewport);
        sim.step(&Local::now().time());
    }
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    let line = match key {
        Key::Space => {
            model.paused = !model.paused;
            return;
        }
        Key::C => {
            model.show_catalog = !model.show_catalog;
            return;
        }
        Key::Key1 => Line::L123,
        Key::Key2 => Line::L456,
        Key::Key3 => Line::Nqr,
        _ => return,
    };

    if line != model.catalog_line {
        model.catalog_line = line;
        model.catalog_text = render_text(line, &model.catalog);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let viewport = window_viewport(app);

    match &model.sim {
        Some(sim) => {
            let mut canvas = NannouCanvas::new(&draw, viewport, model.card.as_ref());
            sim.render(&mut canvas);
        }
        None => {
            draw.background().rgb(0., 0., 0.);
        }
    }

    if model.show_catalog {
        draw_catalog(&draw, viewport, model);
    }

    draw.to_frame(app, &frame).unwrap();
}

fn draw_catalog(draw: &Draw, viewport: Viewport, model: &Model) {
    let [r, g, b] = model.catalog_line.base_color();
    let width = (viewport.width / 3.).max(200.);
    let left = -viewport.width / 2. + 16.;
    let top = viewport.height / 2. - 16.;

    draw.text(&format!("line {}  (1/2/3 to switch)", model.catalog_line))
        .x_y(left + width / 2., top - 8.)
        .w_h(width, 16.)
        .left_justify()
        .color(rgb(r / 255., g / 255., b / 255.))
        .font_size(14);

    draw.text(&model.catalog_text)
        .x_y(left + width / 2., top - 24. - viewport.height / 4.)
        .w_h(width, viewport.height / 2.)
        .left_justify()
        .align_text_top()
        .color(rgba(1., 1., 1., 0.8))
        .font_size(11);
}
