mod demo;

use picocam::display::{Display, InputEvent, RenderTarget};
use picocam::util::FrameClock;
use picocam::{ConfigError, ConsoleConfig, DisplayError, RenderState, Runner};
use sdl2::keyboard::Keycode;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use demo::Demo;

const CONFIG_PATH: &str = "console.json";

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config file if present, defaults otherwise
fn load_config() -> ConsoleConfig {
    match ConsoleConfig::load(CONFIG_PATH) {
        Ok(config) => {
            info!(path = CONFIG_PATH, "config loaded");
            config
        },
        Err(ConfigError::Io(_)) => ConsoleConfig::default(),
        Err(err) => {
            warn!(%err, path = CONFIG_PATH, "ignoring config");
            ConsoleConfig::default()
        },
    }
}

/// Apply command line overrides on top of the loaded config
fn parse_args(config: &mut ConsoleConfig) {
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => config.vsync = false,
            "--scale" | "-s" => {
                if i + 1 < args.len() {
                    if let Ok(s) = args[i + 1].parse::<u32>() {
                        config.scale = s.max(1);
                    }
                    i += 1;
                }
            },
            "--fps" | "-f" => {
                if i + 1 < args.len() {
                    if let Ok(f) = args[i + 1].parse::<u32>() {
                        config.target_fps = f.max(1);
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: picocam [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --scale N, -s N   Window pixels per screen pixel (default: {})", config.scale);
                println!("  --fps N, -f N     Target frame rate (default: {})", config.target_fps);
                println!("  --no-vsync        Disable VSync");
                println!("  --help            Show this help message");
                println!();
                println!("Settings are read from {} when it exists.", CONFIG_PATH);
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }
}

fn main() -> Result<(), DisplayError> {
    setup_logging();

    let mut config = load_config();
    parse_args(&mut config);

    let (window_w, window_h) = config.window_size();
    let (mut display, texture_creator) =
        Display::with_options("picocam", window_w, window_h, config.vsync)?;
    let mut target =
        RenderTarget::with_size(&texture_creator, config.screen_width, config.screen_height)?;

    let mut gfx = RenderState::new(config.screen_width, config.screen_height);
    if let Err(err) = gfx.set_camera_options(config.camera) {
        warn!(%err, "camera options from config");
    }
    let mut runner = Runner::new(gfx);
    let mut clock = FrameClock::new(config.target_fps, 30);

    let mut cart = Demo::new();
    runner.start(&mut cart);

    info!(
        width = config.screen_width,
        height = config.screen_height,
        fps = config.target_fps,
        scale = config.scale,
        "running"
    );
    println!("Controls: arrows move, Z/C/N colour, X/V/M follow axis, F fps, Escape quits");

    let mut show_fps = false;

    'main: loop {
        let (_dt, avg_fps) = clock.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::F) => show_fps = !show_fps,
                _ => {},
            }
        }

        cart.set_fps(if show_fps { avg_fps as u32 } else { 0 });
        let pressed = display.pressed_buttons();
        runner.step(&mut cart, &pressed);

        display.present(&mut target, runner.gfx_mut().pixel_buffer_mut())?;
        clock.wait();
    }

    info!(frames = runner.frame(), "bye");
    Ok(())
}
