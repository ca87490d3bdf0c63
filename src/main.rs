use winit::event_loop::{ControlFlow, EventLoop};

use ink_trail::app::App;
use ink_trail::config::HEADLESS_DEFAULT_FRAMES;
use ink_trail::headless;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    if let Some(flag) = args.next() {
        if flag != "--headless" {
            eprintln!("Usage: ink-trail [--headless [frames]]");
            std::process::exit(2);
        }
        let frames = match args.next().map(|n| n.parse::<u32>()) {
            None => HEADLESS_DEFAULT_FRAMES,
            Some(Ok(n)) => n,
            Some(Err(e)) => {
                eprintln!("Invalid frame count: {}", e);
                std::process::exit(2);
            }
        };
        if let Err(e) = headless::run(frames) {
            log::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
