mod audio;
mod config;
mod error;
mod library;
mod playback;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
