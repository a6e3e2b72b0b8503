//! Converts `radshot.png` into the multi-resolution `radshot.ico` used as the
//! application icon.

use ico_builder::{BuildConfig, IconBuilder};
use std::path::Path;
use std::process::ExitCode;

const SOURCE_PATH: &str = "radshot.png";
const DESTINATION_PATH: &str = "radshot.ico";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    println!("Creating application icon...");
    let builder = IconBuilder::new(BuildConfig::default());
    let rendered = match builder.render(Path::new(SOURCE_PATH)) {
        Ok(rendered) => rendered,
        Err(err) => {
            println!("ERROR: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Some(warning) = rendered.warning() {
        println!("WARNING: {}", warning);
    }
    match rendered.write_to(Path::new(DESTINATION_PATH)) {
        Ok(report) => {
            println!("Created: {}", report.destination.display());
            println!("  Sizes: {}", report.size_summary());
        }
        Err(err) => {
            println!("ERROR: {}", err);
            return ExitCode::FAILURE;
        }
    }
    println!("Done!");
    ExitCode::SUCCESS
}
