//! Creates an ICO file from a PNG (or any other raster image the `image`
//! crate can decode).
//!
//! To create an ICO file with the default sizes (256, 48, 32 and 16), run:
//!
//! ```shell
//! cargo run --example png2ico <path/to/file.png>
//! # ICO will be saved to path/to/file.ico
//! ```
//!
//! To choose the sizes yourself, list them after the path:
//!
//! ```shell
//! cargo run --example png2ico <path/to/file.png> 64 32 16
//! ```

extern crate ico_builder;

use ico_builder::{BuildConfig, IconBuilder};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        println!("Usage: png2ico <path> [<size>...]");
        return;
    }
    let png_path = Path::new(&args[0]);
    let config = if args.len() > 1 {
        let sizes = args[1..]
            .iter()
            .map(|arg| arg.parse::<u32>().expect("sizes must be integers"))
            .collect();
        BuildConfig::with_sizes(sizes)
    } else {
        BuildConfig::default()
    };
    let ico_path = png_path.with_extension("ico");
    match IconBuilder::new(config).build(png_path, &ico_path) {
        Ok(report) => {
            println!("Created {} ({})",
                     report.destination.display(),
                     report.size_summary());
        }
        Err(err) => {
            println!("ERROR: {}", err);
            process::exit(1);
        }
    }
}
