extern crate ico_builder;

use ico_builder::IconDir;
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

fn main() {
    if env::args().count() != 3 {
        println!("Usage: ico2png <path> <size>");
        return;
    }
    let ico_path = env::args().nth(1).unwrap();
    let ico_path = Path::new(&ico_path);
    let size: u32 = env::args().nth(2).unwrap().parse().expect("invalid size");
    let ico_file = BufReader::new(File::open(ico_path)
                                      .expect("failed to open ICO file"));
    let icon_dir = IconDir::read(ico_file).expect("failed to read ICO file");
    let image = icon_dir.get_icon_with_size(size, size)
                        .expect("failed to decode image");
    let png_path = ico_path.with_extension(format!("{}x{}.png", size, size));
    let png_file = BufWriter::new(File::create(png_path)
                                      .expect("failed to create PNG file"));
    image.write_png(png_file).expect("failed to write PNG file");
}
