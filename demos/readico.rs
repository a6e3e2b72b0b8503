extern crate ico_builder;

use ico_builder::IconDir;
use std::env;
use std::fs::File;
use std::io::BufReader;

fn main() {
    if env::args().count() != 2 {
        println!("Usage: readico <path>");
        return;
    }
    let path = env::args().nth(1).unwrap();
    let file = File::open(path).expect("failed to open file");
    let buffered = BufReader::new(file);
    let icon_dir = IconDir::read(buffered).expect("failed to read ICO file");
    println!("{} file contains {} entry(s).",
             icon_dir.resource_type(),
             icon_dir.entries().len());
    for (index, entry) in icon_dir.entries().iter().enumerate() {
        println!("Entry {}: {}x{} {} ({} byte payload)",
                 index,
                 entry.width(),
                 entry.height(),
                 entry.encoding(),
                 entry.data().len());
    }
}
