use std::{env, io, process};
use std::error::Error;
use std::io::ErrorKind;
use xpmload::{display, loader};
use xpmload::raster::Raster;

fn load_raster(path: &str) -> Result<Raster, Box<dyn Error>> {
    let table = loader::load(path)?;
    Ok(Raster::from_table(&table)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = env::args().collect::<Vec<String>>();
    let program = args.first().map(String::as_str).unwrap_or("xpmview");
    let Some(image_file) = args.get(1) else {
        eprintln!("usage: {program} <file.xpm>");
        return Err(Box::new(io::Error::new(ErrorKind::InvalidInput, "Not enough arguments!")));
    };
    let raster = match load_raster(image_file) {
        Ok(raster) => raster,
        Err(e) => {
            eprintln!("{program}: {e}");
            process::exit(1);
        }
    };
    print!("{}", raster.to_ansi());
    display::display_raster(&raster, image_file)
}
