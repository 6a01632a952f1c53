use std::{env, io, process};
use std::error::Error;
use std::io::ErrorKind;
use xpmload::loader;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = env::args().collect::<Vec<String>>();
    let program = args.first().map(String::as_str).unwrap_or("xpmload");
    let Some(image_file) = args.get(1) else {
        eprintln!("usage: {program} <file.xpm>");
        return Err(Box::new(io::Error::new(ErrorKind::InvalidInput, "Not enough arguments!")));
    };
    let table = match loader::load(image_file) {
        Ok(table) => table,
        Err(e) => {
            log::error!("loading {image_file} failed with status {}", e.status());
            eprintln!("{program}: {e}");
            process::exit(1);
        }
    };
    loader::print_rows(&table, &mut io::stdout().lock())?;
    Ok(())
}
