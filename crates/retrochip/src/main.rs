fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom_path = args.next().unwrap_or_default();
    if rom_path.is_empty() {
        eprintln!(
            "No ROM path provided.\n\
             Please specify a path, for example:\n\
             retrochip path/to/your.c16"
        );
        std::process::exit(1);
    }

    log::info!("Playing ROM path: '{}'", rom_path);
    let rom = std::fs::read(&rom_path).expect("Failed to read ROM file");

    retrochip::run(&rom).unwrap();
}
