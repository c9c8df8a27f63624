//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = travelmap_cli::run() {
        eprintln!("travelmap: {err}");
        std::process::exit(1);
    }
}
