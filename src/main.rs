use std::process;

fn main() {
    if let Err(e) = sailplan::cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
