// Main entry point - all the logic is in lib.rs

use figure_mover::run;

fn main() {
    if let Err(err) = run() {
        log::error!("{err:#}");
        std::process::exit(-1);
    }
}
