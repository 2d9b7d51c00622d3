use std::env;

use blueroad::{cli, logging};

fn main() {
    logging::init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
