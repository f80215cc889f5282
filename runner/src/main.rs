#[macro_use]
extern crate clap;

use clap::Arg;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("Sets the XML program file to interpret")
                .required(true)
                .index(1),
        )
        .get_matches();

    let path = matches.value_of("PROGRAM").unwrap();
    process::exit(taci_runner::run_file(path));
}
