// When 'lib.rs' exists, cargo treats 'main.rs' as a separate crate
use reify_common::report_error::Reportable;
use reify_compiler::cli::Config;
use reify_compiler::handle_config;

use std::io;

fn main() {
    better_panic::install();

    if cfg!(debug_assertions) {
        colog::default_builder()
            .filter_level(log::LevelFilter::Trace)
            .init();
    } else {
        colog::default_builder().init();
    }

    let config = Config::from_args();
    let result = handle_config(config);
    if let Err(err) = result {
        let _ = err.report(&mut io::stderr().lock());
        std::process::exit(err.exit_status());
    }
}
