use std::path::PathBuf;
use std::process::ExitCode;

use log::error;

use startasm_driver::{Driver, DriverConfig, DumpFlags};
use startasm_vm::StdIo;

/// A thin demo entry point: load one program, run it to completion, print
/// the final dump. The interactive command shell (`initialize`, `forward`,
/// `breakpoint`, ...) that wraps `Driver` for a real debugging session
/// lives outside this crate.
fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: startasm <program-path>");
        return ExitCode::from(1);
    };

    let mut driver: Driver<StdIo> = Driver::new(DriverConfig::default());
    if !driver.initialize(&path) {
        error!("failed to initialize program at {}", path.display());
        return ExitCode::from(1);
    }

    if let Err(e) = driver.run() {
        error!("{e}");
        return ExitCode::from(1);
    }

    match driver.dump(DumpFlags::all()) {
        Ok(state) => println!("{state}"),
        Err(e) => error!("{e}"),
    }

    ExitCode::SUCCESS
}
