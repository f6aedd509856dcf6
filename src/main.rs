use std::process::ExitCode;

use clap::Parser;
use mimalloc::MiMalloc;

use opendata_browser_lib::cli::Cli;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    // usage errors exit with 2 from here
    let cli = Cli::parse();
    opendata_browser_lib::init_logging(cli.verbose);

    // ── Tokio runtime ──
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(opendata_browser_lib::run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
