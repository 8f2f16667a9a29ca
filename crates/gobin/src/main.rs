mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::Cli;
use gobin_core::GobinError;

/// Exit status after cancellation by signal
const EXIT_CANCELED: i32 = 130;
/// Exit status after a panic
const EXIT_PANIC: i32 = 2;

fn main() {
    install_panic_hook();

    let cli = Cli::parse();
    logging::init_tracing(cli.debug);

    if let Err(e) = commands::run::execute(&cli) {
        eprintln!("Error: {}", e);
        let canceled = e
            .downcast_ref::<GobinError>()
            .is_some_and(GobinError::is_canceled);
        std::process::exit(if canceled { EXIT_CANCELED } else { 1 });
    }
}

/// Prints the panic with a backtrace and exits with [`EXIT_PANIC`]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        eprintln!("{}", std::backtrace::Backtrace::force_capture());
        std::process::exit(EXIT_PANIC);
    }));
}
