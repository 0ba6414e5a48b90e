use std::io::Write;

use env_logger::{Builder, Env};

/// Set up logging for the command-line tool. Progress goes to stderr as
/// bare messages at `info`; `verbose` adds timestamps, levels and targets.
/// `RUST_LOG` overrides the level.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}
