use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// `runner_debug` is set when GitHub step debug logging is on; it lifts the
/// level to at least debug.
pub fn init_logger(verbosity: u8, runner_debug: bool) {
    let level = level_for(verbosity, runner_debug);

    let mut builder = Builder::new();
    builder.filter_level(level);

    builder.format(|buf, record| {
        let level = record.level();

        let level_label = match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn  => "WARN ".yellow().bold(),
            Level::Info  => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(buf, "{} {}", level_label, record.args())
    });

    builder.init();
}

fn level_for(verbosity: u8, runner_debug: bool) -> LevelFilter {
    let level = match verbosity {
        0 => LevelFilter::Error, // default: only errors
        1 => LevelFilter::Info,  // -v: info and up
        2 => LevelFilter::Debug, // -vv: debug and up
        _ => LevelFilter::Trace, // -vvv: trace and up
    };
    if runner_debug {
        level.max(LevelFilter::Debug)
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_debug_raises_but_never_lowers() {
        assert_eq!(level_for(0, false), LevelFilter::Error);
        assert_eq!(level_for(0, true), LevelFilter::Debug);
        assert_eq!(level_for(1, true), LevelFilter::Debug);
        assert_eq!(level_for(3, true), LevelFilter::Trace);
    }
}
