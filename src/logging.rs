use std::io::Write;

use colored::Colorize;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

/// Noisy HTTP crates, capped unless tracing.
const HTTP_MODULES: [&str; 4] = ["reqwest", "hyper", "hyper_util", "rustls"];

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,  // default: warnings and errors
        1 => LevelFilter::Info,  // -v
        2 => LevelFilter::Debug, // -vv
        _ => LevelFilter::Trace, // -vvv
    }
}

/// Initialise env_logger from `-v` count; `SEMCOMMIT_LOG` refines the filters.
pub fn init_logger(verbosity: u8) {
    let level = level_for(verbosity);

    let mut builder = Builder::new();
    builder.filter_level(level);
    if level < LevelFilter::Trace {
        for module in HTTP_MODULES {
            builder.filter_module(module, LevelFilter::Warn);
        }
    }
    builder.parse_env(Env::new().filter("SEMCOMMIT_LOG"));

    builder.format(|buf, record| {
        let level_label = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        if record.level() >= Level::Debug {
            writeln!(
                buf,
                "{} {} {}",
                level_label,
                record.target().bright_black(),
                record.args()
            )
        } else {
            writeln!(buf, "{} {}", level_label, record.args())
        }
    });

    // A logger may already be installed when running under a test harness.
    let _ = builder.try_init();
}
