//! Interactive csvtab shell.
//!
//! # Responsibility
//! - Read configuration, start file logging and run the read/dispatch loop.
//! - Leave every command's semantics to `csvtab_core::Shell`.

use csvtab_core::{flush_logging, init_logging, Shell, ShellConfig, ShellControl};
use log::{error, info};
use std::io::{BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("csvtab: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("csvtab: file logging disabled: {err}");
    }
    info!(
        "event=session_start module=cli status=ok version={} max_plugins={}",
        csvtab_core::core_version(),
        config.max_plugins
    );

    let code = match run(&config) {
        Ok(released) => {
            info!(
                "event=session_end module=cli status=ok plugins_released={}",
                released
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=session_end module=cli status=error error={}", err);
            eprintln!("csvtab: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run(config: &ShellConfig) -> std::io::Result<usize> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut shell = Shell::new(config.max_plugins, std::io::stdout());
    let mut line = Vec::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            println!();
            break;
        }
        if shell.execute_line(&String::from_utf8_lossy(&line))? == ShellControl::Exit {
            break;
        }
    }
    Ok(shell.shutdown())
}
