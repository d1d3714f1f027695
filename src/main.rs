use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = taskgrid::cli::Cli::parse();
    let config = taskgrid::config::from_cli(&cli)?;

    match cli.command.clone() {
        Some(taskgrid::cli::CliCommand::Tui) | None => {
            // Raw mode owns the terminal, so the UI logs to a file instead.
            taskgrid::telemetry::init_file(config.log_path(), cli.log_filter.as_deref())?;
            taskgrid::tui::run(config)?;
        }
        Some(command) => {
            taskgrid::telemetry::init_stderr(cli.log_filter.as_deref())?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            taskgrid::commands::execute(&config, command, &mut handle)?;
        }
    }

    Ok(())
}
