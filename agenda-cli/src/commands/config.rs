use agenda_core::{Agenda, AgendaConfig};
use anyhow::{Result, bail};
use owo_colors::OwoColorize;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn run(agenda: &Agenda, log_level: Option<String>) -> Result<()> {
    let config_path = AgendaConfig::config_path()?;

    if let Some(level) = log_level {
        let level = level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!(
                "Unknown log level '{}'. Use one of: {}",
                level,
                LOG_LEVELS.join(", ")
            );
        }

        let mut config = agenda.config().clone();
        config.log_level = level;
        config.save()?;
        println!(
            "Saved log level {} to {}",
            config.log_level.green(),
            config_path.display()
        );
        return Ok(());
    }

    let config = agenda.config();

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", config.data_path().display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Log level:  {}", config.log_level);

    Ok(())
}
