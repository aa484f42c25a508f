use anyhow::Result;
use coachcal_core::CoachcalConfig;
use owo_colors::OwoColorize;

pub struct ConfigChanges {
    pub user: Option<String>,
    pub timezone: Option<String>,
    pub data_dir: Option<String>,
}

/// Show the config, or persist the given changes.
pub fn run(mut config: CoachcalConfig, changes: ConfigChanges) -> Result<()> {
    let changed = changes.user.is_some() || changes.timezone.is_some() || changes.data_dir.is_some();

    if let Some(user) = changes.user {
        config.user = Some(user);
    }
    if let Some(timezone) = changes.timezone {
        config.timezone = Some(timezone);
        // Reject unknown zones before they are written.
        config.tz()?;
    }
    if let Some(data_dir) = changes.data_dir {
        config.data_dir = data_dir.into();
    }

    if changed {
        config.save()?;
        println!(
            "{}",
            format!("  Saved {}", CoachcalConfig::config_path()?.display()).green()
        );
    }

    println!("  user:     {}", config.user());
    println!("  timezone: {}", config.tz()?);
    println!("  data dir: {}", config.data_path().display());

    Ok(())
}
