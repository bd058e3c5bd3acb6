use anyhow::Result;

use crate::config::{ConfigManager, ResolveOptions, resolve_config};
use crate::ui::Style;

/// Prints the models `\change` offers, marking the one a session starts with.
pub fn print_models() -> Result<()> {
    let config_file = ConfigManager::new()?.load_or_default()?;
    let resolved = resolve_config(&ResolveOptions::default(), &config_file)?;

    println!("{}", Style::header("Known models"));
    for model in &resolved.known_models {
        if *model == resolved.model {
            println!("  {} {}", Style::value(model), Style::default_marker());
        } else {
            println!("  {}", Style::value(model));
        }
    }

    Ok(())
}
