use anyhow::Result;
use catalog_core::Theme;
use clap::Subcommand;
use crate::context::CatalogContext;

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Show the current colour theme
    Get,
    /// Set the colour theme
    Set {
        /// light or dark
        theme: Theme,
    },
    /// Switch between light and dark
    Toggle,
}

pub async fn execute_theme_command(ctx: &CatalogContext, command: ThemeCommands) -> Result<()> {
    let settings = ctx.settings();

    match command {
        ThemeCommands::Get => {
            println!("Theme: {}", settings.theme());
        }
        ThemeCommands::Set { theme } => {
            let theme = settings.set_theme(theme)?;
            println!("✓ Theme set to {}", theme);
        }
        ThemeCommands::Toggle => {
            let theme = settings.toggle_theme()?;
            println!("✓ Theme switched to {}", theme);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{CatalogConfig, SlowQueryLogger};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_toggle_persists_to_preference_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = CatalogConfig::default();
        config.preferences.path = temp_dir.path().join("preferences.toml");

        let ctx = CatalogContext::new(config.clone(), SlowQueryLogger::disabled()).unwrap();
        assert_eq!(ctx.settings().theme(), Theme::Light);

        execute_theme_command(&ctx, ThemeCommands::Toggle).await.unwrap();

        let reopened = CatalogContext::new(config, SlowQueryLogger::disabled()).unwrap();
        assert_eq!(reopened.settings().theme(), Theme::Dark);
    }
}
