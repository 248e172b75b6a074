use anyhow::Result;
use catalog_core::stats::format_thousands;
use catalog_core::{CatalogStats, DatasetRecord, QueryCriteria};
use clap::Subcommand;
use crate::context::CatalogContext;

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Show catalog totals
    Catalog {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show dataset counts and record totals per theme
    Themes,
}

pub async fn execute_stats_command(ctx: &CatalogContext, command: StatsCommands) -> Result<()> {
    match command {
        StatsCommands::Catalog { json } => {
            let stats = CatalogStats::compute(ctx.catalog().records());

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("\nCatalog Statistics");
            println!("{}", "=".repeat(40));
            println!("Total Datasets:  {}", stats.total_datasets);
            println!("Total Records:   {}", format_thousands(stats.total_records));
            println!(
                "Public:          {} ({:.1}%)",
                stats.public_datasets,
                stats.public_share()
            );
            println!("Premium:         {}", stats.premium_datasets);
            println!("Themes:          {}", stats.distinct_themes);
            println!("Versions:        {}", stats.total_versions);

            match stats.last_updated {
                Some(date) => println!("Last Updated:    {}", date),
                None => println!("Last Updated:    unknown"),
            }
        }

        StatsCommands::Themes => {
            println!("\nTheme Statistics");
            println!("{}", "=".repeat(50));
            println!("{:<16} {:<10} {:>16}", "THEME", "DATASETS", "RECORDS");
            println!("{}", "-".repeat(50));

            let view = ctx.query(&QueryCriteria::new()).await;
            for (theme, count) in &view.facets {
                let records = theme_record_total(&view.records, theme);
                let label = if theme.is_empty() { "(none)" } else { theme.as_str() };
                println!("{:<16} {:<10} {:>16}", label, count, format_thousands(records));
            }
        }
    }

    Ok(())
}

/// Sum of parsed record counts for one theme, saturating at `u64::MAX`
fn theme_record_total(records: &[DatasetRecord], theme: &str) -> u64 {
    records
        .iter()
        .filter(|r| r.theme == theme)
        .map(|r| r.quick.records())
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::seed_records;

    #[test]
    fn test_theme_record_total() {
        let records = seed_records();
        assert_eq!(theme_record_total(&records, "finance"), 1_990_000);
        assert_eq!(theme_record_total(&records, "health"), 0);
    }

    #[test]
    fn test_theme_record_total_saturates() {
        let mut records = seed_records();
        records[4].quick.record_count = u64::MAX.to_string();

        assert_eq!(theme_record_total(&records, "finance"), u64::MAX);
    }
}
