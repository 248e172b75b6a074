use anyhow::Result;
use catalog_core::{
    CatalogView, DatasetRecord, FacetCounts, QueryCriteria, SortDirection, SortKey,
};
use clap::{Args, Subcommand};
use crate::context::CatalogContext;

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// List datasets matching the given criteria
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show dataset counts per theme
    Facets {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show full details of one dataset
    Show {
        /// Dataset id
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against name, description and id
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// Theme to keep ("all" for every theme)
    #[arg(long, default_value = "all")]
    pub theme: String,
    /// Access level to keep: public, premium or all
    #[arg(long, default_value = "all")]
    pub access: String,
    /// Category to keep ("all" for every category)
    #[arg(long, default_value = "all")]
    pub category: String,
    /// Sort key: name, theme, access or records
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort order: asc or desc
    #[arg(long)]
    pub order: Option<String>,
}

impl FilterArgs {
    /// Build criteria, taking unspecified ordering from the configuration
    pub fn to_criteria(&self, defaults: &QueryCriteria) -> QueryCriteria {
        let criteria = defaults
            .clone()
            .search(self.search.as_str())
            .theme(self.theme.as_str())
            .access(self.access.as_str())
            .category(self.category.as_str());

        let key = match &self.sort {
            Some(raw) => match SortKey::parse(raw) {
                Some(key) => key,
                None => return criteria.sort(SortKey::default(), SortDirection::default()),
            },
            None => defaults.sort_key,
        };

        // An unparseable --order keeps the configured direction as well
        let direction = self
            .order
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or(defaults.sort_direction);

        criteria.sort(key, direction)
    }
}

pub async fn execute_dataset_command(ctx: &CatalogContext, command: DatasetCommands) -> Result<()> {
    match command {
        DatasetCommands::List { filter, json } => {
            let criteria = filter.to_criteria(&ctx.config().engine.default_criteria());
            let view = ctx.query(&criteria).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }

        DatasetCommands::Facets { json } => {
            let view = ctx.query(&QueryCriteria::new()).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&view.facets)?);
            } else {
                println!("Categories: {}", facet_line(&view.facets, view.total));
            }
        }

        DatasetCommands::Show { id, json } => {
            let record = ctx.find(&id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print_details(record);
            }
        }
    }

    Ok(())
}

/// Render category pills as text, e.g. "All (6) | finance (2)"
pub fn facet_line(facets: &FacetCounts, total: usize) -> String {
    let mut pills = vec![format!("All ({})", total)];
    pills.extend(facets.iter().map(|(theme, count)| {
        let label = if theme.is_empty() { "(none)" } else { theme.as_str() };
        format!("{} ({})", label, count)
    }));
    pills.join(" | ")
}

fn print_view(view: &CatalogView) {
    println!("Available Datasets ({} of {})", view.records.len(), view.total);
    println!("Categories: {}", facet_line(&view.facets, view.total));
    println!("{}", "=".repeat(96));

    if view.is_empty() {
        println!("No datasets found matching your criteria.");
        return;
    }

    println!(
        "{:<12} {:<46} {:<14} {:<8} {:>12}",
        "ID", "NAME", "THEME", "ACCESS", "RECORDS"
    );
    println!("{}", "-".repeat(96));

    for record in &view.records {
        println!(
            "{:<12} {:<46} {:<14} {:<8} {:>12}",
            record.id,
            truncate(&record.name, 46),
            record.theme,
            record.access,
            record.quick.record_count
        );
    }
}

fn print_details(record: &DatasetRecord) {
    println!("\n{}", record.name);
    println!("{}", "=".repeat(60));
    println!("ID:           {}", record.id);
    println!("Theme:        {}", record.theme);
    println!("Access:       {}", record.access);
    println!("Versions:     {}", record.versions.join(", "));
    println!("Records:      {}", record.quick.record_count);
    println!("Last Updated: {}", record.quick.last_updated);
    println!("\n{}", record.description);
    println!("\nVariables:");
    for variable in &record.variables {
        println!("  - {}", variable);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
