use anyhow::{Context, Result};
use catalog_core::{DatasetRecord, DownloadFormat, ExportTemplate, RequestTemplate};
use clap::{Args, Subcommand};
use crate::context::CatalogContext;

#[derive(Subcommand)]
pub enum RequestCommands {
    /// Print the API URL for a dataset query
    Url(RequestArgs),
    /// Print a cURL command for a dataset query
    Curl(RequestArgs),
    /// Print the sample response for a dataset query
    Run(RequestArgs),
    /// Print the bulk download URL for a dataset
    Download {
        #[command(flatten)]
        args: ExportArgs,
        /// File format: csv, json, parquet or excel
        #[arg(long, default_value = "csv")]
        format: DownloadFormat,
    },
    /// Print the raw data API URL for a dataset
    Data(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Dataset id
    pub id: String,
    /// Origin of the API (defaults to the configured origin)
    #[arg(long)]
    pub origin: Option<String>,
    /// Dataset version (defaults to the most recent one)
    #[arg(long)]
    pub version: Option<String>,
    /// Filter as field=value, may be repeated
    #[arg(short, long = "filter", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,
    /// Filters as a JSON object, replacing --filter
    #[arg(long, conflicts_with = "filters")]
    pub filters_json: Option<String>,
    /// Grouping variable
    #[arg(long, default_value = "employment_status")]
    pub group_by: String,
    /// Comma separated metrics
    #[arg(long, default_value = "count")]
    pub metrics: String,
}

impl RequestArgs {
    pub fn to_template(&self, ctx: &CatalogContext) -> Result<RequestTemplate> {
        let record = ctx.find(&self.id)?;
        let mut template = RequestTemplate::for_dataset(record)
            .group_by(self.group_by.as_str())
            .metrics(&self.metrics);

        if let Some(version) = &self.version {
            warn_unlisted_version(record, version);
            template = template.version(version.as_str());
        }

        if let Some(json) = &self.filters_json {
            template = template
                .with_filters_json(json)
                .context("Invalid --filters-json value")?;
        }

        for (field, value) in &self.filters {
            template = template.filter(field.as_str(), value.as_str());
        }

        Ok(template)
    }

    fn origin<'a>(&'a self, ctx: &'a CatalogContext) -> &'a str {
        resolve_origin(self.origin.as_deref(), ctx)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Dataset id
    pub id: String,
    /// Origin of the API (defaults to the configured origin)
    #[arg(long)]
    pub origin: Option<String>,
    /// Dataset version (defaults to the most recent one)
    #[arg(long)]
    pub version: Option<String>,
    /// Comma separated variables to include (all when omitted)
    #[arg(long, conflicts_with = "all_variables")]
    pub variables: Option<String>,
    /// List every variable of the dataset explicitly
    #[arg(long)]
    pub all_variables: bool,
    /// Filter as field=value, may be repeated
    #[arg(short, long = "filter", value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,
}

impl ExportArgs {
    pub fn to_template<'a>(&self, ctx: &'a CatalogContext) -> Result<ExportTemplate<'a>> {
        let record = ctx.find(&self.id)?;
        let mut template = ExportTemplate::for_dataset(record);

        if let Some(version) = &self.version {
            warn_unlisted_version(record, version);
            template = template.version(version.as_str());
        }

        if self.all_variables {
            template = template.select_all();
        } else if let Some(variables) = &self.variables {
            let names = variables.split(',').map(str::trim).filter(|v| !v.is_empty());
            template = template
                .select_variables(names)
                .context("Invalid --variables value")?;
        }

        for (field, value) in &self.filters {
            template = template.filter(field.as_str(), value.as_str());
        }

        Ok(template)
    }

    fn origin<'a>(&'a self, ctx: &'a CatalogContext) -> &'a str {
        resolve_origin(self.origin.as_deref(), ctx)
    }
}

pub async fn execute_request_command(ctx: &CatalogContext, command: RequestCommands) -> Result<()> {
    match command {
        RequestCommands::Url(args) => {
            let template = args.to_template(ctx)?;
            println!("{}", template.url(args.origin(ctx)));
        }
        RequestCommands::Curl(args) => {
            let template = args.to_template(ctx)?;
            println!("{}", template.curl(args.origin(ctx)));
        }
        RequestCommands::Run(args) => {
            let template = args.to_template(ctx)?;
            println!("{}", template.curl(args.origin(ctx)));
            println!("\n{}", serde_json::to_string_pretty(&template.mock_response())?);
            println!("\nNote: this is sample data; no request was sent.");
            return Ok(());
        }
        RequestCommands::Download { args, format } => {
            let template = args.to_template(ctx)?.format(format);
            println!("{}", template.download_url(args.origin(ctx)));
            println!("Format: {} ({})", format, format.description());
        }
        RequestCommands::Data(args) => {
            let template = args.to_template(ctx)?;
            println!("{}", template.data_url(args.origin(ctx)));
        }
    }

    println!("\nNote: this request is illustrative only and has not been sent.");

    Ok(())
}

fn resolve_origin<'a>(origin: Option<&'a str>, ctx: &'a CatalogContext) -> &'a str {
    origin.unwrap_or(ctx.config().request.origin.as_str())
}

fn warn_unlisted_version(record: &DatasetRecord, version: &str) {
    if !record.versions.iter().any(|v| v == version) {
        tracing::warn!(
            dataset = %record.id,
            version = %version,
            "Version not listed for dataset"
        );
    }
}

/// Parse a `field=value` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", s))?;

    if key.trim().is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }

    Ok((key.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{CatalogConfig, MemoryStore, SlowQueryLogger};

    fn context() -> CatalogContext {
        CatalogContext::with_store(
            CatalogConfig::default(),
            Box::new(MemoryStore::new()),
            SlowQueryLogger::disabled(),
        )
        .unwrap()
    }

    fn args(id: &str) -> RequestArgs {
        RequestArgs {
            id: id.to_string(),
            origin: None,
            version: None,
            filters: Vec::new(),
            filters_json: None,
            group_by: "employment_status".to_string(),
            metrics: "count".to_string(),
        }
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("state=Tamil Nadu"),
            Ok(("state".to_string(), "Tamil Nadu".to_string()))
        );
        assert!(parse_key_val("state").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_template_from_args() {
        let ctx = context();
        let mut request = args("hces");
        request.version = Some("2022".to_string());
        request.filters = vec![("sector".to_string(), "Rural".to_string())];
        request.metrics = "count,avg_wage".to_string();

        let template = request.to_template(&ctx).unwrap();
        assert_eq!(template.version, "2022");
        assert_eq!(template.filters.get("sector").map(String::as_str), Some("Rural"));
        assert_eq!(template.metrics, vec!["count", "avg_wage"]);
        assert_eq!(request.origin(&ctx), "http://localhost:8080");
    }

    #[test]
    fn test_unknown_dataset_is_an_error() {
        assert!(args("nope").to_template(&context()).is_err());
    }

    fn export_args(id: &str) -> ExportArgs {
        ExportArgs {
            id: id.to_string(),
            origin: None,
            version: None,
            variables: None,
            all_variables: false,
            filters: Vec::new(),
        }
    }

    #[test]
    fn test_export_template_from_args() {
        let ctx = context();
        let mut request = export_args("plfs");
        request.version = Some("2023_q1".to_string());
        request.variables = Some("state, gender".to_string());
        request.filters = vec![
            ("state".to_string(), "Kerala".to_string()),
            ("year".to_string(), String::new()),
        ];

        let template = request.to_template(&ctx).unwrap().format(DownloadFormat::Parquet);
        assert_eq!(template.variables(), ["state", "gender"]);
        assert_eq!(
            template.download_url(request.origin(&ctx)),
            "http://localhost:8080/api/v1/download?dataset=plfs&version=2023_q1\
             &format=parquet&variables=state%2Cgender&state=Kerala"
        );
    }

    #[test]
    fn test_export_all_variables() {
        let ctx = context();
        let mut request = export_args("nss75");
        request.all_variables = true;

        let template = request.to_template(&ctx).unwrap();
        assert_eq!(template.variables().len(), 5);
        assert!(template.data_path().contains("&fields=state%2Cage%2Cgender"));
    }

    #[test]
    fn test_export_unknown_variable_is_an_error() {
        let mut request = export_args("shg");
        request.variables = Some("state,mpce".to_string());

        let err = request.to_template(&context()).unwrap_err();
        assert!(format!("{:#}", err).contains("no variable named mpce"), "{:#}", err);
    }

    #[tokio::test]
    async fn test_run_prints_sample_response() {
        let ctx = context();
        let result = execute_request_command(&ctx, RequestCommands::Run(args("plfs"))).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_filters_json_is_an_error() {
        let mut request = args("plfs");
        request.filters_json = Some("not json".to_string());
        assert!(request.to_template(&context()).is_err());
    }
}
