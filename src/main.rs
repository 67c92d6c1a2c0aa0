use clap::Parser;
use sst_monthly::utils::error::ErrorSeverity;
use sst_monthly::utils::{logger, validation::Validate};
use sst_monthly::{EtlEngine, JobConfig, LocalStorage, QueryPlan, SstPipeline};

#[derive(Parser, Debug)]
#[command(name = "sst-monthly")]
#[command(about = "Monthly-mean sea-surface temperature over a region, exported as a table")]
struct Args {
    /// Path to the TOML job file
    #[arg(short, long, default_value = "sst-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override [period] start_year
    #[arg(long)]
    start_year: Option<i32>,

    /// Override [period] end_year
    #[arg(long)]
    end_year: Option<i32>,

    /// Print the query plan without reading any data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match JobConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(args.verbose, config.log_format());
    tracing::info!("📁 Loaded job '{}' from {}", config.job.name, args.config);

    if let Some(start_year) = args.start_year {
        config.period.start_year = start_year;
        tracing::info!("🔧 start_year overridden to: {}", start_year);
    }
    if let Some(end_year) = args.end_year {
        config.period.end_year = end_year;
        tracing::info!("🔧 end_year overridden to: {}", end_year);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let plan = QueryPlan::from_config(&config)?;
    display_job_summary(&config, &plan);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no data will be read");
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = SstPipeline::new(storage, config)?;
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Monthly SST export completed");
            println!("✅ Monthly SST export completed");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_job_summary(config: &JobConfig, plan: &QueryPlan) {
    println!("📋 Job Summary:");
    println!(
        "  Job: {} {}",
        config.job.name,
        config.job.version.as_deref().unwrap_or("")
    );
    if let Some(description) = &config.job.description {
        println!("  About: {}", description);
    }
    println!("  Region: {} ({})", config.region_name(), config.region.path);
    println!(
        "  Catalog: {} {}",
        config.catalog.r#type,
        config
            .catalog
            .path
            .as_deref()
            .or(config.catalog.endpoint.as_deref())
            .unwrap_or("")
    );
    println!("  Output: {}/{}", config.output_path(), config.description());
    println!("  Formats: {}", config.export.output_formats.join(", "));
    if config.compression_enabled() {
        println!("  Compression: ZIP");
    }
    println!("📐 Query plan:");
    println!("{}", plan);
    println!();
}
