use car_price_api::core::category_extract::{extract_categories_from_path, write_categories};
use car_price_api::utils::logger;
use clap::Parser;

#[derive(Parser)]
#[command(name = "gencat")]
#[command(about = "Extract the valid category lists from the cleaned training data")]
struct Args {
    /// Cleaned training data (CSV with company, name and fuel_type columns)
    #[arg(short, long, default_value = "Cleaned_Car_data.csv")]
    input: String,

    /// Category file consumed by the prediction service
    #[arg(short, long, default_value = "unique_categories.json")]
    output: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Reading training data from: {}", args.input);

    let result = extract_categories_from_path(&args.input)
        .and_then(|categories| write_categories(&categories, &args.output).map(|_| categories));

    match result {
        Ok(categories) => {
            tracing::info!(
                "✅ Wrote {} companies, {} models, {} fuel types to {}",
                categories.company.len(),
                categories.model.len(),
                categories.fuel_type.len(),
                args.output
            );
        }
        Err(e) => {
            tracing::error!("❌ Category extraction failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
