use clap::Parser;
use tracing::error;

use pie_sitemap::{print_summary, run, utils, Args};

fn main() {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    match run(&args.to_config()) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            let message = format!("{:#}", e);
            error!(action = "abort", component = "main", error = %message, "Sitemap generation failed");
            std::process::exit(1);
        }
    }
}
