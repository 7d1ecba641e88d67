use anyhow::Result;
use clap::Parser;
use tracing::error;

use edgeblock::blocklist::PiholeCommand;
use edgeblock::config::{init_default_config, Config};
use edgeblock::{run, utils, Args};

fn execute(args: &Args) -> Result<()> {
    if args.init {
        return init_default_config(&args.config);
    }

    let config = Config::load(&args.config)?;
    let result = run::scan_logs(&config, args)?;

    let output = run::output_path(&config, args);
    run::write_domains(&result, &output)?;
    run::print_scan_results(&result, &output, args);

    if run::should_submit(&config, args, result.domain_count())? {
        run::submit_domains(&result, &PiholeCommand::default())?;
        println!("Finished.");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    if let Err(e) = utils::validate_args(&args).and_then(|_| execute(&args)) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
