use super::cli::Cli;
use super::error::CliError;
use super::io;
use super::logging;
use eqcharge::{Calculator, Parameters};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub fn run(args: Cli) -> Result<(), CliError> {
    logging::setup_logging(
        args.logging.verbose,
        args.logging.quiet,
        args.logging.log_file.clone(),
    )?;

    if args.list_methods {
        let writer = io::get_writer(&args.output.output)?;
        return io::write_method_list(writer);
    }

    let parameters = args
        .calculation
        .par_file
        .as_deref()
        .map(Parameters::load_from_file)
        .transpose()?;

    let mut calculator = Calculator::from_name(&args.calculation.method)?;
    if let Some(parameters) = &parameters {
        calculator = calculator.with_parameters(parameters)?;
    }
    for (name, value) in &args.calculation.method_options {
        calculator = calculator.with_option(name, value)?;
    }

    let input = args.input.as_deref().unwrap_or("-");
    let (mut set, source_name) = io::read_molecules(input)?;
    let read = set.len();
    info!(source = %source_name, molecules = read, "Loaded molecules");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    pb.set_message("Classifying atoms and bonds...");
    let removed = calculator.prepare(&mut set, args.calculation.permissive_types)?;

    pb.set_message(format!(
        "Calculating {} charges for {} molecules...",
        calculator.method().name(),
        set.len()
    ));
    let result = calculator.calculate_set(&set);

    pb.finish_and_clear();

    if result.charges.is_empty() {
        return Err(CliError::NothingCalculated {
            removed,
            failed: result.failures.len(),
        });
    }

    let writer = io::get_writer(&args.output.output)?;
    io::write_results(
        writer,
        &set,
        &calculator,
        &result,
        &io::RunInfo {
            source_name: &source_name,
            read,
            removed,
        },
        args.output.format,
        args.output.precision,
    )?;

    Ok(())
}
