use clap::Parser;
use taxifare::app::{read_form, render_outcome, FormInput, RideReport};
use taxifare::domain::ports::{ConfigProvider, FarePredictor, Geocoder};
use taxifare::utils::error::ErrorSeverity;
use taxifare::utils::{logger, validation::Validate};
use taxifare::{
    CliConfig, HttpFarePredictor, NominatimGeocoder, RideForm, RideOutcome, RidePipeline,
    TaxifareError, TomlConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting taxifare CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(mut config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config.apply_cli_overrides(&cli);
                Some(config)
            }
            Err(e) => fail(e),
        },
        None => None,
    };

    let mut form = RideForm::default();
    if let Some(config) = &file_config {
        if let Err(e) = config.apply_ride_defaults(&mut form) {
            fail(e);
        }
    }
    cli.apply_ride_fields(&mut form);

    let result = match &file_config {
        Some(config) => run(config, &cli, form).await,
        None => run(&cli, &cli, form).await,
    };

    match result {
        Ok(Some(error)) => {
            let code = exit_code(error.severity());
            if code > 0 {
                std::process::exit(code);
            }
        }
        Ok(None) => {}
        Err(e) => fail(e),
    }

    Ok(())
}

/// Returns the failure of the last ride shown, if it had one.
async fn run<C>(
    config: &C,
    cli: &CliConfig,
    form: RideForm,
) -> taxifare::Result<Option<TaxifareError>>
where
    C: ConfigProvider + Validate,
{
    config.validate()?;

    let geocoder = NominatimGeocoder::from_config(config)?;
    let predictor = HttpFarePredictor::from_config(config)?;
    let mut pipeline = RidePipeline::new(geocoder, predictor);

    if cli.interactive {
        run_session(&mut pipeline, form, cli.json).await?;
        return Ok(None);
    }

    let outcome = pipeline.run_form(&form).await;
    show(&outcome, cli.json)?;

    Ok(match outcome {
        RideOutcome::Estimated { .. } => None,
        RideOutcome::Halted(halt) => Some(halt.error),
        RideOutcome::PredictionFailed { error, .. } => Some(error),
    })
}

/// One form per interaction; the pipeline and its address cache live for the
/// whole session.
async fn run_session<G, P>(
    pipeline: &mut RidePipeline<G, P>,
    mut form: RideForm,
    json: bool,
) -> taxifare::Result<()>
where
    G: Geocoder,
    P: FarePredictor,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("🚖 Enter your ride details to estimate the taxi fare. Type 'quit' to exit.");

    loop {
        match read_form(&mut lines, &mut stdout, &form).await? {
            FormInput::Quit => break,
            FormInput::Submitted(next) => {
                let outcome = pipeline.run_form(&next).await;
                show(&outcome, json)?;
                println!();
                form = next;
            }
        }
    }

    tracing::info!(
        "Session ended with {} cached address(es)",
        pipeline.resolver().cached_len()
    );
    Ok(())
}

fn show(outcome: &RideOutcome, json: bool) -> taxifare::Result<()> {
    if json {
        println!("{}", RideReport::from(outcome).to_json()?);
    } else {
        println!("{}", render_outcome(outcome));
    }
    Ok(())
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // the user can fix the input
        ErrorSeverity::Medium => 2,   // transient, worth trying again
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3, // configuration or system
    }
}

fn fail(e: TaxifareError) -> ! {
    tracing::error!(
        "❌ taxifare failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(exit_code(e.severity()).max(1));
}
