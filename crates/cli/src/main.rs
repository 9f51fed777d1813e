use api_shared::{ChecklistRes, DiagnoseRes};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use sti_core::{
    config::model_path_from_env_value, CoreConfig, ImageUpload, ScoringStrategy,
    ScreeningOutcome, ScreeningReport, ScreeningRequest, ScreeningService, Symptom,
    SymptomVector, APP_TITLE, CONSENT_REQUIRED_MESSAGE, DEFAULT_MODEL_PATH, DISCLAIMER,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sti")]
#[command(about = "STI symptom and image screening CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the symptom checklist
    Symptoms,
    /// Screen a set of symptoms and an optional image
    Diagnose {
        /// Agree that this is not medical advice (required)
        #[arg(long)]
        consent: bool,
        /// Symptom key that is present; repeat for several
        #[arg(long = "symptom", value_name = "KEY")]
        symptoms: Vec<String>,
        /// Image of the affected area (jpg, jpeg or png)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Scoring strategy: exact or additive
        #[arg(long, default_value = "exact")]
        strategy: String,
        /// Classifier weights; falls back to STI_MODEL_PATH or the bundled default
        #[arg(long)]
        model: Option<PathBuf>,
        /// Minimum image confidence for the image result to be used
        #[arg(long)]
        min_confidence: Option<f32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sti_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Symptoms) => print_checklist(),
        Some(Commands::Diagnose {
            consent,
            symptoms,
            image,
            strategy,
            model,
            min_confidence,
            json,
        }) => {
            let outcome = if consent {
                let strategy: ScoringStrategy = strategy.parse()?;
                let present = symptoms
                    .iter()
                    .map(|key| key.parse::<Symptom>())
                    .collect::<Result<Vec<_>, _>>()?;
                let image = image.map(|path| read_image(&path)).transpose()?;

                // An explicit --model must load; the default location is optional.
                let require_model = model.is_some();
                let model_path = model.unwrap_or_else(|| {
                    model_path_from_env_value(
                        std::env::var("STI_MODEL_PATH").ok(),
                        DEFAULT_MODEL_PATH,
                    )
                });
                let cfg = Arc::new(CoreConfig::new(
                    strategy,
                    min_confidence,
                    Some(model_path),
                    require_model,
                )?);
                let service = ScreeningService::from_config(cfg)?;

                service.screen(ScreeningRequest {
                    consent,
                    symptoms: SymptomVector::from_present(present),
                    image,
                    strategy: None,
                })
            } else {
                ScreeningOutcome::ConsentRequired {
                    message: CONSENT_REQUIRED_MESSAGE,
                }
            };

            let code = exit_code(&outcome);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&DiagnoseRes::from(outcome))?
                );
            } else {
                match outcome {
                    ScreeningOutcome::ConsentRequired { message } => eprintln!("{}", message),
                    ScreeningOutcome::Completed { report } => print_report(&report),
                }
            }
            if code != 0 {
                std::process::exit(code);
            }
        }
        None => {
            println!("Use 'sti --help' for commands");
        }
    }

    Ok(())
}

/// Exit status for declined consent, shared by text and JSON output.
const CONSENT_REQUIRED_EXIT: i32 = 2;

fn exit_code(outcome: &ScreeningOutcome) -> i32 {
    match outcome {
        ScreeningOutcome::ConsentRequired { .. } => CONSENT_REQUIRED_EXIT,
        ScreeningOutcome::Completed { .. } => 0,
    }
}

fn read_image(path: &std::path::Path) -> Result<ImageUpload, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    Ok(ImageUpload::new(filename, bytes)?)
}

fn print_checklist() {
    let checklist = ChecklistRes::current();
    println!("{}", checklist.title);
    println!();
    for item in checklist.symptoms {
        println!("  --symptom {:<18} {}", item.key, item.question);
    }
    println!();
    println!("Consent (--consent): {}", checklist.consent_statement);
    println!("{}", checklist.disclaimer);
}

fn print_report(report: &ScreeningReport) {
    println!("{}", APP_TITLE);
    println!("Assessment: {} ({})", report.assessment_id, report.assessed_at.to_rfc3339());

    let present: Vec<&str> = report.symptoms.present().map(Symptom::key).collect();
    if present.is_empty() {
        println!("Symptoms: none reported");
    } else {
        println!("Symptoms: {}", present.join(", "));
    }

    let assessment = &report.symptom_assessment;
    match assessment.score {
        Some(score) => println!(
            "Symptom assessment ({}): {} (score {})",
            assessment.strategy, assessment.condition, score
        ),
        None => println!(
            "Symptom assessment ({}): {}",
            assessment.strategy, assessment.condition
        ),
    }

    if let Some(image) = &report.image {
        println!(
            "Image analysis: {} (confidence {:.2})",
            image.label, image.confidence
        );
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    println!();
    let diagnosis = &report.diagnosis;
    println!("Possible condition: {}", diagnosis.result.diagnosis);
    if let Some(message) = diagnosis.message {
        println!("{}", message);
    }
    println!("Prevention: {}", diagnosis.result.prevention);
    println!("Advice: {}", diagnosis.result.advice);
    println!();
    println!("{}", DISCLAIMER);
}
