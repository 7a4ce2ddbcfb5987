//! Classify a WAV file and print the detected activities as JSON.

use std::path::PathBuf;

use audio_activity::AudioActivityClassifier;
use audio_activity::analysis::read_wav;
use audio_activity::config::{self, ClassifierSettings};
use audio_activity::logging::{self, Console, LogOptions};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    wav_path: PathBuf,
    config_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    mapping_path: Option<PathBuf>,
    strict: bool,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init_with(LogOptions {
        console: Console::Stderr,
        default_filter: "warn",
    }) {
        eprintln!("Logging disabled: {err}");
    }

    let mut settings = match &options.config_path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    // Asking for a classification implies the feature is on.
    settings.enabled = true;
    if let Some(path) = &options.model_path {
        settings.model_path = path.clone();
    }
    if let Some(path) = &options.mapping_path {
        settings.mapping_path = path.clone();
    }

    let (bytes, format) = read_wav(&options.wav_path).map_err(|err| err.to_string())?;
    let classifier = AudioActivityClassifier::from_settings(&settings);
    let result = if options.strict {
        classifier
            .try_classify(&bytes, &format)
            .map_err(|err| err.to_string())?
    } else {
        classifier.classify(&bytes, &format)
    };
    let json = serde_json::to_string_pretty(&result).map_err(|err| err.to_string())?;
    println!("{json}");
    print_settings_hint(&settings);
    Ok(())
}

fn print_settings_hint(settings: &ClassifierSettings) {
    eprintln!(
        "model: {}\nmapping: {}",
        settings.model_path.display(),
        settings.mapping_path.display()
    );
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut wav_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut model_path: Option<PathBuf> = None;
    let mut mapping_path: Option<PathBuf> = None;
    let mut strict = false;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--wav" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--wav requires a value".to_string())?;
                wav_path = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model_path = Some(PathBuf::from(value));
            }
            "--mapping" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--mapping requires a value".to_string())?;
                mapping_path = Some(PathBuf::from(value));
            }
            "--strict" => strict = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let wav_path = wav_path.ok_or_else(|| "--wav is required".to_string())?;
    Ok(CliOptions {
        wav_path,
        config_path,
        model_path,
        mapping_path,
        strict,
    })
}

fn help_text() -> String {
    [
        "audio-activity-classify",
        "",
        "Usage:",
        "  audio-activity-classify --wav <file.wav> [--config <classifier.toml>]",
        "                          [--model <model.json>] [--mapping <mapping.csv>] [--strict]",
        "",
        "Options:",
        "  --wav       WAV file to classify.",
        "  --config    Settings file (default: classifier.toml in the app directory).",
        "  --model     Override the model path from the settings.",
        "  --mapping   Override the mapping path from the settings.",
        "  --strict    Exit with the pipeline error instead of printing an empty result.",
        "",
        "The classifier is enabled regardless of the `enabled` setting.",
    ]
    .join("\n")
}
