//! Promptcraft command-line describer
//!
//! Turn an image into a photorealistic image-generation prompt.
//!
//! Usage:
//!   cargo run --bin promptcraft-describe -- photo.jpg
//!   cargo run --bin promptcraft-describe -- photo.jpg --copy
//!   cargo run --bin promptcraft-describe -- photo.png --max-retries 2 --model gemini-2.0-flash

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use promptcraft_inference::{
    copy_with_fallback, defaults, AuthConfig, CommandClipboard, GeminiConfig, ImagePayload,
    Osc52Clipboard, PromptGenerator,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    image: Option<PathBuf>,
    copy: bool,
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    model: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--copy" | "-c" => {
                result.copy = true;
            }
            "--max-retries" | "-r" => {
                i += 1;
                let value = args.get(i).ok_or("--max-retries needs a value")?;
                result.max_retries = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid --max-retries: {}", value))?,
                );
            }
            "--initial-delay-ms" => {
                i += 1;
                let value = args.get(i).ok_or("--initial-delay-ms needs a value")?;
                result.initial_delay_ms = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid --initial-delay-ms: {}", value))?,
                );
            }
            "--model" | "-m" => {
                i += 1;
                let value = args.get(i).ok_or("--model needs a value")?;
                result.model = Some(value.clone());
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            path => {
                if result.image.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                result.image = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(result)
}

fn print_help() {
    println!(
        r#"
Promptcraft describer

Usage: promptcraft-describe <IMAGE> [OPTIONS]

Options:
  -c, --copy                  Copy the generated prompt to the clipboard
  -r, --max-retries <N>       Retries after HTTP 429 (default: 5)
      --initial-delay-ms <MS> First backoff delay (default: 1000)
  -m, --model <MODEL>         Gemini model id
  -h, --help                  Print help

Environment Variables:
  GEMINI_API_KEY            Generative Language API key (required)
  GEMINI_BASE_URL           API endpoint
  GEMINI_MODEL              Model id (overridden by --model)
  GEMINI_TIMEOUT            Per-attempt timeout in seconds (default: 120)
  PROMPTCRAFT_AUTH_CONFIG   Identity provider JSON blob (required)
  PROMPTCRAFT_AUTH_URL      Identity Toolkit endpoint
  RUST_LOG                  Log filter (default: warn)
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\nRun with --help for usage.", message);
            return Ok(ExitCode::from(2));
        }
    };
    let Some(path) = args.image else {
        eprintln!("No image given.\nRun with --help for usage.");
        return Ok(ExitCode::from(2));
    };

    let bytes =
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let image = ImagePayload::from_bytes(&bytes, None)
        .with_context(|| format!("{} is not a usable image", path.display()))?;

    let mut gemini = GeminiConfig::from_env()?;
    if let Some(retries) = args.max_retries {
        gemini.max_retries = retries;
    }
    if let Some(delay) = args.initial_delay_ms {
        gemini.initial_delay_ms = delay;
    }
    if let Some(model) = args.model {
        gemini.model = model;
    }
    let generator = PromptGenerator::from_config(gemini, AuthConfig::from_env()?)?;

    let outcome = generator.generate(image).await;
    if !outcome.is_success() {
        eprintln!("{}", outcome.display_text());
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", outcome.display_text());

    if args.copy {
        let system = CommandClipboard::system();
        let terminal = Osc52Clipboard::stderr();
        match copy_with_fallback(Some(&system), &terminal, outcome.display_text()) {
            Ok(confirmation) => eprintln!("{}", confirmation.message()),
            Err(err) => {
                eprintln!("{} ({})", defaults::COPY_FAILED_MESSAGE, err);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
