use crate::controller::{GenerationController, InputUpdate, Status};
use crate::engine::HttpGenerationClient;
use crate::model::{ServiceConfig, Tone};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/email/generate";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "replycraft",
    version,
    about = "Draft email replies with a remote generation service"
)]
pub struct Cli {
    /// URL of the reply generation endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Tone of the generated reply
    #[arg(long, value_enum, default_value_t = Tone::Professional)]
    pub tone: Tone,

    /// Email content to reply to
    #[arg(long, conflicts_with = "input")]
    pub email: Option<String>,

    /// Read the email content from a file ("-" for stdin)
    #[arg(long)]
    pub input: Option<std::path::PathBuf>,

    /// Give up on the generation request after this long
    #[arg(long, default_value = "60s")]
    pub timeout: humantime::Duration,

    /// Print a JSON report and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print the reply as plain text and exit (no TUI)
    #[arg(long)]
    pub text: bool,
}

/// How a run ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

pub async fn run(args: Cli) -> Result<Outcome> {
    let cfg = build_config(&args);
    let content = read_initial_content(&args)?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            crate::tui::run(args, cfg, content).await?;
            return Ok(Outcome::Completed);
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(&args, cfg, content).await;
        }
    }

    run_headless(&args, cfg, content).await
}

/// Build a `ServiceConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ServiceConfig {
    ServiceConfig {
        endpoint: args.endpoint.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("replycraft/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Initial email content from `--email`, `--input <PATH>` or `--input -`.
pub fn read_initial_content(args: &Cli) -> Result<String> {
    if let Some(email) = args.email.as_ref() {
        return Ok(email.clone());
    }
    match args.input.as_deref() {
        Some(p) if p == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read email content from stdin")?;
            Ok(buf)
        }
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("read email content from {}", p.display())),
        None => Ok(String::new()),
    }
}

/// Run a single generate call and print the result.
async fn run_headless(args: &Cli, cfg: ServiceConfig, content: String) -> Result<Outcome> {
    let client = HttpGenerationClient::new(&cfg)?;

    let mut controller = GenerationController::new();
    controller.update_input(InputUpdate::Content(content));
    controller.update_input(InputUpdate::Tone(args.tone));
    if !controller.can_submit() {
        return Err(anyhow::anyhow!(
            "no email content to reply to. Use --email <TEXT>, --input <PATH> or --input -"
        ));
    }

    controller.generate(&client).await;
    let state = controller.state();

    if args.json {
        let report = crate::text_summary::build_report(client.endpoint().as_str(), state);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let summary = crate::text_summary::build_text_summary(state);
        for line in summary.stderr {
            eprintln!("{}", line);
        }
        for line in summary.stdout {
            println!("{}", line);
        }
    }

    Ok(if state.status == Status::Success {
        Outcome::Completed
    } else {
        Outcome::Failed
    })
}
