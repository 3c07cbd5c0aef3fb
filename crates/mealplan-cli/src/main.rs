mod config;
mod input;
mod plan_cmd;
mod render_cmd;
#[cfg(test)]
mod test_util;

use std::future::Future;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use mealplan_core::config::parse_temperature;
use mealplan_core::models::UserProfile;
use mealplan_core::present::DEFAULT_STEM;

use config::CliOverrides;
use input::{ProfileArgs, Prompter};
use plan_cmd::OutputOptions;

#[derive(Parser)]
#[command(
    name = "mealplan",
    version,
    about = "Personalized weekly meal plans from a three-stage LLM pipeline"
)]
struct Cli {
    /// Model name (overrides MEALPLAN_MODEL and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature between 0.0 and 2.0 (overrides MEALPLAN_TEMPERATURE)
    #[arg(long, global = true, value_parser = temperature_arg)]
    temperature: Option<f32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a mealplan config file
    Init {
        /// OpenAI API key
        #[arg(long)]
        openai_key: Option<String>,
        /// Google Gemini API key
        #[arg(long)]
        google_key: Option<String>,
        /// Model for stages served by OpenAI (defaults to --model)
        #[arg(long)]
        openai_model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a weekly meal plan (prompts for any profile field not given)
    Plan {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Directory for meal_plan.json and meal_plan.md
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Fail the run if the plan does not pass the plan check
        #[arg(long)]
        strict: bool,
    },
    /// Generate a plan for a fixed sample profile (reduce, male, 85 kg, 180 cm, 30, vegan)
    Example {
        /// Directory for example_meal_plan.json
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Print a saved plan, optionally converting it to Markdown
    Render {
        /// Plan JSON file written by `mealplan plan`
        path: PathBuf,
        /// Write Markdown to this path
        #[arg(long)]
        markdown: Option<PathBuf>,
        /// Skip the shopping list
        #[arg(long)]
        no_shopping: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn temperature_arg(raw: &str) -> Result<f32, String> {
    parse_temperature(raw).map_err(|e| e.to_string())
}

/// Execute the `mealplan init` command: write a config file with the given keys.
fn cmd_init(
    openai_key: Option<String>,
    google_key: Option<String>,
    openai_model: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        planner: config::PlannerSection {
            model: model.clone(),
            temperature,
            strict: None,
        },
        openai: config::ProviderSection {
            api_key: openai_key.clone(),
            model: openai_model.clone(),
            ..Default::default()
        },
        gemini: config::ProviderSection {
            api_key: google_key.clone(),
            ..Default::default()
        },
        stages: config::StagesSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(model) = &model {
        println!("  planner.model = {model}");
    }
    if let Some(temperature) = temperature {
        println!("  planner.temperature = {temperature}");
    }
    if let Some(model) = &openai_model {
        println!("  openai.model = {model}");
    }
    if let Some(key) = &openai_key {
        println!("  openai.api_key = {}", config::mask_secret(key));
    }
    if let Some(key) = &google_key {
        println!("  gemini.api_key = {}", config::mask_secret(key));
    }
    if openai_key.is_none() || google_key.is_none() {
        println!();
        println!("Missing keys can also come from OPENAI_API_KEY and GOOGLE_API_KEY.");
    }
    for note in config::model_notes(&cfg) {
        println!();
        println!("Note: {note}");
    }

    Ok(())
}

/// How an interruptible command ended.
#[derive(Debug, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    Interrupted,
}

/// Run `fut` until it finishes or `interrupt` fires, whichever comes first.
async fn interruptible<F, I>(fut: F, interrupt: I) -> anyhow::Result<RunOutcome>
where
    F: Future<Output = anyhow::Result<()>>,
    I: Future,
{
    tokio::select! {
        result = fut => result.map(|()| RunOutcome::Completed),
        _ = interrupt => Ok(RunOutcome::Interrupted),
    }
}

/// Run a whole command, prompts included, under the Ctrl-C handler.
async fn run_interruptible<F>(fut: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    if interruptible(fut, tokio::signal::ctrl_c()).await? == RunOutcome::Interrupted {
        eprintln!("\nInterrupted by user");
        // A prompt thread may still be blocked on stdin.
        std::process::exit(0);
    }
    Ok(())
}

/// Ask for missing profile fields on a blocking thread so Ctrl-C stays responsive.
async fn collect_profile(args: ProfileArgs) -> anyhow::Result<UserProfile> {
    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        Prompter::new(stdin.lock(), io::stdout()).complete_profile(args)
    })
    .await
    .context("profile input task failed")?
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        model: cli.model.clone(),
        temperature: cli.temperature,
        strict: false,
    };

    match cli.command {
        Commands::Init {
            openai_key,
            google_key,
            openai_model,
            force,
        } => {
            cmd_init(
                openai_key,
                google_key,
                openai_model,
                cli.model,
                cli.temperature,
                force,
            )?;
        }
        Commands::Plan {
            profile,
            output_dir,
            strict,
        } => {
            let resolved = config::resolve(&CliOverrides {
                strict,
                ..overrides
            })?;
            let options = OutputOptions {
                dir: output_dir,
                stem: DEFAULT_STEM.to_string(),
                markdown: true,
            };
            run_interruptible(async {
                let profile = collect_profile(profile).await?;
                plan_cmd::run_plan(&resolved, profile, &options).await
            })
            .await?;
        }
        Commands::Example { output_dir } => {
            let resolved = config::resolve(&overrides)?;
            let profile = plan_cmd::example_profile()?;
            println!("\n=== SAMPLE PROFILE ===");
            println!("Goal: {}", profile.goal().label());
            println!("Sex: {}", profile.sex());
            println!("Weight: {} kg", profile.weight());
            println!("Height: {} cm", profile.height());
            println!("Age: {} years", profile.age());
            println!("Preferences: {}", profile.preferences());
            let options = OutputOptions {
                dir: output_dir,
                stem: format!("example_{DEFAULT_STEM}"),
                markdown: false,
            };
            run_interruptible(plan_cmd::run_plan(&resolved, profile, &options)).await?;
        }
        Commands::Render {
            path,
            markdown,
            no_shopping,
        } => {
            let mut stdout = io::stdout().lock();
            render_cmd::run_render(&path, markdown.as_deref(), !no_shopping, &mut stdout)
                .with_context(|| format!("failed to render {}", path.display()))?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mealplan", &mut io::stdout());
        }
    }

    Ok(())
}
