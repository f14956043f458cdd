use clap::Parser;
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "ensemble",
    version,
    about = "Run one conversation turn against a configured agent"
)]
pub struct Cli {
    /// Path to the agent configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Agent to run (defaults to `default_agent` from the configuration)
    #[arg(long)]
    pub agent: Option<String>,
    /// Session key scoping the stored task history
    #[arg(long)]
    pub session: String,
    /// Address a specific task instead of the session's latest one
    #[arg(long)]
    pub task: Option<i64>,
    /// Prompt label substituted into the agent context, as KEY=VALUE
    #[arg(long = "label", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,
    /// Override the session store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
    /// Read the prompt from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
    /// Disable log output
    #[arg(long, short)]
    pub quiet: bool,
    pub prompt: Vec<String>,
}

pub fn parse_label(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("label '{raw}' must be KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("label '{raw}' has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.prompt_file {
        info!(path = %path.display(), "Loading prompt from file");
        let content = fs::read_to_string(path)?;
        return non_empty(normalize_prompt(content));
    }

    if !cli.prompt.is_empty() {
        info!("Using prompt provided through CLI arguments");
        return non_empty(normalize_prompt(cli.prompt.join(" ")));
    }

    if !io::stdin().is_terminal() {
        info!("Reading prompt from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return non_empty(normalize_prompt(buffer));
    }

    warn!("Prompt not provided via arguments, file, or stdin");
    Err("prompt required via arguments, file, or stdin".into())
}

fn normalize_prompt(prompt: String) -> String {
    prompt.trim().to_string()
}

fn non_empty(prompt: String) -> Result<String, Box<dyn Error>> {
    if prompt.is_empty() {
        return Err("prompt is empty".into());
    }
    Ok(prompt)
}
