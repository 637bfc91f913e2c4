use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ghmerge::error::MergeError;
use ghmerge::github::{CachingSource, GithubClient};
use ghmerge::request::MergeRequest;
use ghmerge::service::{CONTENT_TYPE, MergeService, SvgResponse};
use ghmerge::theme::{OVERLAY_THEME_NAMES, THEME_NAMES};
use ghmerge::types::ThemeColors;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Merge several GitHub contribution calendars into one SVG heatmap
#[derive(Parser, Debug)]
#[command(name = "ghmerge")]
#[command(version)]
#[command(about = "Merge GitHub contribution graphs into a single SVG", long_about = None)]
struct Args {
    /// Comma-separated usernames (2 to 10)
    #[arg(short, long, value_name = "USERS")]
    users: Vec<String>,

    /// A single username; may be repeated
    #[arg(long = "user", value_name = "USER")]
    user: Vec<String>,

    /// Blend mode: sum or overlay
    #[arg(short, long, value_name = "MODE")]
    mode: Option<String>,

    /// Built-in theme name (see --list-themes)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Custom base colors, comma-separated 6-digit hex
    #[arg(short, long, value_name = "HEX")]
    colors: Option<String>,

    /// Generate custom colors for a dark background
    #[arg(long)]
    dark: bool,

    /// Path to a theme file (TOML or YAML) overriding the built-in theme
    #[arg(long, value_name = "FILE")]
    theme_file: Option<PathBuf>,

    /// Output SVG path (use "-" or omit for stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// GitHub token used for the GraphQL API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "ghmerge", &mut std::io::stdout());
        return Ok(());
    }

    if args.list_themes {
        for name in THEME_NAMES {
            let overlay = if OVERLAY_THEME_NAMES.contains(&name) {
                " (overlay)"
            } else {
                ""
            };
            println!("{}{}", name, overlay);
        }
        return Ok(());
    }

    let theme_file = match args.theme_file {
        Some(ref theme_path) => Some(load_theme_file(theme_path)?),
        None => None,
    };

    let request = MergeRequest {
        users: args.users.iter().chain(args.user.iter()).cloned().collect(),
        mode: args.mode.clone(),
        theme: args.theme.clone(),
        colors: args.colors.clone(),
        dark: args.dark,
        theme_file,
    };

    let response = match args.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => {
            let service = MergeService::new(CachingSource::new(GithubClient::new(token)));
            service.handle(&request)
        }
        _ => SvgResponse::from_error(&MergeError::Config("GITHUB_TOKEN not set.".to_string())),
    };

    info!(
        status = response.status,
        content_type = CONTENT_TYPE,
        cache_control = response.cache_control,
        bytes = response.body.len(),
        "response ready"
    );

    write_output(args.output.as_ref(), &response.body)?;

    if response.is_success() {
        Ok(())
    } else {
        Err(format!("Request failed with status {}", response.status))
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_theme_file(theme_path: &Path) -> Result<ThemeColors, String> {
    if !(theme_path.exists() && theme_path.is_file()) {
        return Err(format!("Theme file not found: {}", theme_path.display()));
    }

    let content = std::fs::read_to_string(theme_path)
        .map_err(|e| format!("Failed to read theme file: {}", e))?;

    ThemeColors::from_file_contents(&content).map_err(|e| e.to_string())
}

fn write_output(output: Option<&PathBuf>, svg: &str) -> Result<(), String> {
    match output {
        Some(path) if path.to_str() != Some("-") => {
            std::fs::write(path, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", path.display());
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(svg.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .map_err(|e| format!("Failed to write SVG to stdout: {}", e))?;
        }
    }
    Ok(())
}
