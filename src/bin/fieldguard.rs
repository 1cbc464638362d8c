//! fieldguard CLI binary.
//!
//! Runs the field security engine from the command line.
//!
//! # Commands
//!
//! - `validate` - Validate input against a policy
//! - `sanitize` - Sanitize input according to a policy
//! - `presets` - List the preset table
//! - `replay` - Feed successive values through a field controller

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fieldguard::{
    config::Config,
    field::{FieldOptions, FieldSecurityController, SharedValue},
    resolve_preset,
    security::{match_patterns, Preset},
    sanitize, validate, SecurityLevel, SecurityPolicy, VERSION,
};

#[derive(Parser)]
#[command(name = "fieldguard")]
#[command(version = VERSION)]
#[command(about = "Keystroke-level input security for text fields", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate input against a policy
    Validate {
        /// Input text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sanitize input according to a policy
    Sanitize {
        /// Input text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List the preset table
    Presets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feed successive values through a field controller
    Replay {
        /// Values, applied in order as change events
        #[arg(required = true)]
        values: Vec<String>,

        /// Config file (default: <config_dir>/fieldguard/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field name to look up in the config
        #[arg(long)]
        field: Option<String>,

        /// Preset name (overrides config)
        #[arg(short, long)]
        preset: Option<String>,

        /// Clear the value on any threat
        #[arg(long)]
        block: bool,

        /// Clear the value when sanitizing would change it
        #[arg(long)]
        sanitize: bool,

        /// Record threat messages as warnings
        #[arg(long)]
        warn: bool,

        /// Character limit
        #[arg(long)]
        max_characters: Option<usize>,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// Preset name (form, username, email, search, comment, critical)
    #[arg(short, long, conflicts_with = "level")]
    preset: Option<String>,

    /// Security level (basic, strict, paranoid)
    #[arg(short, long)]
    level: Option<String>,

    /// Maximum length in characters
    #[arg(short, long)]
    max_length: Option<usize>,

    /// Extra regex whose matches are deleted (repeatable)
    #[arg(long = "pattern")]
    patterns: Vec<String>,
}

impl PolicyArgs {
    fn build(&self) -> anyhow::Result<SecurityPolicy> {
        let mut policy = match (&self.preset, &self.level) {
            (Some(name), _) => resolve_preset(name)?,
            (None, Some(level)) => SecurityPolicy::new(level.parse::<SecurityLevel>()?),
            (None, None) => Preset::Form.policy(),
        };

        if let Some(max) = self.max_length {
            policy.max_length = Some(max);
        }
        for pattern in &self.patterns {
            policy = policy.with_custom_pattern(pattern)?;
        }

        Ok(policy)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            input,
            file,
            policy,
            json,
        } => cmd_validate(input, file, &policy, json),

        Commands::Sanitize {
            input,
            file,
            policy,
        } => cmd_sanitize(input, file, &policy),

        Commands::Presets { json } => cmd_presets(json),

        Commands::Replay {
            values,
            config,
            field,
            preset,
            block,
            sanitize,
            warn,
            max_characters,
        } => {
            let mut options = load_field_options(config, field.as_deref())?;
            if let Some(name) = preset {
                options = options.with_preset_name(&name)?;
            }
            if block {
                options.block_unsafe_input = true;
            }
            if sanitize {
                options.sanitize_on_change = true;
            }
            if warn {
                options.show_security_warnings = true;
            }
            if let Some(max) = max_characters {
                options.max_characters = Some(max);
            }
            cmd_replay(&values, options, field.as_deref().unwrap_or("field"))
        },
    }
}

fn cmd_validate(
    input: Option<String>,
    file: Option<PathBuf>,
    policy_args: &PolicyArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let policy = policy_args.build()?;
    let result = validate(&content, &policy);

    if json_output {
        let output = serde_json::json!({
            "level": policy.level,
            "is_valid": result.is_valid,
            "threats": result.threats,
            "sanitized": result.sanitized,
            "patterns": match_patterns(&content).iter().map(|p| serde_json::json!({
                "name": p.name,
                "group": p.group.to_string(),
                "description": p.description,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if result.is_valid {
        println!("VALID ({})", policy.level);
    } else {
        println!("INVALID ({})", policy.level);
        println!();
        println!("Detected threats:");
        for threat in &result.threats {
            println!("  - {} ({})", threat.message, threat.category);
        }

        let patterns = match_patterns(&content);
        if !patterns.is_empty() {
            println!();
            println!("Matched patterns:");
            for pattern in patterns {
                println!("  - {} ({}): {}", pattern.name, pattern.group, pattern.description);
            }
        }

        println!();
        println!("Sanitized: {}", result.sanitized);
    }

    if !result.is_valid {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_sanitize(
    input: Option<String>,
    file: Option<PathBuf>,
    policy_args: &PolicyArgs,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let policy = policy_args.build()?;

    println!("{}", sanitize(&content, &policy));
    Ok(())
}

fn cmd_presets(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let mut presets = serde_json::Map::new();
        for preset in Preset::ALL {
            presets.insert(preset.name().to_string(), serde_json::to_value(preset.policy())?);
        }
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    println!("{:<10} {:<10} {:>10}", "NAME", "LEVEL", "MAX LENGTH");
    println!("{}", "-".repeat(32));
    for preset in Preset::ALL {
        let policy = preset.policy();
        let max = policy
            .max_length
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        println!("{:<10} {:<10} {:>10}", preset.name(), policy.level, max);
    }

    Ok(())
}

fn cmd_replay(values: &[String], options: FieldOptions, name: &str) -> anyhow::Result<()> {
    let value = SharedValue::default();
    let mut field = FieldSecurityController::new(value.clone(), options).with_name(name);

    for raw in values {
        let outcome = field.handle_change(raw);
        let step = serde_json::json!({
            "input": raw,
            "value": value.get(),
            "status": field.status(),
            "cleared": outcome.cleared,
            "threats": outcome.threats,
            "warnings": field.security_warnings(),
            "current_length": field.current_length(),
            "is_over_limit": field.is_over_limit(),
            "show_security_variant": field.should_show_security_variant(),
        });
        println!("{}", serde_json::to_string(&step)?);
    }

    Ok(())
}

// Helper functions

fn load_field_options(config: Option<PathBuf>, field: Option<&str>) -> anyhow::Result<FieldOptions> {
    let path = match config {
        Some(path) => Some(path),
        None => Config::default_path().filter(|p| p.exists()),
    };

    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = config.with_env()?;

    Ok(match field {
        Some(name) => config.field(name).clone(),
        None => config.defaults,
    })
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
