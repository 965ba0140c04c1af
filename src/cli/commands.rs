use clap::{Parser, Subcommand};
use crate::aggregate::{classify, percentages, AggregationResult, ClassifyOptions};
use crate::binder::SceneColorBinder;
use crate::cli::abbrev;
use crate::cli::error::{user_error, validate_pid, validate_pid_field};
use crate::cli::output::{
    binding_json, format_binding, format_phase_legend, format_report, format_unit_view,
    get_terminal_width, is_tty, report_json,
};
use crate::config::{Config, PhaseSource};
use crate::ingest;
use crate::models::{PhaseDefinition, Policy, Rgb, Scene, UnitRecord};
use crate::utils::find_near_phase_matches;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "phasemap")]
#[command(
    about = "Production phase tracking overlay - color CAD scene objects by phase of completion"
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Phase definition: preset name (production, legacy) or path to a phase file
    #[arg(long, global = true)]
    pub phases: Option<String>,
    /// Counting policy: cumulative or exclusive
    #[arg(long, global = true, value_parser = parse_policy)]
    pub policy: Option<Policy>,
    /// User-string key holding the part identifier
    #[arg(long = "pid-field", global = true)]
    pub pid_field: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the phases in progression order with their colors
    Phases {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Count units per phase and show the percentage breakdown
    Report {
        /// Tracking rows (JSON array of row objects)
        rows: PathBuf,
        /// Scene file; its distinct PIDs set the total unit count
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Total units tracked (overrides the scene count)
        #[arg(long)]
        total: Option<usize>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Assign a phase color to every object of a scene
    Color {
        /// Tracking rows (JSON array of row objects)
        rows: PathBuf,
        /// Scene file (JSON object list)
        #[arg(long)]
        scene: PathBuf,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the phase, color and scene objects of one unit
    Show {
        /// Part identifier
        pid: String,
        /// Tracking rows (JSON array of row objects)
        rows: PathBuf,
        /// Scene file to list matching objects from
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config,
}

fn parse_policy(s: &str) -> std::result::Result<Policy, String> {
    Policy::from_str(s)
        .ok_or_else(|| format!("unknown policy '{}' (expected cumulative or exclusive)", s))
}

/// Configuration after applying command-line overrides to the rc file
struct Settings {
    config: Config,
    definition: PhaseDefinition,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = Config::load().context("Failed to load configuration")?;

        if let Some(phases) = &cli.phases {
            config.phases = PhaseSource::parse(phases, None).unwrap_or_else(|e| user_error(&e));
        }
        if let Some(policy) = cli.policy {
            config.policy = policy;
        }
        if let Some(field) = &cli.pid_field {
            config.pid_field = validate_pid_field(field).unwrap_or_else(|e| user_error(&e));
        }

        let definition = config
            .phase_definition()
            .with_context(|| format!("Failed to load phases from {}", config.phases))?;
        log::debug!(
            "using {} phases from {}, policy {}",
            definition.len(),
            config.phases,
            config.policy.as_str()
        );

        Ok(Self { config, definition })
    }

    fn binder(&self) -> SceneColorBinder<'_> {
        SceneColorBinder::new(&self.definition)
            .with_pid_field(&self.config.pid_field)
            .with_neutral(self.config.neutral)
    }

    fn neutral(&self) -> Rgb {
        self.config.neutral
    }

    fn load_rows(&self, path: &Path) -> Result<Vec<UnitRecord>> {
        ingest::load_records(path, &self.config.pid_field)
            .with_context(|| format!("Failed to load rows from {}", path.display()))
    }

    fn load_scene(&self, path: &Path) -> Result<Scene> {
        ingest::load_scene(path)
            .with_context(|| format!("Failed to load scene from {}", path.display()))
    }

    /// Classify and log what the surrounding app should know about the data
    fn classify(&self, records: &[UnitRecord], total_units: Option<usize>) -> AggregationResult {
        let options = ClassifyOptions {
            policy: self.config.policy,
            total_units,
        };
        let result = classify(records, &self.definition, options);

        warn_unrecognized_columns(&result, &self.definition);
        if result.total_was_raised(total_units) {
            log::warn!(
                "Total units ({}) is less than the number of rows ({}); using {}",
                total_units.unwrap_or_default(),
                result.record_count,
                result.total_units
            );
        }
        log::debug!(
            "{} units, {} started, {} not started",
            result.total_units,
            result.units_reached,
            result.not_started
        );
        result
    }
}

fn warn_unrecognized_columns(result: &AggregationResult, definition: &PhaseDefinition) {
    if result.unrecognized_columns.is_empty() {
        return;
    }

    let columns = definition.columns();
    let mut ignored = Vec::new();
    for column in &result.unrecognized_columns {
        match find_near_phase_matches(column, &columns, 2).first() {
            Some((suggestion, _)) => log::warn!(
                "Column '{}' is not a phase column; did you mean '{}'?",
                column,
                suggestion
            ),
            None => ignored.push(column.as_str()),
        }
    }
    if !ignored.is_empty() {
        log::warn!("Ignoring columns that are not phases: {}", ignored.join(", "));
    }
}

pub fn run() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // Check for version flag early (before any processing)
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("phasemap {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Expand command abbreviations before processing
    args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };

    let is_help_request = args.is_empty()
        || args.iter().any(|a| a == "--help" || a == "-h" || a == "help");

    let clap_args = std::iter::once("phasemap".to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>();
    let cli = match Cli::try_parse_from(clap_args) {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            if is_help_request || !e.use_stderr() {
                return Ok(());
            }
            std::process::exit(1);
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(&cli)?;

    match cli.command {
        Commands::Phases { json } => handle_phases(&settings, json),
        Commands::Report { rows, scene, total, json } => {
            handle_report(&settings, &rows, scene.as_deref(), total, json)
        }
        Commands::Color { rows, scene, json } => handle_color(&settings, &rows, &scene, json),
        Commands::Show { pid, rows, scene, json } => {
            handle_show(&settings, &pid, &rows, scene.as_deref(), json)
        }
        Commands::Config => handle_config(&settings),
    }
}

fn handle_phases(settings: &Settings, json: bool) -> Result<()> {
    if json {
        let phases: Vec<serde_json::Value> = settings
            .definition
            .phases()
            .iter()
            .enumerate()
            .map(|(idx, phase)| {
                serde_json::json!({
                    "order": idx + 1,
                    "name": phase.name,
                    "column": phase.column(),
                    "color": phase.color,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&phases)?);
    } else {
        print!("{}", format_phase_legend(&settings.definition, settings.neutral(), is_tty()));
    }
    Ok(())
}

fn handle_report(
    settings: &Settings,
    rows: &Path,
    scene: Option<&Path>,
    total: Option<usize>,
    json: bool,
) -> Result<()> {
    let records = settings.load_rows(rows)?;

    let total_units = match (total, scene) {
        (Some(total), _) => Some(total),
        (None, Some(path)) => {
            let scene = settings.load_scene(path)?;
            Some(scene.unit_count(&settings.config.pid_field))
        }
        (None, None) => None,
    };

    let result = settings.classify(&records, total_units);
    let view = percentages(&result);

    if json {
        println!("{}", serde_json::to_string_pretty(&report_json(&result, &view))?);
    } else {
        print!(
            "{}",
            format_report(
                &result,
                &view,
                &settings.definition,
                settings.neutral(),
                is_tty(),
                get_terminal_width()
            )
        );
    }
    Ok(())
}

fn handle_color(settings: &Settings, rows: &Path, scene: &Path, json: bool) -> Result<()> {
    let records = settings.load_rows(rows)?;
    let scene = settings.load_scene(scene)?;

    let total_units = Some(scene.unit_count(&settings.config.pid_field));
    let result = settings.classify(&records, total_units);
    let binding = settings.binder().bind(&scene, &result);

    if json {
        println!("{}", serde_json::to_string_pretty(&binding_json(&binding)?)?);
    } else {
        print!("{}", format_binding(&binding, is_tty()));
    }
    Ok(())
}

fn handle_show(
    settings: &Settings,
    pid: &str,
    rows: &Path,
    scene: Option<&Path>,
    json: bool,
) -> Result<()> {
    let pid = validate_pid(pid).unwrap_or_else(|e| user_error(&e));
    let records = settings.load_rows(rows)?;
    let scene = match scene {
        Some(path) => settings.load_scene(path)?,
        None => Scene::default(),
    };

    let result = settings.classify(&records, None);
    let view = match settings.binder().lookup(&pid, &scene, &result) {
        Some(view) => view,
        None => user_error(&format!("PID {} not found in {}", pid, rows.display())),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", format_unit_view(&view, is_tty()));
    }
    Ok(())
}

fn handle_config(settings: &Settings) -> Result<()> {
    let config = &settings.config;
    let source = match &config.source {
        Some(path) => path.display().to_string(),
        None => match Config::config_path() {
            Some(path) => format!("{} (not found, using defaults)", path.display()),
            None => "(no home directory, using defaults)".to_string(),
        },
    };

    println!("Config file: {}", source);
    println!("Phases:      {} ({} phases)", config.phases, settings.definition.len());
    println!("Policy:      {}", config.policy.as_str());
    println!("PID field:   {}", config.pid_field);
    println!("Neutral:     {}", config.neutral);
    Ok(())
}
