//! Multiworld settings generator CLI
//!
//! Entry point for the `mw-generate` command-line tool.

use clap::{Parser, Subcommand};
use mw_generate::config::HOST_SETTINGS_FILE;
use mw_generate::{error_chain, read_documents, roll_documents, EffectiveSettings, Generator, RollRng};
use mw_options::{PlandoOptions, StaticRegistry, WorldManifest, WorldRegistry};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mw-generate")]
#[command(about = "Resolve weighted multiworld settings documents", version)]
struct Cli {
    /// Log filter (overrides the settings file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Include timestamps in log lines
    #[arg(long, global = true)]
    log_time: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve settings for every participant of a run
    Generate(GenerateArgs),

    /// Resolve every document of one weights file
    Roll {
        /// Weights file to resolve
        file: PathBuf,

        /// Seed for the run (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Enabled plando modules
        #[arg(long, default_value = "bosses")]
        plando: String,

        /// Additional world manifest (repeatable)
        #[arg(long = "world-manifest")]
        world_manifests: Vec<PathBuf>,
    },

    /// List registered games and their options
    Games {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Additional world manifest (repeatable)
        #[arg(long = "world-manifest")]
        world_manifests: Vec<PathBuf>,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Host settings file (default: generator.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory holding player files
    #[arg(long)]
    player_files_path: Option<PathBuf>,

    /// Weights file used for slots without a player file
    #[arg(long)]
    weights_file_path: Option<PathBuf>,

    /// Meta file broadcast into every document
    #[arg(long)]
    meta_file_path: Option<PathBuf>,

    /// Seed for the run (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum number of players
    #[arg(long)]
    multi: Option<usize>,

    /// Reseed from entropy after drawing the seed name
    #[arg(long)]
    race: bool,

    /// Enabled plando modules, e.g. "bosses,items"
    #[arg(long)]
    plando: Option<String>,

    /// Roll each file once and reuse the result for all of its slots
    #[arg(long)]
    same_options: bool,

    /// Spoiler level 0..=3
    #[arg(long)]
    spoiler: Option<u8>,

    /// Output directory recorded in the plan
    #[arg(long)]
    output_path: Option<PathBuf>,

    #[arg(long)]
    skip_prog_balancing: bool,

    #[arg(long)]
    skip_output: bool,

    #[arg(long)]
    spoiler_only: bool,

    /// JSON player configuration, inline or a path to a JSON file
    #[arg(long)]
    json_config: Option<String>,

    /// Additional world manifest (repeatable)
    #[arg(long = "world-manifest")]
    world_manifests: Vec<PathBuf>,

    /// Write the plan here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

impl GenerateArgs {
    /// Flags given on the command line, as a settings layer
    fn overrides(&self, log_level: Option<&str>, log_time: bool) -> Value {
        let mut map = Map::new();
        let mut set = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };
        if let Some(path) = &self.player_files_path {
            set("player_files_path", Value::from(path.to_string_lossy().to_string()));
        }
        if let Some(path) = &self.weights_file_path {
            set("weights_file_path", Value::from(path.to_string_lossy().to_string()));
        }
        if let Some(path) = &self.meta_file_path {
            set("meta_file_path", Value::from(path.to_string_lossy().to_string()));
        }
        if let Some(seed) = self.seed {
            set("seed", Value::from(seed));
        }
        if let Some(multi) = self.multi {
            set("players", Value::from(multi));
        }
        if let Some(plando) = &self.plando {
            set("plando_options", Value::from(plando.clone()));
        }
        if let Some(spoiler) = self.spoiler {
            set("spoiler", Value::from(spoiler));
        }
        if let Some(path) = &self.output_path {
            set("output_path", Value::from(path.to_string_lossy().to_string()));
        }
        if let Some(json_config) = &self.json_config {
            set("json_config", Value::from(json_config.clone()));
        }
        if let Some(level) = log_level {
            set("log_level", Value::from(level));
        }
        for (key, flag) in [
            ("race", self.race),
            ("same_options", self.same_options),
            ("skip_prog_balancing", self.skip_prog_balancing),
            ("skip_output", self.skip_output),
            ("spoiler_only", self.spoiler_only),
            ("log_time", log_time),
        ] {
            if flag {
                set(key, Value::Bool(true));
            }
        }
        Value::Object(map)
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            run_generate(args, cli.log_level.as_deref(), cli.log_time);
        }
        Commands::Roll {
            file,
            seed,
            plando,
            world_manifests,
        } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), cli.log_time);
            run_roll(&file, seed, &plando, &world_manifests);
        }
        Commands::Games {
            json,
            world_manifests,
        } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"), cli.log_time);
            run_games(json, &world_manifests);
        }
    }
}

fn init_logging(level: &str, with_time: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if with_time {
        builder.init();
    } else {
        builder.without_time().init();
    }
}

fn fail(context: &str, err: &(dyn std::error::Error + 'static)) -> ! {
    eprintln!("{}: {}", context, error_chain(err));
    process::exit(1);
}

fn load_registry(manifests: &[PathBuf]) -> StaticRegistry {
    let mut registry = match StaticRegistry::builtin() {
        Ok(registry) => registry,
        Err(e) => fail("Error loading built-in worlds", &e),
    };
    for path in manifests {
        let result = WorldManifest::load(path).and_then(|manifest| registry.register(manifest));
        if let Err(e) = result {
            fail(&format!("Error loading world manifest {}", path.display()), &e);
        }
    }
    registry
}

fn run_generate(args: GenerateArgs, log_level: Option<&str>, log_time: bool) {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(HOST_SETTINGS_FILE));
    let overrides = args.overrides(log_level, log_time);

    let effective = match EffectiveSettings::build(Some(&config_path), Some(overrides)) {
        Ok(effective) => effective,
        Err(e) => fail("Error loading settings", &e),
    };
    let settings = &effective.settings;
    init_logging(&settings.log_level, settings.log_time);

    let registry = load_registry(&args.world_manifests);
    let plan = match Generator::new(settings, &registry).run() {
        Ok(plan) => plan,
        Err(e) => fail("Generation failed", &e),
    };

    let json = match plan.to_json() {
        Ok(json) => json,
        Err(e) => fail("Error serializing plan", &e),
    };
    match args.out {
        Some(path) => {
            if let Err(e) = fs::write(&path, json) {
                fail(&format!("Error writing {}", path.display()), &e);
            }
            info!(path = %path.display(), players = plan.players.len(), "plan written");
        }
        None => println!("{}", json),
    }
}

fn run_roll(file: &Path, seed: Option<u64>, plando: &str, manifests: &[PathBuf]) {
    let plando = match PlandoOptions::from_option_string(plando) {
        Ok(plando) => plando,
        Err(e) => fail("Invalid plando modules", &e),
    };
    let registry = load_registry(manifests);
    let documents = match read_documents(file) {
        Ok(documents) => documents,
        Err(e) => fail(&format!("File {} is invalid", file.display()), &e),
    };

    let seed = seed.unwrap_or_else(RollRng::random_seed);
    info!(seed, documents = documents.len(), "rolling");
    let rolled = match roll_documents(&documents, &plando, &registry, seed) {
        Ok(rolled) => rolled,
        Err(e) => fail(&format!("File {} is invalid", file.display()), &e),
    };
    match serde_json::to_string_pretty(&rolled) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error serializing output", &e),
    }
}

fn run_games(json_output: bool, manifests: &[PathBuf]) {
    let registry = load_registry(manifests);

    if json_output {
        let games: Map<String, Value> = registry
            .game_names()
            .into_iter()
            .map(|game| {
                let keys: Vec<Value> = registry
                    .options_for(game)
                    .map(|table| table.keys().cloned().map(Value::from).collect())
                    .unwrap_or_default();
                (game.to_string(), Value::Array(keys))
            })
            .collect();
        let output = serde_json::json!({
            "games": games,
            "failed": registry.failed_loads(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => fail("Error serializing output", &e),
        }
        return;
    }

    for game in registry.game_names() {
        println!("{}", game);
        if let Some(table) = registry.options_for(game) {
            for (key, option) in table {
                let weighting = if option.supports_weighting() { "" } else { " (not weighted)" };
                println!("  {} = {}{}", key, option.default_value(), weighting);
            }
        }
    }
    for game in registry.failed_loads() {
        println!("{} (failed to load)", game);
    }
}
