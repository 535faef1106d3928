use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deck_oracle::config::{Config, ConfigOverrides};
use deck_oracle::costs::{
    collection_upgrade_info, get_upgrade_priorities, rarity_breakdown, RarityBreakdown,
    UpgradeCostTable, UpgradePriority,
};
use deck_oracle::deck::DeckBuilder;
use deck_oracle::impact::UpgradeImpactAnalyzer;
use deck_oracle::output::json::render_json;
use deck_oracle::output::table::{
    render_archetypes_table, render_deck_table, render_impact_table, render_priorities_table,
    render_templates_table,
};
use deck_oracle::providers::BuiltinStrategies;
use deck_oracle::scoring::RoleClassifier;
use deck_oracle::viability::ArchetypeViabilityDetector;
use deck_oracle::CollectionSnapshot;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "deck-oracle",
    about = "Deck building, archetype viability and upgrade impact for card collections"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build an 8-card deck from the collection.
    Build {
        #[arg(long)]
        collection: PathBuf,
        /// Comma-separated cards with unlocked evolutions.
        #[arg(long)]
        evolutions: Option<String>,
        #[arg(long)]
        exclude: Option<String>,
        #[arg(long)]
        include: Option<String>,
    },
    /// Score every archetype template against the collection.
    Archetypes {
        #[arg(long)]
        collection: PathBuf,
        #[arg(long)]
        templates: Option<String>,
        #[arg(long = "min-viability")]
        min_viability: Option<f64>,
    },
    /// Rank single-level upgrades by impact across archetypes.
    Impact {
        #[arg(long)]
        collection: PathBuf,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Card-count upgrade priorities.
    Upgrades {
        #[arg(long)]
        collection: PathBuf,
        #[arg(long = "min-score", default_value_t = 0.0)]
        min_score: f64,
        #[arg(long, default_value_t = 0)]
        top: usize,
    },
    /// Show the archetype templates in use.
    Templates {
        /// Print the raw template document instead of a summary.
        #[arg(long)]
        export: bool,
    },
    /// Write or print the config file.
    Config {
        #[arg(long)]
        init: bool,
        /// Overwrite an existing config file with --init.
        #[arg(long)]
        force: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Serialize)]
struct UpgradesReport {
    priorities: Vec<UpgradePriority>,
    breakdown: Vec<RarityBreakdown>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(overrides_for(&cli.command)?);

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }

    let costs = Arc::new(UpgradeCostTable::standard());
    let classifier = Arc::new(RoleClassifier::standard());

    match &cli.command {
        Commands::Build { collection, .. } => {
            let snapshot = read_collection(collection)?;
            let builder = DeckBuilder::new(classifier, costs).with_options(config.build_options());
            let deck = builder.build(&snapshot)?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_deck_table(&deck)),
                OutputFormat::Json => println!("{}", render_json(&deck)?),
            }
        }
        Commands::Archetypes { collection, .. } => {
            let snapshot = read_collection(collection)?;
            let detector = ArchetypeViabilityDetector::new(
                Arc::new(config.load_templates()?),
                Arc::new(config.load_synergy()?),
                Arc::new(BuiltinStrategies::standard()),
            )
            .with_cost_table(costs);
            let analysis = detector.detect(&snapshot, &config.detection_options())?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_archetypes_table(&analysis)),
                OutputFormat::Json => println!("{}", render_json(&analysis)?),
            }
        }
        Commands::Impact { collection, .. } => {
            let snapshot = read_collection(collection)?;
            let analyzer =
                UpgradeImpactAnalyzer::new(Arc::new(config.load_templates()?), classifier, costs);
            let analysis = analyzer.analyze(&snapshot, &config.impact_options())?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_impact_table(&analysis)),
                OutputFormat::Json => println!("{}", render_json(&analysis)?),
            }
        }
        Commands::Upgrades {
            collection,
            min_score,
            top,
        } => {
            let snapshot = read_collection(collection)?;
            snapshot.validate()?;
            let infos = collection_upgrade_info(&costs, &snapshot);
            let report = UpgradesReport {
                priorities: get_upgrade_priorities(&infos, *min_score, *top),
                breakdown: rarity_breakdown(&infos),
            };
            info!(
                cards = infos.len(),
                priorities = report.priorities.len(),
                "computed upgrade priorities"
            );
            match cli.output {
                OutputFormat::Table => println!("{}", render_priorities_table(&report.priorities)),
                OutputFormat::Json => println!("{}", render_json(&report)?),
            }
        }
        Commands::Templates { export } => {
            let store = config.load_templates()?;
            if *export {
                println!("{}", render_json(&store.to_document())?);
            } else {
                match cli.output {
                    OutputFormat::Table => println!("{}", render_templates_table(&store)),
                    OutputFormat::Json => println!("{}", render_json(store.templates())?),
                }
            }
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn overrides_for(command: &Commands) -> Result<ConfigOverrides> {
    let overrides = match command {
        Commands::Build {
            evolutions,
            exclude,
            include,
            ..
        } => ConfigOverrides {
            unlocked_evolutions: evolutions.as_deref().map(parse_card_list).transpose()?,
            exclude_cards: exclude.as_deref().map(parse_card_list).transpose()?,
            include_cards: include.as_deref().map(parse_card_list).transpose()?,
            ..ConfigOverrides::default()
        },
        Commands::Archetypes {
            templates,
            min_viability,
            ..
        } => ConfigOverrides {
            templates_path: templates.clone(),
            min_viability: *min_viability,
            ..ConfigOverrides::default()
        },
        Commands::Impact { threshold, top, .. } => ConfigOverrides {
            viability_threshold: *threshold,
            top_n: *top,
            ..ConfigOverrides::default()
        },
        _ => ConfigOverrides::default(),
    };
    Ok(overrides)
}

fn read_collection(path: &Path) -> Result<CollectionSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading collection: {}", path.display()))?;
    let snapshot: CollectionSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing collection JSON: {}", path.display()))?;
    info!(
        player = snapshot.player_tag.as_str(),
        cards = snapshot.len(),
        "loaded collection"
    );
    Ok(snapshot)
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, force, show } = command else {
        return Ok(());
    };
    if *init {
        Config::init_file(config_path, *force)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn parse_card_list(raw: &str) -> Result<Vec<String>> {
    let out: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();
    if out.is_empty() {
        return Err(anyhow!("card list is empty"));
    }
    Ok(out)
}
