use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::archetype::ArchetypeTemplateStore;
use crate::deck::BuildOptions;
use crate::impact::ImpactOptions;
use crate::providers::SynergyTable;
use crate::types::Rarity;
use crate::viability::DetectionOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub impact: ImpactConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub synergy: SynergyConfig,
}

/// Missing fields fall back to `BuildOptions::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub evolution_slot_limit: usize,
    pub unlocked_evolutions: Vec<String>,
    pub include_cards: Vec<String>,
    pub exclude_cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub min_viability: f64,
    pub include_strategies: bool,
    pub include_upgrades: bool,
    pub top_upgrades_per_archetype: usize,
    pub top_cross_archetype_upgrades: usize,
    pub exclude_cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub viability_threshold: f64,
    pub top_n: usize,
    pub include_max_level: bool,
    pub focus_rarities: Vec<Rarity>,
    pub exclude_cards: Vec<String>,
}

/// Empty path means the bundled set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SynergyConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub templates_path: Option<String>,
    pub unlocked_evolutions: Option<Vec<String>>,
    pub include_cards: Option<Vec<String>>,
    pub exclude_cards: Option<Vec<String>>,
    pub min_viability: Option<f64>,
    pub viability_threshold: Option<f64>,
    pub top_n: Option<usize>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/deck-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.templates_path {
            self.templates.path = path;
        }
        if let Some(evolutions) = overrides.unlocked_evolutions {
            self.builder.unlocked_evolutions = evolutions;
        }
        if let Some(include) = overrides.include_cards {
            self.builder.include_cards = include;
        }
        if let Some(exclude) = overrides.exclude_cards {
            self.builder.exclude_cards = exclude.clone();
            self.detection.exclude_cards = exclude.clone();
            self.impact.exclude_cards = exclude;
        }
        if let Some(min_viability) = overrides.min_viability {
            self.detection.min_viability = min_viability;
        }
        if let Some(threshold) = overrides.viability_threshold {
            self.impact.viability_threshold = threshold;
        }
        if let Some(top_n) = overrides.top_n {
            self.impact.top_n = top_n;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    /// Like `write_template`, but refuses to replace an existing file unless `overwrite`.
    pub fn init_file(path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            return Err(anyhow!(
                "config already exists at {}; pass --force to overwrite",
                path.display()
            ));
        }
        Self::write_template(path)
    }

    pub fn resolved_templates_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.templates.path)
    }

    pub fn resolved_synergy_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.synergy.path)
    }

    /// Custom template file when configured, else the bundled set.
    pub fn load_templates(&self) -> Result<ArchetypeTemplateStore> {
        match self.resolved_templates_path() {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed reading templates: {}", path.display()))?;
                ArchetypeTemplateStore::from_json(&raw)
                    .with_context(|| format!("invalid template file: {}", path.display()))
            }
            None => ArchetypeTemplateStore::bundled().context("bundled templates are invalid"),
        }
    }

    pub fn load_synergy(&self) -> Result<SynergyTable> {
        match self.resolved_synergy_path() {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed reading synergy data: {}", path.display()))?;
                SynergyTable::from_json(&raw)
                    .with_context(|| format!("invalid synergy file: {}", path.display()))
            }
            None => SynergyTable::bundled().context("bundled synergy data is invalid"),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            unlocked_evolutions: self.builder.unlocked_evolutions.clone(),
            evolution_slot_limit: self.builder.evolution_slot_limit,
            include_cards: self.builder.include_cards.clone(),
            exclude_cards: self.builder.exclude_cards.clone(),
        }
    }

    pub fn detection_options(&self) -> DetectionOptions {
        DetectionOptions {
            min_viability: self.detection.min_viability,
            include_strategies: self.detection.include_strategies,
            include_upgrades: self.detection.include_upgrades,
            top_upgrades_per_archetype: self.detection.top_upgrades_per_archetype,
            top_cross_archetype_upgrades: self.detection.top_cross_archetype_upgrades,
            exclude_cards: self.detection.exclude_cards.clone(),
        }
    }

    pub fn impact_options(&self) -> ImpactOptions {
        ImpactOptions {
            viability_threshold: self.impact.viability_threshold,
            top_n: self.impact.top_n,
            include_max_level: self.impact.include_max_level,
            focus_rarities: self.impact.focus_rarities.clone(),
            exclude_cards: self.impact.exclude_cards.clone(),
        }
    }

    pub fn default_template() -> String {
        let template = r#"[builder]
evolution_slot_limit = 2
unlocked_evolutions = []
include_cards = []
exclude_cards = []

[detection]
min_viability = 0.0
include_strategies = true
include_upgrades = true
top_upgrades_per_archetype = 3
top_cross_archetype_upgrades = 10
exclude_cards = []

[impact]
viability_threshold = 0.75
top_n = 10
include_max_level = false
focus_rarities = []
exclude_cards = []

[templates]
# Empty uses the bundled archetype set.
path = ""

[synergy]
path = ""
"#;
        template.to_string()
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| expand_tilde(trimmed))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for BuilderConfig {
    fn default() -> Self {
        let options = BuildOptions::default();
        Self {
            evolution_slot_limit: options.evolution_slot_limit,
            unlocked_evolutions: options.unlocked_evolutions,
            include_cards: options.include_cards,
            exclude_cards: options.exclude_cards,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let options = DetectionOptions::default();
        Self {
            min_viability: options.min_viability,
            include_strategies: options.include_strategies,
            include_upgrades: options.include_upgrades,
            top_upgrades_per_archetype: options.top_upgrades_per_archetype,
            top_cross_archetype_upgrades: options.top_cross_archetype_upgrades,
            exclude_cards: options.exclude_cards,
        }
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        let options = ImpactOptions::default();
        Self {
            viability_threshold: options.viability_threshold,
            top_n: options.top_n,
            include_max_level: options.include_max_level,
            focus_rarities: options.focus_rarities,
            exclude_cards: options.exclude_cards,
        }
    }
}
