use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pricing: PricingConfig,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Region used for nodes that do not declare one
    pub default_region: String,
    /// Upper bound on catalog records requested per query
    pub max_results: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Providers tried in order; API keys come from the environment
    /// (OPENAI_API_KEY, GEMINI_API_KEY, MISTRAL_API_KEY)
    pub provider_order: Vec<String>,
    pub openai_model: String,
    pub gemini_model: String,
    pub mistral_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig {
                default_region: "ap-south-1".to_string(),
                max_results: 100,
            },
            llm: Some(LlmConfig::default()),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_order: vec![
                "openai".to_string(),
                "gemini".to_string(),
                "mistral".to_string(),
            ],
            openai_model: "gpt-4o-2024-11-20".to_string(),
            gemini_model: "gemini-2.0-pro-exp".to_string(),
            mistral_model: "mistral-large-latest".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .archcost.toml in current dir, then ~/.config/archcost/config.toml
            let local = PathBuf::from(".archcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("archcost").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".archcost.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content).with_context(|| {
                let mut err = format!("Failed to parse config: {}", config_path.display());
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Missing required fields");
                err.push_str("\n    - Incorrect value types");
                err.push_str("\n  Tip: Run 'archcost init' to create a new config file");
                err
            })?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'archcost init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
