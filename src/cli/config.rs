use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::blind::SearchStrategy;
use crate::executor::{ExecuteFailReason, RetryPolicy};
use crate::orchestrator::OrchestratorConfig;
use crate::semantic::planner::DEFAULT_START_SCREEN;

pub const DEFAULT_CONFIG_PATH: &str = "ui-navigator.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ui-navigator",
    version,
    about = "Goal-directed path planning and verified execution over app UI graphs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: ui-navigator.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append execution trace events to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan over a flat transition index to the action showing a text
    Plan {
        /// Transition index JSON
        #[arg(long)]
        map: String,

        /// Visible text of the action to reach
        #[arg(long)]
        target: String,

        /// Screen to start from
        #[arg(long)]
        start: String,

        /// Search strategy: bfs or dfs
        #[arg(long)]
        strategy: Option<SearchStrategy>,
    },

    /// Plan over a semantic UI map from a natural-language intent
    PlanIntent {
        /// Semantic UI map JSON
        #[arg(long)]
        ui_map: String,

        /// What the user wants to do
        #[arg(long)]
        intent: String,

        /// Current screen (inferred from the intent when omitted)
        #[arg(long)]
        start: Option<String>,

        /// Target resolver: rule or llm
        #[arg(long, default_value = "rule")]
        resolver: String,
    },

    /// Derive a flat transition index from a semantic UI map
    Flatten {
        /// Semantic UI map JSON
        #[arg(long)]
        ui_map: String,

        /// Where to write the transition index
        #[arg(short, long)]
        output: String,
    },

    /// Plan and execute an intent against a simulated device
    Simulate {
        /// Semantic UI map JSON
        #[arg(long)]
        ui_map: String,

        /// What the user wants to do
        #[arg(long)]
        intent: String,

        /// Screen the simulated device starts on
        #[arg(long)]
        start: Option<String>,

        /// Target resolver: rule or llm
        #[arg(long, default_value = "rule")]
        resolver: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `ui-navigator.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub strategy: SearchStrategy,

    #[serde(default = "default_start_screen")]
    pub default_start_screen: String,

    #[serde(default = "default_fallback_element")]
    pub fallback_element_id: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Bfs,
            default_start_screen: default_start_screen(),
            fallback_element_id: default_fallback_element(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub inter_step_delay_ms: u64,

    #[serde(default = "default_idle_reset")]
    pub idle_reset_delay_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            inter_step_delay_ms: 0,
            idle_reset_delay_ms: default_idle_reset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_one")]
    pub max_attempts: u32,

    #[serde(default)]
    pub backoff_ms: u64,

    /// Execution failure codes worth another attempt, e.g. `COMPONENT_NOT_FOUND`
    #[serde(default)]
    pub retry_on: Vec<ExecuteFailReason>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
            retry_on: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_one() -> u32 { 1 }
fn default_idle_reset() -> u64 { 2000 }
fn default_start_screen() -> String { DEFAULT_START_SCREEN.to_string() }
fn default_fallback_element() -> String { "btnNormal".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "Malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(content)
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_ms),
            self.retry_on.clone(),
        )
    }
}

/// Build the orchestrator's timing and retry settings from the config file.
pub fn build_orchestrator_config(config: &AppConfig) -> OrchestratorConfig {
    OrchestratorConfig {
        inter_step_delay: Duration::from_millis(config.executor.inter_step_delay_ms),
        idle_reset_delay: Duration::from_millis(config.executor.idle_reset_delay_ms),
        retry: config.retry.to_policy(),
    }
}
