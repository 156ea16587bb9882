use std::time::Duration;

use clap::Parser;
use ui_navigator::blind::SearchStrategy;
use ui_navigator::cli::commands::{
    OllamaSettings, build_target_resolver, cmd_flatten, cmd_plan, cmd_plan_intent, cmd_simulate,
};
use ui_navigator::cli::config::{
    AppConfig, Cli, Commands, build_orchestrator_config, load_config, parse_config,
};
use ui_navigator::executor::ExecuteFailReason;
use ui_navigator::graph::TransitionMap;
use ui_navigator::resolver::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

use crate::common::graphs::{DEMO_UI_MAP_JSON, SCENARIO_JSON, demo_ui_map};

mod common;

fn temp_file(name: &str, content: &str) -> String {
    let path = std::env::temp_dir().join(format!("ui-navigator-cli-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn quiet_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.executor.idle_reset_delay_ms = 0;
    config
}

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_plan() {
    let cli = Cli::parse_from([
        "ui-navigator",
        "plan",
        "--map",
        "map.json",
        "--target",
        "Target",
        "--start",
        "Main",
    ]);
    match cli.command {
        Commands::Plan {
            map,
            target,
            start,
            strategy,
        } => {
            assert_eq!(map, "map.json");
            assert_eq!(target, "Target");
            assert_eq!(start, "Main");
            assert_eq!(strategy, None);
        }
        _ => panic!("Expected Plan command"),
    }
}

#[test]
fn cli_parse_plan_with_strategy() {
    let cli = Cli::parse_from([
        "ui-navigator",
        "plan",
        "--map",
        "m.json",
        "--target",
        "x",
        "--start",
        "Main",
        "--strategy",
        "dfs",
    ]);
    match cli.command {
        Commands::Plan { strategy, .. } => assert_eq!(strategy, Some(SearchStrategy::Dfs)),
        _ => panic!("Expected Plan command"),
    }
}

#[test]
fn cli_rejects_unknown_strategy() {
    let result = Cli::try_parse_from([
        "ui-navigator",
        "plan",
        "--map",
        "m.json",
        "--target",
        "x",
        "--start",
        "Main",
        "--strategy",
        "astar",
    ]);
    assert!(result.is_err());
}

#[test]
fn cli_parse_plan_intent_defaults() {
    let cli = Cli::parse_from([
        "ui-navigator",
        "plan-intent",
        "--ui-map",
        "ui.json",
        "--intent",
        "go home",
    ]);
    match cli.command {
        Commands::PlanIntent {
            ui_map,
            intent,
            start,
            resolver,
        } => {
            assert_eq!(ui_map, "ui.json");
            assert_eq!(intent, "go home");
            assert!(start.is_none());
            assert_eq!(resolver, "rule");
        }
        _ => panic!("Expected PlanIntent command"),
    }
}

#[test]
fn cli_parse_flatten() {
    let cli = Cli::parse_from(["ui-navigator", "flatten", "--ui-map", "ui.json", "-o", "flat.json"]);
    match cli.command {
        Commands::Flatten { ui_map, output } => {
            assert_eq!(ui_map, "ui.json");
            assert_eq!(output, "flat.json");
        }
        _ => panic!("Expected Flatten command"),
    }
}

#[test]
fn cli_parse_simulate_with_globals() {
    let cli = Cli::parse_from([
        "ui-navigator",
        "simulate",
        "--ui-map",
        "ui.json",
        "--intent",
        "third level",
        "--start",
        "MainActivity",
        "--resolver",
        "llm",
        "-vv",
        "--trace",
        "trace.jsonl",
        "--ollama-model",
        "llama3",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.trace.as_deref(), Some("trace.jsonl"));
    assert_eq!(cli.ollama_model.as_deref(), Some("llama3"));
    assert!(cli.ollama_endpoint.is_none());
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Simulate { start, resolver, .. } => {
            assert_eq!(start.as_deref(), Some("MainActivity"));
            assert_eq!(resolver, "llm");
        }
        _ => panic!("Expected Simulate command"),
    }
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn missing_config_file_gives_defaults() {
    let config = load_config(Some("/definitely/not/here.yaml"));
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.planner.strategy, SearchStrategy::Bfs);
    assert_eq!(config.planner.default_start_screen, "MainActivity");
    assert_eq!(config.planner.fallback_element_id, "btnNormal");
    assert_eq!(config.executor.idle_reset_delay_ms, 2000);
    assert_eq!(config.retry.max_attempts, 1);
}

#[test]
fn malformed_config_file_gives_defaults() {
    let path = temp_file("bad.yaml", "planner: [not, a, mapping");
    assert_eq!(load_config(Some(&path)), AppConfig::default());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn partial_config_keeps_other_defaults() {
    let config = parse_config(
        r#"
planner:
  strategy: dfs
retry:
  max_attempts: 3
  backoff_ms: 10
  retry_on: [COMPONENT_NOT_FOUND, TIMEOUT]
ollama:
  model: llama3
trace:
  path: run.jsonl
"#,
    )
    .unwrap();

    assert_eq!(config.planner.strategy, SearchStrategy::Dfs);
    assert_eq!(config.planner.default_start_screen, "MainActivity");
    assert_eq!(config.executor.idle_reset_delay_ms, 2000);
    assert_eq!(
        config.retry.retry_on,
        vec![ExecuteFailReason::ComponentNotFound, ExecuteFailReason::Timeout]
    );
    assert_eq!(config.ollama.model.as_deref(), Some("llama3"));
    assert!(config.ollama.endpoint.is_none());
    assert_eq!(config.trace.path.as_deref(), Some("run.jsonl"));
}

#[test]
fn empty_config_is_default() {
    assert_eq!(parse_config("").unwrap(), AppConfig::default());
    assert_eq!(parse_config("   \n").unwrap(), AppConfig::default());
}

#[test]
fn orchestrator_config_comes_from_file_settings() {
    let config = parse_config(
        r#"
executor:
  inter_step_delay_ms: 25
  idle_reset_delay_ms: 0
retry:
  max_attempts: 2
  retry_on: [COMPONENT_NOT_FOUND]
"#,
    )
    .unwrap();

    let built = build_orchestrator_config(&config);
    assert_eq!(built.inter_step_delay, Duration::from_millis(25));
    assert_eq!(built.idle_reset_delay, Duration::ZERO);
    assert_eq!(built.retry.max_attempts, 2);
    assert!(built.retry.should_retry(1, ExecuteFailReason::ComponentNotFound));
    assert!(!built.retry.should_retry(2, ExecuteFailReason::ComponentNotFound));
}

#[test]
fn ollama_settings_fall_back_to_defaults() {
    let client = OllamaSettings::default().client();
    assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(client.model, DEFAULT_MODEL);

    let custom = OllamaSettings {
        endpoint: Some("http://gpu:11434/api/generate"),
        model: None,
    }
    .client();
    assert_eq!(custom.endpoint, "http://gpu:11434/api/generate");
    assert_eq!(custom.model, DEFAULT_MODEL);
}

#[test]
fn resolver_names_are_checked() {
    let map = demo_ui_map();
    assert!(build_target_resolver("rule", &map, OllamaSettings::default()).is_ok());
    assert!(build_target_resolver("llm", &map, OllamaSettings::default()).is_ok());

    let err = build_target_resolver("oracle", &map, OllamaSettings::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("oracle"));
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn plan_command_reports_found_and_missing_paths() {
    let map = temp_file("scenario.json", SCENARIO_JSON);

    assert!(cmd_plan(&map, "Target", "Main", SearchStrategy::Bfs, 0).unwrap());
    assert!(!cmd_plan(&map, "zzzzzzzz", "Main", SearchStrategy::Bfs, 0).unwrap());
    assert!(cmd_plan("/definitely/not/here.json", "Target", "Main", SearchStrategy::Bfs, 0).is_err());

    let _ = std::fs::remove_file(&map);
}

#[test]
fn flatten_command_writes_a_loadable_index() {
    let ui_map = temp_file("demo-ui.json", DEMO_UI_MAP_JSON);
    let output = std::env::temp_dir()
        .join(format!("ui-navigator-cli-{}-flat.json", std::process::id()))
        .to_string_lossy()
        .into_owned();

    cmd_flatten(&ui_map, &output, 0).unwrap();

    let flat = TransitionMap::load(&output).unwrap();
    assert_eq!(flat.page_index.len(), 4);
    assert_eq!(flat.action_metadata.len(), 8);

    let _ = std::fs::remove_file(&ui_map);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn plan_intent_command_reports_success() {
    let ui_map = temp_file("plan-intent-ui.json", DEMO_UI_MAP_JSON);
    let config = AppConfig::default();

    let found = cmd_plan_intent(
        &ui_map,
        "go home",
        Some("SettingsActivity"),
        "rule",
        &config,
        OllamaSettings::default(),
    )
    .unwrap();
    assert!(found);

    let missing = cmd_plan_intent(
        &ui_map,
        "go home",
        Some("ThirdLevelActivity"),
        "rule",
        &config,
        OllamaSettings::default(),
    )
    .unwrap();
    assert!(!missing);

    let _ = std::fs::remove_file(&ui_map);
}

#[test]
fn simulate_command_runs_to_completion() {
    let ui_map = temp_file("simulate-ui.json", DEMO_UI_MAP_JSON);
    let config = quiet_config();

    let completed = cmd_simulate(
        &ui_map,
        "go to the second level",
        Some("MainActivity"),
        "rule",
        &config,
        OllamaSettings::default(),
        None,
    )
    .unwrap();
    assert!(completed);

    let blocked = cmd_simulate(
        &ui_map,
        "go home",
        Some("SettingsActivity"),
        "rule",
        &config,
        OllamaSettings::default(),
        None,
    )
    .unwrap();
    assert!(!blocked, "disabled reset button stops the run");

    let _ = std::fs::remove_file(&ui_map);
}

#[test]
fn simulate_command_rejects_unknown_start() {
    let ui_map = temp_file("simulate-bad-start.json", DEMO_UI_MAP_JSON);

    let result = cmd_simulate(
        &ui_map,
        "go home",
        Some("Nowhere"),
        "rule",
        &quiet_config(),
        OllamaSettings::default(),
        None,
    );
    assert!(result.is_err());

    let _ = std::fs::remove_file(&ui_map);
}
