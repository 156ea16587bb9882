use std::sync::Arc;

use crate::blind::{BlindPlanner, SearchStrategy, UserGoal};
use crate::cli::config::{AppConfig, build_orchestrator_config};
use crate::executor::{RunStatus, SimulatedDevice};
use crate::graph::flatten::flatten;
use crate::graph::{TransitionMap, UiMap};
use crate::orchestrator::{
    Orchestrator, SemanticPlannerClient, StatusListener, TaskOutcome,
};
use crate::resolver::{OllamaClient, OllamaTargetResolver, RuleBasedResolver, TargetResolver};
use crate::semantic::{SemanticPlanner, TargetLocator, infer_current_screen};
use crate::trace::TraceLogger;

/// Ollama settings after CLI > config > default resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaSettings<'a> {
    pub endpoint: Option<&'a str>,
    pub model: Option<&'a str>,
}

impl OllamaSettings<'_> {
    pub fn client(&self) -> OllamaClient {
        let defaults = OllamaClient::default();
        OllamaClient::new(
            self.endpoint.unwrap_or(&defaults.endpoint),
            self.model.unwrap_or(&defaults.model),
        )
    }
}

// ============================================================================
// plan subcommand
// ============================================================================

/// Plan over a transition index and print the path. Returns whether a path
/// was found.
pub fn cmd_plan(
    map_path: &str,
    target: &str,
    start: &str,
    strategy: SearchStrategy,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let map = TransitionMap::load(map_path)?;
    if verbose > 0 {
        eprintln!(
            "Loaded {} screens, {} actions (graph {})",
            map.page_index.len(),
            map.action_index.len(),
            map.fingerprint()
        );
    }

    let planner = BlindPlanner::new(&map);
    let result = planner.plan(&UserGoal::new(target, start).with_strategy(strategy));

    if let Some(failure) = &result.failure {
        println!("{}", failure);
        return Ok(false);
    }

    let path = planner.action_path(&result)?;
    if verbose > 0 {
        if let Some(phase) = result.found_by {
            eprintln!("Found by {:?} search", phase);
        }
    }
    println!(
        "Path to '{}' from {} ({} steps, {}):",
        result.matched_text.as_deref().unwrap_or(target),
        start,
        path.len(),
        strategy
    );
    for (i, step) in path.steps().iter().enumerate() {
        let before = path.expected_before(i).map(|s| s.to_string()).unwrap_or_default();
        let after = path.expected_after(i).map(|s| s.to_string()).unwrap_or_default();
        println!(
            "  {}. [{}] {} {} : {} -> {}",
            i + 1,
            step.action,
            step.trigger,
            step.element_id,
            before,
            after
        );
    }
    Ok(true)
}

// ============================================================================
// plan-intent subcommand
// ============================================================================

/// Plan from an intent over a semantic map and print the planner output as
/// JSON. Returns whether planning succeeded.
pub fn cmd_plan_intent(
    ui_map_path: &str,
    intent: &str,
    start: Option<&str>,
    resolver_name: &str,
    config: &AppConfig,
    ollama: OllamaSettings<'_>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let map = UiMap::load(ui_map_path)?;
    let planner = build_semantic_planner(resolver_name, &map, config, ollama)?;

    let output = planner.plan_safe(intent, &map, start);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(output.is_success())
}

// ============================================================================
// flatten subcommand
// ============================================================================

pub fn cmd_flatten(
    ui_map_path: &str,
    output: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = UiMap::load(ui_map_path)?;
    let flat = flatten(&map);
    std::fs::write(output, flat.to_json_pretty()?)?;

    if verbose > 0 {
        eprintln!("  Wrote: {}", output);
    }
    println!(
        "Flattened {} screens into {} actions, {} visible texts",
        flat.page_index.len(),
        flat.action_index.len(),
        flat.visible_texts().count()
    );
    Ok(())
}

// ============================================================================
// simulate subcommand
// ============================================================================

/// Plan and execute an intent on a simulated device, printing every status
/// change. Returns whether the task completed.
pub fn cmd_simulate(
    ui_map_path: &str,
    intent: &str,
    start: Option<&str>,
    resolver_name: &str,
    config: &AppConfig,
    ollama: OllamaSettings<'_>,
    trace_path: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let map = Arc::new(UiMap::load(ui_map_path)?);
    let start = match start {
        Some(s) => s.to_string(),
        None => infer_current_screen(intent, &map)
            .unwrap_or_else(|| config.planner.default_start_screen.clone()),
    };
    if !map.contains(&start) {
        return Err(format!("start screen '{}' is not in the map", start).into());
    }

    let planner = build_semantic_planner(resolver_name, &map, config, ollama)?;
    let device = Arc::new(SimulatedDevice::new(Arc::clone(&map), &start));
    let listener: Arc<dyn StatusListener> =
        Arc::new(|status: RunStatus| println!("status: {}", status));

    let mut orchestrator = Orchestrator::new(
        Arc::new(SemanticPlannerClient::new(Arc::clone(&map), planner)),
        device.clone(),
        device.clone(),
        device.clone(),
    )
    .with_config(build_orchestrator_config(config))
    .with_listener(listener);
    if let Some(path) = trace_path {
        orchestrator = orchestrator.with_tracer(Arc::new(TraceLogger::new(path)));
    }

    println!("Simulating '{}' from {}", intent, start);
    orchestrator.start(intent)?;
    let outcome = orchestrator.join();

    let completed = match &outcome {
        Some(TaskOutcome::Executed(result)) => {
            println!("result: {}", result);
            result.is_success()
        }
        Some(TaskOutcome::PlanningFailed { code, message }) => {
            println!("planning failed: {} ({})", code, message);
            false
        }
        Some(TaskOutcome::NoCurrentScreen) => {
            println!("no current screen");
            false
        }
        Some(TaskOutcome::Cancelled) | None => {
            println!("cancelled");
            false
        }
    };

    let history = device.history();
    if !history.is_empty() {
        println!("visited: {}", history.join(" -> "));
    }
    if let Some(current) = device.current() {
        println!("now on: {}", current);
    }
    Ok(completed)
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the target resolver named on the command line: `rule` or `llm`.
pub fn build_target_resolver(
    name: &str,
    map: &UiMap,
    ollama: OllamaSettings<'_>,
) -> Result<Box<dyn TargetResolver>, Box<dyn std::error::Error>> {
    match name {
        "rule" => Ok(Box::new(RuleBasedResolver)),
        "llm" => Ok(Box::new(
            OllamaTargetResolver::new(ollama.client()).with_map(map),
        )),
        other => Err(format!("unknown resolver '{}' (expected rule or llm)", other).into()),
    }
}

fn build_semantic_planner(
    resolver_name: &str,
    map: &UiMap,
    config: &AppConfig,
    ollama: OllamaSettings<'_>,
) -> Result<SemanticPlanner, Box<dyn std::error::Error>> {
    let resolver = build_target_resolver(resolver_name, map, ollama)?;
    Ok(SemanticPlanner::new(resolver)
        .with_locator(TargetLocator::new(config.planner.fallback_element_id.clone()))
        .with_default_start(config.planner.default_start_screen.clone()))
}
