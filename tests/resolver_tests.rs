use ui_navigator::resolver::{
    IdentityTextResolver, OllamaClient, OllamaTargetResolver, ResolverError, RuleBasedResolver,
    TargetResolver, VisibleTextResolver, parse_target_reply,
};
use ui_navigator::semantic::{ComponentTarget, TargetSpec};

use crate::common::graphs::demo_ui_map;

mod common;

// =========================================================================
// Keyword rules
// =========================================================================

#[test]
fn keyword_rules_pick_state_targets() {
    let rules = RuleBasedResolver;

    assert_eq!(rules.resolve_intent("open settings"), TargetSpec::state("Settings", 0.8));
    assert_eq!(rules.resolve_intent("回到主页"), TargetSpec::state("Main", 0.8));
    assert_eq!(rules.resolve_intent("Go HOME"), TargetSpec::state("Main", 0.8));
}

#[test]
fn keyword_rules_pick_component_targets() {
    let rules = RuleBasedResolver;

    let TargetSpec::ComponentTarget(back) = rules.resolve_intent("go back") else {
        panic!("component target expected");
    };
    assert_eq!(back.component_id.as_deref(), Some("btnBack"));
    assert_eq!(back.component_text.as_deref(), Some("返回"));
    assert_eq!(back.confidence, 0.8);

    let TargetSpec::ComponentTarget(third) = rules.resolve_intent("跳转到第三层级") else {
        panic!("component target expected");
    };
    assert_eq!(third.component_id.as_deref(), Some("btnToThird"));

    let TargetSpec::ComponentTarget(search) = rules.resolve_intent("search for shoes") else {
        panic!("component target expected");
    };
    assert_eq!(search.component_type.as_deref(), Some("EditText"));
}

#[test]
fn earlier_rules_win() {
    // "settings" is checked before "back".
    assert_eq!(
        RuleBasedResolver.resolve_intent("go back to settings"),
        TargetSpec::state("Settings", 0.8)
    );
}

#[test]
fn unmatched_intent_defaults_to_main_with_low_confidence() {
    let target = RuleBasedResolver.resolve("do a barrel roll").unwrap();
    assert_eq!(target, TargetSpec::state("Main", 0.5));
    assert_eq!(target.confidence(), 0.5);
}

// =========================================================================
// Model replies
// =========================================================================

#[test]
fn parses_state_reply() {
    let target = parse_target_reply(r#"{"type":"StateTarget","stateId":"SettingsActivity","confidence":0.9}"#)
        .unwrap();
    assert_eq!(target, TargetSpec::state("SettingsActivity", 0.9));
}

#[test]
fn parses_fenced_component_reply() {
    let reply = "```json\n{\"type\":\"ComponentTarget\",\"componentId\":\"switchOption\",\"componentType\":\"SWITCH\",\"confidence\":0.7}\n```";

    let target = parse_target_reply(reply).unwrap();

    assert_eq!(
        target,
        TargetSpec::component(
            ComponentTarget::default()
                .with_id("switchOption")
                .with_type("SWITCH")
                .with_confidence(0.7)
        )
    );
}

#[test]
fn missing_confidence_defaults_to_zero() {
    let target = parse_target_reply(r#"{"type":"StateTarget","stateId":"Main"}"#).unwrap();
    assert_eq!(target.confidence(), 0.0);
}

#[test]
fn garbage_reply_is_malformed() {
    for reply in ["sure! the target is Main", r#"{"stateId":"Main"}"#, r#"{"type":"Elsewhere"}"#] {
        match parse_target_reply(reply) {
            Err(ResolverError::MalformedReply { expected, reply: kept }) => {
                assert_eq!(expected, "TargetSpec");
                assert_eq!(kept, reply);
            }
            other => panic!("Expected MalformedReply for {:?}, got {:?}", reply, other),
        }
    }
}

#[test]
fn target_spec_round_trips_through_json() {
    let target = TargetSpec::component(
        ComponentTarget::default()
            .with_text("Dark mode")
            .with_role("TOGGLE")
            .with_property("checked", "false")
            .with_confidence(0.6),
    );

    let json = serde_json::to_value(&target).unwrap();
    assert_eq!(json["type"], "ComponentTarget");
    assert_eq!(json["componentRole"], "TOGGLE");
    assert_eq!(json["componentProperties"]["checked"], "false");
    assert!(json.get("componentId").is_none());

    let back: TargetSpec = serde_json::from_value(json).unwrap();
    assert_eq!(back, target);
    assert_eq!(
        back.to_string(),
        "component [text='Dark mode', role=TOGGLE] (0.60)"
    );
}

#[test]
fn unreachable_model_falls_back_to_rules() {
    // Nothing listens on port 9; the request fails fast.
    let client = OllamaClient::new("http://127.0.0.1:9/api/generate", "none");
    let resolver = OllamaTargetResolver::new(client).with_map(&demo_ui_map());

    assert!(matches!(resolver.ask("go home"), Err(ResolverError::Http { .. })));
    assert_eq!(resolver.resolve("go home").unwrap(), TargetSpec::state("Main", 0.8));
}

// =========================================================================
// Visible text resolution
// =========================================================================

#[test]
fn identity_resolver_trims_the_intent() {
    let resolved = IdentityTextResolver
        .resolve("  Go third  ", "Main", &["Go third", "Back"])
        .unwrap();
    assert_eq!(resolved, "Go third");
}
