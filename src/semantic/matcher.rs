use crate::graph::Element;
use crate::semantic::target::ComponentTarget;

/// Tokens that mark a back/return goal.
const BACK_WORDS: &[&str] = &["back", "返回"];

/// Tokens that mark a "go to" goal.
const GOTO_WORDS: &[&str] = &["goto", "跳转到"];

/// Navigation vocabulary shared by element texts and goal texts.
const CORE_KEYWORDS: &[&str] = &[
    "第二", "third", "层级", "level", "返回", "back", "跳转到", "goto", "btn", "button", "action",
    "navigate",
];

/// Verb prefixes stripped before comparing the core of two texts.
const VERB_PREFIXES: &[&str] = &["跳转到", "点击", "进入"];

/// Element types treated as interchangeable with the common clickable ones.
const CLICKABLE_TYPES: &[&str] = &["menuitem", "listitem", "button", "textview", "imagebutton", "view"];
const SYNONYM_TARGET_TYPES: &[&str] = &["menuitem", "listitem", "button", "textview"];

/// Which stage of the semantic planner is asking.
///
/// The locator pre-filters target screens with a generous rule set; the
/// searcher re-validates candidates with a stricter, smaller one. The two
/// thresholds are tuned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchProfile {
    Locator,
    Searcher,
}

impl MatchProfile {
    pub fn threshold(&self) -> f64 {
        match self {
            MatchProfile::Locator => 0.40,
            MatchProfile::Searcher => 0.35,
        }
    }
}

/// Points earned against points available.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchScore {
    pub matched: f64,
    pub possible: f64,
}

impl MatchScore {
    pub fn ratio(&self) -> f64 {
        if self.possible == 0.0 {
            0.0
        } else {
            self.matched / self.possible
        }
    }
}

/// Whether `element` satisfies `target` under `profile`.
pub fn matches(element: &Element, target: &ComponentTarget, profile: MatchProfile) -> bool {
    score(element, target, profile).ratio() >= profile.threshold()
}

pub fn score(element: &Element, target: &ComponentTarget, profile: MatchProfile) -> MatchScore {
    match profile {
        MatchProfile::Locator => locator_score(element, target),
        MatchProfile::Searcher => searcher_score(element, target),
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn shared_words(a: &str, b: &str, sep: char) -> usize {
    let left: Vec<&str> = a.split(sep).filter(|w| !w.trim().is_empty()).collect();
    let mut seen: Vec<&str> = Vec::new();
    for word in b.split(sep).filter(|w| !w.trim().is_empty()) {
        if left.contains(&word) && !seen.contains(&word) {
            seen.push(word);
        }
    }
    seen.len()
}

fn strip_verbs(text: &str) -> String {
    let mut out = text.to_string();
    for prefix in VERB_PREFIXES {
        out = out.replace(prefix, "");
    }
    out.trim().to_string()
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

// ============================================================================
// Locator rules
// ============================================================================

fn locator_score(element: &Element, target: &ComponentTarget) -> MatchScore {
    let mut s = MatchScore::default();
    let role = element.semantic_role();

    if let Some(target_id) = &target.component_id {
        s.possible += 2.0;
        if &element.element_id == target_id {
            s.matched += 2.0;
        } else {
            let target_id = target_id.to_lowercase();
            let element_id = element.element_id.to_lowercase();

            let target_digits = digits(&target_id);
            if !target_digits.is_empty() && target_digits == digits(&element_id) {
                s.matched += 0.5;
            }
            s.matched += shared_words(&target_id, &element_id, '_') as f64 * 0.5;
            if target_id.contains(&element_id) || element_id.contains(&target_id) {
                s.matched += 1.0;
            }
            if contains_any(&target_id, BACK_WORDS)
                && (contains_any(&element_id, BACK_WORDS) || element_id.contains("return"))
            {
                s.matched += 1.5;
            }
        }
    }

    if let Some(target_type) = &target.component_type {
        s.possible += 1.0;
        let target_type = target_type.to_lowercase();
        let element_type = element.kind.to_lowercase();

        s.matched += if element_type == target_type {
            1.0
        } else if target_type.contains(&element_type) || element_type.contains(&target_type) {
            0.75
        } else if SYNONYM_TARGET_TYPES.contains(&target_type.as_str()) {
            if CLICKABLE_TYPES.contains(&element_type.as_str()) {
                0.75
            } else {
                0.25
            }
        } else {
            0.0
        };
    }

    if let Some(target_text) = &target.component_text {
        let target_text = target_text.to_lowercase();
        let element_text = element.label().map(str::to_lowercase);

        s.possible += 2.0;
        if let Some(element_text) = &element_text {
            if *element_text == target_text {
                s.matched += 2.0;
            } else if element_text.contains(&target_text) {
                s.matched += 1.5;
            } else if target_text.contains(element_text.as_str()) {
                s.matched += 1.25;
            } else {
                s.matched += shared_words(&target_text, element_text, ' ') as f64 * 0.75;
                if contains_any(&target_text, CORE_KEYWORDS)
                    && contains_any(element_text, CORE_KEYWORDS)
                {
                    s.matched += 1.0;
                }
                if contains_any(&target_text, BACK_WORDS)
                    && (contains_any(element_text, BACK_WORDS) || role.contains("NAVIGATE"))
                {
                    s.matched += 1.5;
                }
            }

            let target_core = strip_verbs(&target_text);
            let element_core = strip_verbs(element_text);
            if element_core.contains(&target_core) || target_core.contains(&element_core) {
                s.matched += 1.5;
                s.possible += 1.0;
            }
        }

        s.possible += 1.5;
        if contains_any(&target_text, BACK_WORDS) {
            if role.contains("NAVIGATE") || role.contains("BACK") {
                s.matched += 1.5;
            }
        } else if contains_any(&target_text, GOTO_WORDS) && role.contains("ACTION") {
            s.matched += 1.0;
        }
    }

    if !target.component_properties.is_empty() {
        s.possible += target.component_properties.len() as f64;
        for (key, value) in &target.component_properties {
            if element.properties.get(key) == Some(value) {
                s.matched += 1.0;
            }
        }
    }

    s
}

// ============================================================================
// Searcher rules
// ============================================================================

fn searcher_score(element: &Element, target: &ComponentTarget) -> MatchScore {
    let mut s = MatchScore::default();
    let role = element.semantic_role();

    if let Some(target_id) = &target.component_id {
        s.possible += 2.0;
        if &element.element_id == target_id {
            s.matched += 2.0;
        } else {
            let target_id = target_id.to_lowercase();
            let element_id = element.element_id.to_lowercase();
            if target_id.contains(&element_id) || element_id.contains(&target_id) {
                s.matched += 1.0;
            }
        }
    }

    if let (Some(target_text), Some(element_text)) = (&target.component_text, element.label()) {
        s.possible += 1.5;
        let target_text = target_text.to_lowercase();
        let element_text = element_text.to_lowercase();
        if element_text == target_text {
            s.matched += 1.5;
        } else if element_text.contains(&target_text) {
            s.matched += 1.25;
        } else if target_text.contains(&element_text) {
            s.matched += 1.0;
        }
    }

    if let Some(target_text) = &target.component_text {
        s.possible += 1.0;
        let target_text = target_text.to_lowercase();
        if contains_any(&target_text, BACK_WORDS) {
            if role.contains("NAVIGATE") || role.contains("BACK") {
                s.matched += 1.0;
            }
        } else if contains_any(&target_text, GOTO_WORDS) && role.contains("ACTION") {
            s.matched += 0.75;
        }
    }

    s
}
