use crate::resolver::{ResolverError, TargetResolver};
use crate::semantic::{ComponentTarget, TargetSpec};

/// Keyword table resolver. Works offline and backs up the model resolver.
///
/// The first rule whose keyword appears in the intent wins; anything else
/// resolves to the main screen with low confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedResolver;

impl RuleBasedResolver {
    pub fn resolve_intent(&self, intent: &str) -> TargetSpec {
        let lower = intent.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let component = |id: &str, kind: &str| {
            ComponentTarget::default()
                .with_id(id)
                .with_type(kind)
                .with_confidence(0.8)
        };

        if has(&["设置", "settings"]) {
            TargetSpec::state("Settings", 0.8)
        } else if has(&["搜索", "search"]) {
            TargetSpec::component(component("search_bar", "EditText"))
        } else if has(&["提交", "submit"]) {
            TargetSpec::component(component("submit_button", "Button"))
        } else if has(&["刷新", "refresh"]) {
            TargetSpec::component(component("refresh_button", "Button"))
        } else if has(&["主页", "home"]) {
            TargetSpec::state("Main", 0.8)
        } else if has(&["第二层级", "second level"]) {
            TargetSpec::component(component("btnToSecond", "BUTTON").with_text("跳转到第二层级"))
        } else if has(&["第三层级", "third level"]) {
            TargetSpec::component(component("btnToThird", "BUTTON").with_text("跳转到第三层级"))
        } else if has(&["返回", "back"]) {
            TargetSpec::component(component("btnBack", "BUTTON").with_text("返回"))
        } else if has(&["普通按钮", "normal button"]) {
            TargetSpec::component(component("btnNormal", "BUTTON").with_text("普通按钮"))
        } else if has(&["图标按钮", "icon button"]) {
            TargetSpec::component(component("btnIcon", "BUTTON").with_text("图标按钮"))
        } else {
            TargetSpec::state("Main", 0.5)
        }
    }
}

impl TargetResolver for RuleBasedResolver {
    fn resolve(&self, intent: &str) -> Result<TargetSpec, ResolverError> {
        Ok(self.resolve_intent(intent))
    }
}
