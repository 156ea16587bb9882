use ui_navigator::graph::{TransitionMap, UiMap};
use ui_navigator::model::{ActionPath, ActionRef, ActionStep, ExpectedScreen, Trigger};

/// Main(0) -> Second(1) -> Third(2), with a back action on Second and the
/// "Target" action on Third.
pub const SCENARIO_JSON: &str = r#"{
    "page_index": { "Main": 0, "Second": 1, "Third": 2 },
    "action_index": {
        "(Main, btnToSecond, CLICK)": 0,
        "(Second, btnToThird, CLICK)": 1,
        "(Second, btnBack, CLICK)": 2,
        "(Third, btnTarget, CLICK)": 3
    },
    "action_metadata": {
        "0": { "page": "Main", "componentId": "btnToSecond", "triggerType": "CLICK", "visibleText": "Go second", "viewType": "BUTTON" },
        "1": { "page": "Second", "componentId": "btnToThird", "triggerType": "CLICK", "visibleText": "Go third", "viewType": "BUTTON" },
        "2": { "page": "Second", "componentId": "btnBack", "triggerType": "CLICK", "visibleText": "Back", "viewType": "BUTTON" },
        "3": { "page": "Third", "componentId": "btnTarget", "triggerType": "CLICK", "visibleText": "Target", "viewType": "BUTTON" }
    },
    "visible_text_index": {
        "Go second": [0],
        "Go third": [1],
        "Back": [2],
        "Target": [3]
    },
    "transition": {
        "0": { "0": [1] },
        "1": { "1": [2], "2": [0] },
        "2": { "3": [2] }
    },
    "generator": "ignored by the loader"
}"#;

pub fn scenario_map() -> TransitionMap {
    TransitionMap::from_json(SCENARIO_JSON).expect("scenario map parses")
}

/// Main(0) reaches the target screen T(2) directly with action 0 and via
/// A(1) with actions 1 then 2. Action 3 on T shows "Target".
pub fn shortcut_map() -> TransitionMap {
    TransitionMap::from_json(
        r#"{
        "page_index": { "Main": 0, "A": 1, "T": 2 },
        "action_index": {
            "(Main, direct, CLICK)": 0,
            "(Main, detour, CLICK)": 1,
            "(A, onward, CLICK)": 2,
            "(T, goal, CLICK)": 3
        },
        "action_metadata": {
            "0": { "page": "Main", "componentId": "direct", "triggerType": "CLICK" },
            "1": { "page": "Main", "componentId": "detour", "triggerType": "CLICK" },
            "2": { "page": "A", "componentId": "onward", "triggerType": "CLICK" },
            "3": { "page": "T", "componentId": "goal", "triggerType": "CLICK", "visibleText": "Target" }
        },
        "visible_text_index": { "Target": [3] },
        "transition": {
            "0": { "0": [2], "1": [1] },
            "1": { "2": [2] },
            "2": { "3": [2] }
        }
    }"#,
    )
    .expect("shortcut map parses")
}

/// Main(0) -> Second(1). The "Target" action sits in Second's transition
/// row, but its metadata files it under Island(2), which nothing reaches.
pub fn misfiled_map() -> TransitionMap {
    TransitionMap::from_json(
        r#"{
        "page_index": { "Main": 0, "Second": 1, "Island": 2 },
        "action_index": {
            "(Main, btnToSecond, CLICK)": 0,
            "(Island, btnTarget, CLICK)": 1
        },
        "action_metadata": {
            "0": { "page": "Main", "componentId": "btnToSecond", "triggerType": "CLICK", "visibleText": "Go second" },
            "1": { "page": "Island", "componentId": "btnTarget", "triggerType": "CLICK", "visibleText": "Target" }
        },
        "visible_text_index": { "Go second": [0], "Target": [1] },
        "transition": {
            "0": { "0": [1] },
            "1": { "1": [1] }
        }
    }"#,
    )
    .expect("misfiled map parses")
}

/// Main(0) has a back action with an unknown destination and a link to
/// Detail(1), whose own target action is a back action.
pub fn back_map() -> TransitionMap {
    TransitionMap::from_json(
        r#"{
        "page_index": { "Main": 0, "Detail": 1, "Island": 2 },
        "action_index": {
            "(Main, btnBack, CLICK)": 0,
            "(Main, btnDetail, CLICK)": 1,
            "(Detail, btnClose, CLICK)": 2,
            "(Island, btnHidden, CLICK)": 3
        },
        "action_metadata": {
            "0": { "page": "Main", "componentId": "btnBack", "triggerType": "CLICK", "visibleText": "Back" },
            "1": { "page": "Main", "componentId": "btnDetail", "triggerType": "CLICK", "visibleText": "Detail" },
            "2": { "page": "Detail", "componentId": "btnClose", "triggerType": "CLICK", "visibleText": "Close" },
            "3": { "page": "Island", "componentId": "btnHidden", "triggerType": "CLICK", "visibleText": "Hidden" }
        },
        "visible_text_index": { "Back": [0], "Detail": [1], "Close": [2], "Hidden": [3] },
        "transition": {
            "0": { "0": [], "1": [1] },
            "1": { "2": [] },
            "2": { "3": [2] }
        }
    }"#,
    )
    .expect("back map parses")
}

/// Two-level demo app with a settings screen.
///
/// MainActivity -> SecondLevelActivity -> ThirdLevelActivity, plus
/// MainActivity -> SettingsActivity whose only way home is a disabled
/// button.
pub const DEMO_UI_MAP_JSON: &str = r#"{
    "version": "1.0",
    "states": {
        "MainActivity": {
            "stateId": "MainActivity",
            "components": [
                {
                    "componentId": "btnToSecond",
                    "type": "BUTTON",
                    "text": "跳转到第二层级",
                    "properties": { "semanticRole": "ACTION" },
                    "intents": [
                        { "intentId": "main_to_second", "type": "NAVIGATION", "targetStateId": "SecondLevelActivity" }
                    ]
                },
                {
                    "componentId": "btnNormal",
                    "type": "BUTTON",
                    "text": "普通按钮"
                },
                {
                    "componentId": "btnSettings",
                    "type": "BUTTON",
                    "text": "Settings",
                    "intents": [
                        { "intentId": "main_to_settings", "type": "CLICK", "targetStateId": "SettingsActivity" }
                    ]
                }
            ]
        },
        "SecondLevelActivity": {
            "components": [
                {
                    "componentId": "btnToThird",
                    "type": "BUTTON",
                    "text": "跳转到第三层级",
                    "intents": [
                        { "intentId": "second_to_third", "type": "NAVIGATION", "targetStateId": "ThirdLevelActivity" }
                    ]
                },
                {
                    "componentId": "btnBack",
                    "type": "BUTTON",
                    "text": "返回",
                    "properties": { "semanticRole": "NAVIGATE_BACK" },
                    "intents": [
                        { "intentId": "second_back", "type": "NAVIGATE_BACK", "targetStateId": "" }
                    ]
                }
            ]
        },
        "ThirdLevelActivity": {
            "components": [
                {
                    "componentId": "btnBack",
                    "type": "BUTTON",
                    "text": "返回",
                    "properties": { "semanticRole": "NAVIGATE_BACK" },
                    "intents": [
                        { "intentId": "third_back", "type": "NAVIGATE_BACK" }
                    ]
                },
                {
                    "componentId": "switchOption",
                    "type": "SWITCH",
                    "text": "Dark mode",
                    "supportedTriggers": ["CHECKED_CHANGE"],
                    "intents": [
                        {
                            "intentId": "third_toggle",
                            "type": "CHECKED_CHANGE",
                            "targetStateId": "ThirdLevelActivity",
                            "parameters": { "checked": "true" }
                        }
                    ]
                }
            ]
        },
        "SettingsActivity": {
            "components": [
                {
                    "componentId": "btnReset",
                    "type": "BUTTON",
                    "text": "Reset",
                    "enabled": false,
                    "intents": [
                        { "intentId": "settings_reset", "type": "CLICK", "targetStateId": "MainActivity" }
                    ]
                }
            ],
            "intents": [
                { "intentId": "settings_finish", "type": "NAVIGATE_BACK" }
            ]
        }
    }
}"#;

pub fn demo_ui_map() -> UiMap {
    UiMap::from_json(DEMO_UI_MAP_JSON).expect("demo map parses")
}

/// A path through `screens` in order, one click on `btn<i>` per hop.
pub fn linear_path(screens: &[&str]) -> ActionPath {
    let steps = (0..screens.len().saturating_sub(1))
        .map(|i| ActionStep::new(ActionRef::Indexed(i as u32), format!("btn{}", i), Trigger::Click))
        .collect();
    let expected = screens.iter().map(|s| ExpectedScreen::exact(*s)).collect();
    ActionPath::new(steps, expected).expect("linear path is well formed")
}
