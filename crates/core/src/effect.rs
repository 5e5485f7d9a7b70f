//! Effect inference from scaffold call-pattern markers.
//!
//! The scaffold conventionally declares one abstract region and one abstract
//! effect, e.g.
//!
//! ```c
//! uint32_t rid = cb_region(SEG_HEAP, 0, 1);
//! cb_effect_push(rid, 0, 0, ACT_WRITE);
//! ```
//!
//! which infers `segment = "HEAP"`, `action = "WRITE"`. Only the first
//! occurrence of each marker is considered.

use std::sync::OnceLock;

use regex::Regex;

const SEGMENT_PREFIX: &str = "SEG_";
const ACTION_PREFIX: &str = "ACT_";

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bcb_region(?:_new)?\s*\(\s*(SEG_[A-Z_]+)").expect("valid segment regex")
    })
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bcb_effect_push\s*\(\s*[^,]+,\s*[^,]+,\s*[^,]+,\s*(ACT_[A-Z_]+)")
            .expect("valid action regex")
    })
}

/// Raw (prefix-stripped, case-preserved) effect markers found in a scaffold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectTag {
    pub segment: Option<String>,
    pub action: Option<String>,
}

/// Infer the `(segment, action)` tag from scaffold text.
pub fn infer_effect(scaffold: &str) -> EffectTag {
    let segment = first_marker(segment_re(), scaffold, SEGMENT_PREFIX);
    let action = first_marker(action_re(), scaffold, ACTION_PREFIX);
    EffectTag { segment, action }
}

fn first_marker(re: &Regex, text: &str, prefix: &str) -> Option<String> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| {
        let raw = m.as_str();
        raw.strip_prefix(prefix).unwrap_or(raw).to_string()
    })
}
