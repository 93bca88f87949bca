use crate::store::EngineOutput;

const INTRO: &str = "You are an expert content strategist AI.";
const CONTEXT: &str = "You will receive structured signals about a social media post.\nThese signals are factual and already computed.";
const TASKS_HEADER: &str = "Your task:";
const TASKS: &[&str] = &[
    "Explain WHY the post performed the way it did.",
    "Identify the main failure reason OR success driver.",
    "Suggest concrete, actionable improvements.",
    "Avoid generic advice.",
];
const RULES_HEADER: &str = "RULES:";
const RULES: &[&str] = &[
    "Base your reasoning ONLY on the provided signals.",
    "Do NOT mention metrics that are not present.",
    "Be concise, specific, and practical.",
    "Output valid JSON strictly following the schema.",
];
const ANALYSIS_HEADER: &str = "Engine Analysis:";
const OUTRO: &str = "Return JSON only.";

/// Build the insight prompt for one engine output.
///
/// The record is embedded as two-space indented, ASCII-only JSON in its
/// original key order, so identical input always yields byte-identical output.
pub fn build_insight_prompt(engine_output: &EngineOutput) -> String {
    // Map<String, Value> always serializes; the fallback is unreachable.
    let pretty = serde_json::to_string_pretty(engine_output).unwrap_or_default();
    let analysis = escape_non_ascii(&pretty);

    let tasks = TASKS
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\n{context}\n\n{tasks_header}\n{tasks}\n\n{rules_header}\n{rules}\n\n{analysis_header}\n{analysis}\n\n{outro}\n",
        intro = INTRO,
        context = CONTEXT,
        tasks_header = TASKS_HEADER,
        tasks = tasks,
        rules_header = RULES_HEADER,
        rules = rules,
        analysis_header = ANALYSIS_HEADER,
        analysis = analysis,
        outro = OUTRO,
    )
}

/// Rewrite every non-ASCII char as `\uXXXX` UTF-16 escapes.
///
/// Only valid on serialized JSON, where non-ASCII can appear inside string
/// literals only.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> EngineOutput {
        EngineOutput::try_from(json!({
            "content_id": "cnt_002",
            "views": 100,
            "signals": {"hook_strength": "weak", "posting_hour": 3}
        }))
        .unwrap()
    }

    #[test]
    fn prompt_full_text_for_small_record() {
        let output = EngineOutput::try_from(json!({"content_id": "c1", "views": 3})).unwrap();
        let expected = "You are an expert content strategist AI.

You will receive structured signals about a social media post.
These signals are factual and already computed.

Your task:
1. Explain WHY the post performed the way it did.
2. Identify the main failure reason OR success driver.
3. Suggest concrete, actionable improvements.
4. Avoid generic advice.

RULES:
- Base your reasoning ONLY on the provided signals.
- Do NOT mention metrics that are not present.
- Be concise, specific, and practical.
- Output valid JSON strictly following the schema.

Engine Analysis:
{
  \"content_id\": \"c1\",
  \"views\": 3
}

Return JSON only.
";
        assert_eq!(build_insight_prompt(&output), expected);
    }

    #[test]
    fn prompt_escapes_non_ascii_text() {
        let output =
            EngineOutput::try_from(json!({"content_id": "c1", "caption": "café 😀"})).unwrap();
        let prompt = build_insight_prompt(&output);
        assert!(prompt.contains(r#""caption": "caf\u00e9 \ud83d\ude00""#));
        assert!(prompt.is_ascii());
    }

    #[test]
    fn prompt_keeps_large_integers_exact() {
        let output: EngineOutput =
            serde_json::from_str(r#"{"content_id": "c1", "post_id": 123456789012345678901234}"#)
                .unwrap();
        let prompt = build_insight_prompt(&output);
        assert!(prompt.contains("\"post_id\": 123456789012345678901234\n"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_insight_prompt(&record()), build_insight_prompt(&record()));
    }

    #[test]
    fn prompt_embeds_indented_record() {
        let prompt = build_insight_prompt(&record());
        assert!(prompt.contains("Engine Analysis:\n{\n  \"content_id\": \"cnt_002\",\n  \"views\": 100,"));
        assert!(prompt.contains("    \"hook_strength\": \"weak\""));
    }

    #[test]
    fn prompt_keeps_record_key_order() {
        let output = EngineOutput::try_from(json!({"zeta": 1, "content_id": "x", "alpha": 2})).unwrap();
        let prompt = build_insight_prompt(&output);
        let zeta = prompt.find("\"zeta\"").unwrap();
        let id = prompt.find("\"content_id\"").unwrap();
        let alpha = prompt.find("\"alpha\"").unwrap();
        assert!(zeta < id && id < alpha);
    }

    #[test]
    fn prompt_numbers_tasks() {
        let prompt = build_insight_prompt(&record());
        assert!(prompt.contains("Your task:\n1. Explain WHY the post performed the way it did."));
        assert!(prompt.contains("4. Avoid generic advice."));
    }

    #[test]
    fn prompt_includes_rules() {
        let prompt = build_insight_prompt(&record());
        for rule in RULES {
            assert!(prompt.contains(&format!("- {}", rule)));
        }
    }

    #[test]
    fn prompt_frames_and_ends_with_json_only() {
        let prompt = build_insight_prompt(&record());
        assert!(prompt.starts_with("You are an expert content strategist AI.\n\n"));
        assert!(prompt.ends_with("}\n\nReturn JSON only.\n"));
    }
}
