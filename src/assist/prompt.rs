//! Prompts for the kaizen consultant model

use crate::llm::ChatMessage;
use crate::taxonomy::Taxonomy;

/// Worked example: user turn
pub const FEWSHOT_USER: &str = "Lettuce browns before delivery; trucks are every 2 days.";

/// Worked example: assistant turn, prose followed by the fenced JSON block
pub const FEWSHOT_ASSISTANT: &str = r#"Diagnosis: post-harvest waiting/defects; add rapid pre-cool + daily micro-dispatch.
```json
{
  "summary":"Lettuce browning before delivery",
  "flow":"post_harvest",
  "wastes":["waiting","defects"],
  "root_causes":["delayed dispatch","no rapid pre-cool"],
  "recommendations":[
    {"action":"Pre-cool within 90 min","impact":"high","effort":"medium"},
    {"action":"Switch to smaller daily shipments","impact":"high","effort":"medium"}
  ],
  "quick_test":"Pilot pre-cool + daily dispatch on Lot A for 1 week",
  "kpis":["time_to_cool_min","storage_loss_pct","claim_rate_pct"],
  "next_check_in_days":7
}
```"#;

/// Builds the system prompt describing the response schema in words
pub fn build_system_prompt(taxonomy: &Taxonomy) -> String {
    format!(
        r#"You are an Agriculture Kaizen Consultant.
Return a concise plan and ALWAYS end with a JSON block that matches this schema:
summary(str), flow(one of {flows}),
wastes(array, 1-3 of {wastes}), root_causes(array), recommendations(array of {{action,impact,effort}} where impact and effort are low|medium|high),
quick_test(str), kpis(array), next_check_in_days(int 1-90).
Be concrete, farmer-friendly, no chemical dosages.
"#,
        flows = taxonomy.flows().join(", "),
        wastes = taxonomy.wastes().join(", "),
    )
}

/// System prompt, worked example, then the user's text
pub fn build_messages(system_prompt: &str, user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(FEWSHOT_USER),
        ChatMessage::assistant(FEWSHOT_ASSISTANT),
        ChatMessage::user(user_text),
    ]
}
