//! Generative assist failure handling
//!
//! Every malformed or failing model reply must end in a valid diagnosis
//! from the rule-based fallback, never in an error surfaced to the user.

use ag_kaizen::assist::prompt::FEWSHOT_ASSISTANT;
use ag_kaizen::llm::{MockLLMClient, MockResponse};
use ag_kaizen::{
    BackendError, DiagnosisSource, GenerativeAssist, KaizenService, Taxonomy, Validator,
};
use std::sync::Arc;

fn taxonomy() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::load("configs/taxonomy.yaml").unwrap())
}

fn assist_replying(reply: MockResponse) -> GenerativeAssist {
    let client = Arc::new(MockLLMClient::new());
    client.add_response(reply);
    GenerativeAssist::new(client, taxonomy())
}

#[tokio::test]
async fn test_reply_without_json() {
    let assist = assist_replying(MockResponse::text(
        "Try pre-cooling the lettuce sooner and ship daily.",
    ));
    assert!(assist.try_llm("Lettuce browns").await.is_none());
}

#[tokio::test]
async fn test_truncated_json() {
    let cut = &FEWSHOT_ASSISTANT[..FEWSHOT_ASSISTANT.len() - 40];
    let assist = assist_replying(MockResponse::text(cut));
    assert!(assist.try_llm("Lettuce browns").await.is_none());
}

#[tokio::test]
async fn test_unknown_flow_is_repaired() {
    let reply = FEWSHOT_ASSISTANT.replace("\"flow\":\"post_harvest\"", "\"flow\":\"banana\"");
    let assist = assist_replying(MockResponse::text(reply));

    let analysis = assist.try_llm("Lettuce browns").await.unwrap();
    assert_eq!(analysis.flow, "field_ops");
}

#[tokio::test]
async fn test_invalid_wastes_are_repaired() {
    let reply = FEWSHOT_ASSISTANT.replace(
        "\"wastes\":[\"waiting\",\"defects\"]",
        "\"wastes\":[\"laziness\",\"weather\"]",
    );
    let assist = assist_replying(MockResponse::text(reply));

    let analysis = assist.try_llm("Lettuce browns").await.unwrap();
    assert_eq!(analysis.wastes, vec!["motion"]);
}

#[tokio::test]
async fn test_repaired_reply_passes_validation() {
    let reply = FEWSHOT_ASSISTANT
        .replace("\"flow\":\"post_harvest\"", "\"flow\":\"banana\"")
        .replace(
            "\"wastes\":[\"waiting\",\"defects\"]",
            "\"wastes\":[\"waiting\",\"defects\",\"transport\",\"inventory\",\"gossip\"]",
        );
    let assist = assist_replying(MockResponse::text(reply));

    let analysis = assist.try_llm("Lettuce browns").await.unwrap();
    assert_eq!(analysis.wastes, vec!["waiting", "defects", "transport"]);
    Validator::new(taxonomy()).validate(&analysis).unwrap();
}

#[tokio::test]
async fn test_out_of_range_check_in_is_rejected() {
    let reply = FEWSHOT_ASSISTANT.replace("\"next_check_in_days\":7", "\"next_check_in_days\":0");
    let assist = assist_replying(MockResponse::text(reply));
    assert!(assist.try_llm("Lettuce browns").await.is_none());
}

#[tokio::test]
async fn test_service_falls_back_on_every_failure() {
    let client = Arc::new(MockLLMClient::new());
    client.add_responses(vec![
        MockResponse::error(BackendError::TimeoutError { seconds: 20 }),
        MockResponse::error(BackendError::AuthenticationError {
            message: "invalid api key".to_string(),
        }),
        MockResponse::text("```json\n{\"summary\": \"cut"),
        MockResponse::text("[]"),
    ]);
    let service = KaizenService::new(taxonomy(), Some(client.clone()));
    let validator = Validator::new(taxonomy());

    for _ in 0..4 {
        let diagnosis = service
            .diagnose("Lettuce browns before delivery; trucks are every 2 days.")
            .await
            .unwrap();
        assert_eq!(diagnosis.source, DiagnosisSource::Rules);
        assert_eq!(diagnosis.analysis.flow, "post_harvest");
        validator.validate(&diagnosis.analysis).unwrap();
    }

    assert_eq!(client.remaining_responses(), 0);
    assert_eq!(client.recorded_requests().len(), 4);
}

#[tokio::test]
async fn test_exhausted_mock_falls_back() {
    let client = Arc::new(MockLLMClient::new());
    let service = KaizenService::new(taxonomy(), Some(client));

    let diagnosis = service.diagnose("Cows queue at the gate").await.unwrap();
    assert_eq!(diagnosis.source, DiagnosisSource::Rules);
    assert_eq!(diagnosis.analysis.flow, "livestock");
}
