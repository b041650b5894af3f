use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use lore_domain::Category;
use lore_service::{Providers, ServiceError};

use super::{FailingChat, SpyChat, StubEmbedding, VECTOR_DIM, build_service, privacy_corpus};

fn routing_providers(reply: &str, calls: Arc<AtomicUsize>) -> (Providers, Arc<Mutex<Vec<(String, String)>>>) {
	let prompts = Arc::new(Mutex::new(Vec::new()));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(SpyChat { reply: reply.to_string(), calls, prompts: prompts.clone() }),
	);

	(providers, prompts)
}

#[tokio::test]
async fn route_parses_the_model_reply() {
	let calls = Arc::new(AtomicUsize::new(0));
	let (providers, prompts) = routing_providers("  Policies \n", calls.clone());
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let category =
		service.route("Where is the vacation policy?").await.expect("Failed to route.");

	assert_eq!(category, Category::Policies);
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	let prompts = prompts.lock().expect("Prompt log poisoned.");
	let (system, user) = &prompts[0];

	assert_eq!(system, "You classify user questions into document categories.");
	assert!(user.starts_with("Classify the user query into ONE category:\n\n"));
	assert!(user.ends_with("Query:\nWhere is the vacation policy?"));
}

#[tokio::test]
async fn route_rejects_unknown_category_replies() {
	let calls = Arc::new(AtomicUsize::new(0));
	let (providers, _prompts) = routing_providers("finance", calls);
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let result = service.route("How do I expense a flight?").await;
	let err = result.expect_err("An unknown category must be rejected.");

	assert!(matches!(err, ServiceError::UnknownCategory { .. }));
	assert!(err.to_string().contains("finance"));
}

#[tokio::test]
async fn route_propagates_chat_failures() {
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(FailingChat),
	);
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let result = service.route("Where is the vacation policy?").await;

	assert!(matches!(result, Err(ServiceError::Chat { .. })));
}

#[tokio::test]
async fn route_rejects_blank_queries_without_the_model() {
	let calls = Arc::new(AtomicUsize::new(0));
	let (providers, _prompts) = routing_providers("policies", calls.clone());
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let result = service.route("   ").await;

	assert!(matches!(result, Err(ServiceError::InvalidArgument { .. })));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}
