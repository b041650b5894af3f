use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use lore_service::{LoreService, Providers, ServiceError};

use super::{
	FailingEmbedding, FailingVectors, SpyChat, SpyEmbedding, StubEmbedding, VECTOR_DIM,
	build_service, privacy_corpus, test_config,
};

fn stub_providers() -> Providers {
	Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(SpyChat {
			reply: "unused".to_string(),
			calls: Arc::new(AtomicUsize::new(0)),
			prompts: Arc::new(Mutex::new(Vec::new())),
		}),
	)
}

#[tokio::test]
async fn scoped_retrieval_fuses_vector_hits_ahead_of_lexical() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let service =
		build_service(corpus, ranking, stub_providers()).await.expect("Failed to build service.");
	let hits =
		service.retrieve("privacy", Some("policies"), 6).await.expect("Failed to retrieve.");
	let ids = hits.iter().map(|chunk| chunk.id.as_str()).collect::<Vec<_>>();

	// The medical chunk tops the lexical ranking but is filtered out; the
	// policies chunk it outranked still trails the vector hits.
	assert_eq!(ids, ["policies__privacy_policy.txt__chunk_0", "policies__privacy_policy.txt__chunk_1"]);
}

#[tokio::test]
async fn scoped_retrieval_truncates_to_k() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let service =
		build_service(corpus, ranking, stub_providers()).await.expect("Failed to build service.");
	let hits =
		service.retrieve("privacy", Some("policies"), 1).await.expect("Failed to retrieve.");
	let ids = hits.iter().map(|chunk| chunk.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, ["policies__privacy_policy.txt__chunk_0"]);
}

#[tokio::test]
async fn unscoped_retrieval_appends_lexical_only_hits() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let service =
		build_service(corpus, ranking, stub_providers()).await.expect("Failed to build service.");
	let hits = service.retrieve("privacy", None, 6).await.expect("Failed to retrieve.");
	let ids = hits.iter().map(|chunk| chunk.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, [
		"policies__privacy_policy.txt__chunk_0",
		"policies__privacy_policy.txt__chunk_1",
		"medical__records_handling.txt__chunk_0",
	]);
}

#[tokio::test]
async fn identical_requests_yield_identical_results() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let service =
		build_service(corpus, ranking, stub_providers()).await.expect("Failed to build service.");
	let first =
		service.retrieve("privacy", Some("policies"), 6).await.expect("Failed to retrieve.");
	let second =
		service.retrieve("privacy", Some("policies"), 6).await.expect("Failed to retrieve.");

	assert_eq!(first, second);
}

#[tokio::test]
async fn no_matches_yield_an_empty_result_not_an_error() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let service =
		build_service(corpus, ranking, stub_providers()).await.expect("Failed to build service.");
	let hits =
		service.retrieve("zebra quantum", Some("membership"), 6).await.expect("Failed to retrieve.");

	assert!(hits.is_empty());
}

#[tokio::test]
async fn invalid_arguments_fail_before_any_provider_call() {
	let embed_calls = Arc::new(AtomicUsize::new(0));
	let chat_calls = Arc::new(AtomicUsize::new(0));
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: VECTOR_DIM, calls: embed_calls.clone() }),
		Arc::new(SpyChat {
			reply: "unused".to_string(),
			calls: chat_calls.clone(),
			prompts: Arc::new(Mutex::new(Vec::new())),
		}),
	);
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let blank = service.retrieve("   ", None, 6).await;

	assert!(matches!(blank, Err(ServiceError::InvalidArgument { .. })));

	let zero = service.retrieve("privacy", None, 0).await;

	assert!(matches!(zero, Err(ServiceError::InvalidArgument { .. })));
	assert_eq!(embed_calls.load(Ordering::SeqCst), 0);
	assert_eq!(chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn an_empty_corpus_fails_at_startup() {
	let result = build_service(Vec::new(), Vec::new(), stub_providers()).await;

	assert!(matches!(result, Err(ServiceError::EmptyCorpus)));
}

#[tokio::test]
async fn embedding_failures_propagate() {
	let providers = Providers::new(
		Arc::new(FailingEmbedding),
		Arc::new(SpyChat {
			reply: "unused".to_string(),
			calls: Arc::new(AtomicUsize::new(0)),
			prompts: Arc::new(Mutex::new(Vec::new())),
		}),
	);
	let service = build_service(privacy_corpus(), Vec::new(), providers)
		.await
		.expect("Failed to build service.");
	let result = service.retrieve("privacy", None, 6).await;
	let err = result.expect_err("Embedding failure must surface.");

	assert!(matches!(err, ServiceError::Embedding { .. }));
	assert!(err.to_string().contains("Embedding backend offline."));
}

#[tokio::test]
async fn vector_search_failures_propagate() {
	let service = LoreService::with_providers(
		test_config(),
		Arc::new(FailingVectors { corpus: privacy_corpus() }),
		stub_providers(),
	)
	.await
	.expect("Failed to build service.");
	let result = service.retrieve("privacy", None, 6).await;

	assert!(matches!(result, Err(ServiceError::VectorSearch { .. })));
}
