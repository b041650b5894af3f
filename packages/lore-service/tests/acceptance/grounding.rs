use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use lore_service::{Providers, ServiceError, answer::NO_DOCUMENTS_ANSWER};

use super::{
	FailingChat, SpyChat, SpyEmbedding, StubEmbedding, VECTOR_DIM, build_service, privacy_corpus,
};

#[tokio::test]
async fn grounded_answer_carries_reply_documents_and_context() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let expected_documents = vec![corpus[0].metadata.clone(), corpus[2].metadata.clone()];
	let chat_calls = Arc::new(AtomicUsize::new(0));
	let prompts = Arc::new(Mutex::new(Vec::new()));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(SpyChat {
			reply: "  The policy covers employee data.  ".to_string(),
			calls: chat_calls.clone(),
			prompts: prompts.clone(),
		}),
	);
	let service =
		build_service(corpus, ranking, providers).await.expect("Failed to build service.");
	let result =
		service.answer("privacy", Some("policies"), 6).await.expect("Failed to answer.");
	let expected_context = "[Source: privacy_policy.txt | Category: policies]\n\
	                        Privacy policy for employee data handling.\n\n\
	                        [Source: privacy_policy.txt | Category: policies]\n\
	                        Retention schedule for internal documents.";

	assert_eq!(result.answer, "The policy covers employee data.");
	assert_eq!(result.documents, expected_documents);
	assert_eq!(result.context, expected_context);
	assert_eq!(chat_calls.load(Ordering::SeqCst), 1);

	let prompts = prompts.lock().expect("Prompt log poisoned.");
	let (system, user) = &prompts[0];

	assert_eq!(
		system,
		"You are an AI assistant answering questions strictly from internal documents."
	);
	assert!(user.contains("- Use ONLY the provided context."));
	assert!(user.contains(&format!("Context:\n{expected_context}\n\n")));
	assert!(user.contains("Question:\nprivacy\n\n"));
}

#[tokio::test]
async fn retrieval_misses_answer_without_the_model() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let chat_calls = Arc::new(AtomicUsize::new(0));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(SpyChat {
			reply: "unused".to_string(),
			calls: chat_calls.clone(),
			prompts: Arc::new(Mutex::new(Vec::new())),
		}),
	);
	let service =
		build_service(corpus, ranking, providers).await.expect("Failed to build service.");
	let result = service
		.answer("zebra quantum", Some("membership"), 6)
		.await
		.expect("Failed to answer.");

	assert_eq!(result.answer, NO_DOCUMENTS_ANSWER);
	assert!(result.documents.is_empty());
	assert!(result.context.is_empty());
	assert_eq!(chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chat_failures_propagate() {
	let corpus = privacy_corpus();
	let ranking = vec![corpus[0].clone(), corpus[2].clone()];
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: VECTOR_DIM }),
		Arc::new(FailingChat),
	);
	let service =
		build_service(corpus, ranking, providers).await.expect("Failed to build service.");
	let result = service.answer("privacy", Some("policies"), 6).await;
	let err = result.expect_err("Chat failure must surface.");

	assert!(matches!(err, ServiceError::Chat { .. }));
	assert!(err.to_string().contains("Chat backend offline."));
}

#[tokio::test]
async fn invalid_arguments_skip_all_providers() {
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
	let result = service.answer("", None, 6).await;

	assert!(matches!(result, Err(ServiceError::InvalidArgument { .. })));
	assert_eq!(embed_calls.load(Ordering::SeqCst), 0);
	assert_eq!(chat_calls.load(Ordering::SeqCst), 0);
}
