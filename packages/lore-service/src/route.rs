use lore_domain::Category;

use crate::{LoreService, ServiceError, ServiceResult};

const SYSTEM_PROMPT: &str = "You classify user questions into document categories.";

impl LoreService {
	/// Asks the language model which category a question belongs to.
	///
	/// A reply that is not a known category name is an error; the caller
	/// decides whether that is fatal or answered with a fallback.
	pub async fn route(&self, query: &str) -> ServiceResult<Category> {
		if query.trim().is_empty() {
			return Err(ServiceError::InvalidArgument {
				message: "Query text must not be empty.".to_string(),
			});
		}

		let user = build_route_prompt(query);
		let reply = self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, SYSTEM_PROMPT, &user)
			.await
			.map_err(|err| ServiceError::Chat { message: err.to_string() })?;

		Ok(reply.parse()?)
	}
}

fn build_route_prompt(query: &str) -> String {
	let mut categories = String::new();

	for category in Category::ALL {
		categories.push_str("- ");
		categories.push_str(category.as_str());
		categories.push('\n');
	}

	format!(
		"Classify the user query into ONE category:\n\n{categories}\nReturn ONLY the category name.\n\nQuery:\n{query}"
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn route_prompt_lists_every_category_once() {
		let prompt = build_route_prompt("Where do I file a claim?");

		assert!(prompt.starts_with("Classify the user query into ONE category:\n\n"));

		for category in Category::ALL {
			assert_eq!(prompt.matches(&format!("- {category}\n")).count(), 1);
		}

		assert!(prompt.contains("\nReturn ONLY the category name.\n"));
		assert!(prompt.ends_with("Query:\nWhere do I file a claim?"));
	}
}
