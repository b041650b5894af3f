mod error;

pub use error::{Error, Result};

use std::{env, thread};

use qdrant_client::{
	Qdrant,
	qdrant::{CreateCollectionBuilder, Distance, VectorParamsBuilder},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub fn env_qdrant_url() -> Option<String> {
	env::var("LORE_QDRANT_URL").ok()
}

/// A uniquely named Qdrant collection for one test, deleted on cleanup.
pub struct TestCollection {
	name: String,
	url: String,
	cleaned: bool,
}
impl TestCollection {
	pub async fn create(url: &str, vector_dim: u32) -> Result<Self> {
		let name = format!("lore_test_{}", Uuid::new_v4().simple());
		let client = Qdrant::from_url(url).build()?;
		let vectors = VectorParamsBuilder::new(u64::from(vector_dim), Distance::Cosine);
		let create = CreateCollectionBuilder::new(name.clone()).vectors_config(vectors);

		client.create_collection(create).await?;

		Ok(Self { name, url: url.to_string(), cleaned: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		let client = Qdrant::from_url(&self.url).build()?;

		client.delete_collection(self.name.clone()).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let name = self.name.clone();
		let url = self.url.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test collection cleanup failed: {err}.");

					return;
				},
			};
			let result: Result<()> = runtime.block_on(async {
				let client = Qdrant::from_url(&url).build()?;

				client.delete_collection(name).await?;

				Ok(())
			});

			if let Err(err) = result {
				eprintln!("Test collection cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}
