mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Ingestion, LlmProviderConfig, Providers, Qdrant, Retrieval,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if !cfg.providers.chat.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite number.".to_string(),
		});
	}
	if cfg.providers.chat.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be zero or greater.".to_string(),
		});
	}

	for (label, api_base, path, model, api_key, timeout_ms) in [
		(
			"embedding",
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.path,
			&cfg.providers.embedding.model,
			&cfg.providers.embedding.api_key,
			cfg.providers.embedding.timeout_ms,
		),
		(
			"chat",
			&cfg.providers.chat.api_base,
			&cfg.providers.chat.path,
			&cfg.providers.chat.model,
			&cfg.providers.chat.api_key,
			cfg.providers.chat.timeout_ms,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if path.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} path must be non-empty."),
			});
		}
		if model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.ingestion.max_chars == 0 {
		return Err(Error::Validation {
			message: "ingestion.max_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.ingestion.overlap_chars >= cfg.ingestion.max_chars {
		return Err(Error::Validation {
			message: "ingestion.overlap_chars must be less than ingestion.max_chars.".to_string(),
		});
	}
	if cfg.ingestion.embed_batch_size == 0 {
		return Err(Error::Validation {
			message: "ingestion.embed_batch_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	normalize_api_base(&mut cfg.providers.embedding.api_base);
	normalize_api_base(&mut cfg.providers.chat.api_base);
	normalize_path(&mut cfg.providers.embedding.path);
	normalize_path(&mut cfg.providers.chat.path);
}

fn normalize_api_base(api_base: &mut String) {
	while api_base.ends_with('/') {
		api_base.pop();
	}
}

fn normalize_path(path: &mut String) {
	if !path.is_empty() && !path.starts_with('/') {
		path.insert(0, '/');
	}
}
