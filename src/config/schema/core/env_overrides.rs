use super::super::VectorBackend;
use super::Config;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("STRANDKEEP_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(port_str) = std::env::var("STRANDKEEP_PORT")
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(workspace) = std::env::var("STRANDKEEP_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = PathBuf::from(workspace);
        }

        if let Ok(backend) = std::env::var("STRANDKEEP_VECTOR_BACKEND") {
            match VectorBackend::parse(&backend) {
                Some(parsed) => self.vector.backend = parsed,
                None if backend.is_empty() => {}
                None => {
                    tracing::warn!(value = %backend, "ignoring unknown STRANDKEEP_VECTOR_BACKEND");
                }
            }
        }

        if let Ok(key) = std::env::var("PINECONE_API_KEY")
            && !key.is_empty()
        {
            self.vector.pinecone_api_key = Some(key);
        }

        if let Ok(host) = std::env::var("PINECONE_HOST")
            && !host.is_empty()
        {
            self.vector.pinecone_host = Some(host);
        }

        if let Ok(base_url) = std::env::var("STRANDKEEP_MODEL_BASE_URL")
            && !base_url.is_empty()
        {
            self.model.base_url = base_url;
        }
    }
}
