//! Configuração do VIDGATE carregada a partir de `vidgate.toml`.
//!
//! A struct [`VidgateConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `VIDGATE_LOG` tem precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, WorkflowError};
use crate::workflow::CommentRules;

/// Configuração de nível superior carregada de `vidgate.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct VidgateConfig {
    /// Filtro de log (sintaxe do `EnvFilter`, ex.: "info" ou "vidgate=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tentativas de compare-and-swap antes de devolver o conflito ao chamador.
    #[serde(default = "default_max_cas_attempts")]
    pub max_cas_attempts: u32,

    /// Exige comentário ao rejeitar um vídeo.
    #[serde(default)]
    pub require_rejection_comment: bool,

    /// Tamanho máximo de um comentário, em caracteres.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

// Valor padrão para o filtro de log: "info".
fn default_log_level() -> String {
    "info".to_string()
}

// Valor padrão para tentativas de CAS: 3.
fn default_max_cas_attempts() -> u32 {
    3
}

// Valor padrão para o tamanho de comentário: 2000.
fn default_max_comment_length() -> usize {
    2000
}

impl Default for VidgateConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_cas_attempts: default_max_cas_attempts(),
            require_rejection_comment: false,
            max_comment_length: default_max_comment_length(),
        }
    }
}

impl VidgateConfig {
    /// Carrega a configuração de `vidgate.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("vidgate.toml"))
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<VidgateConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para o filtro de log.
        if let Ok(level) = std::env::var("VIDGATE_LOG")
            && !level.is_empty()
        {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_cas_attempts == 0 {
            return Err(WorkflowError::Config(
                "max_cas_attempts must be at least 1".into(),
            ));
        }
        if self.max_comment_length == 0 {
            return Err(WorkflowError::Config(
                "max_comment_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Regras de comentário repassadas ao validador de transições.
    pub fn comment_rules(&self) -> CommentRules {
        CommentRules {
            require_rejection_comment: self.require_rejection_comment,
            max_comment_length: self.max_comment_length,
        }
    }
}
