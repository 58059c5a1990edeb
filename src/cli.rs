//! Interface de linha de comando do VIDGATE baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (check, matrix, path, demo)
//! e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::workflow::VideoStatus;

/// VIDGATE — Motor de autorização do pipeline de produção de vídeos.
#[derive(Debug, Parser)]
#[command(name = "vidgate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./vidgate.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Política exibida pelo subcomando `matrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Quem pode listar o vídeo.
    Visibility,
    /// Quem pode abrir o detalhe editável.
    Details,
    /// Quem pode reverter a partir do status.
    Revert,
    /// Quem pode remover o responsável.
    Unassign,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mostra as quatro decisões para um papel e um status.
    Check {
        /// Papel do usuário (admin, optimizer, reviewer, ...).
        #[arg(long)]
        role: String,

        /// Status do vídeo (pending, content_review, ...).
        #[arg(long)]
        status: String,
    },

    /// Imprime a grade papel × status de uma política.
    Matrix {
        #[arg(long, value_enum, default_value_t = PolicyArg::Visibility)]
        policy: PolicyArg,
    },

    /// Mostra a cadeia de reversão de um status até `pending`.
    Path {
        /// Status de partida.
        status: VideoStatus,
    },

    /// Executa a demonstração embutida do pipeline.
    Demo,
}
