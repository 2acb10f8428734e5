//! Interface de linha de comando do relay baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, submit,
//! remove-background) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use whitemuse_relay::modes::Mode;

/// WhiteMuse relay: executa jobs de IA generativa em um provedor remoto.
#[derive(Debug, Parser)]
#[command(name = "whitemuse-relay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./relay.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Modo de geração aceito pela CLI, mapeado para [`Mode`] internamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Geração de texto por LLM.
    Text,
    /// Geração de imagem.
    Image,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Text => Mode::Text,
            ModeArg::Image => Mode::Image,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inicia o servidor HTTP.
    Serve {
        /// Endereço de escuta; sobrepõe `bind_addr` e `PORT`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Submete um único job de geração e imprime o envelope resultante.
    Submit {
        /// Modo de geração.
        mode: ModeArg,

        /// Prompt enviado ao modelo.
        prompt: String,

        /// Objeto JSON com parâmetros extras do modelo.
        #[arg(long)]
        input: Option<String>,
    },

    /// Remove ou substitui o fundo de uma imagem.
    RemoveBackground {
        /// URL (ou data URL) da imagem.
        image_url: String,

        /// "white" para fundo branco; qualquer outro texto vira o prompt do fundo.
        #[arg(long)]
        bg_type: Option<String>,
    },
}
