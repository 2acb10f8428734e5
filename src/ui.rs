//! Interface de terminal do relay: spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`JobProgress`] acompanha visualmente a espera
//! por um job no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use whitemuse_relay::envelope::ResultEnvelope;

/// Indicador visual de progresso enquanto um job é executado no provedor.
pub struct JobProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para sucesso.
    green: Style,
    // Estilo vermelho para falha.
    red: Style,
}

impl JobProgress {
    /// Inicia o spinner com a descrição do job.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("waiting for prediction: {description}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Finaliza o spinner e imprime o envelope em JSON.
    ///
    /// Sucesso é mostrado em verde com checkmark; falha em vermelho com X e o
    /// código HTTP equivalente.
    pub fn complete(&self, status: u16, envelope: &ResultEnvelope) {
        self.pb.finish_and_clear();
        match envelope {
            ResultEnvelope::Success(success) => {
                println!(
                    "  {} Prediction {} succeeded",
                    self.green.apply_to("✓"),
                    success.id
                );
            }
            ResultEnvelope::Failure(failure) => {
                println!(
                    "  {} {} (HTTP {status})",
                    self.red.apply_to("✗"),
                    failure.error
                );
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(envelope).unwrap_or_default()
        );
    }
}
