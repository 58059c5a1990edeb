//! Saída de terminal do VIDGATE com cores.
//!
//! Usa a crate `console` para estilização. O [`Printer`] formata
//! decisões de política, grades papel × status e o histórico de aprovações.

use console::Style;

use crate::cli::PolicyArg;
use crate::workflow::{
    ApprovalAction, ProgressReport, Role, VideoRecord, VideoStatus, can_revert, can_see_details,
    can_see_video, can_unassign,
};

/// Formata a saída do CLI: verde para permitido, vermelho para negado.
pub struct Printer {
    // Estilo verde para decisões permitidas e aprovações.
    green: Style,
    // Estilo vermelho para decisões negadas e rejeições.
    red: Style,
    // Estilo amarelo para reversões.
    yellow: Style,
    // Estilo para cabeçalhos.
    bold: Style,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            bold: Style::new().bold(),
        }
    }

    fn mark(&self, allowed: bool) -> String {
        if allowed {
            self.green.apply_to("✓").to_string()
        } else {
            self.red.apply_to("✗").to_string()
        }
    }

    /// Imprime uma decisão por linha, com o nome da função à direita da marca.
    pub fn decisions(&self, role: &str, status: &str, decisions: &[(&str, bool)]) {
        println!("{}", self.bold.apply_to(format!("{role} @ {status}")));
        for (name, allowed) in decisions {
            println!("  {} {name}", self.mark(*allowed));
        }
    }

    /// Imprime a grade de uma política: uma linha por status, uma coluna por papel.
    pub fn matrix(&self, policy: PolicyArg) {
        let check: fn(Role, VideoStatus) -> bool = match policy {
            PolicyArg::Visibility => can_see_video,
            PolicyArg::Details => can_see_details,
            PolicyArg::Revert => can_revert,
            PolicyArg::Unassign => can_unassign,
        };

        let header: Vec<String> = Role::ALL
            .iter()
            .map(|role| format!("{:>8.8}", role.as_str()))
            .collect();
        println!("{:<20} {}", "", self.bold.apply_to(header.join(" ")));

        for status in VideoStatus::ALL {
            let cells: Vec<String> = Role::ALL
                .iter()
                .map(|role| format!("{:>8}", self.mark(check(*role, status))))
                .collect();
            println!("{:<20} {}", status.as_str(), cells.join(" "));
        }
    }

    /// Imprime a cadeia de reversão separada por setas.
    pub fn revert_path(&self, path: &[VideoStatus]) {
        let labels: Vec<&str> = path.iter().map(VideoStatus::as_str).collect();
        println!("{}", labels.join(" ← "));
    }

    /// Imprime uma linha por evento, colorida pela ação.
    pub fn history(&self, record: &VideoRecord) {
        println!();
        println!("{}", self.bold.apply_to(format!("─── {} ───", record.title)));
        for event in record.history() {
            let details = event.details();
            let style = match event.action() {
                ApprovalAction::Approved => &self.green,
                ApprovalAction::Rejected => &self.red,
                ApprovalAction::Reverted => &self.yellow,
            };
            println!(
                "  {:<9} {} → {} by {} ({}){}",
                style.apply_to(event.action()),
                details.from,
                details.to,
                details.role,
                details.timestamp.format("%H:%M:%S%.6f"),
                details
                    .comment
                    .as_ref()
                    .map(|c| format!(": {c}"))
                    .unwrap_or_default()
            );
        }
    }

    /// Imprime o relatório de progresso formatado em JSON.
    pub fn report(&self, report: &ProgressReport) -> serde_json::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        println!();
        println!("{}", self.bold.apply_to("─── Progress Report ───"));
        println!("{json}");
        Ok(())
    }

    /// Imprime um erro esperado da demonstração.
    pub fn denied(&self, message: &str) {
        println!("  {} {message}", self.red.apply_to("✗"));
    }
}
