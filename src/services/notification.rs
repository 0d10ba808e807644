// src/services/notification.rs
//
// Fronteira com o despacho de notificações (colaborador externo). Disparo
// best-effort depois de publicar: nunca bloqueia nem falha a publicação.

use crate::models::scheduling::Schedule;

#[derive(Clone, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }

    /// Fire-and-forget: a task roda em segundo plano e qualquer falha do
    /// colaborador fica registrada no log, não na resposta do `publish`.
    pub fn schedule_published(&self, schedule: &Schedule) {
        let schedule_id = schedule.id;
        let week_start = schedule.week_start;
        tokio::spawn(async move {
            tracing::info!(
                "🔔 Escala {} (semana de {}) publicada — notificando as unidades",
                schedule_id,
                week_start
            );
        });
    }
}
