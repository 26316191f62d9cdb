use crate::Alert;
use anyhow::Context;
use chrono::{DateTime, Local};
use matrix::RoomMessage;

const ALERT_HTML: &str = "alert-html";

/// Renderer formats alerts into room messages.
pub struct Renderer<'a> {
    reg: handlebars::Handlebars<'a>,
}

#[derive(serde::Serialize)]
struct TemplateData<'a> {
    timestamp: String,
    subject: &'a str,
    message: &'a str,
}

impl Renderer<'_> {
    pub fn try_new() -> anyhow::Result<Self> {
        let mut reg = handlebars::Handlebars::new();
        reg.set_strict_mode(true);

        // Handlebars HTML-escapes each `{{value}}`, so alert text can't inject markup.
        reg.register_template_string(
            ALERT_HTML,
            "<h3>ZABBIX ALERT</h3>\
             <p><b>[{{timestamp}}]</b></p>\
             <p><b>SUBJECT:</b> {{subject}}</p>\
             <pre>{{message}}</pre>",
        )
        .context("registering alert-html template")?;

        Ok(Self { reg })
    }

    /// Render `alert`, stamped with the local time `now`.
    pub fn render(&self, alert: &Alert, now: DateTime<Local>) -> anyhow::Result<RoomMessage> {
        let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let body = format!(
            "ZABBIX ALERT\n[{timestamp}]\nSUBJECT: {}\n\n{}",
            alert.subject, alert.message
        );
        let formatted_body = self
            .reg
            .render(
                ALERT_HTML,
                &TemplateData {
                    timestamp,
                    subject: &alert.subject,
                    message: &alert.message,
                },
            )
            .context("rendering alert-html template")?;

        Ok(RoomMessage::html(body, formatted_body))
    }
}
