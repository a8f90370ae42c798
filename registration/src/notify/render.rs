//! Confirmation message template.

use fest_admission_core::notify::{ConfirmationData, MessageRenderer, OutgoingMessage};

/// Renders the registration confirmation sent to every member.
#[derive(Debug, Clone)]
pub struct ConfirmationRenderer {
    event_name: String,
    dashboard_url: String,
}

impl ConfirmationRenderer {
    /// Create a renderer for `event_name`, linking members to `dashboard_url`.
    #[must_use]
    pub fn new(event_name: impl Into<String>, dashboard_url: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            dashboard_url: dashboard_url.into(),
        }
    }
}

/// Escape text for an HTML element body or quoted attribute.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn track_lines(data: &ConfirmationData) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("Team ID", data.team_id.to_string()),
        ("Organization", data.organization.clone()),
        ("Ticket", data.category.to_string()),
    ];
    if let Some(workshop) = data.workshop_track {
        lines.push(("Workshop", workshop.to_string()));
    }
    if let Some(competition) = data.competition_track {
        lines.push(("Competition", competition.to_string()));
    }
    lines
}

impl MessageRenderer for ConfirmationRenderer {
    fn render(&self, data: &ConfirmationData) -> OutgoingMessage {
        let event = &self.event_name;
        let dashboard = &self.dashboard_url;
        let name = &data.member_name;
        let passkey = &data.passkey;
        let lines = track_lines(data);

        let text_rows: String = lines
            .iter()
            .map(|(label, value)| format!("{label}: {value}\n"))
            .collect();
        let html_rows: String = lines
            .iter()
            .map(|(label, value)| {
                let value = escape_html(value);
                format!("<tr><td style=\"padding: 4px 12px 4px 0; color: #666;\">{label}</td><td>{value}</td></tr>")
            })
            .collect();

        let text_body = format!(
            "Hi {name},\n\n\
             Your registration for {event} has been received and is pending payment verification.\n\n\
             {text_rows}\n\
             Your dashboard passkey: {passkey}\n\
             Sign in at {dashboard} with your email and this passkey. Keep it private; it cannot be recovered.\n"
        );

        let event = escape_html(event);
        let dashboard = escape_html(dashboard);
        let name = escape_html(name);
        let passkey = escape_html(passkey);
        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{event} registration</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">You're registered for {event}</h2>
        <p>Hi {name}, your registration has been received and is pending payment verification.</p>
        <table>{html_rows}</table>
        <p style="margin: 30px 0;">
            Your dashboard passkey:
            <strong style="font-family: monospace; font-size: 18px;">{passkey}</strong>
        </p>
        <p>
            <a href="{dashboard}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Open dashboard
            </a>
        </p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Keep this passkey private. It is not stored and cannot be recovered.
        </p>
    </div>
</body>
</html>
            "#
        );

        OutgoingMessage {
            to: data.email.clone(),
            subject: format!("{} registration received: team {}", self.event_name, data.team_id),
            html_body,
            text_body,
        }
    }
}
