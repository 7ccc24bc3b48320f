use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Serialize;

/// Client for the SendGrid v3 mail send API.
#[derive(Clone)]
pub struct SendGridClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

/// An outbound report mail: one recipient, one PDF attachment.
#[derive(Debug)]
pub struct ReportMail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
    pub pdf: Vec<u8>,
}

/// SendGrid mail send request format.
#[derive(Debug, Serialize)]
struct MailSendRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
    attachments: Vec<MailAttachment>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct MailAttachment {
    /// Base64-encoded file body.
    content: String,
    filename: String,
    #[serde(rename = "type")]
    mime_type: String,
    disposition: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("SendGrid error: {0}")]
    Rejected(String),
}

impl SendGridClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Send a report mail with its PDF attached. The attachment body is
    /// base64-encoded here; callers pass raw PDF bytes.
    pub async fn send_report(&self, from: &str, mail: &ReportMail) -> Result<(), MailError> {
        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: mail.to_email.clone(),
                    name: Some(mail.to_name.clone()),
                }],
            }],
            from: EmailAddress {
                email: from.to_string(),
                name: None,
            },
            subject: mail.subject.clone(),
            content: vec![MailContent {
                content_type: "text/html".to_string(),
                value: mail.html_body.clone(),
            }],
            attachments: vec![MailAttachment {
                content: BASE64.encode(&mail.pdf),
                filename: mail.attachment_name.clone(),
                mime_type: "application/pdf".to_string(),
                disposition: "attachment".to_string(),
            }],
        };

        let url = format!("{}/v3/mail/send", self.base_url);

        tracing::debug!(to = %mail.to_email, subject = %mail.subject, "Sending mail via SendGrid");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendgrid_client_url_normalization() {
        let client = SendGridClient::new("https://api.sendgrid.com/", "key");
        assert_eq!(client.base_url, "https://api.sendgrid.com");
    }

    #[test]
    fn test_attachment_serializes_with_mime_type_and_disposition() {
        let attachment = MailAttachment {
            content: BASE64.encode(b"%PDF-"),
            filename: "Report_Hours_May_2024.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            disposition: "attachment".to_string(),
        };
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["type"], "application/pdf");
        assert_eq!(json["disposition"], "attachment");
        assert_eq!(json["filename"], "Report_Hours_May_2024.pdf");
        assert_eq!(json["content"], BASE64.encode(b"%PDF-"));
    }
}
