use athwatch_domain::repositories::notifier::Notifier;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const TELEGRAM_DEFAULT_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub delivered: bool,
    pub duration_ms: u64,
    pub status: Option<u16>,
    pub error: Option<String>,
}

pub struct TelegramNotifier {
    pub api_base: String,
    pub chat_id: String,
    pub timeout_ms: u64,
    bot_token: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(
        api_base: String,
        bot_token: String,
        chat_id: String,
        timeout_ms: u64,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            api_base,
            chat_id,
            timeout_ms,
            bot_token,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Single attempt. Transport errors are stripped of the URL so the token never
    /// reaches the logs.
    pub fn send_detailed(&self, text: &str) -> DeliveryReport {
        let start = Instant::now();
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };
        let response = self.client.post(self.endpoint()).json(&request).send();

        let (status, error) = match response {
            Ok(resp) => {
                let status = resp.status();
                match resp.json::<SendMessageResponse>() {
                    Ok(parsed) if status == StatusCode::OK && parsed.ok => (Some(status), None),
                    Ok(parsed) => (
                        Some(status),
                        Some(format!(
                            "telegram rejected message: status {} ({})",
                            status.as_u16(),
                            parsed.description.unwrap_or_else(|| "no description".to_string())
                        )),
                    ),
                    Err(err) => (
                        Some(status),
                        Some(format!(
                            "telegram http error: status {} ({})",
                            status.as_u16(),
                            err.without_url()
                        )),
                    ),
                }
            }
            Err(err) => (
                None,
                Some(format!("telegram request failed: {}", err.without_url())),
            ),
        };

        DeliveryReport {
            delivered: error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            status: status.map(|s| s.as_u16()),
            error,
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, message: &str) -> bool {
        let report = self.send_detailed(message);
        if report.delivered {
            tracing::info!(duration_ms = report.duration_ms, "telegram message delivered");
        } else {
            metrics::counter!("athwatch.notify.failures").increment(1);
            tracing::warn!(
                status = ?report.status,
                duration_ms = report.duration_ms,
                error = report.error.as_deref().unwrap_or("unknown"),
                "telegram delivery failed"
            );
        }
        report.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::TelegramNotifier;
    use crate::test_support::{http_response, try_spawn_server};
    use athwatch_domain::repositories::notifier::Notifier;
    use std::net::TcpListener;

    #[test]
    fn notify_posts_chat_id_and_text_to_bot_endpoint() {
        let Some((base_url, requests)) =
            try_spawn_server(http_response(200, "OK", r#"{"ok":true,"result":{}}"#))
        else {
            eprintln!("skipping: cannot bind local test server");
            return;
        };

        let notifier = TelegramNotifier::new(base_url, "123:abc".to_string(), "-100".to_string(), 2000)
            .expect("notifier");
        assert!(notifier.notify("INFY.NS is near All-Time High"));

        let request = requests.recv().expect("request captured");
        assert!(request.starts_with("POST /bot123:abc/sendMessage"));
        assert!(request.contains(r#""chat_id":"-100""#));
        assert!(request.contains("INFY.NS is near All-Time High"));
    }

    #[test]
    fn non_ok_status_is_not_delivered() {
        let Some((base_url, _requests)) = try_spawn_server(http_response(
            400,
            "Bad Request",
            r#"{"ok":false,"description":"Bad Request: chat not found"}"#,
        )) else {
            eprintln!("skipping: cannot bind local test server");
            return;
        };

        let notifier = TelegramNotifier::new(base_url, "t".to_string(), "c".to_string(), 2000)
            .expect("notifier");
        let report = notifier.send_detailed("hello");
        assert!(!report.delivered);
        assert_eq!(report.status, Some(400));
        assert!(report.error.unwrap_or_default().contains("chat not found"));
    }

    #[test]
    fn connection_refused_is_not_delivered_and_hides_token() {
        let port = match TcpListener::bind("127.0.0.1:0").and_then(|l| l.local_addr()) {
            Ok(addr) => addr.port(),
            Err(_) => {
                eprintln!("skipping: cannot bind local port");
                return;
            }
        };

        let notifier = TelegramNotifier::new(
            format!("http://127.0.0.1:{port}"),
            "secret-token".to_string(),
            "c".to_string(),
            500,
        )
        .expect("notifier");
        let report = notifier.send_detailed("hello");
        assert!(!report.delivered);
        assert!(report.status.is_none());
        assert!(!report.error.unwrap_or_default().contains("secret-token"));
    }
}
