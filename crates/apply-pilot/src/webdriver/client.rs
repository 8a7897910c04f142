use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::debug;

use super::WebDriverError;

/// W3C element reference key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466ecf3";

/// Unicode code point WebDriver maps to the Enter key.
pub const ENTER_KEY: &str = "\u{E007}";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// How to find an element, in W3C locator strategy terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
    Tag(&'a str),
}

impl<'a> Locator<'a> {
    fn to_json(self) -> Value {
        let (using, value) = match self {
            Locator::Css(value) => ("css selector", value),
            Locator::XPath(value) => ("xpath", value),
            Locator::Tag(value) => ("tag name", value),
        };
        json!({ "using": using, "value": value })
    }
}

/// Opaque handle to an element in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }
}

impl<'de> Deserialize<'de> for ElementRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "element-6066-11e4-a52e-4f735466ecf3")]
            id: String,
        }

        Wire::deserialize(deserializer).map(|wire| ElementRef(wire.id))
    }
}

/// Chrome launch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub private: bool,
    pub headless: bool,
    pub user_agent: String,
}

impl BrowserOptions {
    /// Options with a user agent picked at random from [`USER_AGENTS`].
    pub fn new(private: bool, headless: bool) -> Self {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string();
        Self {
            private,
            headless,
            user_agent,
        }
    }

    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--start-maximized".to_string(),
            "--no-sandbox".to_string(),
            "--disable-extensions".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        if self.private {
            args.push("--incognito".to_string());
        }
        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--window-size=1920,1080".to_string());
        }
        args
    }

    pub fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": self.chrome_args(),
                        "excludeSwitches": ["enable-automation"],
                    }
                }
            }
        })
    }
}

#[derive(Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Minimal W3C WebDriver client bound to a single browser session.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Opens a new browser session on the WebDriver server at `base_url`.
    pub async fn start(base_url: &str, options: &BrowserOptions) -> Result<Self, WebDriverError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = http
            .post(format!("{base_url}/session"))
            .json(&options.capabilities())
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;
        let session: NewSession = decode_response("new session", status, body)?;

        debug!(session = %session.session_id, headless = options.headless, "browser session started");
        Ok(Self {
            http,
            base_url,
            session_id: session.session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, WebDriverError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut request = self.http.request(method.clone(), &url);
        if method == Method::POST {
            request = request.json(&body.unwrap_or_else(|| json!({})));
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        decode_response(path, status, body)
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        self.command::<Value>(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(drop)
    }

    pub async fn title(&self) -> Result<String, WebDriverError> {
        self.command(Method::GET, "/title", None).await
    }

    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        self.command(Method::GET, "/url", None).await
    }

    pub async fn find(&self, locator: Locator<'_>) -> Result<ElementRef, WebDriverError> {
        self.command(Method::POST, "/element", Some(locator.to_json()))
            .await
    }

    pub async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<ElementRef>, WebDriverError> {
        self.command(Method::POST, "/elements", Some(locator.to_json()))
            .await
    }

    pub async fn find_within(
        &self,
        parent: &ElementRef,
        locator: Locator<'_>,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let path = format!("/element/{}/elements", parent.id());
        self.command(Method::POST, &path, Some(locator.to_json()))
            .await
    }

    pub async fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        let path = format!("/element/{}/click", element.id());
        self.command::<Value>(Method::POST, &path, None).await.map(drop)
    }

    /// Clicks through script, for inputs covered by a styled label.
    pub async fn script_click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.execute("arguments[0].click();", vec![element.to_json()])
            .await
            .map(drop)
    }

    pub async fn clear(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        let path = format!("/element/{}/clear", element.id());
        self.command::<Value>(Method::POST, &path, None).await.map(drop)
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        let path = format!("/element/{}/value", element.id());
        self.command::<Value>(Method::POST, &path, Some(json!({ "text": text })))
            .await
            .map(drop)
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        let path = format!("/element/{}/text", element.id());
        self.command(Method::GET, &path, None).await
    }

    pub async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, WebDriverError> {
        let path = format!("/element/{}/attribute/{}", element.id(), name);
        self.command(Method::GET, &path, None).await
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    pub async fn scroll_element(&self, element: &ElementRef, offset: u32) -> Result<(), WebDriverError> {
        self.execute(
            "arguments[0].scrollTo(0, arguments[1]);",
            vec![element.to_json(), json!(offset)],
        )
        .await
        .map(drop)
    }

    /// Polls until at least one element matches or the timeout elapses.
    pub async fn wait_for(
        &self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            let found = self.find_all(locator).await?;
            if !found.is_empty() {
                return Ok(found);
            }
            if Instant::now() >= deadline {
                return Err(WebDriverError::Timeout {
                    waited: timeout,
                    target: format!("{locator:?}"),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Ends the browser session.
    pub async fn quit(&self) -> Result<(), WebDriverError> {
        self.command::<Value>(Method::DELETE, "", None).await.map(drop)
    }
}

/// Unwraps the `value` envelope of a WebDriver response, turning error payloads into
/// [`WebDriverError::Command`].
pub(crate) fn decode_response<T: DeserializeOwned>(
    command: &str,
    status: StatusCode,
    mut body: Value,
) -> Result<T, WebDriverError> {
    let value = body
        .get_mut("value")
        .map(Value::take)
        .ok_or_else(|| WebDriverError::Protocol(format!("{command}: response has no value")))?;

    if !status.is_success() || value.get("error").and_then(Value::as_str).is_some() {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        return Err(WebDriverError::Command {
            command: command.to_string(),
            error,
            message,
        });
    }

    serde_json::from_value(value)
        .map_err(|err| WebDriverError::Protocol(format!("{command}: {err}")))
}
