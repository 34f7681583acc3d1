//! Page capability layer.
//!
//! `CdpPage` is the only type that touches the live chromiumoxide `Page`;
//! everything above it talks to the [`FormPage`] trait. The engine and its
//! tests never need a real browser behind the trait.

use async_trait::async_trait;
use chromiumoxide::Page;
use tokio::time::{sleep, Duration, Instant};

use crate::error::PageError;

/// Bound on every synchronous wait for a control to appear.
pub const CONTROL_WAIT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for a control.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settle time after navigation and submission; the form re-renders
/// client-side after both.
const SETTLE: Duration = Duration::from_secs(2);

/// The interactions the engine needs from a rendered form.
#[async_trait]
pub trait FormPage: Send + Sync {
    /// Load the form URL. Each record gets a fresh load; the form is
    /// stateful per page load.
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Wait for the control, clear prior content, set the value.
    async fn set_field(&self, control_id: &str, value: &str) -> Result<(), PageError>;

    /// Wait for the control and click it (radio-style options).
    async fn click_control(&self, control_id: &str) -> Result<(), PageError>;

    /// Click the form's submit button.
    async fn submit(&self) -> Result<(), PageError>;
}

/// Live form page driven over the Chrome DevTools Protocol.
///
/// Holds the `Page` and exposes only form interactions; it knows nothing
/// about records or mappings.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn eval_bool(&self, js_code: String) -> Result<bool, PageError> {
        let result = self
            .page
            .evaluate(js_code)
            .await
            .map_err(|e| PageError::Script { message: e.to_string() })?;
        result
            .into_value::<bool>()
            .map_err(|e| PageError::Script { message: e.to_string() })
    }

    /// Poll until the control exists in the DOM, bounded by [`CONTROL_WAIT`].
    async fn wait_for_control(&self, control_id: &str) -> Result<(), PageError> {
        let deadline = Instant::now() + CONTROL_WAIT;
        let js_code = format!("document.getElementById({}) !== null", js_str(control_id));
        loop {
            if self.eval_bool(js_code.clone()).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PageError::ControlNotFound {
                    control_id: control_id.to_string(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// Escape a Rust string as a JS string literal.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[async_trait]
impl FormPage for CdpPage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.page.goto(url).await.map_err(|e| PageError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        sleep(SETTLE).await;
        Ok(())
    }

    async fn set_field(&self, control_id: &str, value: &str) -> Result<(), PageError> {
        self.wait_for_control(control_id).await?;
        let js_code = format!(
            "(() => {{ \
                const el = document.getElementById({id}); \
                if (el === null) return false; \
                el.value = {value}; \
                el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                return true; \
            }})()",
            id = js_str(control_id),
            value = js_str(value),
        );
        if self.eval_bool(js_code).await? {
            Ok(())
        } else {
            Err(PageError::ControlNotFound {
                control_id: control_id.to_string(),
            })
        }
    }

    async fn click_control(&self, control_id: &str) -> Result<(), PageError> {
        self.wait_for_control(control_id).await?;
        let js_code = format!(
            "(() => {{ \
                const el = document.getElementById({id}); \
                if (el === null) return false; \
                el.click(); \
                return true; \
            }})()",
            id = js_str(control_id),
        );
        if self.eval_bool(js_code).await? {
            Ok(())
        } else {
            Err(PageError::ControlNotFound {
                control_id: control_id.to_string(),
            })
        }
    }

    async fn submit(&self) -> Result<(), PageError> {
        let js_code = "(() => { \
            const buttons = Array.from(document.querySelectorAll('button')); \
            const submit = buttons.find((b) => b.textContent.trim() === 'Submit'); \
            if (!submit) return false; \
            submit.click(); \
            return true; \
        })()"
            .to_string();
        if self.eval_bool(js_code).await? {
            sleep(SETTLE).await;
            Ok(())
        } else {
            Err(PageError::ControlNotFound {
                control_id: "Submit".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_str_escapes_quotes_and_backslashes() {
        assert_eq!(js_str("plain"), "\"plain\"");
        assert_eq!(js_str("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_str("a\\b"), "\"a\\\\b\"");
    }
}
