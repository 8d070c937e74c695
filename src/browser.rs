//! Live rendering context backed by fantoccini.

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::sleep;
use tracing::info;

use crate::config::Settings;
use crate::fault::Fault;
use crate::surface::{Selector, Surface};

/// A fantoccini session plus the geckodriver child it may have spawned.
/// Single owner of the rendering context; release it with [`Browser::close`].
pub struct Browser {
    client: Client,
    geckodriver: Option<Child>,
}

impl Browser {
    pub async fn launch(settings: &Settings) -> color_eyre::Result<Self> {
        let geckodriver = if settings.spawn_geckodriver {
            info!("starting geckodriver");
            let child = Command::new("geckodriver")
                .args(["--port", "4444"])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;
            // Give the driver a moment to start listening.
            sleep(Duration::from_secs(2)).await;
            Some(child)
        } else {
            None
        };

        info!("connecting to webdriver at {}", settings.webdriver_url);
        let mut caps = serde_json::map::Map::new();
        let mut args = vec![json!("--width=1920"), json!("--height=1080")];
        if settings.headless {
            args.push(json!("-headless"));
        }
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await?;
        info!("webdriver client connected");

        Ok(Self {
            client,
            geckodriver,
        })
    }

    /// Close the session and reap the driver process.
    pub async fn close(self) -> color_eyre::Result<()> {
        let Browser {
            client,
            geckodriver,
        } = self;
        info!("closing webdriver session");
        client.close().await?;
        if let Some(mut child) = geckodriver {
            info!("stopping geckodriver");
            let _ = child.kill();
            let _ = child.wait();
        }
        Ok(())
    }

    fn locator(selector: Selector) -> Locator<'static> {
        match selector {
            Selector::Css(css) => Locator::Css(css),
            Selector::XPath(xpath) => Locator::XPath(xpath),
        }
    }
}

/// Map fantoccini failures onto the fault taxonomy the pipeline acts on.
fn classify(err: CmdError) -> Fault {
    if err.is_no_such_element() {
        return Fault::NotFound;
    }
    if err.is_stale_element_reference() {
        return Fault::Stale;
    }
    if matches!(err, CmdError::WaitTimeout) {
        return Fault::Timeout;
    }
    Fault::Driver(err.to_string())
}

impl Surface for Browser {
    type Handle = Element;

    async fn navigate(&self, url: &str) -> Result<(), Fault> {
        self.client.goto(url).await.map_err(classify)
    }

    async fn query(&self, selector: Selector) -> Result<Element, Fault> {
        self.client
            .find(Self::locator(selector))
            .await
            .map_err(classify)
    }

    async fn query_all(&self, selector: Selector) -> Result<Vec<Element>, Fault> {
        self.client
            .find_all(Self::locator(selector))
            .await
            .map_err(classify)
    }

    async fn await_present(
        &self,
        selector: Selector,
        timeout: Duration,
    ) -> Result<Element, Fault> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Self::locator(selector))
            .await
            .map_err(classify)
    }

    async fn text(&self, handle: &Element) -> Result<String, Fault> {
        handle.text().await.map_err(classify)
    }

    async fn attribute(&self, handle: &Element, name: &str) -> Result<Option<String>, Fault> {
        handle.attr(name).await.map_err(classify)
    }

    async fn fill(&self, handle: &Element, text: &str) -> Result<(), Fault> {
        handle.clear().await.map_err(classify)?;
        handle.send_keys(text).await.map_err(classify)
    }

    async fn click(&self, handle: Element) -> Result<(), Fault> {
        handle.click().await.map(|_| ()).map_err(classify)
    }

    async fn scroll_into_view(&self, handle: &Element) -> Result<(), Fault> {
        let arg = serde_json::to_value(handle).map_err(|err| Fault::Driver(err.to_string()))?;
        self.client
            .execute("arguments[0].scrollIntoView({block: 'center'});", vec![arg])
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn scroll_extent(&self, container: Selector) -> Result<u64, Fault> {
        // Feed containers are addressed by CSS selectors.
        let value = self
            .client
            .execute(
                "const el = document.querySelector(arguments[0]); return el ? el.scrollHeight : 0;",
                vec![json!(container.value())],
            )
            .await
            .map_err(classify)?;
        Ok(value.as_u64().unwrap_or(0))
    }

    async fn scroll_to_bottom(&self, container: Selector) -> Result<(), Fault> {
        self.client
            .execute(
                "const el = document.querySelector(arguments[0]); if (el) el.scrollTo(0, el.scrollHeight);",
                vec![json!(container.value())],
            )
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn current_location(&self) -> Result<String, Fault> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::{ErrorStatus, WebDriver as WebDriverError};

    fn standard(status: ErrorStatus) -> CmdError {
        CmdError::Standard(WebDriverError::new(status, "scripted"))
    }

    #[test]
    fn missing_element_classifies_as_not_found() {
        assert!(matches!(
            classify(standard(ErrorStatus::NoSuchElement)),
            Fault::NotFound
        ));
    }

    #[test]
    fn stale_reference_classifies_as_stale() {
        assert!(matches!(
            classify(standard(ErrorStatus::StaleElementReference)),
            Fault::Stale
        ));
    }

    #[test]
    fn wait_timeout_classifies_as_timeout() {
        assert!(matches!(classify(CmdError::WaitTimeout), Fault::Timeout));
    }

    #[test]
    fn other_statuses_fall_through_to_driver() {
        assert!(matches!(
            classify(standard(ErrorStatus::UnknownError)),
            Fault::Driver(_)
        ));
    }
}
