use thiserror::Error;

/// Every way the rendering context can fail on us, as a value.
///
/// Callers decide what each variant means for them: `NotFound` is never
/// fatal, `Stale` is retried at the same feed position, `Timeout` counts as
/// a failed attempt, and `Driver` covers everything else the WebDriver
/// session can throw.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("element not found")]
    NotFound,
    #[error("stale element reference")]
    Stale,
    #[error("timed out waiting for element")]
    Timeout,
    #[error("webdriver command failed: {0}")]
    Driver(String),
}
