//! Browser session acquisition and teardown.
//!
//! Acquisition is a capability probe chain: an ordered list of launch
//! strategies tried in sequence, first success wins. The chain is
//! 1. an explicitly configured or system-installed browser binary,
//! 2. a managed/downloaded binary in the configured driver directory,
//! 3. chromiumoxide's own executable auto-discovery.
//!
//! The handle owns the browser process, its CDP event loop task, and the
//! single page used for the whole batch. Release is explicit and idempotent.

use std::fmt;
use std::path::{Path, PathBuf};

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::infrastructure::CdpPage;

/// Flags shared by every launch strategy. Headless with the sandbox
/// disabled and a fixed viewport, matching what the destination form is
/// tested against.
const LAUNCH_ARGS: [&str; 4] = [
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--window-size=1920,1080",
];

/// Browser acquisition settings, lifted out of [`Config`] so tests can
/// construct them directly.
#[derive(Debug, Clone, Default)]
pub struct BrowserSettings {
    /// Explicit binary, tried before the built-in candidate paths.
    pub binary_override: Option<PathBuf>,
    /// Directory scanned for a managed/downloaded browser binary.
    pub managed_dir: PathBuf,
}

impl BrowserSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            binary_override: config.browser_binary.as_ref().map(PathBuf::from),
            managed_dir: PathBuf::from(&config.managed_browser_dir),
        }
    }
}

/// One rung of the probe chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// A browser binary already installed on this machine.
    SystemBinary(PathBuf),
    /// A binary placed in the managed driver directory by a previous
    /// download step.
    ManagedBinary(PathBuf),
    /// Let chromiumoxide locate an executable on its own.
    AutoDiscover,
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStrategy::SystemBinary(p) => write!(f, "system binary ({})", p.display()),
            LaunchStrategy::ManagedBinary(p) => write!(f, "managed binary ({})", p.display()),
            LaunchStrategy::AutoDiscover => write!(f, "auto-discovery"),
        }
    }
}

/// Candidate browser executable locations for the current platform.
fn system_candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/bin/google-chrome"));
        paths.push(PathBuf::from("/usr/bin/google-chrome-stable"));
        paths.push(PathBuf::from("/usr/bin/chromium-browser"));
        paths.push(PathBuf::from("/usr/bin/chromium"));
        paths.push(PathBuf::from("/snap/bin/chromium"));
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ));
        paths.push(PathBuf::from(
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ));
        paths.push(PathBuf::from(
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ));
    }

    #[cfg(target_os = "windows")]
    {
        for var in ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"] {
            if let Ok(base) = std::env::var(var) {
                paths.push(PathBuf::from(format!(
                    "{}\\Google\\Chrome\\Application\\chrome.exe",
                    base
                )));
                paths.push(PathBuf::from(format!(
                    "{}\\Microsoft\\Edge\\Application\\msedge.exe",
                    base
                )));
            }
        }
    }

    paths
}

/// Names a download step may have left in the managed directory.
fn managed_binary(dir: &Path) -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["chrome", "chromium", "chrome.exe", "msedge.exe"];
    NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Assemble the probe chain in fixed priority order.
pub fn launch_strategies(settings: &BrowserSettings) -> Vec<LaunchStrategy> {
    let mut strategies = Vec::new();

    if let Some(binary) = &settings.binary_override {
        strategies.push(LaunchStrategy::SystemBinary(binary.clone()));
    }
    if let Some(path) = system_candidate_paths().into_iter().find(|p| p.is_file()) {
        strategies.push(LaunchStrategy::SystemBinary(path));
    }
    if let Some(path) = managed_binary(&settings.managed_dir) {
        strategies.push(LaunchStrategy::ManagedBinary(path));
    }
    strategies.push(LaunchStrategy::AutoDiscover);

    strategies
}

/// A single live browser-automation connection, owned by the batch runner
/// for the duration of one run.
///
/// Callers must `close()` on every exit path. If the handle is instead
/// dropped mid-run (panic unwind), the `Browser` drop still kills the
/// child process.
pub struct SessionHandle {
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
    page: CdpPage,
}

impl SessionHandle {
    /// Try each launch strategy in order; the first one that yields a
    /// working browser and page wins. Fails only if every strategy fails.
    pub async fn acquire(settings: &BrowserSettings) -> Result<Self, SessionError> {
        let mut attempts = Vec::new();

        for strategy in launch_strategies(settings) {
            debug!("trying launch strategy: {}", strategy);
            match launch(&strategy).await {
                Ok(handle) => {
                    info!("browser session acquired via {}", strategy);
                    return Ok(handle);
                }
                Err(e) => {
                    warn!("launch strategy {} failed: {}", strategy, e);
                    attempts.push(format!("{}: {}", strategy, e));
                }
            }
        }

        Err(SessionError::AllStrategiesFailed { attempts })
    }

    /// The page capability handed into the field filler.
    pub fn page(&self) -> &CdpPage {
        &self.page
    }

    /// Tear the session down. Safe to call more than once; only the first
    /// call does anything.
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {}", e);
            }
            let _ = browser.wait().await;
            self.handler_task.abort();
            info!("browser session released");
        }
    }
}

async fn launch(strategy: &LaunchStrategy) -> Result<SessionHandle, SessionError> {
    let failed = |message: String| SessionError::LaunchFailed {
        strategy: strategy.to_string(),
        message,
    };

    let mut builder = BrowserConfig::builder().new_headless_mode().args(LAUNCH_ARGS);
    match strategy {
        LaunchStrategy::SystemBinary(path) | LaunchStrategy::ManagedBinary(path) => {
            builder = builder.chrome_executable(path);
        }
        LaunchStrategy::AutoDiscover => {}
    }
    let config = builder.build().map_err(failed)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| failed(e.to_string()))?;

    // Drain CDP events in the background for the lifetime of the session.
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    // Brief pause for the browser to settle before the first command.
    sleep(Duration::from_millis(300)).await;

    let page: Page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            handler_task.abort();
            return Err(failed(e.to_string()));
        }
    };

    Ok(SessionHandle {
        browser: Some(browser),
        handler_task,
        page: CdpPage::new(page),
    })
}
