//! Tauri adapters for the capability bootstrap.
//!
//! [`PlayerHost`] owns the live [`CapabilityNegotiator`], the boundary table consulted by the
//! `boot_prepare` command, and the neutral page served over a private URI scheme. Everything that
//! touches the webview goes through [`ScriptTarget`], so the flow can be driven without a window.

use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard, PoisonError};

use platform_host::{
    escape_json_string, BoundaryError, BoundaryLedger, BoundaryRegistry, BoundaryToken,
    ContentView, DeregisterError,
};
use player_runtime::{
    launch, BootstrapTask, CapabilityNegotiator, CapabilityRequest, NegotiationError,
    NegotiationPhase, PlayerConfig,
};
use tauri::Manager;

/// Label of the single player window.
pub const MAIN_WINDOW: &str = "main";
/// URI scheme serving the neutral detection page.
pub const NEUTRAL_PAGE_SCHEME: &str = "bootpage";

/// URL the neutral page is reachable under.
#[cfg(any(windows, target_os = "android"))]
pub const NEUTRAL_PAGE_URL: &str = "http://bootpage.localhost/";
/// URL the neutral page is reachable under.
#[cfg(not(any(windows, target_os = "android")))]
pub const NEUTRAL_PAGE_URL: &str = "bootpage://localhost/";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Webview surface that can evaluate script.
pub trait ScriptTarget {
    /// Evaluates `script` in the current document.
    fn eval_script(&self, script: &str) -> Result<(), String>;
}

impl<R: tauri::Runtime> ScriptTarget for tauri::Webview<R> {
    fn eval_script(&self, script: &str) -> Result<(), String> {
        self.eval(script).map_err(|err| err.to_string())
    }
}

impl<R: tauri::Runtime> ScriptTarget for tauri::WebviewWindow<R> {
    fn eval_script(&self, script: &str) -> Result<(), String> {
        self.eval(script).map_err(|err| err.to_string())
    }
}

/// Script exposing `name.prepare(webgl, webaudio, showfps)` to content.
///
/// The call is forwarded to the `boot_prepare` command, which rejects it once `name` is gone.
pub fn boundary_shim(name: &str) -> String {
    let quoted = escape_json_string(name);
    format!(
        "window[{quoted}] = {{ prepare: function (webgl, webaudio, showfps) {{ \
         return window.__TAURI__.core.invoke('boot_prepare', {{ boundary: {quoted}, \
         webgl: !!webgl, webaudio: !!webaudio, showfps: !!showfps }}); }} }};"
    )
}

fn navigation_script(url: &str) -> String {
    format!("window.location.replace({});", escape_json_string(url))
}

/// Maps a content URL onto the webview URL kind Tauri expects.
///
/// # Errors
///
/// Returns an error when `raw` is not an absolute URL.
pub fn webview_url(raw: &str) -> Result<tauri::WebviewUrl, String> {
    let url = tauri::Url::parse(raw).map_err(|err| format!("invalid webview url `{raw}`: {err}"))?;
    Ok(match url.scheme() {
        "http" | "https" => tauri::WebviewUrl::External(url),
        _ => tauri::WebviewUrl::CustomProtocol(url),
    })
}

/// Builds the HTTP response for the neutral page.
pub fn neutral_page_response(html: String) -> tauri::http::Response<Vec<u8>> {
    let mut response = tauri::http::Response::new(html.into_bytes());
    response.headers_mut().insert(
        tauri::http::header::CONTENT_TYPE,
        tauri::http::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

#[derive(Debug, Default)]
/// Boundary registrations shared by the page-load hook and IPC commands.
///
/// Shims are installed at page start only for live names, so a deregistered name is never
/// exposed to the next document.
pub struct BoundaryTable {
    ledger: Mutex<BoundaryLedger>,
}

impl BoundaryTable {
    /// Live boundary names in sorted order.
    pub fn live_names(&self) -> Vec<String> {
        lock(&self.ledger).names()
    }
}

impl BoundaryRegistry for BoundaryTable {
    fn register(&self, name: &str) -> Result<BoundaryToken, BoundaryError> {
        lock(&self.ledger).register(name)
    }

    fn deregister(&self, token: BoundaryToken) -> Result<(), DeregisterError> {
        lock(&self.ledger).deregister(token)
    }

    fn is_registered(&self, name: &str) -> bool {
        lock(&self.ledger).contains(name)
    }
}

#[derive(Debug, Default)]
/// Content view used before the window exists: remembers where the window should open.
struct StartupView {
    initial_url: RefCell<Option<String>>,
    page: RefCell<Option<String>>,
}

impl ContentView for StartupView {
    fn load_url(&self, url: &str) {
        *self.initial_url.borrow_mut() = Some(url.to_string());
    }

    fn load_data(&self, html: &str) {
        *self.page.borrow_mut() = Some(html.to_string());
        *self.initial_url.borrow_mut() = Some(NEUTRAL_PAGE_URL.to_string());
    }

    fn evaluate_script(&self, _script: &str) {
        tracing::warn!("dropping script evaluated before the player window exists");
    }
}

/// Content view over a live webview.
struct ScriptedView<'a, T: ScriptTarget + ?Sized> {
    target: &'a T,
    neutral_page: &'a Mutex<Option<String>>,
}

impl<T: ScriptTarget + ?Sized> ScriptedView<'_, T> {
    fn eval_logged(&self, script: &str) {
        if let Err(err) = self.target.eval_script(script) {
            tracing::warn!(error = %err, "webview script evaluation failed");
        }
    }
}

impl<T: ScriptTarget + ?Sized> ContentView for ScriptedView<'_, T> {
    fn load_url(&self, url: &str) {
        self.eval_logged(&navigation_script(url));
    }

    fn load_data(&self, html: &str) {
        *lock(self.neutral_page) = Some(html.to_string());
        self.eval_logged(&navigation_script(NEUTRAL_PAGE_URL));
    }

    fn evaluate_script(&self, script: &str) {
        self.eval_logged(script);
    }
}

/// Player bootstrap state managed by the Tauri app.
pub struct PlayerHost {
    config: PlayerConfig,
    boundaries: BoundaryTable,
    neutral_page: Mutex<Option<String>>,
    negotiator: Mutex<Option<CapabilityNegotiator>>,
}

impl PlayerHost {
    /// Creates host state for `config`. Nothing starts until [`PlayerHost::launch`].
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            boundaries: BoundaryTable::default(),
            neutral_page: Mutex::new(None),
            negotiator: Mutex::new(None),
        }
    }

    /// Boundary registrations.
    pub fn boundaries(&self) -> &BoundaryTable {
        &self.boundaries
    }

    /// HTML of the neutral page, once negotiation has loaded it.
    pub fn neutral_page(&self) -> Option<String> {
        lock(&self.neutral_page).clone()
    }

    /// Phase of the negotiation in progress, if any.
    pub fn negotiation_phase(&self) -> Option<NegotiationPhase> {
        lock(&self.negotiator).as_ref().map(CapabilityNegotiator::phase)
    }

    /// Starts the content session and returns the URL the player window should open.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError`] when the configuration is invalid or negotiation cannot start.
    pub fn launch(&self) -> Result<String, NegotiationError> {
        let startup = StartupView::default();
        let negotiator = launch(&startup, &self.boundaries, &self.config)?;
        if let Some(page) = startup.page.take() {
            *lock(&self.neutral_page) = Some(page);
        }
        *lock(&self.negotiator) = negotiator;
        Ok(startup
            .initial_url
            .take()
            .unwrap_or_else(|| self.config.content.entry_url.clone()))
    }

    /// Page-start hook: installs live boundary shims and feeds the negotiator.
    pub fn on_page_started<T: ScriptTarget + ?Sized>(&self, target: &T, url: &str) {
        tracing::debug!(url, "page started");
        for name in self.boundaries.live_names() {
            if let Err(err) = target.eval_script(&boundary_shim(&name)) {
                tracing::warn!(boundary = name.as_str(), error = %err, "failed to install boundary");
            }
        }

        let mut slot = lock(&self.negotiator);
        let Some(negotiator) = slot.as_mut() else {
            return;
        };
        let view = ScriptedView {
            target,
            neutral_page: &self.neutral_page,
        };
        let result = negotiator
            .on_page_started()
            .and_then(|task| negotiator.run_task(task, &view, &self.boundaries));
        if let Err(err) = result {
            tracing::warn!(error = %err, url, "capability detection was not injected");
        }
    }

    /// Applies a capability report arriving through `boundary`.
    ///
    /// # Errors
    ///
    /// Returns an error when `boundary` is not a live registration, no negotiation is running,
    /// or the negotiator rejects the report.
    pub fn prepare(
        &self,
        boundary: &str,
        request: CapabilityRequest,
    ) -> Result<BootstrapTask, String> {
        if boundary != self.config.bootstrap.boundary_name
            || !self.boundaries.is_registered(boundary)
        {
            tracing::warn!(boundary, "rejecting call to an unregistered boundary");
            return Err(format!("boundary `{boundary}` is not registered"));
        }
        let mut slot = lock(&self.negotiator);
        let negotiator = slot
            .as_mut()
            .ok_or_else(|| "no capability negotiation is running".to_string())?;
        negotiator.prepare(request).map_err(|err| err.to_string())
    }

    /// Runs a deferred negotiator task against `target`.
    pub fn run_task<T: ScriptTarget + ?Sized>(&self, target: &T, task: BootstrapTask) {
        let mut slot = lock(&self.negotiator);
        let Some(negotiator) = slot.as_mut() else {
            tracing::warn!(?task, "dropping bootstrap task without a negotiation");
            return;
        };
        let view = ScriptedView {
            target,
            neutral_page: &self.neutral_page,
        };
        if let Err(err) = negotiator.run_task(task, &view, &self.boundaries) {
            tracing::warn!(error = %err, "bootstrap task failed");
            return;
        }
        if negotiator.phase() == NegotiationPhase::Complete {
            *slot = None;
            *lock(&self.neutral_page) = None;
        }
    }
}

/// Receives the detection script's capability report and schedules finalization on the UI thread.
#[tauri::command]
pub fn boot_prepare(
    app: tauri::AppHandle,
    host: tauri::State<'_, PlayerHost>,
    boundary: String,
    webgl: bool,
    webaudio: bool,
    showfps: bool,
) -> Result<(), String> {
    let task = host.prepare(
        &boundary,
        CapabilityRequest {
            webgl,
            webaudio,
            showfps,
        },
    )?;
    let handle = app.clone();
    app.run_on_main_thread(move || {
        let Some(window) = handle.get_webview_window(MAIN_WINDOW) else {
            tracing::warn!("player window closed before negotiation finished");
            return;
        };
        handle.state::<PlayerHost>().run_task(&window, task);
    })
    .map_err(|err| format!("failed to schedule bootstrap task: {err}"))
}
