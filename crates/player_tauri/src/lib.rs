//! Tauri host shell for the embedded player.
//!
//! The host confines content file access to the application's private storage, negotiates
//! renderer/audio capabilities on a neutral page before navigating to the content, and installs
//! the Node-style wrappers at every page start. Scheme and command registration stays in this
//! file so the runtime crates never depend on Tauri directly.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

#[doc(hidden)]
pub mod bootstrap;
mod fs_bridge;

use player_runtime::{PageStartScripts, PlayerConfig};
use tauri::webview::PageLoadEvent;
use tauri::{Manager, WebviewWindowBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use platform_host_native::NativeFileBridge;

use crate::bootstrap::{PlayerHost, MAIN_WINDOW, NEUTRAL_PAGE_SCHEME};
use crate::fs_bridge::FILE_BRIDGE_SCHEME;

const PLAYER_CONFIG: &str = include_str!("../player.toml");
const HOST_WRAPPERS: &str = include_str!("../assets/js/host-wrappers.js");
const DEFAULT_LOG_FILTER: &str = "player_tauri=info,player_runtime=info,platform_host_native=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn setup(app: &mut tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let config = PlayerConfig::from_toml_str(PLAYER_CONFIG)?;

    let bridge = fs_bridge::open_bridge(app.handle())?;
    tracing::info!(root = %bridge.sandbox().root().display(), "file bridge ready");
    app.manage(bridge);

    let page_start = PageStartScripts::new(
        fs_bridge::wrapper_script(HOST_WRAPPERS),
        config.content.package_name.clone(),
    );
    let host = PlayerHost::new(config);
    let initial_url = host.launch()?;
    app.manage(host);

    WebviewWindowBuilder::new(
        app.handle(),
        MAIN_WINDOW,
        bootstrap::webview_url(&initial_url)?,
    )
    .title("Player")
    .initialization_script(&page_start.scripts().join("\n"))
    .build()?;
    Ok(())
}

/// Starts the Tauri player host process.
pub fn run() {
    init_tracing();
    tauri::Builder::default()
        .register_uri_scheme_protocol(NEUTRAL_PAGE_SCHEME, |ctx, _request| {
            let html = ctx
                .app_handle()
                .try_state::<PlayerHost>()
                .and_then(|host| host.neutral_page())
                .unwrap_or_default();
            bootstrap::neutral_page_response(html)
        })
        .register_uri_scheme_protocol(FILE_BRIDGE_SCHEME, |ctx, request| {
            match ctx.app_handle().try_state::<NativeFileBridge>() {
                Some(bridge) => {
                    fs_bridge::handle_request(bridge.inner(), request.method(), request.body())
                }
                None => fs_bridge::unavailable_response(),
            }
        })
        .on_page_load(|webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Started) {
                return;
            }
            if let Some(host) = webview.app_handle().try_state::<PlayerHost>() {
                host.on_page_started(webview, payload.url().as_str());
            }
        })
        .setup(setup)
        .invoke_handler(tauri::generate_handler![bootstrap::boot_prepare])
        .run(tauri::generate_context!())
        .expect("player_tauri failed to run Tauri application");
}
