//! Scripts evaluated at the start of every content page load.
//!
//! Content written for a Node-style desktop runtime expects `require('fs')` and friends. The host
//! evaluates a wrapper script mapping those onto the file bridge, publishes the package name, and
//! then notifies the page.

use platform_host::{escape_json_string, ContentView};

/// Hook invoked once the wrappers are installed, if the page defines it.
pub const POLYFILL_LOADED_HOOK: &str =
    "if (window.onNodePolyfillLoaded) onNodePolyfillLoaded();";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Page-start injection plan.
pub struct PageStartScripts {
    wrapper_source: String,
    package_name: String,
}

impl PageStartScripts {
    /// Creates the plan from the bundled wrapper script and the application package name.
    pub fn new(wrapper_source: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            wrapper_source: wrapper_source.into(),
            package_name: package_name.into(),
        }
    }

    /// Scripts in evaluation order.
    pub fn scripts(&self) -> Vec<String> {
        vec![
            self.wrapper_source.clone(),
            format!(
                "window.packageName = {};",
                escape_json_string(&self.package_name)
            ),
            POLYFILL_LOADED_HOOK.to_string(),
        ]
    }

    /// Evaluates every script in `view`.
    pub fn inject(&self, view: &dyn ContentView) {
        for script in self.scripts() {
            view.evaluate_script(&script);
        }
    }
}
