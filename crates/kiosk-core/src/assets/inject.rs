//! Bootstrap config injection into the player's entry document.
//!
//! The player reads its CMS settings from `localStorage["xibo_config"]` on
//! first run. Seeding that key from an inline script ahead of the player's own
//! scripts means the first load already has them; no reload is needed.

use std::borrow::Cow;

use kiosk_types::ProxyConfig;

/// Attribute marking the injected block. Also the "already injected" probe.
pub const BOOTSTRAP_MARKER: &str = "data-kiosk-bootstrap";

/// localStorage key the player reads its settings from.
pub const STORAGE_KEY: &str = "xibo_config";

const SEED_PLACEHOLDER: &str = "__KIOSK_SEED__";

const SCRIPT_TEMPLATE: &str = r#"<script data-kiosk-bootstrap>
(function () {
  var seed = __KIOSK_SEED__;
  window.__KIOSK_BOOTSTRAP__ = seed;
  try {
    var stored = {};
    try { stored = JSON.parse(localStorage.getItem('xibo_config') || '{}') || {}; } catch (e) {}
    localStorage.setItem('xibo_config', JSON.stringify({
      cmsAddress: seed.cmsAddress,
      cmsKey: seed.cmsKey,
      displayName: seed.displayName,
      hardwareKey: stored.hardwareKey || '',
      xmrChannel: stored.xmrChannel || ''
    }));
  } catch (e) {
    console.warn('[kiosk] could not seed player config', e);
  }
})();
</script>
"#;

/// Stamps the bootstrap script into entry documents.
///
/// Built once from the immutable [`ProxyConfig`]; holds the rendered script, or
/// nothing when injection is off or no CMS address is configured.
#[derive(Debug, Clone, Default)]
pub struct BootstrapInjector {
    script: Option<String>,
}

impl BootstrapInjector {
    pub fn new(config: &ProxyConfig) -> Self {
        let script = config.should_inject().then(|| render_script(config));
        Self { script }
    }

    pub fn is_enabled(&self) -> bool {
        self.script.is_some()
    }

    /// Insert the script before the first `<script` tag, else before
    /// `</head>`, else at the start of the document. Documents that already
    /// carry the marker are returned as-is.
    pub fn inject<'a>(&self, document: &'a str) -> Cow<'a, str> {
        let Some(script) = self.script.as_deref() else {
            return Cow::Borrowed(document);
        };
        if document.contains(BOOTSTRAP_MARKER) {
            return Cow::Borrowed(document);
        }

        // ASCII lowercasing keeps byte offsets aligned with the original.
        let lowered = document.to_ascii_lowercase();
        let at = lowered.find("<script").or_else(|| lowered.find("</head>")).unwrap_or(0);

        let mut stamped = String::with_capacity(document.len() + script.len());
        stamped.push_str(&document[..at]);
        stamped.push_str(script);
        stamped.push_str(&document[at..]);
        Cow::Owned(stamped)
    }
}

fn render_script(config: &ProxyConfig) -> String {
    let seed = serde_json::json!({
        "cmsAddress": config.remote_server_address,
        "cmsKey": config.access_key,
        "displayName": config.display_name,
    });
    SCRIPT_TEMPLATE.replace(SEED_PLACEHOLDER, &script_safe_json(&seed.to_string()))
}

/// Escape JSON text so it cannot close the surrounding `<script>` element or
/// terminate a JS line. The escapes only ever land inside string literals.
pub fn script_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}
