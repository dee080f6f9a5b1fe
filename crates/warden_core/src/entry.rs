//! Names and contents of the synthetic files embedded in every bundle.

use serde_json::json;

/// Embedded policy document, read back by the dispatch entry point.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Generated dispatch manifest. Written at bundle-build time so the
/// runtime routes to its handler without inspecting the event shape.
pub const ENTRY_FILE_NAME: &str = "entrypoint.json";

/// Dispatch symbol for a mode type: the mode name with `-` replaced by
/// `_`, suffixed with `_handle`.
pub fn dispatch_symbol(mode_kind: &str) -> String {
    format!("{}_handle", mode_kind.replace('-', "_"))
}

/// Render the dispatch manifest embedded at [`ENTRY_FILE_NAME`].
pub fn render_entry_point(mode_kind: &str) -> String {
    let manifest = json!({ "dispatch": dispatch_symbol(mode_kind) });
    let mut rendered = serde_json::to_string_pretty(&manifest)
        .expect("serialization of a dispatch manifest should not fail");
    rendered.push('\n');
    rendered
}
