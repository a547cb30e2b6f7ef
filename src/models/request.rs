use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
    #[serde(default)]
    pub options: ExtractOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Selector the browser inspector waits for before injecting the script.
    pub wait_for_selector: Option<String>,
    /// Overrides `COPY_TO_CLIPBOARD` for this extraction.
    pub copy_to_clipboard: Option<bool>,
}
