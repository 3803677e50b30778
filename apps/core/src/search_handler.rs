use std::sync::Arc;

use crate::config::WebSearchProvider;
use crate::handler::{CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::{LaunchTarget, Launcher};
use crate::model::Entry;

const QUERY_PLACEHOLDER: &str = "{query}";
const FALLBACK_TEMPLATE: &str = "https://www.google.com/search?q={query}";

/// `search`: entryless, opens the provider's results page for any query.
pub struct SearchHandler {
    template: String,
    launcher: Arc<dyn Launcher>,
}

impl SearchHandler {
    pub fn new(
        provider: WebSearchProvider,
        custom_template: &str,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            template: provider_template(provider, custom_template),
            launcher,
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        self.template
            .replace(QUERY_PLACEHOLDER, &url_encode_component(query.trim()))
    }
}

fn provider_template(provider: WebSearchProvider, custom_template: &str) -> String {
    let template = match provider {
        WebSearchProvider::Duckduckgo => "https://duckduckgo.com/?q={query}",
        WebSearchProvider::Google => FALLBACK_TEMPLATE,
        WebSearchProvider::Bing => "https://www.bing.com/search?q={query}",
        WebSearchProvider::Brave => "https://search.brave.com/search?q={query}",
        WebSearchProvider::Startpage => "https://www.startpage.com/sp/search?query={query}",
        WebSearchProvider::Ecosia => "https://www.ecosia.org/search?q={query}",
        WebSearchProvider::Yahoo => "https://search.yahoo.com/search?p={query}",
        WebSearchProvider::Custom => {
            let custom = custom_template.trim();
            if custom.contains(QUERY_PLACEHOLDER) {
                custom
            } else {
                tracing::warn!("custom search template lacks {{query}}; using google");
                FALLBACK_TEMPLATE
            }
        }
    };
    template.to_string()
}

fn url_encode_component(input: &str) -> String {
    let mut out = String::new();
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
    out
}

impl CommandHandler for SearchHandler {
    fn prefix(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "search the web"
    }

    fn is_entryless(&self) -> bool {
        true
    }

    fn options(&self) -> Vec<Entry> {
        Vec::new()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        if key.trim().is_empty() {
            return Err(ExecuteError::EmptyArgument("Search query"));
        }
        self.launcher.launch(&LaunchTarget::open(self.search_url(key)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{provider_template, url_encode_component};
    use crate::config::WebSearchProvider;

    #[test]
    fn encodes_reserved_bytes_and_spaces() {
        assert_eq!(url_encode_component("rust & c++"), "rust+%26+c%2B%2B");
        assert_eq!(url_encode_component("ä"), "%C3%A4");
    }

    #[test]
    fn custom_template_without_placeholder_falls_back() {
        assert_eq!(
            provider_template(WebSearchProvider::Custom, "https://x.test/?q={query}"),
            "https://x.test/?q={query}"
        );
        assert_eq!(
            provider_template(WebSearchProvider::Custom, "https://x.test/"),
            "https://www.google.com/search?q={query}"
        );
    }
}
