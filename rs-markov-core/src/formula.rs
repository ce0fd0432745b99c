use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Chart API endpoint rendering TeX formulas as images.
pub const RENDER_ENDPOINT: &str = "http://chart.apis.google.com/chart";

/// `$...$` delimited by whitespace or string boundaries; `\$` does not close.
static FORMULA: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?:^|\s)\$((?:[^$]|\\.)*?[^\\])\$(?:\s|$)").expect("formula pattern is valid")
});

/// Returns every formula body found in `text`, in order.
pub fn extract_formulas(text: &str) -> Vec<&str> {
	FORMULA
		.captures_iter(text)
		.filter_map(|c| c.get(1))
		.map(|m| m.as_str())
		.collect()
}

static RENDER_URL: LazyLock<Url> =
	LazyLock::new(|| Url::parse(RENDER_ENDPOINT).expect("render endpoint is a valid URL"));

/// Builds the render URL for one formula.
pub fn render_url(formula: &str) -> String {
	let mut url = RENDER_URL.clone();
	url.query_pairs_mut().append_pair("cht", "tx").append_pair("chl", formula);
	url.into()
}

/// One render URL per formula in `text`.
pub fn render_urls(text: &str) -> Vec<String> {
	extract_formulas(text).into_iter().map(render_url).collect()
}
