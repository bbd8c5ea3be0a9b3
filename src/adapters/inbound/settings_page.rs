//! Settings Page
//!
//! Server-rendered settings surface: one form with a country picker. The
//! page loads the current value through `get-blocked-country-code` and
//! saves edits through `save-blocked-country-code`.

use crate::application::blocked_country::{GET_HANDLER, SAVE_HANDLER};
use crate::domain::services::escape_html;
use crate::domain::value_objects::BLOCKED_COUNTRY_CODE;
use isocountry::CountryCode;

/// Identifiers the page forwards to the API on every call.
#[derive(Debug, Clone, Default)]
pub struct SettingsScope {
    pub account_id: Option<String>,
    pub site_id: Option<String>,
}

/// Render the settings page.
pub fn render(integration_name: &str, scope: &SettingsScope) -> String {
    let options: String = picker_countries()
        .into_iter()
        .map(|country| {
            format!(
                "        <option value=\"{}\">{}</option>\n",
                country.alpha2(),
                escape_html(country.name())
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>{title} settings</title>
  <style>
    body {{ font-family: sans-serif; background: #f9f9f9; margin: 2em; }}
    .card {{ background: #fff; padding: 2em; border-radius: 8px; box-shadow: 0 2px 8px #ccc; max-width: 480px; margin: auto; }}
    #status {{ margin-top: 1em; color: #555; }}
  </style>
</head>
<body>
  <div class="card">
    <h1>Configuration</h1>
    <form id="configuration-form">
      <label for="{key}">Blocked Country Code</label>
      <select id="{key}" name="{key}">
        <option value="">Select a country</option>
{options}      </select>
      <button type="submit">Save</button>
    </form>
    <p id="status"></p>
  </div>
  <script>
    const scopeHeaders = {{ "x-account-id": {account}, "x-site-id": {site} }};
    const picker = document.getElementById("{key}");
    const status = document.getElementById("status");

    async function load() {{
      const response = await fetch("/api/{get}", {{ method: "GET", headers: scopeHeaders }});
      if (response.ok) {{
        const data = await response.json();
        picker.value = data["{key}"] || "";
      }}
    }}

    document.getElementById("configuration-form").addEventListener("submit", async (event) => {{
      event.preventDefault();
      const response = await fetch("/api/{save}", {{
        method: "POST",
        headers: {{ ...scopeHeaders, "content-type": "application/json" }},
        body: JSON.stringify({{ "{key}": picker.value }}),
      }});
      status.textContent = await response.text();
    }});

    load();
  </script>
</body>
</html>
"#,
        title = escape_html(integration_name),
        key = BLOCKED_COUNTRY_CODE,
        options = options,
        account = js_string(scope.account_id.as_deref().unwrap_or_default()),
        site = js_string(scope.site_id.as_deref().unwrap_or_default()),
        get = GET_HANDLER,
        save = SAVE_HANDLER,
    )
}

/// Every ISO 3166-1 country, ordered by name for the picker.
fn picker_countries() -> Vec<CountryCode> {
    let mut countries: Vec<CountryCode> = CountryCode::iter().cloned().collect();
    countries.sort_by_key(|c| c.name());
    countries
}

/// Quote a value as a JavaScript string literal safe inside `<script>`.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(account: &str, site: &str) -> SettingsScope {
        SettingsScope {
            account_id: Some(account.to_string()),
            site_id: Some(site.to_string()),
        }
    }

    #[test]
    fn test_render_lists_every_country() {
        let html = render("geoblock", &SettingsScope::default());

        assert_eq!(
            html.matches("<option value=\"").count(),
            CountryCode::iter().count() + 1
        );
        assert!(html.contains("<option value=\"FR\">France</option>"));
        assert!(html.contains("<option value=\"DE\">Germany</option>"));
    }

    #[test]
    fn test_render_wires_both_rpcs() {
        let html = render("geoblock", &SettingsScope::default());

        assert!(html.contains("/api/get-blocked-country-code"));
        assert!(html.contains("/api/save-blocked-country-code"));
        assert!(html.contains("id=\"BLOCKED_COUNTRY_CODE\""));
    }

    #[test]
    fn test_render_embeds_scope() {
        let html = render("geoblock", &scope("team-1", "site-1"));
        assert!(html.contains(r#""x-account-id": "team-1""#));
        assert!(html.contains(r#""x-site-id": "site-1""#));
    }

    #[test]
    fn test_scope_cannot_break_out_of_script() {
        let html = render("geoblock", &scope("</script><script>alert(1)</script>", "s"));
        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_country_names_are_escaped() {
        let html = render("geoblock", &SettingsScope::default());
        for country in CountryCode::iter() {
            assert!(html.contains(&format!(
                "<option value=\"{}\">{}</option>",
                country.alpha2(),
                escape_html(country.name())
            )));
        }
    }

    #[test]
    fn test_picker_is_ordered_by_name() {
        let countries = picker_countries();
        for pair in countries.windows(2) {
            assert!(pair[0].name() <= pair[1].name());
        }
        assert_eq!(countries.len(), CountryCode::iter().count());
    }

    #[test]
    fn test_js_string_quotes() {
        assert_eq!(js_string("abc"), "\"abc\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
    }
}
