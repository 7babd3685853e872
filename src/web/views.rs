//! Server-rendered HTML views

use chrono::{Datelike, Utc};

use crate::models::{Event, IocType};

/// Escape text for embedding in HTML element content or attribute values
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Shared page shell
fn page(title: &str, body: &str) -> String {
    let year = Utc::now().year();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body {{ background: #0f172a; color: #e2e8f0; font-family: system-ui, sans-serif;
         max-width: 56rem; margin: 0 auto; padding: 2rem 1rem; }}
  h1, h2 {{ color: #f8fafc; }}
  a {{ color: #7dd3fc; }}
  input[type=text] {{ width: 24rem; max-width: 100%; padding: 0.5rem;
         background: #1e293b; color: #e2e8f0; border: 1px solid #334155; border-radius: 4px; }}
  button {{ padding: 0.5rem 1rem; background: #0ea5e9; color: #0f172a;
         border: none; border-radius: 4px; cursor: pointer; }}
  .event {{ background: #1e293b; border: 1px solid #334155; border-radius: 6px;
         padding: 0.75rem 1rem; margin: 0.75rem 0; }}
  .tag {{ background: #334155; border-radius: 3px; padding: 0.1rem 0.4rem;
         margin-right: 0.3rem; font-size: 0.85rem; }}
  pre {{ background: #1e293b; border: 1px solid #334155; border-radius: 6px;
         padding: 1rem; white-space: pre-wrap; }}
  footer {{ margin-top: 3rem; color: #64748b; font-size: 0.85rem; }}
</style>
</head>
<body>
{body}
<footer>&copy; {year} ThreatScribe</footer>
</body>
</html>
"#
    )
}

/// Landing page with the IOC search form
pub fn index_page() -> String {
    page(
        "ThreatScribe",
        r#"<h1>ThreatScribe</h1>
<p>Enter an Indicator of Compromise (IP address, domain, URL, file hash, email, CVE)
to search the connected MISP instance and draft a security report.</p>
<form method="post" action="/search">
  <input type="text" name="ioc" placeholder="e.g. 1.2.3.4" required>
  <button type="submit">Search</button>
</form>"#,
    )
}

/// Results page: echoes the query and shows the matching events and the
/// generated report, or a "no results" notice when the lookup came back empty
pub fn results_page(ioc: &str, events: Option<&[Event]>, report: Option<&str>) -> String {
    let ioc_html = escape(ioc);
    let mut body = format!("<h1>Results for {ioc_html}</h1>\n");

    if let Some(t) = IocType::detect(ioc) {
        body.push_str(&format!("<p>Detected indicator type: <b>{t}</b></p>\n"));
    }

    match events {
        None | Some([]) => {
            body.push_str("<p>No results found in the MISP database for this indicator.</p>\n");
        }
        Some(events) => {
            body.push_str(&format!("<h2>Matching events ({})</h2>\n", events.len()));

            for event in events {
                let tags = event
                    .tags
                    .iter()
                    .map(|t| format!(r#"<span class="tag">{}</span>"#, escape(t)))
                    .collect::<String>();

                body.push_str(&format!(
                    r#"<div class="event">
  <b>Event {id}</b> &mdash; {info}<br>
  <small>{date}</small><br>
  {tags}
</div>
"#,
                    id = escape(&event.id),
                    info = escape(&event.info),
                    date = event.date,
                ));
            }
        }
    }

    if let Some(report) = report {
        body.push_str(&format!(
            "<h2>Generated report</h2>\n<pre>{}</pre>\n",
            escape(report)
        ));
    }

    body.push_str(r#"<p><a href="/">New search</a></p>"#);

    page(&format!("ThreatScribe - {ioc_html}"), &body)
}
