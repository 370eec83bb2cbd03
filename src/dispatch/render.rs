use {
    crate::{ClientAccessibleError, Request, Response, ResponseBody, Result, utils::humanize_title},
    askama::Template,
    http::header::{ACCEPT, CONTENT_TYPE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorFormat {
    Html,
    Json,
}

/// Picks HTML only when the client ranks `text/html` strictly above
/// `application/json`.
pub(crate) fn negotiate(accept: Option<&str>) -> ErrorFormat {
    let Some(accept) = accept else {
        return ErrorFormat::Json;
    };
    if quality(accept, "text", "html") > quality(accept, "application", "json") {
        ErrorFormat::Html
    } else {
        ErrorFormat::Json
    }
}

/// The `q` value the most specific matching media range assigns to
/// `kind/subtype`, or 0 when nothing matches.
fn quality(accept: &str, kind: &str, subtype: &str) -> f32 {
    let mut best: Option<(u8, f32)> = None;

    for range in accept.split(',') {
        let mut params = range.split(';');
        let media = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let Some((range_kind, range_subtype)) = media.split_once('/') else {
            continue;
        };

        let specificity = match (range_kind, range_subtype) {
            (k, s) if k == kind && s == subtype => 2,
            (k, "*") if k == kind => 1,
            ("*", "*") => 0,
            _ => continue,
        };

        let q = params
            .filter_map(|param| param.trim().split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
            .and_then(|(_, value)| value.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0);

        if best.is_none_or(|(current, _)| specificity > current) {
            best = Some((specificity, q));
        }
    }

    best.map_or(0.0, |(_, q)| q)
}

/// Writes `error` into `response` in the format the client prefers.
pub(crate) fn render_error(
    request: &Request,
    response: &mut Response,
    error: &ClientAccessibleError,
) -> Result<()> {
    response.set_status(error.status())?;
    match negotiate(request.header(ACCEPT)) {
        ErrorFormat::Html => {
            response.set_header(CONTENT_TYPE, "text/html; charset=utf-8")?;
            response.set_text(html_fragment(error)?)
        }
        ErrorFormat::Json => {
            response.set_header(CONTENT_TYPE, "application/json")?;
            response.set_body(ResponseBody::Json(error.to_json()))
        }
    }
}

/// The HTML view of a [`ClientAccessibleError`].
///
/// Only the user message and the extras are shown; the developer message is
/// left to the JSON rendering.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorView<'a> {
    status: u16,
    title: String,
    message: &'a str,
    extras: Option<String>,
}

impl<'a> ErrorView<'a> {
    fn new(error: &'a ClientAccessibleError) -> Self {
        let extras = if error.extras().is_empty() {
            None
        } else {
            serde_json::to_string_pretty(error.extras()).ok()
        };
        Self {
            status: error.status().as_u16(),
            title: humanize_title(error.title()),
            message: error.user_message(),
            extras,
        }
    }
}

/// Renders `error` as a small HTML document for a person to read.
pub fn html_fragment(error: &ClientAccessibleError) -> Result<String> {
    Ok(ErrorView::new(error).render()?)
}
