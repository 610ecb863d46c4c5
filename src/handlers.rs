use axum::{
    body::Body,
    extract::{Path as AxumPath, RawQuery, State},
    http::{header, Response},
    response::{Html, IntoResponse},
};
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path};

use log::{debug, info, warn};
use time::{Duration, OffsetDateTime};

use crate::components::{RequestContext, Theme};
use crate::config::ThemeConfig;
use crate::errors::WikiError;
use crate::services::{
    FileService, HtmlFormatter, LinkAttrs, LinkFormatter, MarkdownService, NoTranslation,
    OpenPolicy, SearchService,
};
use crate::types::{
    AppState, Message, PageContext, RcDaybreak, RcEntry, RcFooter, RcHeader, SearchResult, User,
};
use crate::utils::{
    escape_html, format_date, format_timestamp, normalize_path, normalize_pagename, parse_query,
    quote_wikiname_url,
};

const RECENT_CHANGES: &str = "RecentChanges";
/// Day choices offered on the recent changes page
const RC_DAYS: [u32; 8] = [1, 2, 3, 7, 14, 30, 60, 90];
const RC_DEFAULT_DAYS: u32 = 7;

/// Owns the per-request collaborators a theme borrows
struct PageRequest {
    pages: FileService,
    policy: OpenPolicy,
    i18n: NoTranslation,
    formatter: HtmlFormatter,
    user: User,
    form: HashMap<String, String>,
    lang: String,
}

impl PageRequest {
    fn new(state: &AppState, raw_query: &str) -> Self {
        let mut formatter = HtmlFormatter::new("");
        if let Some(name) = &state.theme.interwikiname {
            formatter = formatter.with_interwiki(name, "/");
        }
        Self {
            pages: FileService::new(state.base_dir.as_ref().clone()).with_write(state.allow_write),
            policy: OpenPolicy { allow_write: state.allow_write },
            i18n: NoTranslation,
            formatter,
            user: User::anonymous(),
            form: parse_query(raw_query),
            lang: "en".to_string(),
        }
    }

    fn theme<'a>(&'a self, cfg: &'a ThemeConfig) -> Theme<'a> {
        Theme::new(RequestContext {
            cfg,
            user: &self.user,
            form: &self.form,
            lang: &self.lang,
            content_lang: &self.lang,
            script_name: "",
            pages: &self.pages,
            policy: &self.policy,
            i18n: &self.i18n,
            formatter: &self.formatter,
        })
    }
}

/// Handle root path requests: the front page
pub async fn handle_root(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response<Body>, WikiError> {
    let front_page = state.theme.page_front_page.clone();
    render_request(&state, &front_page, &raw.unwrap_or_default())
}

/// Handle page requests, dispatching on the `action` query parameter
pub async fn handle_page(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    RawQuery(raw): RawQuery,
) -> Result<Response<Body>, WikiError> {
    info!("Page request received: '{}'", path);
    let page_name = normalize_pagename(&normalize_path(&path));
    render_request(&state, &page_name, &raw.unwrap_or_default())
}

/// Render one page request outside of the router
pub fn render_request(
    state: &AppState,
    page_name: &str,
    raw_query: &str,
) -> Result<Response<Body>, WikiError> {
    let start_time = std::time::Instant::now();
    let request = PageRequest::new(state, raw_query);
    // rejects `..` and other names escaping the page directory
    request.pages.page_file(page_name)?;

    let theme = request.theme(&state.theme);
    let action = theme.req().action().to_string();
    debug!("Dispatching action '{}' for page '{}'", action, page_name);

    let response = match action.as_str() {
        "" | "show" | "refresh" => show_page(state, &theme, &request, page_name, false),
        "print" => show_page(state, &theme, &request, page_name, true),
        "raw" => raw_page(&request, page_name),
        "info" => info_page(state, &theme, &request, page_name),
        "fullsearch" | "titlesearch" => search_page(state, &theme, &request, page_name),
        other => {
            warn!("Unsupported action '{}' for page '{}'", other, page_name);
            let mut d = PageContext::for_page(page_name);
            d.msg = Some(Message::Text(format!("Action '{}' is not available.", other)));
            Ok(render_html(state, &theme, &d, ""))
        }
    }?;

    info!("Request for '{}' completed in {:?}ms", page_name, start_time.elapsed().as_millis());
    Ok(response)
}

/// Optional site shell from `<static>/html/base.html`
fn base_template(state: &AppState) -> Option<String> {
    let path = state.static_dir.join("html").join("base.html");
    std::fs::read_to_string(&path).ok()
}

fn render_html(
    state: &AppState,
    theme: &Theme<'_>,
    d: &PageContext,
    content: &str,
) -> Response<Body> {
    let base = base_template(state);
    let page = theme.templates().render_page(d, content, base.as_deref());
    Html(page).into_response()
}

/// Context for a page, with a title linking to the pages that link here
fn page_context(request: &PageRequest, page_name: &str, title: Option<&str>) -> PageContext {
    let mut d = PageContext::for_page(page_name);
    if let Some(title) = title {
        d.title_text = title.to_string();
    }
    d.title_link = Some(format!(
        "{}?action=fullsearch&value=linkto:{}",
        request.formatter.page_url(page_name),
        quote_wikiname_url(page_name)
    ));
    d
}

fn show_page(
    state: &AppState,
    theme: &Theme<'_>,
    request: &PageRequest,
    page_name: &str,
    print_mode: bool,
) -> Result<Response<Body>, WikiError> {
    let content = match request.pages.read_page(page_name) {
        Ok(content) => content,
        Err(WikiError::NotFound) if page_name == RECENT_CHANGES => {
            return recent_changes_page(state, theme, request);
        }
        Err(e) => {
            warn!("Page not found or unreadable: '{}'", page_name);
            return Err(e);
        }
    };

    let result = MarkdownService::new().render(&content);
    let mut d = page_context(request, page_name, result.title.as_deref());
    if print_mode {
        d.print_mode = true;
        d.media = request.form.get("media").cloned();
    }
    Ok(render_html(state, theme, &d, &result.html))
}

fn raw_page(request: &PageRequest, page_name: &str) -> Result<Response<Body>, WikiError> {
    let content = request.pages.read_page(page_name)?;
    let mut resp = Response::new(Body::from(content));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    Ok(resp)
}

fn info_page(
    state: &AppState,
    theme: &Theme<'_>,
    request: &PageRequest,
    page_name: &str,
) -> Result<Response<Body>, WikiError> {
    let file = request.pages.page_file(page_name)?;
    let metadata =
        std::fs::metadata(request.pages.base_dir().join(&file)).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WikiError::NotFound,
            _ => WikiError::Io(e),
        })?;

    let modified = request
        .pages
        .page_mtime(page_name)
        .map(format_timestamp)
        .unwrap_or_else(|| "unknown".to_string());
    let content = format!(
        "<h2>{}</h2>\n<ul class=\"pageinfo\">\n<li>{}: {}</li>\n<li>{}: {}</li>\n<li>{}: {}</li>\n</ul>\n",
        escape_html(&theme.tr("Page information")),
        escape_html(&theme.tr("File")),
        escape_html(&file.to_string_lossy()),
        escape_html(&theme.tr("Size")),
        metadata.len(),
        escape_html(&theme.tr("Last modified")),
        modified
    );
    let title = format!("{} ({})", page_name, theme.tr("Info"));
    let d = page_context(request, page_name, Some(&title));
    Ok(render_html(state, theme, &d, &content))
}

fn search_page(
    state: &AppState,
    theme: &Theme<'_>,
    request: &PageRequest,
    page_name: &str,
) -> Result<Response<Body>, WikiError> {
    let query = request.form.get("value").cloned().unwrap_or_default();
    let titles_only =
        theme.req().action() == "titlesearch" || request.form.contains_key("titlesearch");
    let search_service = SearchService::new(request.pages.clone());
    let results = if titles_only {
        search_service.title_search(&query)?
    } else {
        search_service.search(&query)?
    };

    let content = render_search_results(theme, &query, &results);
    let mut d = PageContext::for_page(page_name);
    d.title_text = format!("{} \"{}\"", theme.tr("Search results for"), query);
    Ok(render_html(state, theme, &d, &content))
}

/// Render search results HTML
fn render_search_results(theme: &Theme<'_>, query: &str, results: &[SearchResult]) -> String {
    let mut content = String::from("<div class=\"searchresults\">\n");
    if query.trim().is_empty() {
        let hint = theme.tr("Enter a search query to find content.");
        content.push_str(&format!("<p>{}</p>\n</div>\n", escape_html(&hint)));
        return content;
    }

    content.push_str(&format!(
        "<p class=\"searchstats\">{} {}</p>\n",
        results.len(),
        escape_html(&theme.tr(if results.len() == 1 { "result" } else { "results" }))
    ));
    if !results.is_empty() {
        content.push_str("<ul>\n");
        for result in results {
            content.push_str(&format!(
                "<li>{}",
                theme.page_link(&result.page_name, &result.title, None, &LinkAttrs::default())
            ));
            if !result.excerpt.is_empty() {
                content.push_str(&format!(
                    "<p class=\"searchexcerpt\">{}</p>",
                    escape_html(&result.excerpt)
                ));
            }
            content.push_str("</li>\n");
        }
        content.push_str("</ul>\n");
    }
    content.push_str("</div>\n");
    content
}

/// Recent changes built from page modification times
fn recent_changes_page(
    state: &AppState,
    theme: &Theme<'_>,
    request: &PageRequest,
) -> Result<Response<Body>, WikiError> {
    let max_days = request
        .form
        .get("max_days")
        .and_then(|d| d.parse::<u32>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(RC_DEFAULT_DAYS);
    let cutoff = OffsetDateTime::now_utc() - Duration::days(i64::from(max_days));

    let mut changes: Vec<(String, OffsetDateTime)> = request
        .pages
        .list_pages()?
        .into_iter()
        .filter_map(|page| request.pages.page_mtime(&page).map(|mtime| (page, mtime)))
        .filter(|(_, mtime)| *mtime >= cutoff)
        .collect();
    changes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debug!("Recent changes: {} pages in the last {} days", changes.len(), max_days);

    let rc = theme.recent_changes();
    let icons = theme.icons();
    let header = RcHeader {
        page_name: RECENT_CHANGES.to_string(),
        q_page_name: quote_wikiname_url(RECENT_CHANGES),
        rc_days: RC_DAYS.to_vec(),
        rc_max_days: max_days,
        ..RcHeader::default()
    };
    let mut html = rc.header(&header);

    let mut current_day = String::new();
    for (page, mtime) in &changes {
        let day = format_date(*mtime);
        if day != current_day {
            html.push_str(&rc.daybreak(&RcDaybreak {
                date: day.clone(),
                bookmark_link_html: None,
            }));
            current_day = day;
        }
        let mut vars = BTreeMap::new();
        vars.insert("q_page_name".to_string(), quote_wikiname_url(page));
        let timestamp = format_timestamp(*mtime);
        let time_html = timestamp
            .split_once(' ')
            .map(|(_, t)| t.to_string())
            .unwrap_or(timestamp.clone());
        html.push_str(&rc.entry(&RcEntry {
            icon_html: icons.make_icon("updated", &BTreeMap::new()),
            pagelink_html: theme.page_link(page, page, None, &LinkAttrs::default()),
            time_html,
            info_html: icons.make_iconlink("info", &vars),
            changecount: 1,
            ..RcEntry::default()
        }));
    }

    let footer = RcFooter {
        rc_msg: changes.is_empty().then(|| escape_html(&theme.tr("No changes in this period."))),
    };
    html.push_str(&rc.footer(&footer));

    let d = PageContext::for_page(RECENT_CHANGES);
    Ok(render_html(state, theme, &d, &html))
}

/// Handle static file requests
pub async fn handle_static(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<impl IntoResponse, WikiError> {
    let normalized = normalize_path(&path);
    if Path::new(&normalized).components().any(|c| !matches!(c, Component::Normal(_))) {
        warn!("Rejected static path: '{}'", normalized);
        return Err(WikiError::InvalidPath);
    }
    let requested = state.static_dir.join(&normalized);

    if !requested.is_file() {
        warn!("Static file not found: {:?}", requested);
        return Err(WikiError::NotFound);
    }

    let bytes = std::fs::read(&requested)?;
    let file_service = FileService::new(state.static_dir.as_ref().clone());
    let content_type = file_service.content_type_for(&requested);
    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut().insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    Ok(resp)
}
