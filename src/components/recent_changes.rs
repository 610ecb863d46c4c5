use std::collections::BTreeMap;

use crate::components::theme::Theme;
use crate::services::LinkAttrs;
use crate::types::{RcDaybreak, RcEntry, RcFooter, RcHeader};

/// Columns of the recent changes table
const RC_COLUMNS: usize = 6;

/// Component for the recent changes table
pub struct RecentChangesComponent<'t, 'a> {
    theme: &'t Theme<'a>,
}

impl<'t, 'a> RecentChangesComponent<'t, 'a> {
    pub fn new(theme: &'t Theme<'a>) -> Self {
        Self { theme }
    }

    /// One table row per changed page
    pub fn entry(&self, e: &RcEntry) -> String {
        let mut html = String::from("<tr>\n");
        html.push_str(&format!("<td class=\"rcicon1\">{}</td>\n", e.icon_html));
        html.push_str(&format!("<td class=\"rcpagelink\">{}</td>\n", e.pagelink_html));
        html.push_str(&format!("<td class=\"rctime\">{}</td>\n", e.time_html));
        html.push_str(&format!("<td class=\"rcicon2\">{}</td>\n", e.info_html));
        html.push_str(&format!("<td class=\"rceditor\">{}</td>\n", e.editors.join("<br>")));

        html.push_str("<td class=\"rccomment\">");
        if e.changecount > 1 {
            let numbered: Vec<String> = e
                .comments
                .iter()
                .map(|(number, comment)| format!("<tt>#{:02}</tt>&nbsp;{}", number, comment))
                .collect();
            html.push_str(&numbered.join("<br>"));
        } else if let Some((_, comment)) = e.comments.first() {
            html.push_str(comment);
        }
        html.push_str("</td>\n</tr>\n");
        html
    }

    pub fn daybreak(&self, d: &RcDaybreak) -> String {
        let bookmark = d
            .bookmark_link_html
            .as_ref()
            .map(|link| format!("&nbsp; {}", link))
            .unwrap_or_default();
        format!(
            "<tr class=\"rcdaybreak\"><td colspan=\"{}\"><strong>{}</strong>{}</td></tr>\n",
            RC_COLUMNS, d.date, bookmark
        )
    }

    /// Opens the recent changes block and its table
    pub fn header(&self, h: &RcHeader) -> String {
        let templates = self.theme.templates();
        let mut html = format!(
            "<div class=\"recentchanges\"{}>\n<div>\n",
            templates.ui_lang_attr()
        );

        if templates.should_use_rss(&h.page_name) {
            html.push_str(&format!(
                "<div class=\"rcrss\"><a href=\"{}\">{}</a></div>",
                templates.rsshref(),
                self.theme.icons().make_icon("rss", &BTreeMap::new())
            ));
        }

        html.push_str("<p>");
        if !h.rc_days.is_empty() {
            let days: Vec<String> = h
                .rc_days
                .iter()
                .map(|&day| {
                    if day == h.rc_max_days {
                        format!("<strong>{}</strong>", day)
                    } else {
                        let params = format!("{}?max_days={}", h.q_page_name, day);
                        self.theme.link_tag(&params, &day.to_string(), &LinkAttrs::default())
                    }
                })
                .collect();
            html.push_str(&self.theme.tr("Show %s days.").replacen("%s", &days.join(" | "), 1));
        }
        if let Some(update) = &h.rc_update_bookmark {
            html.push(' ');
            html.push_str(update);
            if let Some(current) = &h.rc_curr_bookmark {
                html.push(' ');
                html.push_str(current);
            }
        }
        html.push_str("</p>\n</div>\n<table>\n");
        html
    }

    pub fn footer(&self, f: &RcFooter) -> String {
        let mut html = String::from("</table>\n");
        if let Some(msg) = &f.rc_msg {
            html.push_str(&format!("<br>{}\n", msg));
        }
        html.push_str("</div>\n");
        html
    }
}
