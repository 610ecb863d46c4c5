use log::debug;

use crate::components::theme::Theme;
use crate::config::EditorUi;
use crate::services::LinkAttrs;
use crate::types::PageContext;
use crate::utils::{escape_html, quote_wikiname_url, split_camel_case};

/// Standard actions menu, in display order
const MENU: [&str; 17] = [
    "raw",
    "print",
    "RenderAsDocbook",
    "refresh",
    "__separator__",
    "SpellCheck",
    "LikePages",
    "LocalSiteMap",
    "__separator__",
    "RenamePage",
    "DeletePage",
    "__separator__",
    "MyPages",
    "SubscribeUser",
    "__separator__",
    "Despam",
    "PackagePages",
];

/// Menu titles; actions listed here never show up as extra actions
const TITLES: [(&str, &str); 16] = [
    ("__title__", "More Actions:"),
    ("__separator__", "------------"),
    ("raw", "Raw Text"),
    ("print", "Print View"),
    ("refresh", "Delete Cache"),
    ("SpellCheck", "Check Spelling"),
    ("RenamePage", "Rename Page"),
    ("DeletePage", "Delete Page"),
    ("LikePages", "Like Pages"),
    ("LocalSiteMap", "Local Site Map"),
    ("MyPages", "My Pages"),
    ("SubscribeUser", "Subscribe User"),
    ("Despam", "Remove Spam"),
    ("PackagePages", "Package Pages"),
    ("RenderAsDocbook", "Render as Docbook"),
    ("AttachFile", "Attachments"),
];

// class="disabled" for browsers ignoring the disabled attribute
const DISABLED: &str = " disabled class=\"disabled\"";

fn menu_title(action: &str) -> Option<&'static str> {
    TITLES.iter().find(|(a, _)| *a == action).map(|(_, t)| *t)
}

/// Component for the page edit bar and its actions menu
pub struct EditbarComponent<'t, 'a> {
    theme: &'t Theme<'a>,
}

impl<'t, 'a> EditbarComponent<'t, 'a> {
    pub fn new(theme: &'t Theme<'a>) -> Self {
        Self { theme }
    }

    /// Show the edit bar on existing (or deleted) pages the user may read,
    /// except while the editor is open.
    pub fn should_show_editbar(&self, page: &str) -> bool {
        let req = self.theme.req();
        if !(req.pages.exists_including_deleted(page) && req.policy.may_read(req.user, page)) {
            return false;
        }
        let editing = req.action() == "edit"
            && !req.form.contains_key("button_save")
            && !req.form.contains_key("button_cancel");
        !editing
    }

    /// Assemble the edit bar; built on first use and reused for the request
    pub fn editbar(&self, d: &PageContext) -> String {
        if !self.should_show_editbar(&d.page_name) {
            return String::new();
        }
        self.theme
            .editbar_cache
            .get_or_init(|| {
                debug!("Building editbar for page '{}'", d.page_name);
                let items: String = self
                    .editbar_items(&d.page_name)
                    .into_iter()
                    .filter(|item| !item.is_empty())
                    .map(|item| format!("<li>{}</li>", item))
                    .collect();
                format!("<ul class=\"editbar\">{}</ul>\n", items)
            })
            .clone()
    }

    /// Items of the edit bar, empty strings are dropped
    pub fn editbar_items(&self, page: &str) -> Vec<String> {
        vec![
            self.editor_link(page),
            self.info_link(page),
            self.subscribe_link(page),
            self.quicklink_link(page),
            self.attachments_link(page),
            self.actions_menu(page),
        ]
    }

    /// The GUI editor only handles wiki markup
    pub fn guiworks(&self, page: &str) -> bool {
        self.theme.req().pages.page_format(page) == "wiki"
    }

    pub fn show_both_edit_links(&self) -> bool {
        let req = self.theme.req();
        req.user.editor_ui.unwrap_or(req.cfg.editor_ui) == EditorUi::FreeChoice
    }

    fn may_edit(&self, page: &str) -> bool {
        let req = self.theme.req();
        req.pages.is_writable(page) && req.policy.may_write(req.user, page)
    }

    /// Link to the editor, or a disabled marker for immutable pages
    pub fn editor_link(&self, page: &str) -> String {
        if !self.may_edit(page) {
            return self.disabled_edit();
        }

        let mut params = format!("{}?action=edit&amp;editor=", quote_wikiname_url(page));
        let guiworks = self.guiworks(page);
        let (text, name) = if self.show_both_edit_links() && guiworks {
            params.push_str("text");
            (self.theme.tr("Edit (Text)"), "texteditlink")
        } else if guiworks {
            // upgraded to the GUI editor by script when the browser supports it
            params.push_str("textonly");
            (self.theme.tr("Edit"), "editlink")
        } else {
            params.push_str("text");
            (self.theme.tr("Edit"), "texteditlink")
        };
        self.theme.link_tag(&params, &escape_html(&text), &LinkAttrs::name(name))
    }

    /// Script exposing the GUI editor link to the page scripts
    pub fn gui_editor_script(&self, d: &PageContext) -> String {
        let page = d.page_name.as_str();
        if !(self.may_edit(page) && self.show_both_edit_links() && self.guiworks(page)) {
            return String::new();
        }
        format!(
            "<script type=\"text/javascript\">\nvar gui_editor_link_href = \"{}?action=edit&editor=gui\";\nvar gui_editor_link_text = \"{}\";\n</script>\n",
            self.theme.req().formatter.page_url(page),
            self.theme.tr("Edit (GUI)")
        )
    }

    pub fn disabled_edit(&self) -> String {
        format!("<span class=\"disabled\">{}</span>", escape_html(&self.theme.tr("Immutable Page")))
    }

    pub fn info_link(&self, page: &str) -> String {
        self.theme.page_link(
            page,
            &self.theme.tr("Info"),
            Some("action=info"),
            &LinkAttrs::default(),
        )
    }

    /// Subscribe or unsubscribe, for logged in users when mail is enabled
    pub fn subscribe_link(&self, page: &str) -> String {
        let req = self.theme.req();
        if !(req.cfg.mail_enabled && req.user.valid) {
            return String::new();
        }
        let text = if req.user.is_subscribed_to(&[page]) {
            self.theme.tr("Unsubscribe")
        } else {
            self.theme.tr("Subscribe")
        };
        let params = format!("{}?action=subscribe", quote_wikiname_url(page));
        self.theme.link_tag(&params, &escape_html(&text), &LinkAttrs::default())
    }

    /// Add or remove the page from the user's quick links
    pub fn quicklink_link(&self, page: &str) -> String {
        let req = self.theme.req();
        if !req.user.valid {
            return String::new();
        }
        let text = if req.user.is_quick_linked_to(&[page]) {
            self.theme.tr("Remove Link")
        } else {
            self.theme.tr("Add Link")
        };
        let params = format!("{}?action=quicklink", quote_wikiname_url(page));
        self.theme.link_tag(&params, &escape_html(&text), &LinkAttrs::default())
    }

    pub fn attachments_link(&self, page: &str) -> String {
        self.theme.page_link(
            page,
            &self.theme.tr("Attachments"),
            Some("action=AttachFile"),
            &LinkAttrs::default(),
        )
    }

    /// Actions menu.
    ///
    /// The standard entries are always listed; unavailable ones are
    /// disabled. Extra actions the wiki offers follow after a separator.
    pub fn actions_menu(&self, page: &str) -> String {
        let req = self.theme.req();
        let available = req.pages.available_actions(page);
        let option = |action: &str, disabled: bool, title: &str| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                action,
                if disabled { DISABLED } else { "" },
                escape_html(title)
            )
        };
        let title = |action: &str| self.theme.tr(menu_title(action).unwrap_or(action));

        let mut options = Vec::new();
        for action in MENU {
            let mut value = action;
            let mut disabled = false;

            if action == "refresh" {
                if !req.pages.can_use_cache(page) {
                    value = "show";
                    disabled = true;
                }
            } else if action.starts_with("__") {
                // special entries just reload the page without script
                value = "show";
            }

            let capitalised = action.chars().next().is_some_and(char::is_uppercase);
            let unavailable = capitalised && !available.iter().any(|a| a == action);
            if action == "__separator__" || unavailable {
                disabled = true;
            }
            options.push(option(value, disabled, &title(action)));
        }

        let mut more: Vec<&String> = available
            .iter()
            .filter(|a| menu_title(a.as_str()).is_none())
            .collect();
        more.sort();
        more.dedup();
        if !more.is_empty() {
            options.push(option("show", true, &title("__separator__")));
            for action in more {
                let label = self.theme.tr(&split_camel_case(action));
                options.push(option(action.as_str(), false, &label));
            }
        }

        let label = title("__title__");
        format!(
            r#"
<form class="actionsmenu" method="get" action="">
<div>
    <label>{label}</label>
    <select name="action"
        onchange="if ((this.selectedIndex != 0) &&
                      (this.options[this.selectedIndex].disabled == false)) {{
                this.form.submit();
            }}
            this.selectedIndex = 0;">
        {options}
    </select>
    <input type="submit" value="{do_button}">
</div>
<script type="text/javascript">
<!--// Init menu
actionsMenuInit('{label}');
//-->
</script>
</form>
"#,
            label = escape_html(&label),
            options = options.join("\n"),
            do_button = escape_html(&self.theme.tr("Do")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use pretty_assertions::assert_eq;

    #[test]
    fn editbar_only_on_readable_existing_pages() {
        let fx = Fixture::new();
        let theme = fx.theme();
        assert!(theme.editbar().should_show_editbar("FrontPage"));
        assert!(!theme.editbar().should_show_editbar("Missing"));
        assert_eq!(theme.editbar().editbar(&PageContext::for_page("Missing")), "");
    }

    #[test]
    fn editbar_shows_for_deleted_pages() {
        let mut fx = Fixture::new();
        fx.pages.deleted.insert("OldPage".to_string());
        assert!(fx.theme().editbar().should_show_editbar("OldPage"));
    }

    #[test]
    fn editbar_hidden_while_editing() {
        let fx = Fixture::new().with_action("edit");
        assert!(!fx.theme().editbar().should_show_editbar("FrontPage"));

        let mut fx = Fixture::new().with_action("edit");
        fx.form.insert("button_save".to_string(), "Save".to_string());
        assert!(fx.theme().editbar().should_show_editbar("FrontPage"));
    }

    #[test]
    fn editbar_is_built_once_per_theme() {
        let fx = Fixture::new();
        let theme = fx.theme();
        let first = theme.editbar().editbar(&PageContext::for_page("FrontPage"));
        let second = theme.editbar().editbar(&PageContext::for_page("FindPage"));
        assert_eq!(first, second);
        assert!(first.starts_with("<ul class=\"editbar\"><li>"));
        assert!(first.contains("FrontPage?action=info"));
    }

    #[test]
    fn editor_link_variants() {
        let fx = Fixture::new();
        assert_eq!(
            fx.theme().editbar().editor_link("FrontPage"),
            "<a name=\"texteditlink\" href=\"/FrontPage?action=edit&amp;editor=text\">Edit (Text)</a>"
        );

        let mut fx = Fixture::new();
        fx.cfg.editor_ui = EditorUi::TheOne;
        assert_eq!(
            fx.theme().editbar().editor_link("FrontPage"),
            "<a name=\"editlink\" href=\"/FrontPage?action=edit&amp;editor=textonly\">Edit</a>"
        );

        let mut fx = Fixture::new();
        fx.pages.format = "markdown".to_string();
        assert_eq!(
            fx.theme().editbar().editor_link("FrontPage"),
            "<a name=\"texteditlink\" href=\"/FrontPage?action=edit&amp;editor=text\">Edit</a>"
        );
    }

    #[test]
    fn user_preference_overrides_editor_ui() {
        let mut fx = Fixture::new();
        fx.user.editor_ui = Some(EditorUi::TheOne);
        assert!(!fx.theme().editbar().show_both_edit_links());
    }

    #[test]
    fn immutable_pages_get_disabled_edit() {
        let mut fx = Fixture::new();
        fx.policy.allow_write = false;
        assert_eq!(
            fx.theme().editbar().editor_link("FrontPage"),
            "<span class=\"disabled\">Immutable Page</span>"
        );

        let mut fx = Fixture::new();
        fx.pages.writable = false;
        assert_eq!(
            fx.theme().editbar().editor_link("FrontPage"),
            "<span class=\"disabled\">Immutable Page</span>"
        );
        assert_eq!(fx.theme().editbar().gui_editor_script(&PageContext::for_page("FrontPage")), "");
    }

    #[test]
    fn gui_editor_script_points_at_page() {
        let fx = Fixture::new();
        let script = fx.theme().editbar().gui_editor_script(&PageContext::for_page("FrontPage"));
        assert!(script.contains(
            "var gui_editor_link_href = \"/FrontPage?action=edit&editor=gui\";"
        ));
        assert!(script.contains("var gui_editor_link_text = \"Edit (GUI)\";"));
    }

    #[test]
    fn subscribe_and_quicklink_need_valid_user() {
        let mut fx = Fixture::new();
        fx.cfg.mail_enabled = true;
        assert_eq!(fx.theme().editbar().subscribe_link("FrontPage"), "");
        assert_eq!(fx.theme().editbar().quicklink_link("FrontPage"), "");

        let mut fx = fx.logged_in("Alice");
        fx.user.subscriptions = vec!["FrontPage".to_string()];
        fx.user.quicklinks = vec!["FrontPage".to_string()];
        let theme = fx.theme();
        let editbar = theme.editbar();
        assert_eq!(
            editbar.subscribe_link("FrontPage"),
            "<a href=\"/FrontPage?action=subscribe\">Unsubscribe</a>"
        );
        assert_eq!(
            editbar.subscribe_link("FindPage"),
            "<a href=\"/FindPage?action=subscribe\">Subscribe</a>"
        );
        assert_eq!(
            editbar.quicklink_link("FrontPage"),
            "<a href=\"/FrontPage?action=quicklink\">Remove Link</a>"
        );
        assert_eq!(
            editbar.quicklink_link("FindPage"),
            "<a href=\"/FindPage?action=quicklink\">Add Link</a>"
        );
    }

    #[test]
    fn subscribe_needs_mail() {
        let fx = Fixture::new().logged_in("Alice");
        assert_eq!(fx.theme().editbar().subscribe_link("FrontPage"), "");
    }

    #[test]
    fn actions_menu_enables_available_actions() {
        let mut fx = Fixture::new();
        fx.pages.actions = vec!["LikePages".to_string(), "AttachFile".to_string()];
        let menu = fx.theme().editbar().actions_menu("FrontPage");
        assert!(menu.contains("<option value=\"raw\">Raw Text</option>"));
        assert!(menu.contains("<option value=\"refresh\">Delete Cache</option>"));
        assert!(menu.contains("<option value=\"LikePages\">Like Pages</option>"));
        assert!(menu.contains(
            "<option value=\"RenamePage\" disabled class=\"disabled\">Rename Page</option>"
        ));
        assert!(menu.contains(
            "<option value=\"show\" disabled class=\"disabled\">------------</option>"
        ));
        assert!(!menu.contains("Attach File"));
        assert!(menu.contains("actionsMenuInit('More Actions:');"));
    }

    #[test]
    fn actions_menu_disables_refresh_without_cache() {
        let mut fx = Fixture::new();
        fx.pages.cacheable = false;
        let menu = fx.theme().editbar().actions_menu("FrontPage");
        assert!(menu.contains(
            "<option value=\"show\" disabled class=\"disabled\">Delete Cache</option>"
        ));
    }

    #[test]
    fn actions_menu_appends_extra_actions_sorted() {
        let mut fx = Fixture::new();
        fx.pages.actions = vec!["SyncPages".to_string(), "CopyPage".to_string()];
        let menu = fx.theme().editbar().actions_menu("FrontPage");
        let copy = menu.find("<option value=\"CopyPage\">Copy Page</option>").unwrap();
        let sync = menu.find("<option value=\"SyncPages\">Sync Pages</option>").unwrap();
        let package = menu.find("Package Pages").unwrap();
        assert!(package < copy && copy < sync);
    }
}
