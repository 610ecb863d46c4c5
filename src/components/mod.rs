pub mod editbar;
pub mod icons;
pub mod navigation;
pub mod recent_changes;
pub mod shorten;
pub mod templates;
pub mod theme;

pub use editbar::EditbarComponent;
pub use icons::{Icon, IconComponent};
pub use navigation::{NaviLinkResolver, NavigationComponent};
pub use recent_changes::RecentChangesComponent;
pub use shorten::{DefaultShortener, ShortenPagename};
pub use templates::TemplateComponent;
pub use theme::{RequestContext, Theme};
