pub mod dispatch;
pub mod feed;
pub mod receivers;
pub mod settings;

pub use dispatch::{CommonEvent, ComplaintEvent, Dispatcher};
pub use feed::{FeedItem, FeedPage, FeedQuery, FeedService, FeedSource, Role};
pub use receivers::{ReceiverResolver, Receivers, UserDirectory};
pub use settings::{EventSetting, SettingsService};
