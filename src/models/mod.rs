pub mod common_notification;
pub mod complaint_notification;
pub mod notification_setting;

pub use common_notification::{Entity as CommonNotification, Model as CommonNotificationModel};
pub use complaint_notification::{
    Entity as ComplaintNotification, Model as ComplaintNotificationModel,
};
pub use notification_setting::{Entity as NotificationSetting, Model as NotificationSettingModel};
