pub mod notificationmodel;
pub mod propertymodel;
