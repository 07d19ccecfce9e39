//! Alert recording and notification forwarding

mod channels;
mod sink;

pub use channels::{
    NotificationChannel, SlackChannel, TelegramChannel, WebhookChannel, build_channels,
};
pub use sink::{AlertSink, SinkStats};
