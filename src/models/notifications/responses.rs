use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
