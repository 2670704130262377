use crate::constants::BACKUP_FORMAT_VERSION;

/// Stream header, written exactly once before any frame.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BackupInfo {
    #[prost(uint64, tag = "1")]
    pub version: u64,
    #[prost(uint64, tag = "2")]
    pub backup_time_ms: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub media_root_backup_key: Vec<u8>,
    #[prost(string, tag = "4")]
    pub current_app_version: String,
    #[prost(string, tag = "5")]
    pub first_app_version: String,
}

impl BackupInfo {
    /// Header at the current format version.
    pub fn current(backup_time_ms: u64) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION,
            backup_time_ms,
            ..Default::default()
        }
    }
}

/// One logical unit of backup content.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Frame {
    #[prost(oneof = "frame::Item", tags = "1, 2, 3, 4, 5")]
    pub item: Option<frame::Item>,
}

pub mod frame {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Item {
        #[prost(message, tag = "1")]
        Account(super::AccountData),
        #[prost(message, tag = "2")]
        Recipient(super::Recipient),
        #[prost(message, tag = "3")]
        Chat(super::Chat),
        #[prost(message, tag = "4")]
        ChatItem(super::ChatItem),
        #[prost(message, tag = "5")]
        StickerPack(super::StickerPack),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountData {
    #[prost(bytes = "vec", tag = "1")]
    pub profile_key: Vec<u8>,
    #[prost(string, optional, tag = "2")]
    pub username: Option<String>,
    #[prost(string, tag = "3")]
    pub given_name: String,
    #[prost(string, tag = "4")]
    pub family_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Recipient {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub aci: Vec<u8>,
    #[prost(uint64, optional, tag = "3")]
    pub e164: Option<u64>,
    #[prost(string, tag = "4")]
    pub profile_given_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Chat {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(uint64, tag = "2")]
    pub recipient_id: u64,
    #[prost(bool, tag = "3")]
    pub archived: bool,
    #[prost(uint32, optional, tag = "4")]
    pub pinned_order: Option<u32>,
    #[prost(uint64, tag = "5")]
    pub expiration_timer_ms: u64,
    #[prost(uint64, tag = "6")]
    pub mute_until_ms: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatItem {
    #[prost(uint64, tag = "1")]
    pub chat_id: u64,
    #[prost(uint64, tag = "2")]
    pub author_id: u64,
    #[prost(uint64, tag = "3")]
    pub date_sent: u64,
    #[prost(message, optional, tag = "4")]
    pub standard_message: Option<StandardMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StandardMessage {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(message, repeated, tag = "2")]
    pub attachments: Vec<FilePointer>,
}

/// Reference to attachment media stored outside the backup stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilePointer {
    #[prost(string, tag = "1")]
    pub content_type: String,
    #[prost(uint32, tag = "2")]
    pub size: u32,
    #[prost(bytes = "vec", tag = "3")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub digest: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StickerPack {
    #[prost(bytes = "vec", tag = "1")]
    pub pack_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub pack_key: Vec<u8>,
}

impl Frame {
    pub fn account(account: AccountData) -> Self {
        Self { item: Some(frame::Item::Account(account)) }
    }

    pub fn recipient(id: u64) -> Self {
        Self {
            item: Some(frame::Item::Recipient(Recipient { id, ..Default::default() })),
        }
    }

    pub fn chat(id: u64, recipient_id: u64) -> Self {
        Self {
            item: Some(frame::Item::Chat(Chat { id, recipient_id, ..Default::default() })),
        }
    }

    /// Chat item carrying a plain text message.
    pub fn text_message(chat_id: u64, author_id: u64, date_sent: u64, text: &str) -> Self {
        Self {
            item: Some(frame::Item::ChatItem(ChatItem {
                chat_id,
                author_id,
                date_sent,
                standard_message: Some(StandardMessage {
                    text: text.to_owned(),
                    attachments: Vec::new(),
                }),
            })),
        }
    }

    pub fn sticker_pack(pack_id: Vec<u8>, pack_key: Vec<u8>) -> Self {
        Self {
            item: Some(frame::Item::StickerPack(StickerPack { pack_id, pack_key })),
        }
    }

    /// Short variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match &self.item {
            Some(frame::Item::Account(_)) => "account",
            Some(frame::Item::Recipient(_)) => "recipient",
            Some(frame::Item::Chat(_)) => "chat",
            Some(frame::Item::ChatItem(_)) => "chat_item",
            Some(frame::Item::StickerPack(_)) => "sticker_pack",
            None => "empty",
        }
    }
}
