use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

const OFFLINE_ACCESS_TOKEN: &str = "0";
const OFFLINE_USER_TYPE: &str = "legacy";

/// Unauthenticated account derived from the profile username only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfflineAccount {
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl OfflineAccount {
    pub fn new(username: &str) -> Self {
        let username = username.trim().to_string();
        Self {
            uuid: offline_uuid(&username).to_string(),
            username,
            access_token: OFFLINE_ACCESS_TOKEN.into(),
            user_type: OFFLINE_USER_TYPE.into(),
        }
    }
}

/// Name-based UUID the way offline-mode servers compute it: MD5 of
/// `OfflinePlayer:<name>`, stamped as version 3.
fn offline_uuid(username: &str) -> Uuid {
    let digest = Md5::digest(format!("OfflinePlayer:{username}").as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Builder::from_md5_bytes(bytes).into_uuid()
}
