use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::CopyforgeError;

const FLASH_MESSAGES_KEY: &str = "flash_messages";

pub(crate) const SUCCESS: &str = "success";
pub(crate) const WARNING: &str = "warning";
pub(crate) const ERROR: &str = "error";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct FlashMessage {
    pub(crate) text: String,
    pub(crate) class: String,
}

pub(crate) async fn push(
    session: &Session,
    class: &str,
    text: impl Into<String>,
) -> Result<(), CopyforgeError> {
    let mut messages = session
        .get::<Vec<FlashMessage>>(FLASH_MESSAGES_KEY)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?
        .unwrap_or_default();
    messages.push(FlashMessage {
        text: text.into(),
        class: class.to_string(),
    });
    session
        .insert(FLASH_MESSAGES_KEY, messages)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?;
    Ok(())
}

/// Reports `err` to the user; configuration and precondition problems are shown verbatim.
pub(crate) async fn push_error(session: &Session, err: &CopyforgeError) -> Result<(), CopyforgeError> {
    push(session, ERROR, err.to_string()).await
}

pub(crate) async fn take_messages(session: &Session) -> Result<Vec<FlashMessage>, CopyforgeError> {
    Ok(session
        .remove::<Vec<FlashMessage>>(FLASH_MESSAGES_KEY)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?
        .unwrap_or_default())
}
