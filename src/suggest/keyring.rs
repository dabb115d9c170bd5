use std::collections::HashMap;

use crate::error::{Error, Result};

pub(crate) const SERVICE_NAME: &str = "picklist";
const KEYRING_SERVER: &str = "anthropic-api";

fn attributes() -> HashMap<&'static str, &'static str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);
    attrs
}

async fn open() -> Result<oo7::Keyring> {
    oo7::Keyring::new()
        .await
        .map_err(|e| Error::Keyring(format!("failed to connect to keyring: {}", e)))
}

/// Store the suggestion API key in the system keyring via Secret Service.
pub async fn store_api_key(key: &str) -> Result<()> {
    let keyring = open().await?;
    keyring
        .create_item("Picklist Anthropic API Key", &attributes(), key.as_bytes(), true)
        .await
        .map_err(|e| Error::Keyring(format!("failed to store API key: {}", e)))?;
    Ok(())
}

/// Load the suggestion API key, `None` if none was stored.
pub async fn load_api_key() -> Result<Option<String>> {
    let keyring = open().await?;
    let items = keyring
        .search_items(&attributes())
        .await
        .map_err(|e| Error::Keyring(format!("failed to search keyring: {}", e)))?;

    if let Some(item) = items.first() {
        let secret = item
            .secret()
            .await
            .map_err(|e| Error::Keyring(format!("failed to read secret: {}", e)))?;
        let key = String::from_utf8(secret.to_vec())
            .map_err(|e| Error::Keyring(format!("invalid UTF-8 in secret: {}", e)))?;
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}

pub async fn delete_api_key() -> Result<()> {
    let keyring = open().await?;
    let items = keyring
        .search_items(&attributes())
        .await
        .map_err(|e| Error::Keyring(format!("failed to search keyring: {}", e)))?;
    for item in items {
        item.delete()
            .await
            .map_err(|e| Error::Keyring(format!("failed to delete API key: {}", e)))?;
    }
    Ok(())
}
