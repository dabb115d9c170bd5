use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Field reader that falls back to the default for values this build does not know,
/// such as a language added by a newer version.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(&value).unwrap_or_else(|e| {
        log::warn!("Ignoring unrecognized value {}: {}", value, e);
        T::default()
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Indigo,
    Rose,
    Emerald,
    Amber,
    Violet,
    Sky,
    Pink,
    Orange,
    Slate,
}

impl ThemeColor {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Indigo => "#4f46e5",
            Self::Rose => "#f43f5e",
            Self::Emerald => "#10b981",
            Self::Amber => "#f59e0b",
            Self::Violet => "#7c3aed",
            Self::Sky => "#0ea5e9",
            Self::Pink => "#ec4899",
            Self::Orange => "#f97316",
            Self::Slate => "#334155",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Ar)
    }
}

/// User preferences. Missing keys in saved data take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    #[serde(deserialize_with = "or_default")]
    pub theme_color: ThemeColor,
    pub is_dark_mode: bool,
    pub enable_confetti: bool,
    pub auto_reset_pool: bool,
    pub show_timestamps: bool,
    #[serde(deserialize_with = "or_default")]
    pub language: Language,
    pub show_global_timer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_color: ThemeColor::Indigo,
            is_dark_mode: false,
            enable_confetti: true,
            auto_reset_pool: false,
            show_timestamps: true,
            language: Language::En,
            show_global_timer: false,
        }
    }
}
