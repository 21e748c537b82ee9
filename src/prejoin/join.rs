use reqwest::Url;
use tracing::warn;

use super::choices::{TranslationSettings, UserChoices};
use crate::error::PreJoinError;
use crate::session::{QualityOptions, VideoCodec};

/// Everything carried by a room link: `/rooms/{room}?username=..&settings=..&region=..&hq=true&codec=vp9`.
///
/// When `username` is present the interactive pre-join step can be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    pub room_id: String,
    pub username: Option<String>,
    pub settings: Option<TranslationSettings>,
    pub region: Option<String>,
    pub quality: QualityOptions,
}

impl JoinRequest {
    /// Join a room by id with no carried state
    pub fn for_room(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            username: None,
            settings: None,
            region: None,
            quality: QualityOptions::default(),
        }
    }

    pub fn from_url(raw: &str) -> Result<Self, PreJoinError> {
        let url = Url::parse(raw).map_err(|e| PreJoinError::InvalidUrl(e.to_string()))?;

        let room_id = url
            .path_segments()
            .and_then(|mut segments| {
                segments.find(|s| *s == "rooms")?;
                segments.next()
            })
            .filter(|room| !room.is_empty())
            .ok_or(PreJoinError::MissingRoom)?;

        let mut request = Self::for_room(room_id);

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "username" => {
                    let name = value.trim();
                    if !name.is_empty() {
                        request.username = Some(name.to_string());
                    }
                }
                "settings" => match serde_json::from_str::<TranslationSettings>(&value) {
                    Ok(settings) => request.settings = Some(settings),
                    Err(e) => warn!("Ignoring malformed translation settings in room link: {}", e),
                },
                "region" if !value.is_empty() => request.region = Some(value.into_owned()),
                "hq" => request.quality.hq = value == "true",
                "codec" => match value.parse::<VideoCodec>() {
                    Ok(codec) => request.quality.codec = codec,
                    Err(e) => warn!("{}; keeping {}", e, request.quality.codec),
                },
                _ => {}
            }
        }

        Ok(request)
    }

    /// Choices for the auto-connect path, if the link carried a username.
    ///
    /// Devices default to enabled; settings fall back to the defaults.
    pub fn auto_connect(&self) -> Option<(UserChoices, TranslationSettings)> {
        let username = self.username.as_deref()?;
        let choices = UserChoices::new(username).ok()?;
        Some((choices, self.settings.unwrap_or_default()))
    }
}
