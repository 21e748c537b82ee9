use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::prejoin::UserChoices;

/// Video codec preferred for published tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    Vp8,
    H264,
    #[default]
    Vp9,
    Av1,
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoCodec::Vp8 => "vp8",
            VideoCodec::H264 => "h264",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Av1 => "av1",
        };
        f.write_str(name)
    }
}

impl FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vp8" => Ok(VideoCodec::Vp8),
            "h264" => Ok(VideoCodec::H264),
            "vp9" => Ok(VideoCodec::Vp9),
            "av1" => Ok(VideoCodec::Av1),
            other => Err(format!("Unsupported video codec: {}", other)),
        }
    }
}

/// Standard capture/simulcast resolutions (16:9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPreset {
    H216,
    H540,
    H720,
    H1080,
    H2160,
}

impl VideoPreset {
    /// Width and height in pixels
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            VideoPreset::H216 => (384, 216),
            VideoPreset::H540 => (960, 540),
            VideoPreset::H720 => (1280, 720),
            VideoPreset::H1080 => (1920, 1080),
            VideoPreset::H2160 => (3840, 2160),
        }
    }
}

/// Quality knobs carried by the room link or configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityOptions {
    /// High quality: 4K capture with 1080p/720p simulcast layers
    pub hq: bool,
    pub codec: VideoCodec,
}

/// Configuration for one session object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOptions {
    pub video_device_id: String,
    pub audio_device_id: String,
    pub capture_resolution: VideoPreset,
    pub simulcast_layers: Vec<VideoPreset>,
    pub video_codec: VideoCodec,
    /// Pause publishing layers nobody subscribes to
    pub dynacast: bool,
    /// Subscribe at the resolution the receiving element actually renders
    pub adaptive_stream: bool,
}

impl RoomOptions {
    pub fn for_choices(choices: &UserChoices, quality: &QualityOptions) -> Self {
        let (capture_resolution, simulcast_layers) = if quality.hq {
            (VideoPreset::H2160, vec![VideoPreset::H1080, VideoPreset::H720])
        } else {
            (VideoPreset::H720, vec![VideoPreset::H540, VideoPreset::H216])
        };

        Self {
            video_device_id: choices.video_device_id.clone(),
            audio_device_id: choices.audio_device_id.clone(),
            capture_resolution,
            simulcast_layers,
            video_codec: quality.codec,
            dynacast: true,
            adaptive_stream: true,
        }
    }
}

/// Options for the transport connect call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub auto_subscribe: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            auto_subscribe: true,
        }
    }
}
