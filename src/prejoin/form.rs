use tracing::debug;

use super::choices::{Language, TranslationSettings, UserChoices, VoiceGender};
use crate::error::PreJoinError;

/// Interactive pre-join state, editable until submitted.
///
/// Translation settings can change freely here; once submitted they are
/// frozen into the connection request.
#[derive(Debug, Clone)]
pub struct PreJoinForm {
    pub username: String,
    pub video_enabled: bool,
    pub audio_enabled: bool,
    pub video_device_id: String,
    pub audio_device_id: String,
    settings: TranslationSettings,
}

impl Default for PreJoinForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            video_enabled: true,
            audio_enabled: true,
            video_device_id: String::new(),
            audio_device_id: String::new(),
            settings: TranslationSettings::default(),
        }
    }
}

impl PreJoinForm {
    pub fn new(settings: TranslationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> TranslationSettings {
        self.settings
    }

    pub fn set_input_lang(&mut self, lang: Language) {
        debug!("Input language changed to {}", lang);
        self.settings.input_lang = lang;
    }

    pub fn set_output_lang(&mut self, lang: Language) {
        debug!("Output language changed to {}", lang);
        self.settings.output_lang = lang;
    }

    pub fn set_gender(&mut self, gender: VoiceGender) {
        debug!("Voice gender changed to {:?}", gender);
        self.settings.gender = gender;
    }

    /// Validate the form and produce the values the controller consumes
    pub fn submit(&self) -> Result<(UserChoices, TranslationSettings), PreJoinError> {
        let choices = UserChoices::new(&self.username)?
            .with_video(self.video_enabled)
            .with_audio(self.audio_enabled)
            .with_devices(&self.video_device_id, &self.audio_device_id);

        Ok((choices, self.settings))
    }
}
