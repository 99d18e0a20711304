use super::{AudioClip, AudioState, ClientSession};
use crate::SessionError;
use huddle_core::ClientEvent;

impl ClientSession {
    pub fn start_recording(&mut self) -> Result<(), SessionError> {
        match self.audio {
            AudioState::Idle => {
                self.audio = AudioState::Recording;
                Ok(())
            }
            _ => Err(self.invalid_audio("start recording")),
        }
    }

    pub fn stop_recording(&mut self, clip: AudioClip) -> Result<(), SessionError> {
        match self.audio {
            AudioState::Recording => {
                self.audio = AudioState::Previewing(clip);
                Ok(())
            }
            _ => Err(self.invalid_audio("stop recording")),
        }
    }

    /// Drops the recording or the previewed clip.
    pub fn discard_recording(&mut self) -> Result<(), SessionError> {
        match self.audio {
            AudioState::Idle => Err(self.invalid_audio("discard a recording")),
            _ => {
                self.audio = AudioState::Idle;
                Ok(())
            }
        }
    }

    /// Hands out the previewed clip for upload, leaving the preview in place.
    pub fn preview(&self) -> Option<&AudioClip> {
        match &self.audio {
            AudioState::Previewing(clip) => Some(clip),
            _ => None,
        }
    }

    /// Posts the previewed clip once the embedder has uploaded it to `url`.
    pub fn send_recording(&mut self, url: &str) -> Result<ClientEvent, SessionError> {
        if self.preview().is_none() {
            return Err(self.invalid_audio("send a recording"));
        }
        let event = self.post(None, Some(url))?;
        self.audio = AudioState::Idle;
        Ok(event)
    }

    fn invalid_audio(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.audio.name(),
        }
    }
}
