//! Background music.
//!
//! The scene only ever asks one question of audio: is it playing? An
//! [`AudioController`] owns that flag and an optional backend. A backend that
//! could not be created leaves the toggle inert; a backend that refuses to
//! start is logged and reported as not playing. Neither ever reaches the
//! frame loop as an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// Audio settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Track to loop. No track means no audio.
    pub track: Option<PathBuf>,
    pub volume: f32,
    pub looping: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track: None,
            volume: 0.5,
            looping: true,
        }
    }
}

/// A playback backend.
pub trait AudioSink {
    /// Start or resume playback.
    fn play(&mut self) -> Result<(), AudioError>;
    /// Pause playback. Never fails.
    fn pause(&mut self);
    fn set_looping(&mut self, looping: bool);
    fn set_volume(&mut self, volume: f32);
}

/// Owns the single "is playing" flag.
pub struct AudioController {
    sink: Option<Box<dyn AudioSink>>,
    playing: bool,
}

impl AudioController {
    /// Wrap a backend, applying the configured loop flag and volume.
    pub fn new(mut sink: Box<dyn AudioSink>, config: &AudioConfig) -> Self {
        sink.set_looping(config.looping);
        sink.set_volume(config.volume.clamp(0.0, 1.0));
        Self {
            sink: Some(sink),
            playing: false,
        }
    }

    /// Controller with no backend; toggling does nothing.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            playing: false,
        }
    }

    /// Open the configured track with the default backend.
    ///
    /// Falls back to [`disabled`](Self::disabled) when there is no track, the
    /// `audio` feature is off, or the backend fails to open.
    pub fn from_config(config: &AudioConfig) -> Self {
        let Some(track) = &config.track else {
            log::debug!("No audio track configured");
            return Self::disabled();
        };

        #[cfg(feature = "audio")]
        {
            match rodio_sink::RodioSink::open(track.clone(), config.looping) {
                Ok(sink) => {
                    log::info!("Loaded audio track {}", track.display());
                    Self::new(Box::new(sink), config)
                }
                Err(e) => {
                    log::warn!("Audio unavailable: {}", e);
                    Self::disabled()
                }
            }
        }

        #[cfg(not(feature = "audio"))]
        {
            log::warn!(
                "Audio track {} configured but built without the `audio` feature",
                track.display()
            );
            Self::disabled()
        }
    }

    /// Whether music is currently playing.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a backend is attached.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    /// Flip playback. Returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            log::debug!("Audio toggle ignored: no backend");
            return false;
        };

        if self.playing {
            sink.pause();
            self.playing = false;
        } else {
            match sink.play() {
                Ok(()) => self.playing = true,
                Err(e) => {
                    log::warn!("{}", e);
                    self.playing = false;
                }
            }
        }
        self.playing
    }

    /// Pause if playing.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            if self.playing {
                sink.pause();
            }
        }
        self.playing = false;
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(feature = "audio")]
pub use rodio_sink::RodioSink;

#[cfg(feature = "audio")]
mod rodio_sink {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioSink;
    use crate::error::AudioError;

    /// Plays one file through the default output device.
    pub struct RodioSink {
        _stream: OutputStream,
        _stream_handle: OutputStreamHandle,
        sink: Sink,
        path: PathBuf,
        looping: bool,
    }

    impl RodioSink {
        /// Open the default device and queue `path`, paused.
        pub fn open(path: PathBuf, looping: bool) -> Result<Self, AudioError> {
            let (_stream, stream_handle) =
                OutputStream::try_default().map_err(|e| AudioError::NoDevice(e.to_string()))?;
            let sink =
                Sink::try_new(&stream_handle).map_err(|e| AudioError::NoDevice(e.to_string()))?;
            let this = Self {
                _stream,
                _stream_handle: stream_handle,
                sink,
                path,
                looping,
            };
            this.queue()?;
            Ok(this)
        }

        fn queue(&self) -> Result<(), AudioError> {
            let file = File::open(&self.path)
                .map_err(|e| AudioError::Load(format!("{}: {}", self.path.display(), e)))?;
            let reader = BufReader::new(file);
            self.sink.stop();
            if self.looping {
                let source =
                    Decoder::new_looped(reader).map_err(|e| AudioError::Load(e.to_string()))?;
                self.sink.append(source);
            } else {
                let source = Decoder::new(reader).map_err(|e| AudioError::Load(e.to_string()))?;
                self.sink.append(source);
            }
            // Start paused, will play when play() is called
            self.sink.pause();
            Ok(())
        }
    }

    impl AudioSink for RodioSink {
        fn play(&mut self) -> Result<(), AudioError> {
            if self.sink.empty() {
                self.queue()?;
            }
            self.sink.play();
            if self.sink.is_paused() {
                return Err(AudioError::PlaybackBlocked(
                    "output device did not start".to_string(),
                ));
            }
            Ok(())
        }

        fn pause(&mut self) {
            self.sink.pause();
        }

        fn set_looping(&mut self, looping: bool) {
            self.looping = looping;
        }

        fn set_volume(&mut self, volume: f32) {
            self.sink.set_volume(volume.clamp(0.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        plays: u32,
        pauses: u32,
        volume: f32,
        looping: bool,
    }

    struct FakeSink {
        log: Rc<RefCell<Log>>,
        blocked: bool,
    }

    impl AudioSink for FakeSink {
        fn play(&mut self) -> Result<(), AudioError> {
            self.log.borrow_mut().plays += 1;
            if self.blocked {
                Err(AudioError::PlaybackBlocked("autoplay".into()))
            } else {
                Ok(())
            }
        }
        fn pause(&mut self) {
            self.log.borrow_mut().pauses += 1;
        }
        fn set_looping(&mut self, looping: bool) {
            self.log.borrow_mut().looping = looping;
        }
        fn set_volume(&mut self, volume: f32) {
            self.log.borrow_mut().volume = volume;
        }
    }

    fn controller(blocked: bool) -> (AudioController, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let sink = FakeSink {
            log: log.clone(),
            blocked,
        };
        (AudioController::new(Box::new(sink), &AudioConfig::default()), log)
    }

    #[test]
    fn test_toggle_plays_and_pauses() {
        let (mut audio, log) = controller(false);
        assert_eq!(log.borrow().volume, 0.5);
        assert!(log.borrow().looping);
        assert!(audio.toggle());
        assert!(audio.is_playing());
        assert!(!audio.toggle());
        assert_eq!(log.borrow().plays, 1);
        assert_eq!(log.borrow().pauses, 1);
    }

    #[test]
    fn test_blocked_playback_reports_not_playing() {
        let (mut audio, log) = controller(true);
        assert!(!audio.toggle());
        assert!(!audio.is_playing());
        // The user can retry by toggling again.
        assert!(!audio.toggle());
        assert_eq!(log.borrow().plays, 2);
        assert_eq!(log.borrow().pauses, 0);
    }

    #[test]
    fn test_missing_backend_is_inert() {
        let mut audio = AudioController::from_config(&AudioConfig::default());
        assert!(!audio.is_available());
        assert!(!audio.toggle());
        assert!(!audio.is_playing());
    }

    #[test]
    fn test_drop_pauses_playback() {
        let (mut audio, log) = controller(false);
        audio.toggle();
        drop(audio);
        assert_eq!(log.borrow().pauses, 1);
    }
}
