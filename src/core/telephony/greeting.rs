//! Answer for the incoming-call webhook.

use super::twiml::{DEFAULT_SAY_VOICE, VoiceResponse};

pub const DEFAULT_WELCOME_MESSAGE: &str = "Thank you for calling. I am connecting you to Luna, \
     Lumiring technical support. Please wait a moment.";
pub const DEFAULT_CONNECTED_MESSAGE: &str = "You are now connected. Please state your concern.";

/// Path the media stream connects back to.
pub const MEDIA_STREAM_PATH: &str = "/media-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub voice: String,
    pub welcome: String,
    pub connected: String,
}

impl Default for Greeting {
    fn default() -> Self {
        Self {
            voice: DEFAULT_SAY_VOICE.to_string(),
            welcome: DEFAULT_WELCOME_MESSAGE.to_string(),
            connected: DEFAULT_CONNECTED_MESSAGE.to_string(),
        }
    }
}

impl Greeting {
    /// Greet the caller, pause, then connect the call audio to
    /// `wss://{host}/media-stream`.
    pub fn twiml(&self, host: &str) -> String {
        VoiceResponse::new()
            .say(Some(&self.voice), self.welcome.as_str())
            .pause(1)
            .say(Some(&self.voice), self.connected.as_str())
            .connect_stream(media_stream_url(host))
            .to_xml()
    }
}

pub fn media_stream_url(host: &str) -> String {
    format!("wss://{host}{MEDIA_STREAM_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_twiml_order() {
        let xml = Greeting::default().twiml("bridge.example.com");

        let welcome = xml.find("Thank you for calling.").unwrap();
        let pause = xml.find("<Pause length=\"1\"/>").unwrap();
        let connected = xml.find("You are now connected.").unwrap();
        let stream = xml
            .find(r#"<Stream url="wss://bridge.example.com/media-stream"/>"#)
            .unwrap();

        assert!(welcome < pause && pause < connected && connected < stream);
        assert!(xml.contains(r#"voice="Polly.Matthew""#));
        assert!(xml.contains("<Connect>"));
    }
}
