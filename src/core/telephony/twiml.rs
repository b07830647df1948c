//! Minimal TwiML document builder.
//!
//! Covers the verbs the gateway emits: greeting the caller, connecting a
//! media stream, and parking both legs of a transfer in a conference.

use std::fmt::Write;

/// Voice used for every `<Say>` the gateway emits unless configured otherwise.
pub const DEFAULT_SAY_VOICE: &str = "Polly.Matthew";

#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    Say { voice: Option<String>, text: String },
    Pause { length: u32 },
    ConnectStream { url: String },
    DialConference(Conference),
}

/// `<Dial><Conference>` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conference {
    pub name: String,
    pub start_on_enter: bool,
    pub end_on_exit: bool,
    pub wait_url: Option<String>,
    pub beep: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, voice: Option<&str>, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            voice: voice.map(str::to_string),
            text: text.into(),
        });
        self
    }

    pub fn pause(mut self, length: u32) -> Self {
        self.verbs.push(Verb::Pause { length });
        self
    }

    pub fn connect_stream(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::ConnectStream { url: url.into() });
        self
    }

    pub fn dial_conference(mut self, conference: Conference) -> Self {
        self.verbs.push(Verb::DialConference(conference));
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);

        for verb in &self.verbs {
            match verb {
                Verb::Say { voice, text } => {
                    match voice {
                        Some(voice) => {
                            let _ = write!(xml, r#"<Say voice="{}">"#, escape(voice));
                        }
                        None => xml.push_str("<Say>"),
                    }
                    xml.push_str(&escape(text));
                    xml.push_str("</Say>");
                }
                Verb::Pause { length } => {
                    let _ = write!(xml, r#"<Pause length="{length}"/>"#);
                }
                Verb::ConnectStream { url } => {
                    let _ = write!(xml, r#"<Connect><Stream url="{}"/></Connect>"#, escape(url));
                }
                Verb::DialConference(conference) => {
                    xml.push_str("<Dial><Conference");
                    let _ = write!(
                        xml,
                        r#" startConferenceOnEnter="{}" endConferenceOnExit="{}""#,
                        conference.start_on_enter, conference.end_on_exit
                    );
                    if let Some(beep) = conference.beep {
                        let _ = write!(xml, r#" beep="{beep}""#);
                    }
                    if let Some(wait_url) = &conference.wait_url {
                        let _ = write!(xml, r#" waitUrl="{}""#, escape(wait_url));
                    }
                    xml.push('>');
                    xml.push_str(&escape(&conference.name));
                    xml.push_str("</Conference></Dial>");
                }
            }
        }

        xml.push_str("</Response>");
        xml
    }
}

/// Escape text for use in XML content and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_and_stream() {
        let xml = VoiceResponse::new()
            .say(Some(DEFAULT_SAY_VOICE), "Thank you for calling.")
            .pause(1)
            .connect_stream("wss://example.com/media-stream")
            .to_xml();

        assert_eq!(
            xml,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#,
                r#"<Say voice="Polly.Matthew">Thank you for calling.</Say>"#,
                r#"<Pause length="1"/>"#,
                r#"<Connect><Stream url="wss://example.com/media-stream"/></Connect>"#,
                "</Response>"
            )
        );
    }

    #[test]
    fn test_conference_attributes() {
        let xml = VoiceResponse::new()
            .dial_conference(Conference {
                name: "transfer_CA1".to_string(),
                start_on_enter: false,
                end_on_exit: false,
                wait_url: Some("http://twimlets.com/holdmusic?Bucket=a&b=c".to_string()),
                beep: None,
            })
            .to_xml();

        assert!(xml.contains(r#"startConferenceOnEnter="false""#));
        assert!(xml.contains(r#"endConferenceOnExit="false""#));
        assert!(xml.contains(r#"waitUrl="http://twimlets.com/holdmusic?Bucket=a&amp;b=c""#));
        assert!(xml.contains(">transfer_CA1</Conference></Dial>"));
        assert!(!xml.contains("beep"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
        let xml = VoiceResponse::new().say(None, "Tom & Jerry").to_xml();
        assert!(xml.contains("<Say>Tom &amp; Jerry</Say>"));
    }
}
