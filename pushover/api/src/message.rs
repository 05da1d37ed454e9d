use std::borrow::Cow;

use crate::is_blank;

/// Messages may be sent with a different priority
/// that affects how the message is presented to the user. <https://pushover.net/api#priority>
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
pub enum Priority {
    /// Low
    #[strum(to_string = "-1", serialize = "low")]
    Low,
    /// Normal (default)
    #[strum(to_string = "0", serialize = "normal")]
    Normal,
    /// High
    #[strum(to_string = "1", serialize = "high")]
    High,
}

impl Priority {
    /// Anything at or below -1 is [`Priority::Low`], anything at or above 1 is [`Priority::High`].
    pub fn clamp(priority: i32) -> Self {
        if priority <= -1 {
            Priority::Low
        } else if priority >= 1 {
            Priority::High
        } else {
            Priority::Normal
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl From<Priority> for i32 {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Low => -1,
            Priority::Normal => 0,
            Priority::High => 1,
        }
    }
}

/// Message parameters <https://pushover.net/api#messages>.
///
/// Blank fields are left out of the payload.
#[derive(Default, Debug, Clone)]
pub struct Message<'a> {
    message: Cow<'a, str>,
    /// Your message's title, otherwise your app's name is used. <https://pushover.net/api#messages>
    pub title: Option<&'a str>,
    /// A supplementary URL to show with your message. <https://pushover.net/api#urls>
    pub url: Option<&'a str>,
    /// A title for your supplementary URL,
    /// otherwise just the URL is shown. <https://pushover.net/api#urls>
    pub url_title: Option<&'a str>,
    /// Clamped into [-1, 1] when encoded, see [`Priority::clamp`]. <https://pushover.net/api#priority>
    pub priority: i32,
}

fn add_optional_text(payload: &mut String, name: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !is_blank(v)) {
        payload.push('&');
        payload.push_str(name);
        payload.push('=');
        payload.push_str(&urlencoding::encode(v));
    }
}

impl<'a> Message<'a> {
    /// Creates a [`Message`] with normal priority.
    pub fn new<T>(message: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Appends percent-encoded fields to `authentication_tokens` and returns the payload.
    pub fn encode(&self, authentication_tokens: &str) -> String {
        let mut payload = String::from(authentication_tokens);

        add_optional_text(&mut payload, "message", Some(self.message.as_ref()));
        add_optional_text(&mut payload, "title", self.title);
        add_optional_text(&mut payload, "url", self.url);
        add_optional_text(&mut payload, "url_title", self.url_title);

        if self.priority != i32::from(Priority::Normal) {
            payload.push_str("&priority=");
            payload.push_str(&Priority::clamp(self.priority).to_string());
        }

        payload
    }
}
