//! Structured chat replies.
//!
//! Every outcome a user can see is a [`Response`] variant, and [`render`] is
//! the only place that turns one into a [`Reply`].

use std::fmt;

use serde::Serialize;

use crate::models::BotConfig;
use crate::services::Resolution;
use crate::utils::natural_age;

/// What the bot has to say about one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The command had no usable name
    InvalidFormat,
    /// The resolver ran
    Resolved(Resolution),
}

/// A labeled value shown under the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
}

/// Transport-agnostic rich reply (title, body, images, fields, footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ReplyField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Reply {
    fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: None,
            thumbnail: None,
            fields: Vec::new(),
            footer: None,
        }
    }

    fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(ReplyField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    fn aged(mut self, age: chrono::Duration) -> Self {
        self.footer = Some(format!("Backer info last dumped {}.", natural_age(age)));
        self
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        writeln!(f, "{}", self.description)?;
        if let Some(thumbnail) = &self.thumbnail {
            writeln!(f, "[thumbnail] {thumbnail}")?;
        }
        for field in &self.fields {
            writeln!(f, "{} {}", field.name, field.value)?;
        }
        if let Some(image) = &self.image {
            writeln!(f, "[image] {image}")?;
        }
        if let Some(footer) = &self.footer {
            writeln!(f, "-- {footer}")?;
        }
        Ok(())
    }
}

/// Turn a response into the reply the transport will send.
pub fn render(response: &Response, bot: &BotConfig) -> Reply {
    match response {
        Response::InvalidFormat => Reply::new(
            "Invalid Format",
            format!(
                "Please use `{} backer name` to invoke the bot. Name must be exact.",
                bot.command_prefix
            ),
        ),
        Response::Resolved(Resolution::NoSnapshotYet) => Reply::new(
            "Please focus on it.",
            "Backer list has not been dumped yet, this bot will dump backer info every hour.",
        ),
        Response::Resolved(Resolution::NotFoundInSnapshot { name, age }) => {
            let mut reply = Reply::new(
                name.clone(),
                "No such user found in backer info.\n\n\
                 Check exact spelling, or you may have backed anonymously. \
                 See image for how to change your profile name and set contribution visibility.\n\n\
                 This bot will dump backer info every hour.",
            )
            .aged(*age);
            reply.image = Some(bot.help_image_url.clone());
            reply
        }
        Response::Resolved(Resolution::Found {
            backer,
            age,
            also_at,
        }) => {
            let place = backer
                .place_in_line
                .map_or_else(|| "unranked".to_string(), |p| p.to_string());
            let mut reply = Reply::new(backer.display_name.clone(), bot.found_note.clone())
            .field("Current place in line:", place)
            .field("Contribution made:", backer.contributed_at.clone());

            if !also_at.is_empty() {
                let places: Vec<String> = also_at.iter().map(u32::to_string).collect();
                reply = reply.field("Also listed at:", places.join(", "));
            }
            if !backer.image_url.is_empty() {
                reply.thumbnail = Some(backer.image_url.clone());
            }
            reply.aged(*age)
        }
        Response::Resolved(Resolution::Unavailable { .. }) => Reply::new(
            "Backer info unavailable",
            "The backer list could not be read right now. Please try again later.",
        ),
    }
}
