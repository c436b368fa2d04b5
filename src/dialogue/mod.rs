//! Conversational front: commands in, replies out, one explicit state machine per user.

pub mod command;
pub mod flow;
pub mod menu;
pub mod render;
pub mod session;

pub use command::{ChartRequest, Command, CommandParseError, DateChoice};
pub use flow::{Dialogue, Inbound, InboundEvent};
pub use menu::{Button, Menu};
pub use render::Renderer;
pub use session::{DialogueState, MemorySessionStore, SessionStore};

use crate::core::services::{DynamicsChart, ExportFile, PieChart};

/// Non-text payload attached to a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Export(ExportFile),
    Pie(PieChart),
    Dynamics(DynamicsChart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    pub menu: Option<Menu>,
    pub attachment: Option<Attachment>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
            attachment: None,
        }
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Everything sent back for one inbound event, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub messages: Vec<OutboundMessage>,
}

impl Reply {
    pub fn single(message: OutboundMessage) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn with_menu(text: impl Into<String>, menu: Menu) -> Self {
        Self::single(OutboundMessage::text(text).with_menu(menu))
    }

    pub fn push(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }

    /// Texts of all messages joined by blank lines.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Menu of the last message that carries one.
    pub fn menu(&self) -> Option<&Menu> {
        self.messages.iter().rev().find_map(|message| message.menu.as_ref())
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.messages
            .iter()
            .find_map(|message| message.attachment.as_ref())
    }
}
