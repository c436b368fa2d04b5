use colored::Colorize;
use std::fmt;

use crate::dialogue::{Attachment, Menu, Reply};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => format!("[i] {text}"),
        MessageKind::Success => format!("[ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints a numbered button list; numbers can be used with `tap`.
pub fn menu(menu: &Menu) {
    for (index, button) in menu.buttons().enumerate() {
        println!(
            "  {} {}  {}",
            format!("[{}]", index + 1).bright_cyan(),
            button.label,
            format!("({})", button.data()).dimmed()
        );
    }
}

/// Prints every message of a reply. Attachments other than exports are described by their text.
pub fn reply(reply: &Reply) {
    for message in &reply.messages {
        println!();
        println!("{}", message.text);
        if let Some(Attachment::Export(file)) = &message.attachment {
            info(format!("{} ({} bytes)", file.file_name, file.bytes.len()));
        }
    }
    if let Some(last) = reply.menu() {
        println!();
        menu(last);
    }
}
