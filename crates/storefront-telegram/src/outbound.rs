// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyboard conversion and message splitting for outbound delivery.

use storefront_core::Keyboard;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

/// Telegram's limit for a single text message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Maps a channel-agnostic keyboard onto Telegram reply markup.
///
/// Inline rows become callback buttons. Menu rows become a resized reply
/// keyboard.
pub fn to_reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(rows) => {
            let rows: Vec<Vec<InlineKeyboardButton>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.command.clone()))
                        .collect()
                })
                .collect();
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
        Keyboard::Menu(rows) => {
            let rows: Vec<Vec<KeyboardButton>> = rows
                .iter()
                .map(|row| row.iter().map(KeyboardButton::new).collect())
                .collect();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
    }
}

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Cuts prefer a blank line, then a newline, then a space; a hard cut is the
/// last resort. Cuts always fall on character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (head, tail) = split_once_at(rest, max_chars.max(1));
        chunks.push(head.to_string());
        rest = tail;
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

fn split_once_at(text: &str, max_chars: usize) -> (&str, &str) {
    let limit = match text.char_indices().nth(max_chars) {
        Some((byte, _)) => byte,
        None => return (text, ""),
    };
    let window = &text[..limit];

    if let Some(pos) = window.rfind("\n\n").filter(|&p| p > 0) {
        return (&text[..pos], text[pos + 2..].trim_start_matches('\n'));
    }
    if let Some(pos) = window.rfind('\n').filter(|&p| p > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }
    if let Some(pos) = window.rfind(' ').filter(|&p| p > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }
    (window, &text[limit..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Button;

    #[test]
    fn inline_keyboard_keeps_layout() {
        let keyboard = Keyboard::Inline(vec![
            vec![Button::new("➖", "dec:1"), Button::new("➕", "inc:1")],
            vec![Button::new("🛒 Cart", "cart")],
        ]);
        match to_reply_markup(&keyboard) {
            ReplyMarkup::InlineKeyboard(markup) => {
                assert_eq!(markup.inline_keyboard.len(), 2);
                assert_eq!(markup.inline_keyboard[0].len(), 2);
                assert_eq!(markup.inline_keyboard[1][0].text, "🛒 Cart");
            }
            other => panic!("expected inline keyboard, got {other:?}"),
        }
    }

    #[test]
    fn menu_keyboard_is_resized() {
        let keyboard = Keyboard::Menu(vec![vec!["Catalog".into(), "Cart".into()]]);
        match to_reply_markup(&keyboard) {
            ReplyMarkup::Keyboard(markup) => {
                assert!(markup.resize_keyboard);
                assert_eq!(markup.keyboard[0][1].text, "Cart");
            }
            other => panic!("expected reply keyboard, got {other:?}"),
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("hello", 100), vec!["hello"]);
        assert_eq!(split_text("", 100), vec![""]);
    }

    #[test]
    fn split_prefers_blank_line() {
        let chunks = split_text("A\nB\n\nC\nD", 6);
        assert_eq!(chunks, vec!["A\nB", "C\nD"]);
    }

    #[test]
    fn split_falls_back_to_space_then_hard_cut() {
        assert_eq!(split_text("OneLongWordThen another", 20), vec!["OneLongWordThen", "another"]);
        assert_eq!(split_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn split_respects_multibyte_characters() {
        let text = "Чай ".repeat(10);
        let chunks = split_text(&text, 7);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
        assert_eq!(chunks.concat().replace(' ', ""), text.replace(' ', ""));
    }
}
