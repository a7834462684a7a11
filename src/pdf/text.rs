//! Text fields: Helvetica metrics, soft wrapping and content operators

use lopdf::{Document, Object, ObjectId, Dictionary};
use log::debug;
use crate::field::Field;
use crate::layout::text_origin;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : ; < = > ? @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ \ ] ^ _ `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { | } ~
];

/// Width used for anything outside printable ASCII
const DEFAULT_WIDTH: u16 = 556;

/// Create a standard Type1 Helvetica font with WinAnsiEncoding
///
/// One of the 14 standard PDF fonts, so nothing needs embedding.
pub fn add_helvetica(doc: &mut Document) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    doc.add_object(Object::Dictionary(font))
}

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        0xA0 => 278,
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` set in Helvetica at `font_size`
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c) as u32).sum();
    units as f32 * font_size / 1000.0
}

/// Break text into lines no wider than `max_width`
///
/// Explicit newlines always break. Words are packed greedily; a word that
/// cannot fit on a line of its own is split between characters. Every
/// line holds at least one character, so a zero-width box still terminates.
pub fn wrap_lines(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut line = String::new();

        for (i, word) in paragraph.split(' ').enumerate() {
            let candidate = if i == 0 { word.to_string() } else { format!("{} {}", line, word) };
            if text_width(&candidate, font_size) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(word, font_size) <= max_width {
                line = word.to_string();
                continue;
            }

            for ch in word.chars() {
                let mut next = line.clone();
                next.push(ch);
                if !line.is_empty() && text_width(&next, font_size) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push(ch);
                } else {
                    line = next;
                }
            }
        }

        lines.push(line);
    }

    lines
}

/// Map text to WinAnsiEncoding bytes; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut substituted = 0usize;
    let bytes = text
        .chars()
        .map(|c| {
            win_ansi_byte(c).unwrap_or_else(|| {
                substituted += 1;
                b'?'
            })
        })
        .collect();

    if substituted > 0 {
        debug!("{} character(s) in {:?} have no WinAnsi code, drawn as '?'", substituted, text);
    }
    bytes
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        0x20AC => 0x80, // €
        0x201A => 0x82,
        0x201E => 0x84,
        0x2026 => 0x85, // …
        0x2022 => 0x95, // •
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2122 => 0x99, // ™
        0x09 => b' ',
        _ => return None,
    };
    Some(byte)
}

/// Write `bytes` as a PDF literal string, escaping delimiters
fn push_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }
    out.push(b')');
}

/// Append the operators that draw a text field
///
/// The first baseline sits `font_size + padding` below the box top; following
/// lines step down by `font_size × line_height_factor`.
pub fn write_text_field(
    out: &mut Vec<u8>,
    field: &Field,
    font_name: &str,
    page_height: f32,
    padding: f32,
    line_height_factor: f32,
) {
    let font_size = field.font_size as f32;
    let origin = text_origin(field.position, font_size, page_height, padding);
    let text = field.content.as_deref().unwrap_or("");
    let lines = wrap_lines(text, font_size, field.size.width);

    out.extend_from_slice(b"BT\n");
    out.extend_from_slice(format!("/{} {} Tf\n", font_name, font_size).as_bytes());
    out.extend_from_slice(format!("{} TL\n", font_size * line_height_factor).as_bytes());
    out.extend_from_slice(b"0 g\n");
    out.extend_from_slice(format!("1 0 0 1 {} {} Tm\n", origin.x, origin.y).as_bytes());

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b"T*\n");
        }
        push_literal(out, &encode_win_ansi(line));
        out.extend_from_slice(b" Tj\n");
    }

    out.extend_from_slice(b"ET\n");
}
