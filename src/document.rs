//! The exported sprite sheet document: a TOML file with one `image` header and
//! one `[[sprite]]` block per rectangle. TOML has no per-entry comment field,
//! so comments travel out of band as a `# <comment>` line immediately before
//! the block they belong to. Encoding splices those lines into the structured
//! output; decoding runs the structured parse and an independent line scan,
//! then zips the two by positional index (the Nth parsed block gets the Nth
//! scanned comment).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sprites::SpriteStore;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("invalid sprite document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not encode sprite document: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocEntry {
    pub name: String,
    pub comment: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteDoc {
    pub image: String,
    pub sprites: Vec<DocEntry>,
}

/// The structured half of the format, what the TOML layer actually sees.
#[derive(Serialize, Deserialize)]
struct RawDoc {
    image: String,
    #[serde(default)]
    sprite: Vec<RawSprite>,
}

#[derive(Serialize, Deserialize)]
struct RawSprite {
    name: String,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Snapshot the store in z-order.
pub fn export(store: &SpriteStore, image_name: &str) -> SpriteDoc {
    SpriteDoc {
        image: image_name.to_owned(),
        sprites: store
            .sprites()
            .iter()
            .map(|s| DocEntry {
                name: s.name.clone(),
                comment: s.comment.clone(),
                x: s.x,
                y: s.y,
                width: s.width,
                height: s.height,
            })
            .collect(),
    }
}

/// Replace the store's contents wholesale; every entry gets a fresh id and any
/// previous selection is gone.
pub fn import(store: &mut SpriteStore, doc: &SpriteDoc) {
    store.replace_all(doc.sprites.iter().map(|e| {
        (
            e.name.clone(),
            e.comment.clone(),
            e.x,
            e.y,
            e.width,
            e.height,
        )
    }));
    log::info!(
        "imported {} sprite(s) for image {:?}",
        doc.sprites.len(),
        doc.image
    );
}

pub fn encode(doc: &SpriteDoc) -> Result<String, DocError> {
    let raw = RawDoc {
        image: doc.image.clone(),
        sprite: doc
            .sprites
            .iter()
            .map(|e| RawSprite {
                name: e.name.clone(),
                x: e.x,
                y: e.y,
                width: e.width,
                height: e.height,
            })
            .collect(),
    };
    let text = toml::to_string(&raw)?;

    // Splice each non-empty comment in immediately before its block. The
    // format carries exactly one comment line per block, so multi-line
    // comment text is flattened with spaces to keep the output parseable.
    let mut comments = doc.sprites.iter().map(|e| flatten_comment(&e.comment));
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim() == "[[sprite]]" {
            match comments.next() {
                Some(c) if !c.is_empty() => {
                    out.push_str("# ");
                    out.push_str(&c);
                    out.push('\n');
                }
                _ => {}
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

pub fn decode(text: &str) -> Result<SpriteDoc, DocError> {
    let raw: RawDoc = toml::from_str(text)?;
    let comments = scan_comments(text);
    let sprites = raw
        .sprite
        .into_iter()
        .enumerate()
        .map(|(i, s)| DocEntry {
            name: s.name,
            comment: comments.get(i).cloned().unwrap_or_default(),
            x: s.x,
            y: s.y,
            width: s.width,
            height: s.height,
        })
        .collect();
    Ok(SpriteDoc {
        image: raw.image,
        sprites,
    })
}

fn flatten_comment(comment: &str) -> String {
    comment
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line scan recovering one comment per `[[sprite]]` block. A comment line
/// sets the pending comment; a block header consumes it; any other non-blank
/// line clears it, so a comment only counts when it immediately precedes its
/// block.
fn scan_comments(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix('#') {
            pending = rest.trim().to_owned();
        } else if is_sprite_header(line) {
            out.push(std::mem::take(&mut pending));
        } else if !line.is_empty() {
            pending.clear();
        }
    }
    out
}

/// Only `[[sprite]]` headers count as rectangle blocks; any other
/// array-of-tables header is an ordinary non-blank line to the scan.
fn is_sprite_header(line: &str) -> bool {
    line.strip_prefix("[[")
        .and_then(|l| l.strip_suffix("]]"))
        .is_some_and(|inner| inner.trim() == "sprite")
}
