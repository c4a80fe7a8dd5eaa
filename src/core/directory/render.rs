//! Chat card rendering
//!
//! Turns resolved records into display blocks (optional image, then an info
//! block) and wraps them into a reply payload. Rendering is pure apart from
//! read-only existence checks on the local asset directory.

use serde::{Deserialize, Serialize};
use url::Url;

use super::cascade::DirectoryMatches;
use super::config::AssetsConfig;
use super::normalize::normalize;
use super::store::{RecordKind, RoomRecord};

/// Image extensions tried, in order, for building assets.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Marker prefix for `mapa_url` values that point into the asset directory.
pub const LOCAL_MARKER: &str = "local:";

/// One block of a chat card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBlock {
    Image { url: String, alt: String },
    Info { title: String, subtitle: String },
}

/// Card for a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyCard {
    pub id: i64,
    pub kind: RecordKind,
    pub blocks: Vec<DisplayBlock>,
}

/// Reply payload for one chat query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub query: String,
    pub text: String,
    pub cards: Vec<ReplyCard>,
}

/// Renders records into chat cards.
#[derive(Debug, Clone, Default)]
pub struct CardRenderer {
    assets: AssetsConfig,
}

impl CardRenderer {
    pub fn new(assets: AssetsConfig) -> Self {
        Self { assets }
    }

    /// Image block (when an image is available) followed by the info block.
    pub fn render(&self, record: &RoomRecord) -> Vec<DisplayBlock> {
        let title = record_title(record);
        let mut blocks = Vec::with_capacity(2);

        if let Some(url) = self.image_url(record) {
            blocks.push(DisplayBlock::Image {
                url,
                alt: title.clone(),
            });
        }

        blocks.push(DisplayBlock::Info {
            title,
            subtitle: self.subtitle(record),
        });
        blocks
    }

    /// Reply for a resolved query; an empty match set gets a friendly message.
    pub fn reply(&self, query: &str, matches: &DirectoryMatches) -> ChatReply {
        let cards: Vec<ReplyCard> = matches
            .iter()
            .map(|record| ReplyCard {
                id: record.id,
                kind: record.kind,
                blocks: self.render(record),
            })
            .collect();

        let text = match cards.len() {
            0 => format!(
                "No encontré salones ni laboratorios que coincidan con \"{}\". \
                 Intenta con otro nombre o número.",
                query.trim()
            ),
            1 => format!("Encontré 1 resultado para \"{}\".", query.trim()),
            n => format!("Encontré {} resultados para \"{}\".", n, query.trim()),
        };

        ChatReply {
            query: query.to_string(),
            text,
            cards,
        }
    }

    /// Generic reply used when the store could not be queried.
    pub fn failure_reply(&self, query: &str) -> ChatReply {
        ChatReply {
            query: query.to_string(),
            text: "Ocurrió un problema al consultar el directorio. \
                   Intenta de nuevo más tarde."
                .to_string(),
            cards: Vec::new(),
        }
    }

    fn subtitle(&self, record: &RoomRecord) -> String {
        let or_placeholder = |value: Option<&str>| -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(&self.assets.placeholder)
                .to_string()
        };

        format!(
            "Edificio: {} | Piso: {} | Ubicación: {}",
            or_placeholder(record.edificio.as_deref()),
            or_placeholder(record.piso.as_deref()),
            or_placeholder(record.ubicacion.as_deref()),
        )
    }

    /// Display URL: local building asset first, then the stored link.
    pub fn image_url(&self, record: &RoomRecord) -> Option<String> {
        record
            .edificio
            .as_deref()
            .and_then(|building| self.local_building_asset(building))
            .or_else(|| {
                record
                    .mapa_url
                    .as_deref()
                    .and_then(|link| self.stored_link_url(link))
            })
    }

    fn local_building_asset(&self, building: &str) -> Option<String> {
        let dir = self.assets.dir.as_ref()?;

        for basename in building_basenames(building) {
            for ext in IMAGE_EXTENSIONS {
                let file_name = format!("{basename}.{ext}");
                if dir.join(&file_name).is_file() {
                    return Some(self.public_url(&file_name));
                }
            }
        }
        None
    }

    fn stored_link_url(&self, link: &str) -> Option<String> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        if let Some(file_name) = link.strip_prefix(LOCAL_MARKER) {
            let file_name = file_name.trim().trim_start_matches('/');
            return (!file_name.is_empty()).then(|| self.public_url(file_name));
        }

        if link.starts_with("http://") || link.starts_with("https://") {
            return Some(drive_direct_link(link).unwrap_or_else(|| link.to_string()));
        }

        Some(self.public_url(link.trim_start_matches('/')))
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.assets.base_url.trim_end_matches('/'), file_name)
    }
}

/// Title: name, else primary code.
fn record_title(record: &RoomRecord) -> String {
    record
        .nombre
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or(record.code.as_deref())
        .unwrap_or("Sin nombre")
        .trim()
        .to_string()
}

/// Asset file stems a building image may be saved under.
///
/// "Edificio 1" → `edificio_1`, `edificio-1`, `edificio1`.
pub fn building_basenames(building: &str) -> Vec<String> {
    let words: Vec<String> = normalize(building)
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return Vec::new();
    }

    let mut basenames = Vec::with_capacity(3);
    for candidate in [words.join("_"), words.join("-"), words.concat()] {
        if !basenames.contains(&candidate) {
            basenames.push(candidate);
        }
    }
    basenames
}

/// Rewrite a Google Drive share link to its direct-view form.
///
/// Handles `/file/d/<id>/view` and `open?id=<id>` links; anything else
/// returns `None`.
pub fn drive_direct_link(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    if parsed.host_str()? != "drive.google.com" {
        return None;
    }

    let from_path = parsed.path_segments().and_then(|segments| {
        let segments: Vec<&str> = segments.collect();
        segments
            .iter()
            .position(|s| *s == "d")
            .and_then(|pos| segments.get(pos + 1))
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
    });

    let id = from_path.or_else(|| {
        parsed
            .query_pairs()
            .find(|(key, value)| key == "id" && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })?;

    Some(format!("https://drive.google.com/uc?export=view&id={id}"))
}
