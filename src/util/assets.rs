//! Embedded reference data. The catalogs ship inside the binary so the
//! engine has no runtime file dependencies.

use std::borrow::Cow;

use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;

use crate::domain::reference::ReferenceError;

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

pub const ULD_CATALOG: &str = "uld_catalog.json";
pub const MESSAGES: &str = "messages.json";
pub const QUESTIONS: &str = "questions.json";

/// Parses one embedded JSON catalog. A miss or parse failure is a
/// configuration error, not expected input.
pub fn parse_json<T: DeserializeOwned>(name: &'static str) -> Result<T, ReferenceError> {
    let raw = load_asset(name)?;
    serde_json::from_slice(raw.as_ref()).map_err(|source| ReferenceError::Parse {
        asset: name,
        source,
    })
}

fn load_asset(name: &'static str) -> Result<Cow<'static, [u8]>, ReferenceError> {
    EmbeddedAssets::get(name)
        .map(|file| file.data)
        .ok_or(ReferenceError::MissingAsset(name))
}
