//! Packing of payloads into text blobs for a string-only store.
//!
//! JSON payloads are zlib-compressed and then base64 encoded with the
//! standard padded alphabet. Position lists skip the compressor since the
//! position codec already packs them tighter than deflate would.
//!
//! The async entry points run on the blocking pool and must be awaited
//! before the blob is used.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 4);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

pub fn to_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_text(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

pub fn pack_json_blocking<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(to_text(&compress(&json)?))
}

pub fn unpack_json_blocking<T: DeserializeOwned>(text: &str) -> Result<T> {
    let json = decompress(&from_text(text)?)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Serializes, compresses and transcodes `value`.
pub async fn pack_json<T>(value: T) -> Result<String>
where
    T: Serialize + Send + 'static,
{
    offload(move || pack_json_blocking(&value)).await
}

/// Reverses [`pack_json`].
pub async fn unpack_json<T>(text: String) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    offload(move || unpack_json_blocking(&text)).await
}

pub async fn pack_bytes(bytes: Vec<u8>) -> Result<String> {
    offload(move || Ok(to_text(&bytes))).await
}

pub async fn unpack_bytes(text: String) -> Result<Vec<u8>> {
    offload(move || from_text(&text)).await
}

pub(crate) async fn offload<F, R>(work: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
