// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encoding gateway for record and artifact files.
//!
//! Every read of a questionnaire record goes through [`EncodingGateway`].
//! Bytes are decoded with the primary encoding first, then with a
//! configured fallback, then with a detector guess. When several fallbacks
//! decode cleanly the detector picks among them, otherwise the first one in
//! configured order wins. A decode only counts when it is error-free; lossy
//! replacement is never accepted. Writes are always canonical UTF-8.

use encoding_rs::{Encoding, BIG5, GB18030, GBK, UTF_8};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the encoding gateway
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} could not be decoded as {tried}", path.display())]
    Undecodable { path: PathBuf, tried: String },
}

/// Text decoded from bytes, with the encoding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

#[derive(Debug, Clone)]
pub struct EncodingGateway {
    primary: &'static Encoding,
    fallbacks: Vec<&'static Encoding>,
    detect: bool,
}

impl Default for EncodingGateway {
    fn default() -> Self {
        Self {
            primary: UTF_8,
            fallbacks: vec![GB18030, BIG5],
            detect: true,
        }
    }
}

impl EncodingGateway {
    pub fn new(primary: &'static Encoding, fallbacks: Vec<&'static Encoding>) -> Self {
        Self {
            primary,
            fallbacks,
            detect: true,
        }
    }

    /// Disable the detector step, leaving only primary and fallbacks.
    pub fn without_detection(mut self) -> Self {
        self.detect = false;
        self
    }

    /// Resolve encoding labels such as `"gbk"` or `"shift_jis"`.
    ///
    /// Returns the first label that is not a known encoding as the error.
    pub fn from_labels(primary: &str, fallbacks: &[String]) -> Result<Self, String> {
        let lookup = |label: &str| {
            Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| label.to_string())
        };
        let primary = lookup(primary)?;
        let fallbacks = fallbacks
            .iter()
            .map(|l| lookup(l))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(primary, fallbacks))
    }

    /// Decode raw bytes without loss, or `None` if no candidate fits.
    pub fn decode(&self, bytes: &[u8]) -> Option<Decoded> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            return strict_decode(encoding, &bytes[bom_len..]).map(|text| Decoded {
                text: text.into_owned(),
                encoding,
            });
        }

        if let Some(text) = strict_decode(self.primary, bytes) {
            return Some(Decoded {
                text: text.into_owned(),
                encoding: self.primary,
            });
        }

        // Legacy CJK encodings overlap heavily (most Big5 bytes are also
        // valid GB18030), so a clean decode alone cannot pick a fallback.
        let guess = (self.detect || self.fallbacks.len() > 1).then(|| detect(bytes));
        let clean: Vec<(&'static Encoding, Cow<'_, str>)> = self
            .fallbacks
            .iter()
            .filter_map(|&encoding| strict_decode(encoding, bytes).map(|text| (encoding, text)))
            .collect();
        let preferred = guess.and_then(|guess| {
            clean
                .iter()
                .position(|(encoding, _)| same_family(guess, *encoding))
        });
        if let Some((encoding, text)) = clean.into_iter().nth(preferred.unwrap_or(0)) {
            return Some(Decoded {
                text: text.into_owned(),
                encoding,
            });
        }

        if let Some(guess) = guess.filter(|_| self.detect) {
            if let Some(text) = strict_decode(guess, bytes) {
                tracing::debug!(encoding = guess.name(), "decoded with detected encoding");
                return Some(Decoded {
                    text: text.into_owned(),
                    encoding: guess,
                });
            }
        }
        None
    }

    /// Read a file and decode it to text.
    pub fn read_text(&self, path: &Path) -> Result<String, EncodingError> {
        let bytes = fs::read(path).map_err(|source| EncodingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match self.decode(&bytes) {
            Some(decoded) => {
                if decoded.encoding != self.primary {
                    tracing::info!(
                        path = %path.display(),
                        encoding = decoded.encoding.name(),
                        "record decoded with fallback encoding"
                    );
                }
                Ok(decoded.text)
            }
            None => Err(EncodingError::Undecodable {
                path: path.to_path_buf(),
                tried: self.tried(),
            }),
        }
    }

    /// Write text as UTF-8, replacing the file atomically.
    ///
    /// Parent directories are created as needed.
    pub fn write_text(&self, path: &Path, text: &str) -> Result<(), EncodingError> {
        let io_err = |source| EncodingError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        // Keep the full file name so `a.json` and `a.txt` never share a tmp file
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(text.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, path).map_err(io_err)
    }

    fn tried(&self) -> String {
        let mut names: Vec<&str> = std::iter::once(self.primary)
            .chain(self.fallbacks.iter().copied())
            .map(Encoding::name)
            .collect();
        if self.detect {
            names.push("detected encoding");
        }
        names.join(", ")
    }
}

fn detect(bytes: &[u8]) -> &'static Encoding {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// The detector reports GBK for simplified Chinese; GB18030 is its superset.
fn same_family(guess: &'static Encoding, candidate: &'static Encoding) -> bool {
    guess == candidate || (guess == GBK && candidate == GB18030)
}

fn strict_decode<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

#[cfg(test)]
#[path = "encoding_tests.rs"]
mod tests;
