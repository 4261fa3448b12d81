//! Channel/World model
//!
//! Read-only indexed time series of named signal channels. Loaded once
//! per run and shared by every component that executes against it.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Channel lookup failures during execution.
#[derive(Debug, Error, PartialEq)]
pub enum ChannelError {
    #[error("unknown channel in world: {0}")]
    NotFound(String),

    #[error("channel {channel} has no sample at or before t={t}")]
    NoSample { channel: String, t: f64 },
}

/// World loading failures.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("cannot read world {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("world is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("world JSON must contain an object 'channels'")]
    MissingChannels,

    #[error("cannot coerce channel {channel}: {message}")]
    Coerce { channel: String, message: String },
}

/// One named channel: an ordered sequence of `(timestamp, value)`
/// samples. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    samples: Vec<(f64, f64)>,
}

impl Channel {
    /// Build a channel, sorting samples by timestamp.
    pub fn new(name: impl Into<String>, mut samples: Vec<(f64, f64)>) -> Self {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            name: name.into(),
            samples,
        }
    }

    /// A constant channel: one sample pinned at t = 0.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, vec![(0.0, value)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    /// Value of the sample nearest-at-or-before `t`.
    pub fn sample_at(&self, t: f64) -> Result<f64, ChannelError> {
        self.samples
            .iter()
            .rev()
            .find(|(ts, _)| *ts <= t)
            .map(|(_, v)| *v)
            .ok_or_else(|| ChannelError::NoSample {
                channel: self.name.clone(),
                t,
            })
    }
}

/// Mapping from channel name to channel. Shared read-only across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    channels: IndexMap<String, Channel>,
}

impl World {
    pub fn new(channels: Vec<Channel>) -> Self {
        let mut map = IndexMap::new();
        for ch in channels {
            map.insert(ch.name().to_string(), ch);
        }
        Self { channels: map }
    }

    pub fn channel(&self, name: &str) -> Result<&Channel, ChannelError> {
        self.channels
            .get(name)
            .ok_or_else(|| ChannelError::NotFound(name.to_string()))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Load a world from a JSON file.
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let text = fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a world from JSON text.
    ///
    /// Channel descriptors are coerced tolerantly: a bare number, a
    /// wrapper object (`{"value": 0.1}`, `{"const": 0.1}`, ...), a list
    /// of `[t, value]` pairs, or `{"samples": [...]}`.
    pub fn from_json_str(text: &str) -> Result<Self, WorldError> {
        let root: Value = serde_json::from_str(text)?;
        let raw = root
            .get("channels")
            .and_then(Value::as_object)
            .ok_or(WorldError::MissingChannels)?;

        let mut channels = Vec::with_capacity(raw.len());
        for (name, descriptor) in raw {
            channels.push(coerce_channel(name, descriptor)?);
        }
        Ok(Self::new(channels))
    }
}

fn coerce_channel(name: &str, descriptor: &Value) -> Result<Channel, WorldError> {
    if let Some(v) = descriptor.as_f64() {
        return Ok(Channel::constant(name, v));
    }

    if let Some(list) = descriptor.as_array() {
        let mut samples = Vec::with_capacity(list.len());
        for entry in list {
            samples.push(coerce_sample(name, entry)?);
        }
        return Ok(Channel::new(name, samples));
    }

    if let Some(obj) = descriptor.as_object() {
        if let Some(list) = obj.get("samples").and_then(Value::as_array) {
            let mut samples = Vec::with_capacity(list.len());
            for entry in list {
                samples.push(coerce_sample(name, entry)?);
            }
            return Ok(Channel::new(name, samples));
        }
        // Wrapper keys tried in order, then single-entry unwrapping
        for key in ["value", "const", "s", "signal"] {
            if let Some(inner) = obj.get(key) {
                return coerce_channel(name, inner);
            }
        }
        if obj.len() == 1 {
            if let Some(inner) = obj.values().next() {
                return coerce_channel(name, inner);
            }
        }
        return Err(WorldError::Coerce {
            channel: name.to_string(),
            message: format!(
                "cannot coerce descriptor with keys {:?}",
                obj.keys().collect::<Vec<_>>()
            ),
        });
    }

    Err(WorldError::Coerce {
        channel: name.to_string(),
        message: format!("unsupported descriptor type: {}", descriptor),
    })
}

fn coerce_sample(name: &str, entry: &Value) -> Result<(f64, f64), WorldError> {
    if let Some(pair) = entry.as_array() {
        if pair.len() == 2 {
            if let (Some(t), Some(v)) = (pair[0].as_f64(), pair[1].as_f64()) {
                return Ok((t, v));
            }
        }
    }
    if let Some(obj) = entry.as_object() {
        if let (Some(t), Some(v)) = (
            obj.get("t").and_then(Value::as_f64),
            obj.get("v").and_then(Value::as_f64),
        ) {
            return Ok((t, v));
        }
    }
    Err(WorldError::Coerce {
        channel: name.to_string(),
        message: format!("sample must be [t, value] or {{\"t\", \"v\"}}: {}", entry),
    })
}
