use super::{
    duration::parse_duration_seconds,
    error::{AutoAuthError, CrossFieldViolation, SchemaViolation, SinkError, SinkErrorKind, SinkErrors},
    fields::Fields,
};
use crate::{
    document::{Body, Item, JsonObject, Value},
    env::EnvProvider,
};
use serde::Serialize;
use serde_with::{serde_as, DeserializeFromStr, DurationSeconds, SerializeDisplay};
use std::{fmt, str::FromStr, time::Duration};
use tracing::{debug, warn};

const SINK_BLOCK: &str = "sink";

/// A destination the agent writes its credential to.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sink {
    /// The sink type, lowercased. This selects the sink writer, e.g. `file`.
    #[serde(rename = "type")]
    pub kind: String,

    /// The TTL to use when response-wrapping the credential before writing it.
    ///
    /// A zero duration means the credential is not wrapped.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub wrap_ttl: Duration,

    /// The Diffie-Hellman settings used to encrypt the credential, if encryption is enabled.
    #[serde(flatten)]
    pub dh: Option<DhSettings>,

    /// Every field in the sink block, including the ones that were interpreted here.
    pub config: JsonObject,
}

impl Sink {
    /// The Diffie-Hellman key agreement type, if encryption is enabled.
    pub fn dh_type(&self) -> Option<DhType> {
        self.dh.as_ref().map(|dh| dh.dh_type)
    }

    /// The path to the peer's Diffie-Hellman public key, if encryption is enabled.
    pub fn dh_path(&self) -> Option<&str> {
        self.dh.as_ref().map(|dh| dh.path.as_str())
    }

    /// The additional authenticated data bound into the encryption.
    ///
    /// This is always empty when encryption is disabled.
    pub fn aad(&self) -> &str {
        self.dh.as_ref().map(|dh| dh.aad.as_str()).unwrap_or_default()
    }
}

/// The settings for encrypting a sink's credential using a Diffie-Hellman derived key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DhSettings {
    /// The key agreement to use.
    pub dh_type: DhType,

    /// The path to the peer's public key.
    #[serde(rename = "dh_path")]
    pub path: String,

    /// The additional authenticated data, possibly empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aad: String,
}

/// A Diffie-Hellman key agreement type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum DhType {
    /// X25519 key agreement.
    Curve25519,
}

impl fmt::Display for DhType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curve25519 => write!(f, "curve25519"),
        }
    }
}

impl FromStr for DhType {
    type Err = ParseDhTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curve25519" => Ok(Self::Curve25519),
            _ => Err(ParseDhTypeError(s.to_string())),
        }
    }
}

/// An error when parsing a [`DhType`].
#[derive(Debug, thiserror::Error)]
#[error("unsupported Diffie-Hellman type '{0}'")]
pub struct ParseDhTypeError(String);

/// Extract every `sink` block out of an `auto_auth` block.
///
/// Every sink is processed even if a previous one failed so that all errors can be reported at once.
pub(crate) fn extract_sinks(list: &Body, env: &dyn EnvProvider) -> Result<Vec<Sink>, AutoAuthError> {
    let items: Vec<_> = list.filter(SINK_BLOCK).collect();
    if items.is_empty() {
        return Err(AutoAuthError::Sink(SchemaViolation::AtLeastOneBlock(SINK_BLOCK)));
    }

    let mut sinks = Vec::new();
    let mut errors = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let sink_type = item.labels().first().map(|label| label.to_lowercase());
        let result = match &sink_type {
            Some(kind) => decode_sink(kind, item, env),
            None => Err(SchemaViolation::MissingSinkType.into()),
        };
        match result {
            Ok(sink) => sinks.push(sink),
            Err(kind) => {
                let error = SinkError { index, sink_type, kind };
                warn!(%error, position = %item.position(), "invalid sink");
                errors.push(error);
            }
        }
    }
    if errors.is_empty() {
        Ok(sinks)
    } else {
        Err(SinkErrors::new(errors, sinks).into())
    }
}

fn decode_sink(kind: &str, item: &Item, env: &dyn EnvProvider) -> Result<Sink, SinkErrorKind> {
    let Value::Object(body) = item.value() else {
        return Err(SchemaViolation::NotAnObject(SINK_BLOCK).into());
    };
    let fields = Fields::new(body);

    let wrap_ttl = match fields.value("wrap_ttl") {
        Some(value) => parse_duration_seconds("wrap_ttl", value)?,
        None => Duration::ZERO,
    };
    let dh_type = match fields.string("dh_type")? {
        Some(value) => {
            Some(value.parse::<DhType>().map_err(|_| SchemaViolation::InvalidValue { field: "dh_type", value })?)
        }
        None => None,
    };
    let dh_path = fields.string("dh_path")?.filter(|path| !path.is_empty());
    let aad = resolve_aad(kind, &fields, env)?;

    let dh = match (dh_type, dh_path) {
        (None, None) => {
            if !aad.is_empty() {
                return Err(CrossFieldViolation::AadWithoutDh.into());
            }
            None
        }
        (Some(dh_type), Some(path)) => Some(DhSettings { dh_type, path, aad }),
        _ => return Err(CrossFieldViolation::DhIncomplete.into()),
    };
    Ok(Sink { kind: kind.to_string(), wrap_ttl, dh, config: body.to_json() })
}

// A literal `aad` always takes precedence over `aad_env_var`.
fn resolve_aad(kind: &str, fields: &Fields<'_>, env: &dyn EnvProvider) -> Result<String, SchemaViolation> {
    if let Some(aad) = fields.string("aad")? {
        if fields.contains("aad_env_var") {
            debug!(sink = kind, "both 'aad' and 'aad_env_var' set, using 'aad'");
        }
        return Ok(aad);
    }
    let Some(name) = fields.string("aad_env_var")? else {
        return Ok(String::new());
    };
    match env.var(&name) {
        Some(aad) => Ok(aad),
        None => {
            debug!(sink = kind, variable = %name, "AAD environment variable is not set");
            Ok(String::new())
        }
    }
}
