use super::{error::SchemaViolation, fields::Fields};
use crate::document::{Body, JsonObject, Value};
use serde::Serialize;

const METHOD_BLOCK: &str = "method";
const DEFAULT_MOUNT_PREFIX: &str = "auth";
const KNOWN_FIELDS: &[&str] = &["type", "mount_path", "config"];

/// The way the agent authenticates against the secrets backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Method {
    /// The authentication method type, e.g. `aws-iam`.
    #[serde(rename = "type")]
    pub kind: String,

    /// The path the method is mounted at, without a trailing slash.
    pub mount_path: String,

    /// Method specific parameters.
    pub config: JsonObject,
}

/// Extract the single `method` block out of an `auto_auth` block.
pub(crate) fn extract_method(list: &Body) -> Result<Method, SchemaViolation> {
    let mut items = list.filter(METHOD_BLOCK);
    let (Some(item), None) = (items.next(), items.next()) else {
        return Err(SchemaViolation::ExactlyOneBlock(METHOD_BLOCK));
    };
    let Value::Object(body) = item.value() else {
        return Err(SchemaViolation::NotAnObject(METHOD_BLOCK));
    };
    let fields = Fields::new(body);

    let kind = fields.string("type")?.filter(|kind| !kind.is_empty()).ok_or(SchemaViolation::MissingMethodType)?;
    let mut mount_path = fields
        .string("mount_path")?
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| format!("{DEFAULT_MOUNT_PREFIX}/{kind}"));
    if mount_path.ends_with('/') {
        mount_path.pop();
    }

    // Anything we don't know about is handed over to the method as-is, unless `config` already sets it.
    let mut config = fields.object("config")?.unwrap_or_default();
    for (name, value) in body.to_json() {
        if !KNOWN_FIELDS.contains(&name.as_str()) {
            config.entry(name).or_insert(value);
        }
    }
    Ok(Method { kind, mount_path, config })
}
