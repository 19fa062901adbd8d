use super::{
    error::{AutoAuthError, SchemaViolation},
    method::{self, Method},
    sink::{self, Sink},
};
use crate::{
    document::{Body, Value},
    env::EnvProvider,
};
use serde::Serialize;

const AUTO_AUTH_BLOCK: &str = "auto_auth";

/// How the agent authenticates and where it delivers the resulting credential.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AutoAuth {
    method: Method,
    sinks: Vec<Sink>,
}

impl AutoAuth {
    /// Start building an [`AutoAuth`].
    pub fn builder() -> AutoAuthBuilder {
        AutoAuthBuilder::default()
    }

    /// The authentication method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The sinks, in the order in which they were declared. There's always at least one.
    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    /// Split this into its method and sinks.
    pub fn into_parts(self) -> (Method, Vec<Sink>) {
        (self.method, self.sinks)
    }
}

/// A builder for [`AutoAuth`].
#[derive(Clone, Debug, Default)]
pub struct AutoAuthBuilder {
    method: Option<Method>,
    sinks: Vec<Sink>,
}

impl AutoAuthBuilder {
    /// Set the authentication method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a sink.
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add a list of sinks.
    pub fn sinks<I>(mut self, sinks: I) -> Self
    where
        I: IntoIterator<Item = Sink>,
    {
        self.sinks.extend(sinks);
        self
    }

    /// Build the [`AutoAuth`], making sure there's a method and at least one sink.
    pub fn build(self) -> Result<AutoAuth, SchemaViolation> {
        let method = self.method.ok_or(SchemaViolation::MissingMethod)?;
        if self.sinks.is_empty() {
            return Err(SchemaViolation::MissingSinks);
        }
        Ok(AutoAuth { method, sinks: self.sinks })
    }
}

/// Extract the single `auto_auth` block out of a document.
pub(crate) fn extract_auto_auth(root: &Body, env: &dyn EnvProvider) -> Result<AutoAuth, AutoAuthError> {
    let mut items = root.filter(AUTO_AUTH_BLOCK);
    let (Some(item), None) = (items.next(), items.next()) else {
        return Err(SchemaViolation::ExactlyOneBlock(AUTO_AUTH_BLOCK).into());
    };
    let Value::Object(list) = item.value() else {
        return Err(SchemaViolation::NotAnObject(AUTO_AUTH_BLOCK).into());
    };

    let method = method::extract_method(list).map_err(AutoAuthError::Method)?;
    let sinks = sink::extract_sinks(list, env)?;
    Ok(AutoAuth::builder().method(method).sinks(sinks).build()?)
}
