//! Environment variable lookups.

/// A source of environment variables.
pub trait EnvProvider: Send + Sync + 'static {
    /// Look up a variable, returning `None` if it's not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Looks variables up in the current process' environment.
///
/// Variables whose value isn't valid unicode are treated as if they were not set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<F> EnvProvider for F
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}
