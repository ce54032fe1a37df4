use std::fmt;
use std::sync::Arc;

/// Stable key for an observation location.
/// Keep the original locality text (e.g. "L123456") but avoid repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalityId(pub Arc<str>);

impl LocalityId {
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for LocalityId {
    fn from(s: &str) -> Self { Self(Arc::from(s)) }
}

impl fmt::Display for LocalityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
