/// The user's model API key, held only by the page session that collected it.
///
/// Never written to the process environment, never persisted, never logged: the
/// `Debug` output is redacted and there is no `Display` impl.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// A blank key counts as not provided
    pub fn is_provided(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn expose(&self) -> &str {
        self.0.trim()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_provided() {
            f.write_str("Credential(<redacted>)")
        } else {
            f.write_str("Credential(<empty>)")
        }
    }
}
