use std::fmt;

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// CSS-facing name used by the rendering layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One (role, text) pair in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
}

impl ConversationEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered, append-only, in-memory record of the current page load.
///
/// Local UI state only. The log is never transmitted in bulk; each send
/// carries just the latest user text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry. There is deliberately no removal or mutation API.
    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(ConversationEntry::new(role, text));
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts entries with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.role == role)
            .count()
    }
}

/// Client-generated opaque token correlating one browser session's
/// messages at the backend.
///
/// Created once at widget initialization and never changed afterwards;
/// not persisted across page loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Prefix marking ids minted by the web widget.
    pub const WEB_PREFIX: &'static str = "web_";

    /// Wraps a pre-generated raw id. Returns `None` for empty input so a
    /// broken entropy source cannot produce an unusable blank id.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// Builds the widget's id format from two entropy components:
    /// a random fraction in `[0, 1)` and an epoch-milliseconds timestamp.
    /// Both are base36-encoded, matching the backend's expectations for
    /// web-originated ids.
    pub fn from_entropy(random_fraction: f64, epoch_millis: f64) -> Self {
        let random_part = encode_base36((random_fraction.abs().fract() * 1e12) as u64);
        let time_part = encode_base36(epoch_millis.max(0.0) as u64);
        Self(format!("{}{random_part}{time_part}", Self::WEB_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Lowercase base36 rendering of an integer, `"0"` for zero.
fn encode_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_append_only_and_ordered() {
        let mut log = ConversationLog::new();
        log.push(Role::User, "hi");
        log.push(Role::Bot, "hello");
        log.push(Role::User, "bye");

        let roles = log
            .entries()
            .iter()
            .map(|entry| entry.role)
            .collect::<Vec<_>>();
        assert_eq!(roles, vec![Role::User, Role::Bot, Role::User]);
        assert_eq!(log.count_role(Role::User), 2);
        assert_eq!(log.count_role(Role::Bot), 1);
    }

    #[test]
    fn session_id_rejects_empty_raw() {
        assert!(SessionId::new("").is_none());
        assert!(SessionId::new("web_abc123").is_some());
    }

    #[test]
    fn session_id_from_entropy_is_prefixed_and_non_empty() {
        let id = SessionId::from_entropy(0.472_913, 1_724_400_000_000.0);
        assert!(id.as_str().starts_with(SessionId::WEB_PREFIX));
        assert!(id.as_str().len() > SessionId::WEB_PREFIX.len());
    }

    #[test]
    fn session_id_from_zero_entropy_still_non_empty() {
        let id = SessionId::from_entropy(0.0, 0.0);
        assert!(id.as_str().starts_with(SessionId::WEB_PREFIX));
        assert!(id.as_str().len() > SessionId::WEB_PREFIX.len());
    }

    #[test]
    fn base36_round_digits() {
        assert_eq!(encode_base36(0), "0");
        assert_eq!(encode_base36(35), "z");
        assert_eq!(encode_base36(36), "10");
    }
}
