//! Envelope addresses (RFC 5322 §3.4), split into mailbox and host.

/// One envelope address.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `personal_name = "Juan García"`,
///   `mailbox_name = "juan"`, `host_name = "ejemplo.com"`
/// - `"user@example.com"` → `personal_name = ""`, `mailbox_name = "user"`,
///   `host_name = "example.com"`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Human-readable display name (may be empty).
    pub personal_name: String,
    /// Local part, before the `@`.
    pub mailbox_name: String,
    /// Domain part, after the `@` (empty for addresses without one).
    pub host_name: String,
}

impl Address {
    /// Build an address from its three components.
    pub fn new(personal_name: &str, mailbox_name: &str, host_name: &str) -> Self {
        Self {
            personal_name: personal_name.to_string(),
            mailbox_name: mailbox_name.to_string(),
            host_name: host_name.to_string(),
        }
    }

    /// Convert every address of a parsed header, groups flattened.
    ///
    /// Entries without an address (bare group names, empty angle brackets)
    /// are dropped.
    pub fn list(header: Option<&mail_parser::Address<'_>>) -> Vec<Self> {
        match header {
            Some(mail_parser::Address::List(list)) => {
                list.iter().filter_map(Self::from_addr).collect()
            }
            Some(mail_parser::Address::Group(groups)) => groups
                .iter()
                .flat_map(|group| group.addresses.iter())
                .filter_map(Self::from_addr)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Convert one parsed address. Input without an `@` is kept whole as the
    /// mailbox name.
    pub fn from_addr(addr: &mail_parser::Addr<'_>) -> Option<Self> {
        let spec = addr.address.as_deref()?.trim();
        if spec.is_empty() {
            return None;
        }
        let personal_name = addr.name.as_deref().unwrap_or_default().trim();
        Some(Self::from_addr_spec(personal_name, spec))
    }

    /// The `mailbox@host` form that filters match against.
    pub fn addr_spec(&self) -> String {
        format!("{}@{}", self.mailbox_name, self.host_name)
    }

    fn from_addr_spec(personal_name: &str, spec: &str) -> Self {
        let (mailbox, host) = match spec.rsplit_once('@') {
            Some((m, h)) => (m, h),
            None => (spec, ""),
        };
        Self::new(personal_name, mailbox, host)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.personal_name.is_empty() {
            write!(f, "{}", self.addr_spec())
        } else {
            write!(f, "{} <{}>", self.personal_name, self.addr_spec())
        }
    }
}
