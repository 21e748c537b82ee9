use std::collections::HashSet;

/// Decides whether a connected participant may control translation
pub trait AuthorizationPolicy: Send + Sync {
    fn is_authorized(&self, identity: &str) -> bool;
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_authorized(&self, identity: &str) -> bool {
        self(identity)
    }
}

/// Fixed set of identities allowed to use translation
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    identities: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identities: identities.into_iter().map(Into::into).collect(),
        }
    }
}

impl AuthorizationPolicy for AllowList {
    fn is_authorized(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }
}
