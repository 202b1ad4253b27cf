use std::sync::RwLock;

/// Tokens held by a signed-in client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Where the client keeps its tokens between calls
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: Session);
    fn clear(&self);
}

/// Session kept in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, session: Session) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    fn clear(&self) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Called with the login route when the session is no longer accepted
pub trait LoginRedirect: Send + Sync {
    fn redirect(&self, login_route: &str);
}

impl<F> LoginRedirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, login_route: &str) {
        self(login_route)
    }
}
