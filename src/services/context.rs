use crate::auth::Principal;

/// Per-request data handed to every collaborator call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: String,
    principal: Option<Principal>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, principal: Option<Principal>) -> Self {
        Self {
            request_id: request_id.into(),
            principal,
        }
    }

    /// Context for calls made outside any HTTP request (CLI, tests)
    pub fn system() -> Self {
        Self::new("system", None)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Acting user id, or 0 for anonymous and system calls
    pub fn user_id(&self) -> u64 {
        self.principal.as_ref().map_or(0, Principal::user_id)
    }
}
