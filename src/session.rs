// Session state: the token and the user's current selections. Created
// empty at startup, changed only by command handlers, gone at exit.

use chrono::{DateTime, Utc};

use crate::api::{Container, DriveItem};
use crate::auth::AccessToken;
use crate::error::Rejection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub display_name: String,
}

impl From<&Container> for ContainerRef {
    fn from(c: &Container) -> Self {
        ContainerRef {
            id: c.id.clone(),
            display_name: c.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
}

impl From<&DriveItem> for DocumentRef {
    fn from(item: &DriveItem) -> Self {
        DocumentRef {
            id: item.id.clone(),
            name: item.name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub token: Option<AccessToken>,
    pub active_container: Option<ContainerRef>,
    pub active_document: Option<DocumentRef>,
}

/// What a command needs before it may run. Each level implies the ones
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Requirement {
    Nothing,
    Token,
    Container,
    Document,
}

/// Snapshot of the session fields a command was cleared to use.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: Option<String>,
    container: Option<ContainerRef>,
    document: Option<DocumentRef>,
}

impl Scope {
    pub fn token(&self) -> Result<&str, Rejection> {
        self.token.as_deref().ok_or(Rejection::NoToken)
    }

    pub fn container(&self) -> Result<&ContainerRef, Rejection> {
        self.container.as_ref().ok_or(Rejection::NoContainer)
    }

    pub fn document(&self) -> Result<&DocumentRef, Rejection> {
        self.document.as_ref().ok_or(Rejection::NoDocument)
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the requirement ladder in order: token, container, document.
    /// The first missing piece wins.
    pub fn require(&self, requirement: Requirement, now: DateTime<Utc>) -> Result<Scope, Rejection> {
        let mut scope = Scope::default();
        if requirement >= Requirement::Token {
            let token = self.token.as_ref().ok_or(Rejection::NoToken)?;
            if token.is_expired_at(now) {
                return Err(Rejection::TokenExpired);
            }
            scope.token = Some(token.secret.clone());
        }
        if requirement >= Requirement::Container {
            scope.container = Some(self.active_container.clone().ok_or(Rejection::NoContainer)?);
        }
        if requirement >= Requirement::Document {
            scope.document = Some(self.active_document.clone().ok_or(Rejection::NoDocument)?);
        }
        Ok(scope)
    }

    /// Make `container` active. The active document belongs to the previous
    /// container, so it is dropped.
    pub fn activate_container(&mut self, container: ContainerRef) {
        self.active_container = Some(container);
        self.active_document = None;
    }
}
