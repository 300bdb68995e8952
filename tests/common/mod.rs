// Shared fakes for driving the command table without a terminal or a
// network: a recording gateway, a canned credential provider and a
// scripted console.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use chrono::{Duration, Utc};
use reqwest::StatusCode;

use spe_demo_cli::api::{Container, DriveItem, Invitation, Permission, StorageGateway};
use spe_demo_cli::auth::{AccessToken, CredentialProvider};
use spe_demo_cli::commands::CommandContext;
use spe_demo_cli::console::Console;
use spe_demo_cli::error::GatewayError;
use spe_demo_cli::session::{ContainerRef, DocumentRef, Session};

pub fn token() -> AccessToken {
    AccessToken {
        secret: "eyJ0eXAiOiJKV1QiLCJhbGciOiJub25lIn0.e30.sig".into(),
        expires_at: Utc::now() + Duration::hours(1),
        roles: vec!["FileStorageContainer.Selected".into()],
    }
}

pub fn container(id: &str, name: &str) -> Container {
    Container {
        id: id.into(),
        display_name: name.into(),
        ..Container::default()
    }
}

pub fn item(id: &str, name: &str) -> DriveItem {
    DriveItem {
        id: id.into(),
        name: name.into(),
        ..DriveItem::default()
    }
}

pub fn permission(id: &str, roles: &[&str]) -> Permission {
    Permission {
        id: id.into(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        ..Permission::default()
    }
}

/// Session with a valid token and, optionally, active selections.
pub fn session_with(container: bool, document: bool) -> Session {
    let mut session = Session::new();
    session.token = Some(token());
    if container {
        session.active_container = Some(ContainerRef {
            id: "c1".into(),
            display_name: "Demo".into(),
        });
    }
    if document {
        session.active_document = Some(DocumentRef {
            id: "d1".into(),
            name: "report.docx".into(),
        });
    }
    session
}

/// In-memory storage service that records every call made to it.
#[derive(Default)]
pub struct FakeGateway {
    pub calls: RefCell<Vec<String>>,
    pub containers: RefCell<Vec<Container>>,
    pub files: RefCell<Vec<DriveItem>>,
    pub permissions: RefCell<Vec<Permission>>,
    pub invitations: RefCell<Vec<Invitation>>,
    /// When set, every call fails with this status.
    pub fail_with: Cell<Option<StatusCode>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(containers: Vec<Container>) -> Self {
        let gateway = Self::new();
        *gateway.containers.borrow_mut() = containers;
        gateway
    }

    pub fn with_files(files: Vec<DriveItem>) -> Self {
        let gateway = Self::new();
        *gateway.files.borrow_mut() = files;
        gateway
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, call: String) -> Result<(), GatewayError> {
        self.calls.borrow_mut().push(call);
        match self.fail_with.get() {
            Some(status) => Err(GatewayError::from_status(status, "simulated failure")),
            None => Ok(()),
        }
    }
}

impl StorageGateway for FakeGateway {
    fn create_container(&self, token: &str, name: &str) -> Result<Container, GatewayError> {
        assert!(!token.is_empty());
        self.record(format!("create_container {}", name))?;
        let mut containers = self.containers.borrow_mut();
        let created = container(&format!("c{}", containers.len() + 1), name);
        containers.push(created.clone());
        Ok(created)
    }

    fn list_containers(&self, _token: &str) -> Result<Vec<Container>, GatewayError> {
        self.record("list_containers".into())?;
        Ok(self.containers.borrow().clone())
    }

    fn grant_permission(
        &self,
        _token: &str,
        container_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Permission, GatewayError> {
        self.record(format!("grant_permission {} {} {}", container_id, email, role))?;
        Ok(permission("cp1", &[role]))
    }

    fn list_files(&self, _token: &str, container_id: &str) -> Result<Vec<DriveItem>, GatewayError> {
        self.record(format!("list_files {}", container_id))?;
        Ok(self.files.borrow().clone())
    }

    fn upload_file(
        &self,
        _token: &str,
        container_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DriveItem, GatewayError> {
        self.record(format!("upload_file {} {} {}", container_id, file_name, bytes.len()))?;
        let mut files = self.files.borrow_mut();
        let mut uploaded = item(&format!("d{}", files.len() + 1), file_name);
        uploaded.web_url = Some(format!("https://contoso.example/{}", file_name));
        uploaded.size = Some(bytes.len() as u64);
        files.push(uploaded.clone());
        Ok(uploaded)
    }

    fn invite(
        &self,
        _token: &str,
        container_id: &str,
        item_id: &str,
        invitation: &Invitation,
    ) -> Result<Vec<Permission>, GatewayError> {
        self.record(format!("invite {} {}", container_id, item_id))?;
        self.invitations.borrow_mut().push(invitation.clone());
        let roles: Vec<&str> = invitation.roles.iter().map(String::as_str).collect();
        let granted = permission("p1", &roles);
        self.permissions.borrow_mut().push(granted.clone());
        Ok(vec![granted])
    }

    fn list_permissions(
        &self,
        _token: &str,
        container_id: &str,
        item_id: &str,
    ) -> Result<Vec<Permission>, GatewayError> {
        self.record(format!("list_permissions {} {}", container_id, item_id))?;
        Ok(self.permissions.borrow().clone())
    }
}

/// Credential provider returning a fixed token, or failing.
pub struct FakeCredentials {
    pub calls: Cell<usize>,
    pub fail: bool,
}

impl FakeCredentials {
    pub fn ok() -> Self {
        FakeCredentials {
            calls: Cell::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        FakeCredentials {
            calls: Cell::new(0),
            fail: true,
        }
    }
}

impl CredentialProvider for FakeCredentials {
    fn acquire_token(&self) -> Result<AccessToken, GatewayError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            Err(GatewayError::Auth("invalid_client: bad secret".into()))
        } else {
            Ok(token())
        }
    }
}

/// Console fed from a list of answers. Running out of answers behaves like
/// a closed stdin.
#[derive(Default)]
pub struct ScriptedConsole {
    pub answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub tasks: usize,
    open_tasks: usize,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedConsole {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn warned(&self, needle: &str) -> bool {
        self.warnings.iter().any(|line| line.contains(needle))
    }

    pub fn errored(&self, needle: &str) -> bool {
        self.errors.iter().any(|line| line.contains(needle))
    }

    pub fn balanced(&self) -> bool {
        self.open_tasks == 0
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn show(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn warn(&mut self, line: &str) {
        self.warnings.push(line.to_string());
    }

    fn error(&mut self, line: &str) {
        self.errors.push(line.to_string());
    }

    fn begin_task(&mut self, _message: &str) {
        self.tasks += 1;
        self.open_tasks += 1;
    }

    fn end_task(&mut self) {
        self.open_tasks -= 1;
    }
}

pub fn context<'a>(
    session: &'a mut Session,
    console: &'a mut ScriptedConsole,
    gateway: &'a FakeGateway,
    credentials: &'a FakeCredentials,
) -> CommandContext<'a> {
    CommandContext {
        session,
        console,
        gateway,
        credentials,
    }
}
