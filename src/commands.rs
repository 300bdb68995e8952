// Command table. Each entry declares its menu key, its label, what it
// needs from the session and the handler to run. `dispatch` checks the
// requirement before the handler sees anything, so a rejected command
// never reaches the network.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{Local, Utc};

use crate::api::{Container, DriveItem, Invitation, StorageGateway, DEFAULT_INVITE_MESSAGE};
use crate::auth::{AccessToken, CredentialProvider};
use crate::console::Console;
use crate::error::{CommandError, GatewayError, Rejection};
use crate::input::{or_default, parse_roles, parse_selection, parse_yes, split_list};
use crate::session::{ContainerRef, DocumentRef, Requirement, Scope, Session};

/// File offered by the upload prompt when the answer is empty.
pub const DEFAULT_UPLOAD_PATH: &str = "SimpleSampleDoc.docx";

/// Role granted on a container when the answer is empty.
pub const DEFAULT_CONTAINER_ROLE: &str = "owner";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything a handler may touch.
pub struct CommandContext<'a> {
    pub session: &'a mut Session,
    pub console: &'a mut dyn Console,
    pub gateway: &'a dyn StorageGateway,
    pub credentials: &'a dyn CredentialProvider,
}

impl<'a> CommandContext<'a> {
    fn ask(&mut self, prompt: &str) -> Result<String, CommandError> {
        self.console.read_line(prompt).map_err(CommandError::Console)
    }

    /// Run one gateway call with the busy indicator shown.
    fn remote<T>(
        &mut self,
        message: &str,
        call: impl FnOnce(&dyn StorageGateway) -> Result<T, GatewayError>,
    ) -> Result<T, CommandError> {
        self.console.begin_task(message);
        let result = call(self.gateway);
        self.console.end_task();
        Ok(result?)
    }

    fn authenticate(&mut self) -> Result<AccessToken, CommandError> {
        self.console.begin_task("Acquiring access token...");
        let result = self.credentials.acquire_token();
        self.console.end_task();
        Ok(result?)
    }
}

pub type Handler = fn(&mut CommandContext<'_>, &Scope) -> Result<Flow, CommandError>;

pub struct Command {
    pub key: &'static str,
    pub label: &'static str,
    pub requirement: Requirement,
    pub handler: Handler,
}

pub static COMMANDS: &[Command] = &[
    Command {
        key: "1",
        label: "Acquire Access Token",
        requirement: Requirement::Nothing,
        handler: acquire_token,
    },
    Command {
        key: "2",
        label: "Create a Container",
        requirement: Requirement::Token,
        handler: create_container,
    },
    Command {
        key: "3",
        label: "List Containers",
        requirement: Requirement::Token,
        handler: list_containers,
    },
    Command {
        key: "4",
        label: "Set Active Container",
        requirement: Requirement::Token,
        handler: set_active_container,
    },
    Command {
        key: "5",
        label: "Add User to Active Container",
        requirement: Requirement::Container,
        handler: grant_permission,
    },
    Command {
        key: "6",
        label: "List Files in Active Container",
        requirement: Requirement::Container,
        handler: list_files,
    },
    Command {
        key: "7",
        label: "Upload a File to Active Container",
        requirement: Requirement::Container,
        handler: upload_file,
    },
    Command {
        key: "8",
        label: "Set Active Document",
        requirement: Requirement::Container,
        handler: set_active_document,
    },
    Command {
        key: "9",
        label: "Invite Users to Active Document",
        requirement: Requirement::Document,
        handler: invite_to_document,
    },
    Command {
        key: "10",
        label: "Show Permissions on Active Document",
        requirement: Requirement::Document,
        handler: show_permissions,
    },
    Command {
        key: "x",
        label: "Exit",
        requirement: Requirement::Nothing,
        handler: exit,
    },
];

pub fn find(key: &str) -> Option<&'static Command> {
    let key = key.trim();
    COMMANDS.iter().find(|c| c.key.eq_ignore_ascii_case(key))
}

/// Check the command's requirement against the session, then run it.
pub fn execute(command: &Command, ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
    let scope = ctx.session.require(command.requirement, Utc::now())?;
    (command.handler)(ctx, &scope)
}

/// Run the command behind `choice` and report whatever went wrong.
///
/// Rejections and remote failures are printed and the loop carries on;
/// only a console failure is returned, since no more input can be read.
pub fn dispatch(choice: &str, ctx: &mut CommandContext<'_>) -> io::Result<Flow> {
    let Some(command) = find(choice) else {
        ctx.console.warn("Invalid choice. Please try again.");
        return Ok(Flow::Continue);
    };
    match execute(command, ctx) {
        Ok(flow) => Ok(flow),
        Err(CommandError::Rejected(rejection)) => {
            tracing::info!(command = command.label, ?rejection, "command rejected");
            ctx.console.warn(&rejection.to_string());
            Ok(Flow::Continue)
        }
        Err(CommandError::Console(err)) => Err(err),
        Err(err @ CommandError::Remote(_)) | Err(err @ CommandError::File { .. }) => {
            tracing::warn!(command = command.label, error = %err, "command failed");
            ctx.console.error(&format!("{} failed: {}", command.label, err));
            if let CommandError::Remote(remote) = &err {
                ctx.console.error(hint(remote));
            }
            Ok(Flow::Continue)
        }
    }
}

fn hint(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::Network(_) => "Check your network connection and try again.",
        GatewayError::Auth(_) => {
            "Check CLIENT_ID, TENANT_ID and CLIENT_SECRET, or acquire a new token (Option 1)."
        }
        GatewayError::NotFound(_) => {
            "The container or document may no longer exist. Select it again (Option 4 or 8)."
        }
        GatewayError::Api { .. } => "The service rejected the request.",
        GatewayError::Decode(_) => "The service answered with an unexpected payload.",
    }
}

fn describe_container(c: &Container) -> String {
    format!("{} (ID: {})", c.display_name, c.id)
}

fn describe_item(item: &DriveItem) -> String {
    let kind = if item.is_folder() { "folder" } else { "file" };
    match item.size {
        Some(size) => format!("{} [{}, {} bytes] (ID: {})", item.name, kind, size, item.id),
        None => format!("{} [{}] (ID: {})", item.name, kind, item.id),
    }
}

fn show_numbered(console: &mut dyn Console, lines: impl Iterator<Item = String>) {
    for (index, line) in lines.enumerate() {
        console.show(&format!("{}. {}", index + 1, line));
    }
}

fn acquire_token(ctx: &mut CommandContext<'_>, _scope: &Scope) -> Result<Flow, CommandError> {
    let token = ctx.authenticate()?;
    ctx.console.show("Access token acquired successfully.");
    ctx.console.show(&format!(
        "Token Expires On: {}",
        token.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ));
    ctx.console.show(&format!("Roles: {}", token.roles.join(", ")));
    ctx.console.show(&format!("Token (truncated): {}", token.truncated()));
    ctx.session.token = Some(token);
    Ok(Flow::Continue)
}

fn create_container(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let name = ctx.ask("Enter container name")?.trim().to_string();
    if name.is_empty() {
        return Err(Rejection::MissingInput("container name").into());
    }
    let container = ctx.remote("Creating container...", |g| g.create_container(token, &name))?;
    tracing::info!(id = %container.id, "container created");
    ctx.console.show(&format!("Container created: {}", describe_container(&container)));
    Ok(Flow::Continue)
}

fn list_containers(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let containers = ctx.remote("Listing containers...", |g| g.list_containers(token))?;
    if containers.is_empty() {
        ctx.console.show("No containers found.");
    } else {
        ctx.console.show("Containers:");
        show_numbered(ctx.console, containers.iter().map(describe_container));
    }
    Ok(Flow::Continue)
}

fn set_active_container(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let containers = ctx.remote("Listing containers...", |g| g.list_containers(token))?;
    if containers.is_empty() {
        return Err(Rejection::NothingToSelect("containers").into());
    }
    ctx.console.show("Available Containers:");
    show_numbered(ctx.console, containers.iter().map(describe_container));
    let answer = ctx.ask("Enter the number of the container to set as active")?;
    let selected = parse_selection(&answer, containers.len())
        .and_then(|index| containers.get(index))
        .ok_or(Rejection::InvalidSelection)?;
    let container = ContainerRef::from(selected);
    ctx.console.show(&format!("Active container set to: {}", container.display_name));
    tracing::info!(id = %container.id, "active container changed");
    ctx.session.activate_container(container);
    Ok(Flow::Continue)
}

fn grant_permission(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let email = ctx.ask("Enter the email of the user to grant permission")?.trim().to_string();
    if email.is_empty() {
        return Err(Rejection::MissingInput("email").into());
    }
    let answer = ctx.ask("Enter the role (reader, writer, manager, owner) [owner]")?;
    let role = or_default(&answer, DEFAULT_CONTAINER_ROLE);
    ctx.remote("Granting permission...", |g| {
        g.grant_permission(token, &container.id, &email, &role)
    })?;
    ctx.console.show(&format!("Permission granted successfully to {} as {}.", email, role));
    Ok(Flow::Continue)
}

fn list_files(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let items = ctx.remote("Listing files...", |g| g.list_files(token, &container.id))?;
    if items.is_empty() {
        ctx.console.show("No files in the active container.");
    } else {
        ctx.console.show(&format!("Files in {}:", container.display_name));
        show_numbered(ctx.console, items.iter().map(describe_item));
    }
    Ok(Flow::Continue)
}

fn upload_file(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let answer = ctx.ask(&format!(
        "Enter the path to the document to upload (default: {})",
        DEFAULT_UPLOAD_PATH
    ))?;
    let path = PathBuf::from(or_default(&answer, DEFAULT_UPLOAD_PATH));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or(Rejection::MissingInput("file name"))?;
    let bytes = fs::read(&path).map_err(|source| CommandError::File {
        path: path.clone(),
        source,
    })?;
    let item = ctx.remote("Uploading...", |g| {
        g.upload_file(token, &container.id, &file_name, bytes)
    })?;
    ctx.console.show(&format!("File uploaded: {}", item.name));
    if let Some(url) = &item.web_url {
        ctx.console.show(&format!("Copy this URL into your browser to edit: {}", url));
    }
    Ok(Flow::Continue)
}

fn set_active_document(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let items = ctx.remote("Listing files...", |g| g.list_files(token, &container.id))?;
    if items.is_empty() {
        return Err(Rejection::NothingToSelect("files").into());
    }
    ctx.console.show("Available Files:");
    show_numbered(ctx.console, items.iter().map(describe_item));
    let answer = ctx.ask("Enter the number of the document to set as active")?;
    let selected = parse_selection(&answer, items.len())
        .and_then(|index| items.get(index))
        .ok_or(Rejection::InvalidSelection)?;
    let document = DocumentRef::from(selected);
    ctx.console.show(&format!("Active document set to: {}", document.name));
    ctx.session.active_document = Some(document);
    Ok(Flow::Continue)
}

fn invite_to_document(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let document = scope.document()?;

    let recipients = split_list(&ctx.ask("Enter recipient emails (comma-separated)")?);
    if recipients.is_empty() {
        return Err(Rejection::MissingInput("recipients").into());
    }
    let message = or_default(&ctx.ask("Enter a message (optional)")?, DEFAULT_INVITE_MESSAGE);
    let require_sign_in = parse_yes(&ctx.ask("Require sign-in? (yes/no)")?);
    let send_invitation = parse_yes(&ctx.ask("Send invitation email? (yes/no)")?);
    let roles = parse_roles(&ctx.ask("Enter roles (comma-separated, default: read)")?);

    let invitation = Invitation {
        recipients,
        message,
        require_sign_in,
        send_invitation,
        roles,
    };
    let granted = ctx.remote("Sending invitation...", |g| {
        g.invite(token, &container.id, &document.id, &invitation)
    })?;
    ctx.console.show(&format!(
        "Invitation sent successfully to {}.",
        invitation.recipients.join(", ")
    ));
    for permission in &granted {
        ctx.console.show(&format!("Granted roles: {}", permission.roles.join(", ")));
    }
    Ok(Flow::Continue)
}

fn show_permissions(ctx: &mut CommandContext<'_>, scope: &Scope) -> Result<Flow, CommandError> {
    let token = scope.token()?;
    let container = scope.container()?;
    let document = scope.document()?;
    let permissions = ctx.remote("Fetching permissions...", |g| {
        g.list_permissions(token, &container.id, &document.id)
    })?;
    if permissions.is_empty() {
        ctx.console.show("No permissions found on the active document.");
        return Ok(Flow::Continue);
    }
    ctx.console.show("Permissions on the active document:");
    for (index, permission) in permissions.iter().enumerate() {
        let rendered = serde_json::to_string_pretty(permission)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        ctx.console.show(&format!("\nPermission {}:", index + 1));
        ctx.console.show(&rendered);
    }
    Ok(Flow::Continue)
}

fn exit(ctx: &mut CommandContext<'_>, _scope: &Scope) -> Result<Flow, CommandError> {
    ctx.console.show("Goodbye.");
    Ok(Flow::Exit)
}
