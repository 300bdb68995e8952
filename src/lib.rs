// Library root
// -----------
// This crate exposes the pieces of the storage demo CLI. The binary
// (`main.rs`) wires them together into the interactive session.
//
// Module responsibilities:
// - `config`: settings from the environment and `.env` files.
// - `logging`: tracing subscriber setup.
// - `error`: remote failures, rejections and per-command errors.
// - `auth`: client-credentials token acquisition.
// - `api`: HTTP calls to the file storage endpoints.
// - `session`: the token and the active container/document.
// - `input`: parsing of prompt answers.
// - `console`: terminal input/output behind a trait.
// - `commands`: the command table and its dispatcher.
// - `ui`: the menu loop.
//
// Handlers only see the `StorageGateway`, `CredentialProvider` and
// `Console` traits, so the whole session can be driven without a network
// or a terminal.
pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod logging;
pub mod session;
pub mod ui;
