// Whole sessions through the menu loop with scripted input.

mod common;

use std::io::Write;

use reqwest::StatusCode;

use spe_demo_cli::session::{ContainerRef, DocumentRef, Session};
use spe_demo_cli::ui::run_session;

use common::{FakeCredentials, FakeGateway, ScriptedConsole};

#[test]
fn create_select_upload_share_and_inspect() {
    let mut file = tempfile::Builder::new()
        .prefix("Plan")
        .suffix(".docx")
        .tempfile()
        .unwrap();
    file.write_all(b"quarterly plan").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let file_name = file.path().file_name().unwrap().to_str().unwrap().to_string();

    let script = [
        "1",
        "2", "Demo",
        "3",
        "4", "1",
        "7", path.as_str(),
        "6",
        "8", "1",
        "9", "a@b.com", "", "", "", "",
        "10",
        "x",
    ];
    let mut session = Session::new();
    let mut console = ScriptedConsole::new(&script);
    let gateway = FakeGateway::new();
    let credentials = FakeCredentials::ok();

    run_session(&mut session, &mut console, &gateway, &credentials).unwrap();

    assert!(console.answers.is_empty(), "script not fully consumed");
    assert!(console.warnings.is_empty(), "unexpected warnings: {:?}", console.warnings);
    assert!(console.errors.is_empty(), "unexpected errors: {:?}", console.errors);
    assert!(console.balanced());

    assert!(session.token.is_some());
    assert_eq!(
        session.active_container,
        Some(ContainerRef {
            id: "c1".into(),
            display_name: "Demo".into()
        })
    );
    assert_eq!(
        session.active_document,
        Some(DocumentRef {
            id: "d1".into(),
            name: file_name.clone()
        })
    );

    assert_eq!(
        gateway.calls.borrow().as_slice(),
        [
            "create_container Demo".to_string(),
            "list_containers".to_string(),
            "list_containers".to_string(),
            format!("upload_file c1 {} 14", file_name),
            "list_files c1".to_string(),
            "list_files c1".to_string(),
            "invite c1 d1".to_string(),
            "list_permissions c1 d1".to_string(),
        ]
    );
    assert_eq!(gateway.invitations.borrow()[0].roles, vec!["read"]);
    assert!(console.printed("Active container set to: Demo"));
    assert!(console.printed(&format!("Active document set to: {}", file_name)));
    assert!(console.printed("Permission 1:"));
    assert!(console.printed("\"read\""));
    assert!(console.printed("Active container: Demo"));
    assert!(console.printed("Goodbye."));
}

#[test]
fn remote_failure_returns_to_the_menu() {
    let mut session = common::session_with(true, false);
    let mut console = ScriptedConsole::new(&["3", "4", "x"]);
    let gateway = FakeGateway::new();
    gateway.fail_with.set(Some(StatusCode::SERVICE_UNAVAILABLE));
    let credentials = FakeCredentials::ok();

    run_session(&mut session, &mut console, &gateway, &credentials).unwrap();

    assert_eq!(gateway.call_count(), 2);
    assert!(console.errored("List Containers failed"));
    assert!(console.errored("Set Active Container failed"));
    assert!(session.active_container.is_none());
    let menus = console.output.iter().filter(|l| *l == "Select an option:").count();
    assert_eq!(menus, 3);
}

#[test]
fn rejections_do_not_stop_the_loop() {
    let mut session = Session::new();
    let mut console = ScriptedConsole::new(&["6", "9", "bogus", "x"]);
    let gateway = FakeGateway::new();
    let credentials = FakeCredentials::ok();

    run_session(&mut session, &mut console, &gateway, &credentials).unwrap();

    assert_eq!(console.warnings.len(), 3);
    assert_eq!(gateway.call_count(), 0);
    assert!(console.answers.is_empty());
}

#[test]
fn closed_input_ends_the_session_with_an_error() {
    let mut session = Session::new();
    let mut console = ScriptedConsole::new(&["3"]);
    let gateway = FakeGateway::new();
    let credentials = FakeCredentials::ok();

    let result = run_session(&mut session, &mut console, &gateway, &credentials);

    assert!(result.is_err());
    assert!(console.warned("acquire an access token"));
}
