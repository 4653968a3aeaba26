mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;

use contactbook::auth::Session;
use contactbook::config::ListMode;
use contactbook::controller::{ContactListController, ControllerSettings, ViewState};
use contactbook::gateway::{HttpContactGateway, MemoryContactGateway};
use contactbook::validation::{Field, FormMode};

#[tokio::test]
async fn login_create_and_see_the_server_id() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, session) = common::client_for(&server.base_url)?;
    session.login(&client, "alice", common::PASSWORD).await?;

    let gateway = Arc::new(HttpContactGateway::new(client, "v2"));
    let mut controller = ContactListController::new(gateway, session, ControllerSettings::default());
    controller.mount().await;
    assert_eq!(controller.state(), ViewState::List);
    assert!(controller.contacts().is_empty());

    controller.open_create();
    let form = controller.form_mut().expect("form open");
    form.set_field(Field::FirstName, "Grace");
    form.set_field(Field::LastName, "Hopper");
    form.set_field(Field::Email, "grace@example.com");
    form.set_field(Field::PhoneNumber, "555 987 6543");
    form.set_field(Field::City, "Arlington");
    form.set_field(Field::State, "va");
    form.set_field(Field::ZipCode, "22201");

    let saved = controller.submit_form().await.expect("contact saved");
    let id = saved.id.expect("server-assigned id");

    assert_eq!(controller.state(), ViewState::List);
    let listed = controller
        .contacts()
        .iter()
        .find(|c| c.id.as_ref() == Some(&id))
        .expect("new contact is listed");
    assert_eq!(listed.phone_number, "555-987-6543");
    assert_eq!(listed.state, "VA");
    assert_eq!(
        controller.current_message().map(|m| m.text.as_str()),
        Some("Contact created successfully")
    );
    Ok(())
}

#[tokio::test]
async fn no_session_redirects_to_login() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, session) = common::client_for(&server.base_url)?;

    let gateway = Arc::new(HttpContactGateway::new(client, "v2"));
    let mut controller = ContactListController::new(gateway, session, ControllerSettings::default());
    controller.mount().await;
    assert_eq!(controller.state(), ViewState::RedirectToLogin);
    Ok(())
}

#[tokio::test]
async fn rejected_token_ends_the_session() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (client, session) = common::client_for(&server.base_url)?;
    session
        .establish(Session {
            token: "forged-token".to_string(),
            username: "mallory".to_string(),
            role: None,
            expiration: Utc::now() + Duration::hours(1),
        })
        .await;

    let gateway = Arc::new(HttpContactGateway::new(client, "v2"));
    let mut controller = ContactListController::new(gateway, session.clone(), ControllerSettings::default());
    controller.mount().await;

    assert_eq!(controller.state(), ViewState::RedirectToLogin);
    assert!(!session.is_authenticated().await);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_leaves_an_empty_list_and_an_error() -> Result<()> {
    // Nothing listens on this port
    let port = portpicker::pick_unused_port().expect("free port");
    let (client, session) = common::client_for(&format!("http://127.0.0.1:{}", port))?;
    session
        .establish(Session {
            token: "token".to_string(),
            username: "alice".to_string(),
            role: None,
            expiration: Utc::now() + Duration::hours(1),
        })
        .await;

    let gateway = Arc::new(HttpContactGateway::new(client, "v2"));
    let mut controller = ContactListController::new(gateway, session, ControllerSettings::default());
    controller.mount().await;

    assert_eq!(controller.state(), ViewState::Error);
    assert!(controller.contacts().is_empty());
    assert!(!controller.is_loading());
    assert_eq!(
        controller.error(),
        Some("Unable to reach the server. Please check your connection.")
    );
    Ok(())
}

#[tokio::test]
async fn paged_mode_walks_the_server_pages() -> Result<()> {
    let seeded = MemoryContactGateway::with_contacts(
        ["Ann", "Bea", "Cal", "Dan", "Eve"]
            .iter()
            .map(|first| common::valid_contact(first, "Pager")),
    );
    let server = common::TestServer::start_with(seeded).await?;
    let (gateway, session) = common::logged_in_gateway(&server).await?;

    let settings = ControllerSettings {
        list_mode: ListMode::Paged,
        page_size: 2,
        ..ControllerSettings::default()
    };
    let mut controller = ContactListController::new(Arc::new(gateway), session, settings);
    controller.mount().await;
    assert_eq!(controller.pagination().total_pages(), 3);

    assert!(controller.next_page().await);
    assert!(controller.next_page().await);
    assert!(!controller.next_page().await);
    assert_eq!(controller.pagination().page, 3);
    assert_eq!(controller.contacts().len(), 1);
    assert_eq!(controller.contacts()[0].first_name, "Eve");
    Ok(())
}

#[tokio::test]
async fn edit_then_delete_through_the_controller() -> Result<()> {
    let seeded = MemoryContactGateway::with_contacts(vec![common::valid_contact("Ann", "Smith")]);
    let server = common::TestServer::start_with(seeded).await?;
    let (gateway, session) = common::logged_in_gateway(&server).await?;

    let mut controller = ContactListController::new(Arc::new(gateway), session, ControllerSettings::default());
    controller.mount().await;
    let id = controller.contacts()[0].id.clone().expect("id");

    controller.toggle_selection(id.clone());
    controller.open_update().await;
    assert_eq!(controller.state(), ViewState::FormOpen(FormMode::Edit));
    controller.form_mut().expect("form").set_field(Field::City, "Tacoma");
    controller.submit_form().await.expect("updated");
    assert_eq!(controller.contacts()[0].city, "Tacoma");

    controller.request_delete();
    assert!(controller.confirm_delete().await);
    assert!(controller.contacts().is_empty());
    assert!(server.state.contacts.is_empty().await);
    Ok(())
}
