use book_console::console::{
    Action, BookApi, Cell, Console, ConsoleError, Field, LogNotifier, NotificationQueue,
    RestClient, RowState, TableError,
};
use book_console::{start_server, Config};

async fn start_in_memory_server() -> RestClient {
    let config = Config {
        database_url: None,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        pool_size: 1,
    };
    let (addr, server) = start_server(config).await.unwrap();
    tokio::spawn(async move {
        server.await.unwrap();
    });

    RestClient::new(&format!("http://{addr}"))
}

fn fill_create<N: book_console::console::Notifier>(
    console: &mut Console<RestClient, N>,
    email: &str,
) {
    console.open_create();
    for (field, raw) in [
        (Field::Email, email),
        (Field::Url, "http://x.com"),
        (Field::Tel, "1"),
        (Field::Color, "red"),
        (Field::Okey, "k"),
        (Field::City, "NY"),
        (Field::Author, "Bob"),
        (Field::DateOfCreation, "2020-01-01"),
        (Field::Age, "5"),
        (Field::NumberOfPages, "10"),
        (Field::NumberOfChapters, "2"),
        (Field::NumberOfPublishedBooks, "1"),
    ] {
        console.set_create_field(field, raw);
    }
}

#[tokio::test]
async fn console_manages_books_over_http() {
    let api = start_in_memory_server().await;
    let queue = NotificationQueue::new();
    let mut console = Console::with_initial(api.clone(), &queue, Vec::new());

    // Create through the dialog; the table picks the book up on refetch
    fill_create(&mut console, "a@x.com");
    let created = console.submit_create().await.unwrap();
    assert!(!console.dialog().is_visible());
    assert_eq!(vec![created.clone()], console.books().await.unwrap());
    assert_eq!(Some(created.clone()), api.get(created.id).await.unwrap());

    // A second book with the same email is refused, naming the field
    fill_create(&mut console, "a@x.com");
    let err = console.submit_create().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Client(_)));
    assert_eq!(vec!["Book with the same email already exists".to_string()], queue.drain());
    assert!(console.dialog().is_visible());
    console.cancel_create();

    // Edit a row and save it
    console.edit(&created).unwrap();
    console.set_edit_field(Field::Author, "Alice").unwrap();
    console.set_edit_field(Field::NumberOfPages, "321").unwrap();

    let rows = console.rows().await.unwrap();
    assert!(matches!(rows[0].cells[6], Cell::Input { ref value, .. } if value == "Alice"));
    assert_eq!(Action::Save, rows[0].actions[0].action);

    let saved = console.save(created.id).await.unwrap();
    assert_eq!("Alice", saved.author);
    assert_eq!(321, saved.number_of_pages);
    assert_eq!(created.date_of_creation, saved.date_of_creation);
    assert_eq!(RowState::Idle, console.table().state());
    assert_eq!(vec![saved.clone()], console.books().await.unwrap());

    // Delete it; the collection is refetched and empty
    let deleted = console.delete(created.id).await.unwrap();
    assert_eq!(saved, deleted);
    assert!(console.books().await.unwrap().is_empty());
    assert_eq!(None, api.get(created.id).await.unwrap());

    // Deleting again fails visibly
    console.delete(created.id).await.unwrap_err();
    assert_eq!(vec!["Failed to delete the book".to_string()], queue.drain());
}

#[tokio::test]
async fn console_reports_to_the_log() {
    let api = start_in_memory_server().await;
    let mut console = Console::new(api, LogNotifier);

    fill_create(&mut console, "log@x.com");
    let created = console.submit_create().await.unwrap();
    assert_eq!(vec![created.clone()], console.books().await.unwrap());

    // Failures still come back to the caller when notifications only go to the log
    fill_create(&mut console, "log@x.com");
    let err = console.submit_create().await.unwrap_err();
    match err {
        ConsoleError::Client(err) => assert_eq!(&["email".to_string()][..], err.conflict_fields()),
        other => panic!("expected a client error, got {other:?}"),
    }

    console.cancel_create();
    console.edit(&created).unwrap();
    let err = console.delete(created.id).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Table(TableError::RowBusy(_))));
}
