//! End-to-end import scenarios over in-memory archives.

use chatmerge::prelude::*;

const TWO_PARTY: &str = "\
12/31/24, 9:41 PM - John Doe: Hello
12/31/24, 9:42 PM - Jane Doe: Hi John!
12/31/24, 9:43 PM - John Doe: How was your day?";

const TWO_PARTY_EXTENDED: &str = "\
12/31/24, 9:41 PM - John Doe: Hello
12/31/24, 9:42 PM - Jane Doe: Hi John!
12/31/24, 9:43 PM - John Doe: How was your day?
12/31/24, 9:50 PM - Jane Doe: Pretty good
12/31/24, 9:51 PM - John Doe: Glad to hear it";

fn archive_with_chat(text: &str) -> MemoryArchive {
    MemoryArchive::new().with_entry("_chat.txt", text)
}

#[tokio::test]
async fn import_creates_chat_with_parsed_messages() {
    let mut store = ChatStore::new();
    let summary = Importer::new()
        .import(&archive_with_chat(TWO_PARTY), &mut store)
        .await
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            added: 1,
            updated: 0,
            skipped: 0
        }
    );
    assert_eq!(store.len(), 1);

    let chat = store.iter().next().unwrap();
    assert_eq!(chat.message_count(), 3);
    assert_eq!(chat.messages[0].timestamp, "12/31/24 9:41 PM");
    assert_eq!(chat.messages[0].author, "John Doe");
    assert_eq!(chat.messages[0].content, "Hello");
    assert_eq!(chat.identity_key, ["Jane Doe", "John Doe"]);
}

#[tokio::test]
async fn reimport_is_a_noop() {
    let mut store = ChatStore::new();
    let importer = Importer::new();
    let archive = archive_with_chat(TWO_PARTY);

    importer.import(&archive, &mut store).await.unwrap();
    let before: usize = store.iter().map(Chat::message_count).sum();

    let summary = importer.import(&archive, &mut store).await.unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            added: 0,
            updated: 0,
            skipped: 1
        }
    );
    assert_eq!(store.len(), 1);
    let after: usize = store.iter().map(Chat::message_count).sum();
    assert_eq!(before, after);
}

#[tokio::test]
async fn superset_import_appends_only_the_new_tail() {
    let mut store = ChatStore::new();
    let importer = Importer::new();

    importer
        .import(&archive_with_chat(TWO_PARTY), &mut store)
        .await
        .unwrap();
    let original_id = store.iter().next().unwrap().id;

    let summary = importer
        .import(&archive_with_chat(TWO_PARTY_EXTENDED), &mut store)
        .await
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            added: 0,
            updated: 1,
            skipped: 0
        }
    );
    assert_eq!(store.len(), 1);

    let chat = store.iter().next().unwrap();
    assert_eq!(chat.id, original_id);
    assert_eq!(chat.message_count(), 5);
    // prior messages untouched, at the same positions
    assert_eq!(chat.messages[0].content, "Hello");
    assert_eq!(chat.messages[2].content, "How was your day?");
    // new tail appended in original order
    assert_eq!(chat.messages[3].content, "Pretty good");
    assert_eq!(chat.messages[4].content, "Glad to hear it");
}

#[tokio::test]
async fn identity_matches_across_filenames() {
    let mut store = ChatStore::new();
    let importer = Importer::new();

    let first = MemoryArchive::new().with_entry("_chat.txt", TWO_PARTY);
    let second = MemoryArchive::new().with_entry("export-2.txt", TWO_PARTY_EXTENDED);

    importer.import(&first, &mut store).await.unwrap();
    let summary = importer.import(&second, &mut store).await.unwrap();

    // Same participant set: a continuation, not a new chat.
    assert_eq!(summary.added, 0);
    assert_eq!(summary.updated, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn same_filename_disjoint_participants_makes_two_chats() {
    let mut store = ChatStore::new();
    let importer = Importer::new();

    let first = archive_with_chat(TWO_PARTY);
    let second = archive_with_chat(
        "1/1/25, 10:00 AM - Alice: morning\n1/1/25, 10:01 AM - Bob: morning!",
    );

    importer.import(&first, &mut store).await.unwrap();
    let summary = importer.import(&second, &mut store).await.unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn attachment_resolves_from_archive() {
    let text = "12/31/24, 9:41 PM - John Doe: \u{200e}<attached: photo.jpg>";
    let archive = MemoryArchive::new()
        .with_entry("_chat.txt", text)
        .with_entry("photo.jpg", vec![0xff, 0xd8, 0xff]);

    let mut store = ChatStore::new();
    Importer::new().import(&archive, &mut store).await.unwrap();

    let chat = store.iter().next().unwrap();
    let media = chat.messages[0].media.as_ref().unwrap();
    assert_eq!(media.kind, MediaKind::Image);
    assert_eq!(media.name, "photo.jpg");
    let resource = media.resource.as_ref().unwrap();
    assert_eq!(resource.bytes, vec![0xff, 0xd8, 0xff]);
    assert_eq!(resource.mime, None);
}

#[tokio::test]
async fn missing_attachment_is_a_dangling_reference() {
    let text = "12/31/24, 9:41 PM - John Doe: <attached: photo.jpg>";
    let archive = MemoryArchive::new().with_entry("_chat.txt", text);

    let mut store = ChatStore::new();
    let summary = Importer::new().import(&archive, &mut store).await.unwrap();
    assert_eq!(summary.added, 1);

    let chat = store.iter().next().unwrap();
    let media = chat.messages[0].media.as_ref().unwrap();
    assert_eq!(media.kind, MediaKind::Image);
    assert_eq!(media.name, "photo.jpg");
    assert!(media.is_dangling());
}

#[tokio::test]
async fn pdf_attachment_is_retagged() {
    let text = "12/31/24, 9:41 PM - John Doe: <attached: invoice.pdf>";
    let archive = MemoryArchive::new()
        .with_entry("_chat.txt", text)
        .with_entry("invoice.pdf", b"%PDF-1.4".to_vec());

    let mut store = ChatStore::new();
    Importer::new().import(&archive, &mut store).await.unwrap();

    let media = store.iter().next().unwrap().messages[0].media.clone().unwrap();
    assert_eq!(media.kind, MediaKind::Pdf);
    assert_eq!(
        media.resource.unwrap().mime.as_deref(),
        Some("application/pdf")
    );
}

#[tokio::test]
async fn attachment_resolution_is_case_insensitive() {
    let text = "12/31/24, 9:41 PM - John Doe: <attached: IMG-0001.JPG>";
    let archive = MemoryArchive::new()
        .with_entry("_chat.txt", text)
        .with_entry("media/img-0001.jpg", vec![1, 2, 3]);

    let mut store = ChatStore::new();
    Importer::new().import(&archive, &mut store).await.unwrap();

    let media = store.iter().next().unwrap().messages[0].media.clone().unwrap();
    assert!(!media.is_dangling());
    assert_eq!(media.name, "img-0001.jpg");
}

#[tokio::test]
async fn omitted_attachment_gets_placeholder() {
    let text = "12/31/24, 9:41 PM - John Doe: <attachment omitted>";
    let archive = MemoryArchive::new().with_entry("_chat.txt", text);

    let mut store = ChatStore::new();
    Importer::new().import(&archive, &mut store).await.unwrap();

    let media = store.iter().next().unwrap().messages[0].media.clone().unwrap();
    assert_eq!(media.kind, MediaKind::File);
    assert_eq!(media.name, "attachment");
    assert!(media.is_dangling());
}

#[tokio::test]
async fn no_transcript_fails_and_commits_nothing() {
    let archive = MemoryArchive::new().with_entry("photo.jpg", vec![1]);
    let mut store = ChatStore::new();

    let err = Importer::new().import(&archive, &mut store).await.unwrap_err();
    assert!(err.is_no_transcript());
    assert!(store.is_empty());
}

#[tokio::test]
async fn generic_filename_names_chat_after_other_party() {
    let importer =
        Importer::with_config(ImportConfig::new().with_local_display_name("John Doe"));
    let mut store = ChatStore::new();

    importer
        .import(&archive_with_chat(TWO_PARTY), &mut store)
        .await
        .unwrap();

    assert_eq!(store.iter().next().unwrap().name, "Jane Doe");
}

#[tokio::test]
async fn group_chat_name_joins_participants() {
    let text = "\
1/1/25, 9:00 AM - Dee: hi
1/1/25, 9:01 AM - Amy: hey
1/1/25, 9:02 AM - Cid: yo
1/1/25, 9:03 AM - Bob: hello";
    let mut store = ChatStore::new();
    Importer::new()
        .import(&archive_with_chat(text), &mut store)
        .await
        .unwrap();

    // First three of the sorted participant set, ellipsis for the rest.
    assert_eq!(store.iter().next().unwrap().name, "Amy, Bob, Cid...");
}

#[tokio::test]
async fn colliding_names_get_numeric_suffix() {
    let importer = Importer::with_config(ImportConfig::new().with_local_display_name("Me"));
    let mut store = ChatStore::new();

    let first = archive_with_chat("1/1/25, 9:00 AM - Alice: hi\n1/1/25, 9:01 AM - Me: hey");
    // Different conversation, but it also synthesizes the name "Alice".
    let second =
        archive_with_chat("2/2/25, 9:00 AM - Alice: other thread\n2/2/25, 9:01 AM - Meredith: ok");

    importer.import(&first, &mut store).await.unwrap();
    importer.import(&second, &mut store).await.unwrap();

    let mut names: Vec<&str> = store.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Alice", "Alice (1)"]);
}

#[tokio::test]
async fn two_generic_transcripts_in_one_archive_disambiguate() {
    // Both transcripts synthesize the name "Alice"; the second must see the
    // first one's pending chat and take a suffix.
    let importer = Importer::with_config(ImportConfig::new().with_local_display_name("Me"));
    let archive = MemoryArchive::new()
        .with_entry(
            "a/_chat.txt",
            "1/1/25, 9:00 AM - Alice: hi\n1/1/25, 9:01 AM - Me: hey",
        )
        .with_entry(
            "b/_chat.txt",
            "2/2/25, 9:00 AM - Alice: hello again\n2/2/25, 9:01 AM - Meredith: hi",
        );

    let mut store = ChatStore::new();
    let summary = importer.import(&archive, &mut store).await.unwrap();
    assert_eq!(summary.added, 2);

    let mut names: Vec<&str> = store.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Alice", "Alice (1)"]);
}

#[tokio::test]
async fn multiple_transcripts_one_import_call() {
    let archive = MemoryArchive::new()
        .with_entry("a/_chat.txt", TWO_PARTY)
        .with_entry(
            "b/_chat.txt",
            "1/1/25, 10:00 AM - Alice: morning\n1/1/25, 10:01 AM - Bob: morning!",
        );

    let mut store = ChatStore::new();
    let summary = Importer::new().import(&archive, &mut store).await.unwrap();
    assert_eq!(
        summary,
        ImportSummary {
            added: 2,
            updated: 0,
            skipped: 0
        }
    );
    assert_eq!(store.len(), 2);
    // new chats are prepended in discovery order
    let names: Vec<&str> = store.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Jane Doe", "Alice"]);
}

#[tokio::test]
async fn new_chats_prepend_existing_chats_stay() {
    let mut store = ChatStore::new();
    let importer = Importer::new();

    importer
        .import(&archive_with_chat(TWO_PARTY), &mut store)
        .await
        .unwrap();
    importer
        .import(
            &archive_with_chat("1/1/25, 10:00 AM - Alice: hi\n1/1/25, 10:01 AM - Bob: hey"),
            &mut store,
        )
        .await
        .unwrap();

    assert_eq!(store.len(), 2);
    let first = store.iter().next().unwrap();
    assert_eq!(first.identity_key, ["Alice", "Bob"]);
}

#[tokio::test]
async fn store_removal_is_explicit() {
    let mut store = ChatStore::new();
    Importer::new()
        .import(&archive_with_chat(TWO_PARTY), &mut store)
        .await
        .unwrap();

    let id = store.iter().next().unwrap().id;
    assert!(store.remove(id).is_some());
    assert!(store.is_empty());
}
