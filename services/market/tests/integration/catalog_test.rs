use bytes::Bytes;

use swampnotes_domain::id::{CourseId, NoteId};
use swampnotes_domain::pagination::PageRequest;
use swampnotes_market::domain::repository::ContentStore;
use swampnotes_market::domain::types::NoteSearch;
use swampnotes_market::error::MarketServiceError;
use swampnotes_market::usecase::catalog::{
    GetNoteUseCase, ListLibraryUseCase, ListUploadedUseCase, SearchNotesUseCase,
};
use swampnotes_market::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, ListCourseNotesUseCase, ListCoursesUseCase,
};
use swampnotes_market::usecase::purchase::PurchaseNoteUseCase;
use swampnotes_market::usecase::upload::{UploadNoteInput, UploadNoteUseCase};

use crate::helpers::InMemoryMarket;

fn search(market: &InMemoryMarket) -> SearchNotesUseCase<InMemoryMarket> {
    SearchNotesUseCase {
        notes: market.clone(),
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_order_results_most_recent_first() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let older = market.seed_note(author.id, 10).await;
    let newer = market.seed_note(author.id, 10).await;

    let hits = search(&market).execute(NoteSearch::default()).await.unwrap();

    let ids: Vec<NoteId> = hits.iter().map(|n| n.id).collect();
    assert_eq!(ids, [newer.id, older.id]);
}

#[tokio::test]
async fn should_match_query_in_title_description_or_course_name() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let by_title = market
        .seed_note_with(author.id, 0, |n| {
            n.title = "Thermodynamics Cheat Sheet".into();
            n.description = None;
            n.course_name = "PHY 2048".into();
        })
        .await;
    let by_description = market
        .seed_note_with(author.id, 0, |n| {
            n.title = "Week 3".into();
            n.description = Some("entropy and THERMODYNAMICS laws".into());
            n.course_name = "PHY 2049".into();
        })
        .await;
    market
        .seed_note_with(author.id, 0, |n| {
            n.title = "Sonnets".into();
            n.description = Some("poetry".into());
            n.course_name = "ENL 2012".into();
        })
        .await;

    let hits = search(&market)
        .execute(NoteSearch {
            query: Some("thermo".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<NoteId> = hits.iter().map(|n| n.id).collect();
    assert_eq!(ids, [by_description.id, by_title.id]);

    let by_course = search(&market)
        .execute(NoteSearch {
            query: Some("enl 20".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_course.len(), 1);
}

#[tokio::test]
async fn should_filter_by_course_and_semester_exactly() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course_id = CourseId::generate();
    let wanted = market
        .seed_note_with(author.id, 5, |n| {
            n.course_id = course_id;
            n.semester = "Spring 2026".into();
        })
        .await;
    market
        .seed_note_with(author.id, 5, |n| {
            n.course_id = course_id;
            n.semester = "Fall 2025".into();
        })
        .await;
    market
        .seed_note_with(author.id, 5, |n| n.semester = "Spring 2026".into())
        .await;

    let hits = search(&market)
        .execute(NoteSearch {
            course_id: Some(course_id),
            semester: Some("Spring 2026".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, wanted.id);
}

#[tokio::test]
async fn should_page_through_results_with_stable_order() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    for _ in 0..5 {
        market.seed_note(author.id, 1).await;
    }

    let all = search(&market).execute(NoteSearch::default()).await.unwrap();
    let second_page = search(&market)
        .execute(NoteSearch {
            page: PageRequest::new(Some(2), Some(2)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[0].id, all[2].id);
    assert_eq!(second_page[1].id, all[3].id);
}

#[tokio::test]
async fn should_clamp_zero_limit_to_one_result() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    market.seed_note(author.id, 1).await;
    market.seed_note(author.id, 1).await;

    let hits = search(&market)
        .execute(NoteSearch {
            page: PageRequest::new(Some(0), None),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
}

// ── Note detail and listings ─────────────────────────────────────────────────

#[tokio::test]
async fn should_count_view_on_note_lookup() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let note = market.seed_note(author.id, 10).await;
    let usecase = GetNoteUseCase {
        notes: market.clone(),
    };

    usecase.execute(note.id).await.unwrap();
    let second = usecase.execute(note.id).await.unwrap();

    assert_eq!(second.views, 2);
    assert_eq!(market.note(note.id).await.views, 2);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_note_lookup() {
    let market = InMemoryMarket::new();
    let result = GetNoteUseCase {
        notes: market.clone(),
    }
    .execute(NoteId::generate())
    .await;
    assert!(matches!(result, Err(MarketServiceError::NoteNotFound)));
}

#[tokio::test]
async fn should_list_library_and_uploaded_notes() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let reader = market.seed_user(100).await;
    let first = market.seed_note(author.id, 10).await;
    let second = market.seed_note(author.id, 0).await;
    market.seed_note(author.id, 10).await;
    let purchase = PurchaseNoteUseCase {
        uow: market.clone(),
    };
    purchase.execute(reader.id, first.id).await.unwrap();
    purchase.execute(reader.id, second.id).await.unwrap();

    let library = ListLibraryUseCase {
        notes: market.clone(),
    }
    .execute(reader.id, PageRequest::default())
    .await
    .unwrap();
    let library_ids: Vec<NoteId> = library.iter().map(|n| n.id).collect();
    assert_eq!(library_ids.len(), 2);
    assert!(library_ids.contains(&first.id) && library_ids.contains(&second.id));

    let uploaded = ListUploadedUseCase {
        notes: market.clone(),
    }
    .execute(author.id, PageRequest::default())
    .await
    .unwrap();
    assert_eq!(uploaded.len(), 3);
    assert!(
        ListUploadedUseCase {
            notes: market.clone()
        }
        .execute(reader.id, PageRequest::default())
        .await
        .unwrap()
        .is_empty()
    );
}

// ── Upload ───────────────────────────────────────────────────────────────────

fn upload_input(
    author: &swampnotes_market::domain::types::User,
    course_id: CourseId,
) -> UploadNoteInput {
    UploadNoteInput {
        author_id: author.id,
        title: "  Discrete Math Proofs ".into(),
        description: Some("induction, pigeonhole".into()),
        course_id,
        course_name: "COT 3100".into(),
        semester: "Fall 2025".into(),
        price: 25,
        is_free: false,
        content_type: Some("application/pdf".into()),
        bytes: Bytes::from_static(b"%PDF-1.4 proofs"),
    }
}

fn upload_usecase(
    market: &InMemoryMarket,
) -> UploadNoteUseCase<InMemoryMarket, InMemoryMarket, InMemoryMarket> {
    UploadNoteUseCase {
        notes: market.clone(),
        courses: market.clone(),
        content: market.clone(),
    }
}

#[tokio::test]
async fn should_store_upload_and_create_note() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;

    let note = upload_usecase(&market)
        .execute(upload_input(&author, course.id))
        .await
        .unwrap();

    assert_eq!(note.title, "Discrete Math Proofs");
    assert_eq!(note.price, 25);
    assert_eq!(note.content_handle, format!("{}.pdf", note.id));
    let stored = market.get(&note.content_handle).await.unwrap();
    assert_eq!(stored.as_deref(), Some(&b"%PDF-1.4 proofs"[..]));
    assert_eq!(market.note(note.id).await.author_id, author.id);
}

#[tokio::test]
async fn should_remove_stored_content_when_note_insert_fails() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;
    market.set_fail_note_create(true);

    let err = upload_usecase(&market)
        .execute(upload_input(&author, course.id))
        .await
        .unwrap_err();

    assert!(matches!(err, MarketServiceError::Internal(_)));
    let state = market.snapshot().await;
    assert!(state.content.is_empty());
    assert!(state.notes.is_empty());
}

#[tokio::test]
async fn should_force_zero_price_for_free_upload() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;
    let mut input = upload_input(&author, course.id);
    input.is_free = true;

    let note = upload_usecase(&market).execute(input).await.unwrap();

    assert!(note.is_free);
    assert_eq!(note.price, 0);
}

#[tokio::test]
async fn should_reject_non_pdf_upload() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;
    let mut input = upload_input(&author, course.id);
    input.content_type = Some("image/png".into());

    let result = upload_usecase(&market).execute(input).await;

    assert!(matches!(result, Err(MarketServiceError::InvalidUpload(_))));
    assert!(market.snapshot().await.notes.is_empty());
}

#[tokio::test]
async fn should_reject_negative_price() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;
    let mut input = upload_input(&author, course.id);
    input.price = -1;

    let result = upload_usecase(&market).execute(input).await;

    assert!(matches!(result, Err(MarketServiceError::InvalidPrice)));
}

#[tokio::test]
async fn should_reject_upload_for_unknown_course() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;

    let result = upload_usecase(&market)
        .execute(upload_input(&author, CourseId::generate()))
        .await;

    assert!(matches!(result, Err(MarketServiceError::CourseNotFound)));
    assert!(market.snapshot().await.content.is_empty());
}

#[tokio::test]
async fn should_reject_blank_title() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("COT3100").await;
    let mut input = upload_input(&author, course.id);
    input.title = "   ".into();

    let result = upload_usecase(&market).execute(input).await;

    assert!(matches!(result, Err(MarketServiceError::MissingData)));
}

// ── Courses ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_and_list_courses_by_code() {
    let market = InMemoryMarket::new();
    let create = CreateCourseUseCase {
        courses: market.clone(),
    };
    for code in ["STA3032", "COP3502", "MAC2311"] {
        create
            .execute(CreateCourseInput {
                code: code.into(),
                title: "Intro".into(),
                school: "UF".into(),
            })
            .await
            .unwrap();
    }

    let courses = ListCoursesUseCase {
        courses: market.clone(),
    }
    .execute()
    .await
    .unwrap();

    let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["COP3502", "MAC2311", "STA3032"]);
}

#[tokio::test]
async fn should_allow_same_code_at_different_school() {
    let market = InMemoryMarket::new();
    let create = CreateCourseUseCase {
        courses: market.clone(),
    };
    for school in ["UF", "FSU"] {
        create
            .execute(CreateCourseInput {
                code: "MAC2311".into(),
                title: "Calculus 1".into(),
                school: school.into(),
            })
            .await
            .unwrap();
    }
    let duplicate = create
        .execute(CreateCourseInput {
            code: "MAC2311".into(),
            title: "Calculus 1".into(),
            school: "UF".into(),
        })
        .await;
    assert!(matches!(duplicate, Err(MarketServiceError::CourseAlreadyExists)));
}

#[tokio::test]
async fn should_list_notes_of_existing_course_only() {
    let market = InMemoryMarket::new();
    let author = market.seed_user(0).await;
    let course = market.seed_course("EEL3111").await;
    market
        .seed_note_with(author.id, 5, |n| n.course_id = course.id)
        .await;
    market.seed_note(author.id, 5).await;
    let usecase = ListCourseNotesUseCase {
        courses: market.clone(),
        notes: market.clone(),
    };

    let notes = usecase
        .execute(course.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);

    let missing = usecase
        .execute(CourseId::generate(), PageRequest::default())
        .await;
    assert!(matches!(missing, Err(MarketServiceError::CourseNotFound)));
}
