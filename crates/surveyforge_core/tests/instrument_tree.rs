use surveyforge_core::db::open_store_in_memory;
use surveyforge_core::{
    CreateSurveyRequest, InstrumentService, NodeLevel, QuestionDraft, QuestionService,
    QuestionType, ServiceError, SqliteSurveyRepository, Survey, SurveyId, SurveyService,
    TreeError, ALL_RESPONDENTS,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_store_in_memory().unwrap()
}

fn create_survey(conn: &rusqlite::Connection) -> SurveyId {
    let repo = SqliteSurveyRepository::try_new(conn).unwrap();
    let service = SurveyService::new(repo);
    let survey = service
        .create_survey(CreateSurveyRequest {
            title: "Workplace climate".to_string(),
            description: "Annual edition".to_string(),
            is_active: true,
            instrument_structure: Vec::new(),
        })
        .unwrap();
    survey.id
}

fn load_survey(conn: &rusqlite::Connection, id: SurveyId) -> Survey {
    let repo = SqliteSurveyRepository::try_new(conn).unwrap();
    let service = SurveyService::new(repo);
    service.get_survey(id).unwrap().unwrap()
}

fn text_draft(instrument_id: Uuid, title: &str) -> QuestionDraft {
    QuestionDraft {
        instrument_id,
        title: title.to_string(),
        kind: QuestionType::ShortAnswer,
        required: false,
        options: None,
        placeholder: None,
        respondent_job_type: ALL_RESPONDENTS.to_string(),
    }
}

#[test]
fn section_codes_count_up_from_l1001() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let first = service
        .create_node(survey_id, NodeLevel::Section, None, "Demographics")
        .unwrap();
    let second = service
        .create_node(survey_id, NodeLevel::Section, None, "Work environment")
        .unwrap();

    let survey = load_survey(&conn, survey_id);
    assert_eq!(survey.instrument_structure.node(first).unwrap().code(), "L1001");
    assert_eq!(survey.instrument_structure.node(second).unwrap().code(), "L1002");
    assert_eq!(survey.instrument_structure.root_ids(), &[first, second]);
}

#[test]
fn deleted_sub_section_codes_are_not_reissued() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let section = service
        .create_node(survey_id, NodeLevel::Section, None, "Demographics")
        .unwrap();
    let first = service
        .create_node(survey_id, NodeLevel::SubSection, Some(section), "Personal")
        .unwrap();
    let second = service
        .create_node(survey_id, NodeLevel::SubSection, Some(section), "Location")
        .unwrap();

    {
        let survey = load_survey(&conn, survey_id);
        assert_eq!(
            survey.instrument_structure.node(first).unwrap().code(),
            "L1001.201"
        );
        assert_eq!(
            survey.instrument_structure.node(second).unwrap().code(),
            "L1001.202"
        );
    }

    let removed = service.delete_node(survey_id, first).unwrap();
    assert_eq!(removed, vec![first]);

    let third = service
        .create_node(survey_id, NodeLevel::SubSection, Some(section), "Household")
        .unwrap();
    let survey = load_survey(&conn, survey_id);
    assert_eq!(
        survey.instrument_structure.node(third).unwrap().code(),
        "L1001.203"
    );
    assert_eq!(
        survey.instrument_structure.node(second).unwrap().code(),
        "L1001.202"
    );
}

#[test]
fn grouping_codes_nest_under_the_sub_section() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let section = service
        .create_node(survey_id, NodeLevel::Section, None, "Health")
        .unwrap();
    let sub = service
        .create_node(survey_id, NodeLevel::SubSection, Some(section), "Habits")
        .unwrap();
    let grouping = service
        .create_node(survey_id, NodeLevel::Grouping, Some(sub), "Sleep")
        .unwrap();

    let survey = load_survey(&conn, survey_id);
    assert_eq!(
        survey.instrument_structure.node(grouping).unwrap().code(),
        "L1001.201.301"
    );
    assert_eq!(
        survey.instrument_structure.node(grouping).unwrap().parent_id(),
        Some(sub)
    );
}

#[test]
fn level_pairing_violations_are_rejected_without_writes() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let section = service
        .create_node(survey_id, NodeLevel::Section, None, "Demographics")
        .unwrap();

    let err = service
        .create_node(survey_id, NodeLevel::Section, Some(section), "Nested section")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tree(TreeError::RootWithParent(id)) if id == section
    ));

    let err = service
        .create_node(survey_id, NodeLevel::SubSection, None, "Floating sub")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tree(TreeError::MissingParent(NodeLevel::SubSection))
    ));

    let err = service
        .create_node(survey_id, NodeLevel::Grouping, Some(section), "Wrong depth")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tree(TreeError::LevelMismatch { .. })
    ));

    let unknown_parent = Uuid::new_v4();
    let err = service
        .create_node(survey_id, NodeLevel::SubSection, Some(unknown_parent), "x")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Tree(TreeError::ParentNotFound(id)) if id == unknown_parent
    ));

    let survey = load_survey(&conn, survey_id);
    assert_eq!(survey.instrument_structure.len(), 1);
}

#[test]
fn rename_changes_label_but_never_the_code() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let section = service
        .create_node(survey_id, NodeLevel::Section, None, "Draft name")
        .unwrap();
    assert!(service.rename_node(survey_id, section, "Final name").unwrap());
    assert!(!service.rename_node(survey_id, Uuid::new_v4(), "x").unwrap());

    let survey = load_survey(&conn, survey_id);
    let record = survey.instrument_structure.node(section).unwrap();
    assert_eq!(record.name(), "Final name");
    assert_eq!(record.code(), "L1001");
}

#[test]
fn deleting_a_section_removes_the_subtree_and_its_questions() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let tree = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());
    let questions = QuestionService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let doomed = tree
        .create_node(survey_id, NodeLevel::Section, None, "Doomed")
        .unwrap();
    let doomed_sub = tree
        .create_node(survey_id, NodeLevel::SubSection, Some(doomed), "Inner")
        .unwrap();
    let kept = tree
        .create_node(survey_id, NodeLevel::Section, None, "Kept")
        .unwrap();

    questions
        .add_question(survey_id, text_draft(doomed, "On doomed"))
        .unwrap();
    let survivor = questions
        .add_question(survey_id, text_draft(kept, "On kept"))
        .unwrap();
    questions
        .add_question(survey_id, text_draft(doomed_sub, "On doomed sub"))
        .unwrap();

    let removed = tree.delete_node(survey_id, doomed).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(removed.contains(&doomed));
    assert!(removed.contains(&doomed_sub));

    let survey = load_survey(&conn, survey_id);
    assert!(!survey.instrument_structure.contains(doomed));
    assert!(!survey.instrument_structure.contains(doomed_sub));
    assert!(survey.instrument_structure.contains(kept));
    assert_eq!(survey.total_questions, 1);
    assert_eq!(survey.questions.len(), 1);
    assert_eq!(survey.questions[0].id, survivor);
    assert_eq!(survey.questions[0].question_number, 1);
}

#[test]
fn recursive_count_spans_the_subtree_while_listing_stays_direct() {
    let conn = setup();
    let survey_id = create_survey(&conn);
    let tree = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());
    let questions = QuestionService::new(SqliteSurveyRepository::try_new(&conn).unwrap());

    let section = tree
        .create_node(survey_id, NodeLevel::Section, None, "Health")
        .unwrap();
    let sub = tree
        .create_node(survey_id, NodeLevel::SubSection, Some(section), "Habits")
        .unwrap();

    let on_section = questions
        .add_question(survey_id, text_draft(section, "Section level"))
        .unwrap();
    questions
        .add_question(survey_id, text_draft(sub, "Sub level"))
        .unwrap();

    let direct = tree.questions_for_instrument(survey_id, section).unwrap();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].id, on_section);

    assert_eq!(tree.count_questions_recursive(survey_id, section).unwrap(), 2);
    assert_eq!(tree.count_questions_recursive(survey_id, sub).unwrap(), 1);
    assert_eq!(
        tree.count_questions_recursive(survey_id, Uuid::new_v4())
            .unwrap(),
        0
    );
}

#[test]
fn operations_on_a_missing_survey_fail_with_not_found() {
    let conn = setup();
    let service = InstrumentService::new(SqliteSurveyRepository::try_new(&conn).unwrap());
    let unknown = Uuid::new_v4();

    let err = service
        .create_node(unknown, NodeLevel::Section, None, "x")
        .unwrap_err();
    assert!(matches!(err, ServiceError::SurveyNotFound(id) if id == unknown));
}
