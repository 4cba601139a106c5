//! Facade graph verification against a scripted transport.
//!
//! These tests drive the navigation graph end to end without a network:
//! a mock transport records every issued request and answers from a
//! scripted queue. They pin down the mutation-coordination contract —
//! server responses replace snapshots wholesale, local lookups fail
//! before any remote call, empty collections are not errors.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use pivotal_fluent::{
    Error, MovePosition, NewStory, StoryState, StoryType, Token, Tracker, Transport, Verb,
};

#[derive(Debug, Clone)]
struct RecordedRequest {
    verb: Verb,
    path: String,
    body: Option<String>,
}

/// Transport double answering from a scripted response queue.
#[derive(Clone, Default)]
struct MockTransport {
    requests: Rc<RefCell<Vec<RecordedRequest>>>,
    responses: Rc<RefCell<VecDeque<Result<String, (u16, String)>>>>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn respond_ok(&self, xml: &str) {
        self.responses.borrow_mut().push_back(Ok(xml.to_string()));
    }

    fn respond_err(&self, status: u16, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err((status, message.to_string())));
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        _token: &Token,
        path: &str,
        body: Option<&str>,
        verb: Verb,
    ) -> pivotal_fluent::Result<String> {
        self.requests.borrow_mut().push(RecordedRequest {
            verb,
            path: path.to_string(),
            body: body.map(str::to_string),
        });
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(xml)) => Ok(xml),
            Some(Err((status, message))) => Err(Error::api_full(message, status, path)),
            None => panic!("unexpected request: {verb} {path}"),
        }
    }
}

fn tracker_over(mock: &MockTransport) -> Tracker {
    Tracker::with_transport(Token::new("test-token"), Box::new(mock.clone()))
}

const PROJECT_42: &str = r#"
    <project>
        <id>42</id>
        <name>Enterprise</name>
        <iteration_length>2</iteration_length>
        <week_start_day>Monday</week_start_day>
        <bugs_and_chores_are_estimatable>false</bugs_and_chores_are_estimatable>
    </project>"#;

fn story_xml(id: i64, name: &str, state: &str) -> String {
    format!(
        r#"<story>
            <id>{id}</id>
            <project_id>42</project_id>
            <story_type>feature</story_type>
            <current_state>{state}</current_state>
            <name>{name}</name>
            <description>original description</description>
            <requested_by>Alice</requested_by>
            <updated_at>2011-06-15 10:00:00 UTC</updated_at>
        </story>"#
    )
}

fn stories_xml(stories: &[String]) -> String {
    format!(r#"<stories type="array">{}</stories>"#, stories.join(""))
}

#[test]
fn update_replaces_snapshot_with_server_representation() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&stories_xml(&[
        story_xml(1, "one", "started"),
        story_xml(2, "two", "started"),
        story_xml(3, "three", "started"),
    ]));
    // The server recomputes fields the mutator never touched.
    mock.respond_ok(
        r#"<story>
            <id>2</id>
            <project_id>42</project_id>
            <story_type>feature</story_type>
            <current_state>finished</current_state>
            <name>two renamed</name>
            <description>server rewrote this</description>
            <estimate>8</estimate>
            <updated_at>2011-06-16 12:00:00 UTC</updated_at>
        </story>"#,
    );

    let tracker = tracker_over(&mock);
    let mut stories = tracker.projects().get(42).unwrap().stories().get_all().unwrap();
    assert_eq!(stories.len(), 3);

    let story = &mut stories[1];
    story
        .update(|s| s.name = "two renamed".to_string())
        .unwrap();

    // the snapshot is the server's full representation, not a client merge
    let snapshot = story.item();
    assert_eq!(snapshot.name, "two renamed");
    assert_eq!(snapshot.description, "server rewrote this");
    assert_eq!(snapshot.current_state, StoryState::Finished);
    assert_eq!(snapshot.estimate, 8);

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].verb, Verb::Put);
    assert_eq!(requests[2].path, "/projects/42/stories/2");
}

#[test]
fn update_sends_whole_entity_and_forces_estimate_for_bugs() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42); // bugs_and_chores_are_estimatable = false
    mock.respond_ok(&stories_xml(&[story_xml(7, "broken", "started")]));
    mock.respond_ok(&story_xml(7, "broken", "started"));

    let tracker = tracker_over(&mock);
    let mut stories = tracker.projects().get(42).unwrap().stories().get_all().unwrap();
    stories[0]
        .update(|s| {
            s.story_type = StoryType::Bug;
            s.estimate = 5;
        })
        .unwrap();

    let requests = mock.requests();
    let body = requests[2].body.as_deref().expect("update carries a body");
    assert!(body.contains("<story_type>bug</story_type>"));
    // the mutator set 5, but the project forbids bug/chore estimates
    assert!(body.contains("<estimate>-1</estimate>"));
    assert!(body.contains("<requested_by>Alice</requested_by>"));
}

#[test]
fn delete_returns_the_parent_collection() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(9, "doomed", "started"));
    mock.respond_ok(&story_xml(9, "doomed", "started")); // delete echoes the story
    mock.respond_ok(&stories_xml(&[]));

    let tracker = tracker_over(&mock);
    let stories = tracker.projects().get(42).unwrap().stories();
    let story = stories.get(9).unwrap();

    // the returned parent keeps the chain alive
    let parent = story.delete().unwrap();
    assert_eq!(parent.project().item().id, 42);
    assert!(parent.get_all().unwrap().is_empty());

    let requests = mock.requests();
    assert_eq!(requests[2].verb, Verb::Delete);
    assert_eq!(requests[2].path, "/projects/42/stories/9");
}

#[test]
fn empty_collection_is_not_a_transport_failure() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&stories_xml(&[]));
    mock.respond_err(500, "Internal Server Error");

    let tracker = tracker_over(&mock);
    let stories = tracker.projects().get(42).unwrap().stories();

    // zero children is an empty sequence
    assert!(stories.get_all().unwrap().is_empty());

    // a failing transport is an API error instead
    let err = stories.get_all().unwrap_err();
    match err {
        Error::Api {
            status_code,
            endpoint,
            ..
        } => {
            assert_eq!(status_code, Some(500));
            assert_eq!(endpoint.as_deref(), Some("/projects/42/stories"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn removing_an_unknown_task_fails_before_any_network_call() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(5, "no tasks", "started"));

    let tracker = tracker_over(&mock);
    let mut story = tracker.projects().get(42).unwrap().stories().get(5).unwrap();
    let issued_before = mock.request_count();

    assert!(matches!(
        story.remove_task(123),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        story.update_task(123, true, "x"),
        Err(Error::NotFound { .. })
    ));

    assert_eq!(mock.request_count(), issued_before);
}

#[test]
fn sub_resource_mutations_mirror_the_server_representation() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(5, "busy", "started"));
    mock.respond_ok(
        r#"<note>
            <id>71</id>
            <text>looks good</text>
            <author>Carol</author>
            <noted_at>2011-06-17 08:00:00 UTC</noted_at>
        </note>"#,
    );
    mock.respond_ok(
        r#"<task>
            <id>81</id>
            <description>test it</description>
            <position>1</position>
            <complete>false</complete>
        </task>"#,
    );
    mock.respond_ok(
        r#"<task>
            <id>81</id>
            <description>test it twice</description>
            <position>1</position>
            <complete>true</complete>
        </task>"#,
    );
    mock.respond_ok(
        r#"<task>
            <id>81</id>
            <description>test it twice</description>
            <position>1</position>
            <complete>true</complete>
        </task>"#,
    );

    let tracker = tracker_over(&mock);
    let mut story = tracker.projects().get(42).unwrap().stories().get(5).unwrap();

    story.add_note("looks good").unwrap();
    assert_eq!(story.item().notes.len(), 1);
    assert_eq!(story.item().notes[0].id, 71);
    assert_eq!(story.item().notes[0].story_id, 5);

    story.add_task("test it").unwrap();
    assert_eq!(story.item().tasks.len(), 1);

    story.update_task(81, true, "test it twice").unwrap();
    assert_eq!(story.item().tasks[0].description, "test it twice");
    assert!(story.item().tasks[0].complete);

    story.remove_task(81).unwrap();
    assert!(story.item().tasks.is_empty());

    let requests = mock.requests();
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths[2..],
        [
            "/projects/42/stories/5/notes",
            "/projects/42/stories/5/tasks",
            "/projects/42/stories/5/tasks/81",
            "/projects/42/stories/5/tasks/81",
        ]
    );
}

#[test]
fn unsupported_operations_fail_without_a_request() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(5, "story", "started"));

    let tracker = tracker_over(&mock);
    let project = tracker.projects().get(42).unwrap();
    let mut story = project.stories().get(5).unwrap();
    let issued_before = mock.request_count();

    assert!(matches!(
        project.iterations().limited(0, 10),
        Err(Error::Unsupported { .. })
    ));
    assert!(matches!(
        story.link_to_external(),
        Err(Error::Unsupported { .. })
    ));

    assert_eq!(mock.request_count(), issued_before);
}

#[test]
fn every_collection_read_is_a_fresh_fetch() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&stories_xml(&[story_xml(1, "one", "started")]));
    mock.respond_ok(&stories_xml(&[]));

    let tracker = tracker_over(&mock);
    let stories = tracker.projects().get(42).unwrap().stories();

    assert_eq!(stories.get_all().unwrap().len(), 1);
    // no list caching: the second read sees the new server state
    assert!(stories.get_all().unwrap().is_empty());
    assert_eq!(mock.request_count(), 3);
}

#[test]
fn filtered_and_limited_listings_use_query_parameters() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&stories_xml(&[]));
    mock.respond_ok(&stories_xml(&[]));

    let tracker = tracker_over(&mock);
    let stories = tracker.projects().get(42).unwrap().stories();

    stories.filtered("state:started owner:BO").unwrap();
    stories.limited(20, 10).unwrap();

    let requests = mock.requests();
    assert_eq!(
        requests[1].path,
        "/projects/42/stories?filter=state%3Astarted%20owner%3ABO"
    );
    assert_eq!(requests[2].path, "/projects/42/stories?limit=10&offset=20");
}

#[test]
fn story_creation_appends_server_assigned_fields() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(777, "fresh", "unscheduled"));

    let tracker = tracker_over(&mock);
    let project = tracker.projects().get(42).unwrap();

    let mut new = NewStory::new(StoryType::Feature, "fresh");
    new.requested_by = "Alice".to_string();
    new.labels = vec!["warp".to_string(), "core".to_string()];

    let story = project.stories().add(&new).unwrap();
    assert_eq!(story.item().id, 777);

    let requests = mock.requests();
    assert_eq!(requests[1].verb, Verb::Post);
    let body = requests[1].body.as_deref().unwrap();
    assert!(body.contains("<labels>warp,core</labels>"));
    // an unset estimate is still transmitted as the sentinel
    assert!(body.contains("<estimate>-1</estimate>"));
}

#[test]
fn deliver_all_finished_returns_the_affected_stories() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&stories_xml(&[
        story_xml(1, "one", "delivered"),
        story_xml(2, "two", "delivered"),
    ]));

    let tracker = tracker_over(&mock);
    let delivered = tracker
        .projects()
        .get(42)
        .unwrap()
        .stories()
        .deliver_all_finished()
        .unwrap();

    assert_eq!(delivered.len(), 2);
    assert!(delivered
        .iter()
        .all(|s| s.item().current_state == StoryState::Delivered));

    let requests = mock.requests();
    assert_eq!(requests[1].verb, Verb::Put);
    assert_eq!(
        requests[1].path,
        "/projects/42/stories/deliver_all_finished"
    );
}

#[test]
fn move_takes_the_server_snapshot() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(&story_xml(5, "mover", "started"));
    mock.respond_ok(&story_xml(5, "mover", "unscheduled"));

    let tracker = tracker_over(&mock);
    let mut story = tracker.projects().get(42).unwrap().stories().get(5).unwrap();
    story.move_to(MovePosition::Before, 6).unwrap();

    assert_eq!(story.item().current_state, StoryState::Unscheduled);
    let requests = mock.requests();
    assert_eq!(requests[2].verb, Verb::Post);
    assert_eq!(
        requests[2].path,
        "/projects/42/stories/5/moves?move[move]=before&move[target]=6"
    );
}

#[test]
fn iterations_hydrate_their_stories() {
    let mock = MockTransport::new();
    mock.respond_ok(PROJECT_42);
    mock.respond_ok(
        r#"<iterations type="array">
            <iteration>
                <id>1</id>
                <number>1</number>
                <start>2011-06-13 06:00:00 UTC</start>
                <finish>2011-06-27 06:00:00 UTC</finish>
                <team_strength>1.0</team_strength>
                <stories>
                    <story>
                        <id>300</id>
                        <project_id>42</project_id>
                        <story_type>feature</story_type>
                        <current_state>finished</current_state>
                        <name>scheduled</name>
                    </story>
                </stories>
            </iteration>
        </iterations>"#,
    );

    let tracker = tracker_over(&mock);
    let iterations = tracker
        .projects()
        .get(42)
        .unwrap()
        .iterations()
        .get_all()
        .unwrap();

    assert_eq!(iterations.len(), 1);
    assert_eq!(iterations[0].item().number, 1);
    assert_eq!(iterations[0].stories().len(), 1);
    assert_eq!(iterations[0].stories()[0].name, "scheduled");
}
