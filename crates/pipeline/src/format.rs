//! Event → notification text.
//!
//! Rendering is pure. Tracker actions are first classified into a
//! [`TrackerNotice`] using only the payload itself, so actions that can never
//! produce a message are dropped before any enrichment lookup is made.
//!
//! Links use the chat platform's `[text](<url>)` form; the angle brackets
//! suppress link previews.

use std::fmt::Write as _;

use crate::{resolve_reference, Action, PushEvent, Reference};

/// Number of characters of a commit id shown in push bullet lists.
pub const SHORT_ID_LEN: usize = 7;

/// Field whose change signals a workflow transition.
pub const WORKFLOW_STATE_FIELD: &str = "workflow_state_id";

/// Returns at most the first [`SHORT_ID_LEN`] characters of a commit id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn link(text: &str, url: &str) -> String {
    format!("[{text}](<{url}>)")
}

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// Renders a push notification.
///
/// One commit renders on a single line; several render as a header followed by
/// one bullet per commit in push order. Pushes without commits render nothing.
pub fn render_push(user: &str, event: &PushEvent) -> Option<String> {
    let repo = link(&event.repository.name, event.repository.link());
    match event.commits.as_slice() {
        [] => None,
        [only] => {
            let commit = event.head_commit.as_ref().unwrap_or(only);
            Some(format!(
                "{user} pushed a new {} to {repo}: {}",
                link("commit", &commit.url),
                commit.message
            ))
        }
        commits => {
            let mut message = format!("{user} pushed {} new commits to {repo}:", commits.len());
            for commit in commits {
                let _ = write!(
                    message,
                    "\n- {}: {}",
                    link(short_id(&commit.id), &commit.url),
                    commit.message
                );
            }
            Some(message)
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Workflow states that are announced when a story moves into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTransition {
    Todo,
    InProgress,
    Done,
}

impl WorkflowTransition {
    /// Maps a workflow-state display name. Other states are not announced.
    pub fn from_state_name(name: &str) -> Option<Self> {
        match name {
            "Todo" => Some(Self::Todo),
            "In Progress" => Some(Self::InProgress),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// A tracker action that will produce a notification once enriched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerNotice {
    /// `story` / `create`.
    StoryCreated { name: String, app_url: String },
    /// `story` / `update` with an announced workflow state.
    StoryMoved {
        transition: WorkflowTransition,
        app_url: String,
    },
    /// `story-comment` / `create`.
    CommentCreated { text: String, app_url: String },
}

impl TrackerNotice {
    /// Whether rendering needs the item title from the tracker API.
    pub fn needs_item_title(&self) -> bool {
        !matches!(self, TrackerNotice::StoryCreated { .. })
    }

    /// URL of the item the notice is about.
    pub fn app_url(&self) -> &str {
        match self {
            TrackerNotice::StoryCreated { app_url, .. }
            | TrackerNotice::StoryMoved { app_url, .. }
            | TrackerNotice::CommentCreated { app_url, .. } => app_url,
        }
    }

    /// Renders the notice. `title` is ignored for [`TrackerNotice::StoryCreated`].
    pub fn render(&self, user: &str, title: &str) -> String {
        match self {
            TrackerNotice::StoryCreated { name, app_url } => {
                format!("{user} created a new story: {}", link(name, app_url))
            }
            TrackerNotice::StoryMoved {
                transition,
                app_url,
            } => {
                let item = link(title, app_url);
                match transition {
                    WorkflowTransition::Todo => format!("{user} moved a story into Todo: {item}"),
                    WorkflowTransition::InProgress => format!("{user} started working on: {item}"),
                    WorkflowTransition::Done => format!("{user} completed: {item}"),
                }
            }
            TrackerNotice::CommentCreated { text, app_url } => {
                format!("{user} made a new comment on {}: {text}", link(title, app_url))
            }
        }
    }
}

/// Classifies a tracker action. `None` means the action is silently ignored.
pub fn classify_action(action: &Action, references: &[Reference]) -> Option<TrackerNotice> {
    match (action.entity_type.as_str(), action.kind.as_str()) {
        ("story", "create") => Some(TrackerNotice::StoryCreated {
            name: action.name.clone(),
            app_url: action.app_url.clone(),
        }),
        ("story", "update") => {
            let new_state = action.changes.get(WORKFLOW_STATE_FIELD)?.new_value.as_ref()?;
            let transition =
                WorkflowTransition::from_state_name(resolve_reference(new_state, references))?;
            Some(TrackerNotice::StoryMoved {
                transition,
                app_url: action.app_url.clone(),
            })
        }
        ("story-comment", "create") => Some(TrackerNotice::CommentCreated {
            text: action.text.clone(),
            app_url: action.app_url.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Change, CommitPerson, CommitRecord, OpaqueValue, Repository};

    fn commit(id: &str, message: &str) -> CommitRecord {
        CommitRecord {
            id: id.to_string(),
            message: message.to_string(),
            url: format!("https://github.com/acme/hermes/commit/{id}"),
            author: CommitPerson {
                username: "ada".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn push(commits: Vec<CommitRecord>) -> PushEvent {
        PushEvent {
            git_ref: "refs/heads/main".to_string(),
            repository: Repository {
                name: "hermes".to_string(),
                url: "https://github.com/acme/hermes".to_string(),
                ..Default::default()
            },
            head_commit: commits.last().cloned(),
            commits,
        }
    }

    fn story_update(state_id: OpaqueValue) -> Action {
        Action {
            entity_type: "story".to_string(),
            kind: "update".to_string(),
            app_url: "https://app.shortcut.com/acme/story/42/login".to_string(),
            changes: [(
                WORKFLOW_STATE_FIELD.to_string(),
                Change {
                    new_value: Some(state_id),
                    old_value: None,
                },
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        }
    }

    fn states() -> Vec<Reference> {
        [(1, "Todo"), (2, "In Progress"), (3, "Done"), (4, "Review")]
            .into_iter()
            .map(|(id, name)| Reference {
                id: Some(OpaqueValue::from(id as i64)),
                entity_type: "workflow-state".to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn short_id_truncates_to_seven_characters() {
        assert_eq!(short_id("0123456789abcdef"), "0123456");
        assert_eq!(short_id("0123456"), "0123456");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn short_id_respects_char_boundaries() {
        assert_eq!(short_id("ééééééééé"), "ééééééé");
    }

    #[test]
    fn single_commit_push() {
        let event = push(vec![commit("0123456789", "Fix login")]);
        assert_eq!(
            render_push("ada", &event).unwrap(),
            "ada pushed a new [commit](<https://github.com/acme/hermes/commit/0123456789>) \
             to [hermes](<https://github.com/acme/hermes>): Fix login"
        );
    }

    #[test]
    fn multi_commit_push_lists_commits_in_order() {
        let event = push(vec![
            commit("aaaaaaaaaa", "first"),
            commit("bbbbbbbbbb", "second"),
            commit("ccc", "third"),
        ]);
        let message = render_push("<@1>", &event).unwrap();
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "<@1> pushed 3 new commits to [hermes](<https://github.com/acme/hermes>):"
        );
        assert_eq!(
            lines[1],
            "- [aaaaaaa](<https://github.com/acme/hermes/commit/aaaaaaaaaa>): first"
        );
        assert!(lines[2].starts_with("- [bbbbbbb]("));
        assert!(lines[2].ends_with(": second"));
        assert!(lines[3].starts_with("- [ccc]("));
    }

    #[test]
    fn empty_push_renders_nothing() {
        assert_eq!(render_push("ada", &push(vec![])), None);
    }

    #[test]
    fn story_create() {
        let action = Action {
            entity_type: "story".to_string(),
            kind: "create".to_string(),
            name: "Login fails".to_string(),
            app_url: "https://app.shortcut.com/acme/story/42".to_string(),
            ..Default::default()
        };
        let notice = classify_action(&action, &[]).unwrap();
        assert!(!notice.needs_item_title());
        assert_eq!(
            notice.render("ada", ""),
            "ada created a new story: [Login fails](<https://app.shortcut.com/acme/story/42>)"
        );
    }

    #[test]
    fn story_transitions() {
        let url = "https://app.shortcut.com/acme/story/42/login";
        let cases = [
            (1, format!("ada moved a story into Todo: [Login](<{url}>)")),
            (2, format!("ada started working on: [Login](<{url}>)")),
            (3, format!("ada completed: [Login](<{url}>)")),
        ];
        for (id, expected) in cases {
            let notice =
                classify_action(&story_update(OpaqueValue::from(id as i64)), &states()).unwrap();
            assert!(notice.needs_item_title());
            assert_eq!(notice.render("ada", "Login"), expected);
        }
    }

    #[test]
    fn unannounced_or_unresolved_states_are_ignored() {
        assert_eq!(classify_action(&story_update(OpaqueValue::from(4_i64)), &states()), None);
        assert_eq!(classify_action(&story_update(OpaqueValue::from(99_i64)), &states()), None);
        assert_eq!(classify_action(&story_update(OpaqueValue::from("2")), &states()), None);
    }

    #[test]
    fn story_update_without_state_change_is_ignored() {
        let action = Action {
            entity_type: "story".to_string(),
            kind: "update".to_string(),
            ..Default::default()
        };
        assert_eq!(classify_action(&action, &states()), None);
    }

    #[test]
    fn comment_create() {
        let action = Action {
            entity_type: "story-comment".to_string(),
            kind: "create".to_string(),
            text: "Looks good".to_string(),
            app_url: "https://app.shortcut.com/acme/story/42/login#activity-7".to_string(),
            ..Default::default()
        };
        let notice = classify_action(&action, &[]).unwrap();
        assert_eq!(
            notice.render("<@9>", "Login"),
            "<@9> made a new comment on \
             [Login](<https://app.shortcut.com/acme/story/42/login#activity-7>): Looks good"
        );
    }

    #[test]
    fn other_tuples_are_ignored() {
        let tuples = [
            ("story", "delete"),
            ("epic", "create"),
            ("story-comment", "update"),
        ];
        for (entity, kind) in tuples {
            let action = Action {
                entity_type: entity.to_string(),
                kind: kind.to_string(),
                ..Default::default()
            };
            assert_eq!(classify_action(&action, &states()), None, "{entity}/{kind}");
        }
    }
}
