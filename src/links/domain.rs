// Domain types - Pure, immutable, no side effects
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// New types for compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub i64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque user reference, owned by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub title: String,
    pub url: String,
    pub submitted_by: UserId,
    pub submitted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub commented_on: SubmissionId,
    pub commented_by: UserId,
    /// `None` for a top-level comment on the submission
    pub in_reply_to: Option<CommentId>,
    pub created_on: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.in_reply_to.is_none()
    }
}

/// A submission together with the live counts the ranking needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionStats {
    pub submission: Submission,
    pub upvotes: i64,
    pub comments: i64,
}

/// Listing entry. The score lives here and never on `Submission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub upvotes: i64,
    pub comments: i64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    InvalidUrl(String),
    EmptyBody,
    ParentMismatch {
        parent: CommentId,
        parent_submission: SubmissionId,
        submission: SubmissionId,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::InvalidUrl(reason) => write!(f, "Invalid URL: {}", reason),
            Self::EmptyBody => write!(f, "Comment body is required"),
            Self::ParentMismatch {
                parent,
                parent_submission,
                submission,
            } => write!(
                f,
                "Comment {} belongs to submission {}, not {}",
                parent, parent_submission, submission
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validated submission, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub title: String,
    pub url: String,
    pub submitted_by: UserId,
    pub submitted_on: DateTime<Utc>,
}

impl NewSubmission {
    pub fn new(
        title: &str,
        url: &str,
        submitted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let parsed =
            Url::parse(url.trim()).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            title: title.to_string(),
            url: parsed.to_string(),
            submitted_by,
            submitted_on: now,
        })
    }
}

/// Validated comment, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub body: String,
    pub commented_on: SubmissionId,
    pub commented_by: UserId,
    pub in_reply_to: Option<CommentId>,
    pub created_on: DateTime<Utc>,
}

impl NewComment {
    /// The parent, when given, must already exist and sit on the same submission.
    pub fn new(
        body: &str,
        commented_by: UserId,
        submission: &Submission,
        parent: Option<&Comment>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }

        if let Some(parent) = parent {
            if parent.commented_on != submission.id {
                return Err(ValidationError::ParentMismatch {
                    parent: parent.id,
                    parent_submission: parent.commented_on,
                    submission: submission.id,
                });
            }
        }

        Ok(Self {
            body: body.to_string(),
            commented_on: submission.id,
            commented_by,
            in_reply_to: parent.map(|p| p.id),
            created_on: now,
        })
    }
}

/// Whole days since submission, rounded toward negative infinity.
/// Future timestamps give a negative count.
pub fn age_in_days(submitted_on: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = now - submitted_on;
    let days = delta.num_days();
    if delta < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

pub fn score(upvotes: i64, comments: i64, submitted_on: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    upvotes + comments - age_in_days(submitted_on, now)
}

/// Order submissions by descending score, ties by ascending id.
pub fn rank(stats: Vec<SubmissionStats>, now: DateTime<Utc>) -> Vec<RankedSubmission> {
    let mut ranked: Vec<RankedSubmission> = stats
        .into_iter()
        .map(|s| RankedSubmission {
            score: score(s.upvotes, s.comments, s.submission.submitted_on, now),
            submission: s.submission,
            upvotes: s.upvotes,
            comments: s.comments,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.submission.id.cmp(&b.submission.id))
    });

    ranked
}
