// Board service - looks up referenced entities, runs pure domain checks,
// then hands validated records to the repository.
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::links::domain::{
    self, Comment, CommentId, NewComment, NewSubmission, RankedSubmission, Submission,
    SubmissionId, UserId, ValidationError,
};
use crate::links::repository::{DynLinkRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

pub type BoardResult<T> = Result<T, BoardError>;

/// Everything the detail page shows for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub upvotes: i64,
    pub comments: i64,
    pub root_comments: Vec<Comment>,
}

#[derive(Clone)]
pub struct Board {
    repo: DynLinkRepository,
}

impl Board {
    pub fn new(repo: DynLinkRepository) -> Self {
        Self { repo }
    }

    /// Scores are computed fresh from live counts on every call.
    pub async fn ranked_listing(&self, now: DateTime<Utc>) -> BoardResult<Vec<RankedSubmission>> {
        let stats = self.repo.submission_stats().await?;
        Ok(domain::rank(stats, now))
    }

    pub async fn submit_link(
        &self,
        title: &str,
        url: &str,
        author: UserId,
        now: DateTime<Utc>,
    ) -> BoardResult<Submission> {
        let new = NewSubmission::new(title, url, author, now)?;
        let submission = self.repo.insert_submission(&new).await?;

        tracing::info!(
            submission_id = %submission.id,
            submitted_by = %submission.submitted_by,
            "Link submitted"
        );
        Ok(submission)
    }

    pub async fn submission(&self, id: SubmissionId) -> BoardResult<Submission> {
        self.repo
            .submission(id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("Submission {}", id)))
    }

    pub async fn submission_detail(&self, id: SubmissionId) -> BoardResult<SubmissionDetail> {
        let submission = self.submission(id).await?;
        let upvotes = self.repo.upvote_count(id).await?;
        let comments = self.repo.comment_count(id).await?;
        let root_comments = self.repo.root_comments(id).await?;

        Ok(SubmissionDetail {
            submission,
            upvotes,
            comments,
            root_comments,
        })
    }

    pub async fn root_comments_for(&self, id: SubmissionId) -> BoardResult<Vec<Comment>> {
        self.submission(id).await?;
        Ok(self.repo.root_comments(id).await?)
    }

    pub async fn comment(&self, id: CommentId) -> BoardResult<Comment> {
        self.repo
            .comment(id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("Comment {}", id)))
    }

    /// One level down the reply chain
    pub async fn replies_to(&self, id: CommentId) -> BoardResult<Vec<Comment>> {
        self.comment(id).await?;
        Ok(self.repo.replies(id).await?)
    }

    /// One level up the reply chain; `None` for a root comment
    pub async fn parent_of(&self, comment: &Comment) -> BoardResult<Option<Comment>> {
        match comment.in_reply_to {
            Some(parent) => Ok(Some(self.comment(parent).await?)),
            None => Ok(None),
        }
    }

    pub async fn create_comment(
        &self,
        body: &str,
        author: UserId,
        submission: SubmissionId,
        parent: Option<CommentId>,
        now: DateTime<Utc>,
    ) -> BoardResult<Comment> {
        let submission = self.submission(submission).await?;
        let parent = match parent {
            Some(id) => Some(self.comment(id).await?),
            None => None,
        };

        let new = NewComment::new(body, author, &submission, parent.as_ref(), now)?;
        let comment = self.repo.insert_comment(&new).await?;

        tracing::info!(
            comment_id = %comment.id,
            submission_id = %comment.commented_on,
            in_reply_to = ?comment.in_reply_to.map(|c| c.0),
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn add_upvote(&self, submission: SubmissionId, user: &UserId) -> BoardResult<()> {
        self.submission(submission).await?;
        self.repo.add_upvote(submission, user).await?;

        tracing::debug!(submission_id = %submission, user_id = %user, "Upvote added");
        Ok(())
    }

    pub async fn remove_upvote(&self, submission: SubmissionId, user: &UserId) -> BoardResult<()> {
        self.submission(submission).await?;
        self.repo.remove_upvote(submission, user).await?;

        tracing::debug!(submission_id = %submission, user_id = %user, "Upvote removed");
        Ok(())
    }

    pub async fn upvote_count(&self, submission: SubmissionId) -> BoardResult<i64> {
        Ok(self.repo.upvote_count(submission).await?)
    }
}
