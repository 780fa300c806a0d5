// Repository pattern - isolates all database side effects
use crate::links::domain::*;
use crate::state::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Repository trait - all database operations the board needs
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn insert_submission(&self, new: &NewSubmission) -> Result<Submission, RepositoryError>;

    async fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError>;

    /// Every submission with its upvote and comment counts, in id order
    async fn submission_stats(&self) -> Result<Vec<SubmissionStats>, RepositoryError>;

    async fn insert_comment(&self, new: &NewComment) -> Result<Comment, RepositoryError>;

    async fn comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError>;

    /// Top-level comments on a submission, in creation order
    async fn root_comments(&self, submission: SubmissionId)
        -> Result<Vec<Comment>, RepositoryError>;

    /// Direct replies to a comment, in creation order
    async fn replies(&self, parent: CommentId) -> Result<Vec<Comment>, RepositoryError>;

    /// Comments at any depth
    async fn comment_count(&self, submission: SubmissionId) -> Result<i64, RepositoryError>;

    /// Idempotent: adding an existing member is a no-op
    async fn add_upvote(&self, submission: SubmissionId, user: &UserId)
        -> Result<(), RepositoryError>;

    /// Idempotent: removing an absent member is a no-op
    async fn remove_upvote(
        &self,
        submission: SubmissionId,
        user: &UserId,
    ) -> Result<(), RepositoryError>;

    async fn upvote_count(&self, submission: SubmissionId) -> Result<i64, RepositoryError>;

    async fn has_upvoted(
        &self,
        submission: SubmissionId,
        user: &UserId,
    ) -> Result<bool, RepositoryError>;
}

/// SQLite implementation
pub struct SqliteLinkRepository {
    pool: DbPool,
}

impl SqliteLinkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SUBMISSION_COLUMNS: &str = "id, title, url, submitted_by, submitted_on";
const COMMENT_COLUMNS: &str = "id, body, commented_on, commented_by, in_reply_to, created_on";

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: SubmissionId(row.get(0)?),
        title: row.get(1)?,
        url: row.get(2)?,
        submitted_by: UserId(row.get(3)?),
        submitted_on: parse_timestamp(row, 4)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.get(0)?),
        body: row.get(1)?,
        commented_on: SubmissionId(row.get(2)?),
        commented_by: UserId(row.get(3)?),
        in_reply_to: row.get::<_, Option<i64>>(4)?.map(CommentId),
        created_on: parse_timestamp(row, 5)?,
    })
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn insert_submission(&self, new: &NewSubmission) -> Result<Submission, RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO submissions (title, url, submitted_by, submitted_on)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                new.title,
                new.url,
                new.submitted_by.as_str(),
                new.submitted_on.to_rfc3339()
            ],
        )?;

        Ok(Submission {
            id: SubmissionId(conn.last_insert_rowid()),
            title: new.title.clone(),
            url: new.url.clone(),
            submitted_by: new.submitted_by.clone(),
            submitted_on: new.submitted_on,
        })
    }

    async fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let conn = self.pool.get()?;

        let submission = conn
            .query_row(
                &format!("SELECT {} FROM submissions WHERE id = ?1", SUBMISSION_COLUMNS),
                params![id.0],
                submission_from_row,
            )
            .optional()?;

        Ok(submission)
    }

    async fn submission_stats(&self) -> Result<Vec<SubmissionStats>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT s.id, s.title, s.url, s.submitted_by, s.submitted_on,
                    (SELECT COUNT(*) FROM upvotes u WHERE u.submission_id = s.id),
                    (SELECT COUNT(*) FROM comments c WHERE c.commented_on = s.id)
             FROM submissions s
             ORDER BY s.id",
        )?;

        let stats = stmt
            .query_map([], |row| {
                Ok(SubmissionStats {
                    submission: submission_from_row(row)?,
                    upvotes: row.get(5)?,
                    comments: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stats)
    }

    async fn insert_comment(&self, new: &NewComment) -> Result<Comment, RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO comments (body, commented_on, commented_by, in_reply_to, created_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.body,
                new.commented_on.0,
                new.commented_by.as_str(),
                new.in_reply_to.map(|c| c.0),
                new.created_on.to_rfc3339()
            ],
        )?;

        Ok(Comment {
            id: CommentId(conn.last_insert_rowid()),
            body: new.body.clone(),
            commented_on: new.commented_on,
            commented_by: new.commented_by.clone(),
            in_reply_to: new.in_reply_to,
            created_on: new.created_on,
        })
    }

    async fn comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let conn = self.pool.get()?;

        let comment = conn
            .query_row(
                &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
                params![id.0],
                comment_from_row,
            )
            .optional()?;

        Ok(comment)
    }

    async fn root_comments(
        &self,
        submission: SubmissionId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments
             WHERE commented_on = ?1 AND in_reply_to IS NULL
             ORDER BY id",
            COMMENT_COLUMNS
        ))?;

        let comments = stmt
            .query_map(params![submission.0], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    async fn replies(&self, parent: CommentId) -> Result<Vec<Comment>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM comments WHERE in_reply_to = ?1 ORDER BY id",
            COMMENT_COLUMNS
        ))?;

        let comments = stmt
            .query_map(params![parent.0], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    async fn comment_count(&self, submission: SubmissionId) -> Result<i64, RepositoryError> {
        let conn = self.pool.get()?;

        let count = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE commented_on = ?1",
            params![submission.0],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    async fn add_upvote(
        &self,
        submission: SubmissionId,
        user: &UserId,
    ) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT OR IGNORE INTO upvotes (submission_id, user_id) VALUES (?1, ?2)",
            params![submission.0, user.as_str()],
        )?;

        Ok(())
    }

    async fn remove_upvote(
        &self,
        submission: SubmissionId,
        user: &UserId,
    ) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "DELETE FROM upvotes WHERE submission_id = ?1 AND user_id = ?2",
            params![submission.0, user.as_str()],
        )?;

        Ok(())
    }

    async fn upvote_count(&self, submission: SubmissionId) -> Result<i64, RepositoryError> {
        let conn = self.pool.get()?;

        let count = conn.query_row(
            "SELECT COUNT(*) FROM upvotes WHERE submission_id = ?1",
            params![submission.0],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    async fn has_upvoted(
        &self,
        submission: SubmissionId,
        user: &UserId,
    ) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;

        let found: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM upvotes WHERE submission_id = ?1 AND user_id = ?2",
            params![submission.0, user.as_str()],
            |row| row.get(0),
        )?;

        Ok(found)
    }
}

/// Type alias for Arc-wrapped repository (for AppState)
pub type DynLinkRepository = Arc<dyn LinkRepository>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_repo() -> (SqliteLinkRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = db::create_pool(&db_path, 4).unwrap();
        db::run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        for name in ["alice", "bob", "carol"] {
            conn.execute(
                "INSERT INTO users (id, username) VALUES (?1, ?1)",
                params![name],
            )
            .unwrap();
        }
        drop(conn);

        (SqliteLinkRepository::new(pool), temp_dir)
    }

    async fn submit(repo: &SqliteLinkRepository, title: &str) -> Submission {
        let new = NewSubmission::new(
            title,
            "https://example.com",
            UserId::new("alice"),
            Utc::now(),
        )
        .unwrap();
        repo.insert_submission(&new).await.unwrap()
    }

    async fn reply(
        repo: &SqliteLinkRepository,
        submission: &Submission,
        parent: Option<&Comment>,
        body: &str,
    ) -> Comment {
        let new = NewComment::new(body, UserId::new("bob"), submission, parent, Utc::now()).unwrap();
        repo.insert_comment(&new).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_load_submission() {
        let (repo, _temp) = create_test_repo();

        let saved = submit(&repo, "First").await;
        let loaded = repo.submission(saved.id).await.unwrap();

        // RFC 3339 keeps sub-second precision, so the round trip is exact
        assert_eq!(loaded, Some(saved));
        assert_eq!(repo.submission(SubmissionId(999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_upvote_is_idempotent() {
        let (repo, _temp) = create_test_repo();
        let s = submit(&repo, "Votes").await;
        let alice = UserId::new("alice");

        repo.add_upvote(s.id, &alice).await.unwrap();
        repo.add_upvote(s.id, &alice).await.unwrap();

        assert_eq!(repo.upvote_count(s.id).await.unwrap(), 1);
        assert!(repo.has_upvoted(s.id, &alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_absent_upvote_is_noop() {
        let (repo, _temp) = create_test_repo();
        let s = submit(&repo, "Votes").await;
        let bob = UserId::new("bob");

        repo.remove_upvote(s.id, &bob).await.unwrap();
        assert_eq!(repo.upvote_count(s.id).await.unwrap(), 0);

        repo.add_upvote(s.id, &bob).await.unwrap();
        repo.remove_upvote(s.id, &bob).await.unwrap();
        repo.remove_upvote(s.id, &bob).await.unwrap();
        assert_eq!(repo.upvote_count(s.id).await.unwrap(), 0);
        assert!(!repo.has_upvoted(s.id, &bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_root_comments_exclude_replies() {
        let (repo, _temp) = create_test_repo();
        let s = submit(&repo, "Thread").await;

        let c1 = reply(&repo, &s, None, "root").await;
        let c2 = reply(&repo, &s, Some(&c1), "reply").await;
        let c3 = reply(&repo, &s, None, "second root").await;

        let roots = repo.root_comments(s.id).await.unwrap();
        assert_eq!(roots, vec![c1.clone(), c3]);

        let replies = repo.replies(c1.id).await.unwrap();
        assert_eq!(replies, vec![c2.clone()]);
        assert!(repo.replies(c2.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_round_trip() {
        let (repo, _temp) = create_test_repo();
        let s = submit(&repo, "Thread").await;
        let root = reply(&repo, &s, None, "root").await;
        let child = reply(&repo, &s, Some(&root), "child").await;

        assert_eq!(repo.comment(child.id).await.unwrap(), Some(child));
        assert_eq!(repo.comment(CommentId(12345)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stats_count_comments_at_any_depth() {
        let (repo, _temp) = create_test_repo();
        let a = submit(&repo, "A").await;
        let b = submit(&repo, "B").await;

        let root = reply(&repo, &a, None, "root").await;
        let child = reply(&repo, &a, Some(&root), "child").await;
        reply(&repo, &a, Some(&child), "grandchild").await;

        repo.add_upvote(b.id, &UserId::new("alice")).await.unwrap();
        repo.add_upvote(b.id, &UserId::new("carol")).await.unwrap();

        let stats = repo.submission_stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].submission.id, a.id);
        assert_eq!((stats[0].upvotes, stats[0].comments), (0, 3));
        assert_eq!(stats[1].submission.id, b.id);
        assert_eq!((stats[1].upvotes, stats[1].comments), (2, 0));

        assert_eq!(repo.comment_count(a.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stats_on_empty_store() {
        let (repo, _temp) = create_test_repo();
        assert!(repo.submission_stats().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_timestamp_persists() {
        let (repo, _temp) = create_test_repo();
        let when = Utc::now() - Duration::days(3);
        let new = NewSubmission::new("Old", "http://example.org", UserId::new("carol"), when)
            .unwrap();
        let saved = repo.insert_submission(&new).await.unwrap();

        let loaded = repo.submission(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.submitted_on, when);
    }

    #[tokio::test]
    async fn test_upvote_requires_known_user() {
        let (repo, _temp) = create_test_repo();
        let s = submit(&repo, "FK").await;

        let result = repo.add_upvote(s.id, &UserId::new("ghost")).await;
        assert!(matches!(result, Err(RepositoryError::Sql(_))));
    }
}
