pub mod board;
pub mod domain;
pub mod repository;

pub use board::{Board, BoardError, BoardResult, SubmissionDetail};
pub use domain::{
    Comment, CommentId, NewComment, NewSubmission, RankedSubmission, Submission, SubmissionId,
    SubmissionStats, UserId, ValidationError,
};
pub use repository::{DynLinkRepository, LinkRepository, RepositoryError, SqliteLinkRepository};
