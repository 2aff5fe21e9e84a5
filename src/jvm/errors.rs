use super::code::InsnId;
use super::BinaryName;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A name failed validation
    #[error("malformed name: {0}")]
    MalformedName(String),

    /// A field or method descriptor failed to parse
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// Member resolution or reference indexing was attempted before the inheritance edges were
    /// built (or after a registration made them stale)
    #[error("class pool has not been linked since it was last modified")]
    GraphNotLinked,

    /// Superclass or superinterface declarations loop back onto themselves
    #[error("cyclic inheritance involving '{0}'")]
    CyclicInheritance(BinaryName),

    /// Scanning was attempted with a matcher that has no steps
    #[error("instruction matching requires at least 1 step")]
    NoSteps,

    /// Steps can only be added to an idle matcher
    #[error("reset the matcher before adding steps to it")]
    NotIdle,

    /// The matcher still holds the result of a previous match
    #[error("reset the matcher before scanning again")]
    NotReset,

    /// Pending actions can only be queued (or committed) after a successful match
    #[error("the matcher has not matched anything")]
    NotMatched,

    /// A step handle or step index that does not belong to the matcher
    #[error("unknown step {0}")]
    UnknownStep(usize),

    /// The instruction at a matched position is not the one that was captured
    #[error("expected captured instruction {expected:?} but found {found:?}")]
    CaptureMismatch {
        expected: InsnId,
        found: Option<InsnId>,
    },

    /// The cursor is no longer positioned at the end of the matched span
    #[error("cursor at {found} is not positioned after the matched span (ending at {expected})")]
    CursorMoved { expected: usize, found: usize },

    /// A bulk removal commit did not remove anything
    #[error("failed to find any removals in the matched span")]
    NothingRemoved,
}
