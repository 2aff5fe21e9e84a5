use super::Step;
use crate::jvm::code::{Cursor, InsnNode, Instruction, InstructionList};
use crate::jvm::Error;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_MATCHER_TOKEN: AtomicUsize = AtomicUsize::new(0);

/// Reference to a step of a particular matcher
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StepHandle {
    matcher: usize,
    index: usize,
}

impl StepHandle {
    /// Position of the step in its matcher
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatcherState {
    /// Steps can be added, nothing is captured
    Idle,

    /// A scan is in progress
    Scanning,

    /// Every step captured an instruction, rewrites can be queued
    Matched,

    /// The last scan did not find a match
    Exhausted,

    /// Queued rewrites have been committed
    Replaced,
}

/// Rewrite queued for one step's captured instruction
#[derive(Clone, Debug)]
enum Action {
    Replace(Instruction),
    Remove,
}

/// Matches a fixed sequence of steps against an instruction list and rewrites the matches
///
/// A matcher is reusable across scans (and lists) by calling [`Self::reset`] in between.
pub struct InstructionMatcher<'a> {
    token: usize,
    steps: Vec<Box<dyn Step + 'a>>,
    state: MatcherState,

    /// Position of the first captured instruction
    span_start: usize,

    /// Captured instructions, in step order
    captures: Vec<InsnNode>,

    /// Pending rewrite for each step
    actions: Vec<Option<Action>>,

    /// Instructions to insert after the span once it is committed
    ending_inserts: Vec<Instruction>,

    /// Instructions deleted by the last commit
    removed: usize,
}

impl<'a> InstructionMatcher<'a> {
    pub fn new() -> InstructionMatcher<'a> {
        InstructionMatcher {
            token: NEXT_MATCHER_TOKEN.fetch_add(1, Ordering::Relaxed),
            steps: vec![],
            state: MatcherState::Idle,
            span_start: 0,
            captures: vec![],
            actions: vec![],
            ending_inserts: vec![],
            removed: 0,
        }
    }

    /// Matcher with the given steps, in order
    pub fn with_steps(
        steps: impl IntoIterator<Item = Box<dyn Step + 'a>>,
    ) -> InstructionMatcher<'a> {
        let mut matcher = InstructionMatcher::new();
        matcher.steps.extend(steps);
        matcher
    }

    /// Append a step (only allowed while idle)
    pub fn add_step(&mut self, step: impl Step + 'a) -> Result<StepHandle, Error> {
        if self.state != MatcherState::Idle {
            return Err(Error::NotIdle);
        }
        self.steps.push(Box::new(step));
        Ok(StepHandle {
            matcher: self.token,
            index: self.steps.len() - 1,
        })
    }

    /// Handle to the step at an index
    pub fn step(&self, index: usize) -> Option<StepHandle> {
        if index < self.steps.len() {
            Some(StepHandle {
                matcher: self.token,
                index,
            })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn state(&self) -> MatcherState {
        self.state
    }

    /// Forget captures and queued rewrites, making the matcher idle again
    pub fn reset(&mut self) {
        self.captures.clear();
        self.actions.clear();
        self.ending_inserts.clear();
        self.span_start = 0;
        self.removed = 0;
        self.state = MatcherState::Idle;
    }

    /// Try to match all steps starting exactly at the cursor
    ///
    /// The cursor is moved past every instruction that was tested.
    pub fn match_first(&mut self, cursor: &mut Cursor<'_>) -> Result<bool, Error> {
        self.begin_scan()?;
        let matched = self.attempt(cursor);
        self.end_scan(matched);
        Ok(matched)
    }

    /// Find the first match at or after the cursor
    ///
    /// On a match, the cursor is left just past the matched span. Otherwise, it is left at the
    /// end of the list.
    pub fn find(&mut self, cursor: &mut Cursor<'_>) -> Result<bool, Error> {
        self.begin_scan()?;
        let matched = loop {
            let start = cursor.position();
            if !cursor.has_next() {
                break false;
            }
            if self.attempt(cursor) {
                break true;
            }
            cursor.seek(start + 1);
        };
        self.end_scan(matched);
        Ok(matched)
    }

    fn begin_scan(&mut self) -> Result<(), Error> {
        if self.steps.is_empty() {
            return Err(Error::NoSteps);
        }
        match self.state {
            MatcherState::Matched | MatcherState::Replaced => Err(Error::NotReset),
            MatcherState::Idle | MatcherState::Scanning | MatcherState::Exhausted => {
                self.captures.clear();
                self.state = MatcherState::Scanning;
                Ok(())
            }
        }
    }

    /// Single attempt at the cursor position
    fn attempt(&mut self, cursor: &mut Cursor<'_>) -> bool {
        let start = cursor.position();
        self.captures.clear();
        for step in &self.steps {
            let matched = match cursor.advance() {
                Some(node) if step.test(node) => {
                    self.captures.push(node.clone());
                    true
                }
                _ => false,
            };
            if !matched {
                self.captures.clear();
                return false;
            }
        }
        self.span_start = start;
        true
    }

    fn end_scan(&mut self, matched: bool) {
        if matched {
            self.actions = self.steps.iter().map(|_| None).collect();
            self.state = MatcherState::Matched;
        } else {
            self.state = MatcherState::Exhausted;
        }
    }

    /// Instruction captured by a step of the current match
    pub fn captured(&self, step: StepHandle) -> Option<&Instruction> {
        if step.matcher != self.token {
            return None;
        }
        self.captures.get(step.index).map(|node| &node.insn)
    }

    /// Captured instructions (with their identities), in step order
    pub fn captures(&self) -> &[InsnNode] {
        &self.captures
    }

    /// Positions of the matched instructions, as they were when matched
    pub fn span(&self) -> Option<Range<usize>> {
        match self.state {
            MatcherState::Matched | MatcherState::Replaced => {
                Some(self.span_start..self.span_start + self.captures.len())
            }
            _ => None,
        }
    }

    /// Queue replacing the instruction captured by a step (`None` removes it)
    pub fn add_replacement(
        &mut self,
        step: StepHandle,
        replacement: Option<Instruction>,
    ) -> Result<(), Error> {
        if step.matcher != self.token {
            self.check_matched()?;
            return Err(Error::UnknownStep(step.index));
        }
        self.queue(step.index, replacement)
    }

    /// Queue removing the instruction captured by a step
    pub fn add_removal(&mut self, step: StepHandle) -> Result<(), Error> {
        self.add_replacement(step, None)
    }

    /// Queue replacing the instruction captured by the step at an index
    pub fn set_replacement(&mut self, index: usize, replacement: Instruction) -> Result<(), Error> {
        self.queue(index, Some(replacement))
    }

    /// Queue removing the instruction captured by the step at an index
    pub fn set_removal(&mut self, index: usize) -> Result<(), Error> {
        self.queue(index, None)
    }

    /// Queue removing every captured instruction
    pub fn set_remove_all(&mut self) -> Result<(), Error> {
        self.check_matched()?;
        for action in &mut self.actions {
            *action = Some(Action::Remove);
        }
        Ok(())
    }

    /// Queue an instruction to insert after the span when it is committed
    pub fn add_ending_insert(&mut self, insn: Instruction) {
        self.ending_inserts.push(insn);
    }

    fn check_matched(&self) -> Result<(), Error> {
        if self.state == MatcherState::Matched {
            Ok(())
        } else {
            Err(Error::NotMatched)
        }
    }

    fn queue(&mut self, index: usize, replacement: Option<Instruction>) -> Result<(), Error> {
        self.check_matched()?;
        let action = self
            .actions
            .get_mut(index)
            .ok_or(Error::UnknownStep(index))?;
        *action = Some(match replacement {
            Some(insn) => Action::Replace(insn),
            None => Action::Remove,
        });
        Ok(())
    }

    /// Apply the queued rewrites to the matched span
    ///
    /// The cursor must still be just past the span, and the span must still hold exactly the
    /// captured instructions. Afterwards, the cursor is left past the rewritten span and any
    /// ending inserts.
    ///
    /// Returns whether the list changed: always when there are ending inserts, otherwise when
    /// some step had a replacement or removal.
    pub fn replace(&mut self, cursor: &mut Cursor<'_>) -> Result<bool, Error> {
        self.check_matched()?;

        let end = self.span_start + self.captures.len();
        if cursor.position() != end {
            return Err(Error::CursorMoved {
                expected: end,
                found: cursor.position(),
            });
        }
        for (offset, captured) in self.captures.iter().enumerate() {
            let found = cursor.list().get(self.span_start + offset).map(|node| node.id);
            if found != Some(captured.id) {
                return Err(Error::CaptureMismatch {
                    expected: captured.id,
                    found,
                });
            }
        }

        cursor.seek(self.span_start);
        let mut changed = false;
        let mut removed = 0;
        for action in &mut self.actions {
            match action.take() {
                None => {
                    cursor.advance();
                }
                Some(Action::Replace(insn)) => {
                    cursor.set(insn);
                    cursor.advance();
                    changed = true;
                }
                Some(Action::Remove) => {
                    cursor.remove();
                    removed += 1;
                    changed = true;
                }
            }
        }

        let inserted = !self.ending_inserts.is_empty();
        for insn in self.ending_inserts.drain(..) {
            cursor.insert(insn);
        }

        log::trace!(
            "Committed match at {} ({} removed, changed: {}, inserted: {})",
            self.span_start,
            removed,
            changed,
            inserted
        );
        self.removed = removed;
        self.state = MatcherState::Replaced;
        Ok(inserted || changed)
    }

    /// Number of instructions deleted by the last commit
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl<'a> Default for InstructionMatcher<'a> {
    fn default() -> InstructionMatcher<'a> {
        InstructionMatcher::new()
    }
}

/// Remove every match of the matcher from the list, returning how many spans were removed
///
/// The list is scanned once from the start, and scanning resumes right where the previous match
/// was removed, so matches never overlap. The matcher is reset between matches and left idle.
pub fn remove_all_matches(
    matcher: &mut InstructionMatcher<'_>,
    list: &mut InstructionList,
) -> Result<usize, Error> {
    matcher.reset();
    let mut cursor = list.cursor();
    let mut count = 0;
    while matcher.find(&mut cursor)? {
        matcher.set_remove_all()?;
        matcher.replace(&mut cursor)?;
        if matcher.removed() == 0 {
            matcher.reset();
            return Err(Error::NothingRemoved);
        }
        count += 1;
        matcher.reset();
    }
    matcher.reset();
    Ok(count)
}
