//! Action executor.
//!
//! Walks a macro's [`ActionTree`] one leaf per call. Nested `repeat` nodes are
//! tracked with an explicit stack of frames whose capacity is the static
//! nesting limit, so the executor never recurses and its memory does not grow
//! with the number of repetitions.
use embassy_time::Instant;
use heapless::Vec;
use padmacro_types::MAX_NESTING;
use padmacro_types::action::{Action, ActionNode, ActionSpan, ActionTree, PostWait};
use padmacro_types::keycode::HidKeyCode;
use rand::Rng;
use rand_core::RngCore;

use crate::MAX_HELD_KEYS;
use crate::output::MacroOutput;
use crate::timer::Deadline;

/// Keys pressed by `press_down` and not released yet
pub type HeldKeys = Vec<HidKeyCode, MAX_HELD_KEYS>;

/// Progress in one action list
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub list: ActionSpan,
    /// Index of the next node to run
    pub next: u16,
    /// Passes left over this list, the current one included
    pub remaining: u32,
    /// Delay once the last pass is done
    pub post_wait: PostWait,
}

/// Execution position inside an action tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    frames: Vec<Frame, { MAX_NESTING + 1 }>,
}

impl Cursor {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Point the cursor at the first node of the root list
    pub fn reset(&mut self, root: ActionSpan) {
        self.frames.clear();
        // The stack is empty, so this push can't fail
        let _ = self.frames.push(Frame {
            list: root,
            next: 0,
            remaining: 1,
            post_wait: PostWait::None,
        });
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from the root list to the innermost repeat body
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Runtime state the executor owns for one macro instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecState {
    pub cursor: Cursor,
    pub held_keys: HeldKeys,
    /// The cursor may not advance before this
    pub action_deadline: Deadline,
}

impl ExecState {
    pub const fn new() -> Self {
        Self {
            cursor: Cursor::new(),
            held_keys: Vec::new(),
            action_deadline: Deadline::none(),
        }
    }

    /// Start a fresh pass at the first node of the root list
    pub fn rewind(&mut self, root: ActionSpan) {
        self.cursor.reset(root);
        self.action_deadline.clear();
    }

    /// Release all held keys and forget the position
    pub fn stop<O: MacroOutput>(&mut self, output: &mut O) {
        release_held(&mut self.held_keys, output);
        self.cursor.clear();
        self.action_deadline.clear();
    }
}

/// Result of one [`Executor::advance`] call
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// The action deadline is still pending
    Idle,
    /// One node ran, a delay may be pending
    Progressed,
    /// The cursor ran off the end of the root list
    Finished,
}

pub struct Executor<'a, O: MacroOutput, R: RngCore> {
    output: &'a mut O,
    rng: &'a mut R,
}

impl<'a, O: MacroOutput, R: RngCore> Executor<'a, O, R> {
    pub fn new(output: &'a mut O, rng: &'a mut R) -> Self {
        Self { output, rng }
    }

    /// Run the next node of `tree` if the action deadline allows it
    pub fn advance(&mut self, tree: &ActionTree, state: &mut ExecState, now: Instant) -> Step {
        if state.action_deadline.is_pending(now) {
            return Step::Idle;
        }
        state.action_deadline.clear();

        loop {
            let Some(frame) = state.cursor.frames.last_mut() else {
                return Step::Finished;
            };
            let list = tree.list(frame.list);

            if frame.next as usize >= list.len() {
                // An empty body would spin here once per remaining pass
                if frame.remaining > 1 && !list.is_empty() {
                    frame.remaining -= 1;
                    frame.next = 0;
                } else {
                    let post_wait = frame.post_wait;
                    state.cursor.frames.pop();
                    if state.cursor.frames.is_empty() {
                        return Step::Finished;
                    }
                    let delay = self.delay(post_wait);
                    if delay > 0 {
                        state.action_deadline.after(now, delay as u64);
                        return Step::Progressed;
                    }
                }
                continue;
            }

            let node = &list[frame.next as usize];
            frame.next += 1;

            if let Action::Repeat { count, body } = node.action {
                let frame = Frame {
                    list: body,
                    next: 0,
                    remaining: count,
                    post_wait: node.post_wait,
                };
                if state.cursor.frames.push(frame).is_err() {
                    error!("Repeat nesting exceeds the cursor depth, skipping the body");
                }
                return Step::Progressed;
            }

            let delay = self.run_leaf(tree, node, &mut state.held_keys);
            if delay > 0 {
                state.action_deadline.after(now, delay as u64);
            }
            return Step::Progressed;
        }
    }

    /// Emit a leaf's output and return the delay that follows it
    fn run_leaf(&mut self, tree: &ActionTree, node: &ActionNode, held: &mut HeldKeys) -> u32 {
        match &node.action {
            Action::PressCombo(keys) => {
                for key in keys.iter() {
                    self.output.press(*key);
                }
                for key in keys.iter().rev() {
                    self.output.release(*key);
                }
            }
            Action::PressDown(keys) => {
                for key in keys.iter() {
                    if held.contains(key) {
                        continue;
                    }
                    if held.push(*key).is_err() {
                        warn!("Too many held keys, not pressing {:?}", key);
                        continue;
                    }
                    self.output.press(*key);
                }
            }
            Action::PressUp(keys) => {
                for key in keys.iter() {
                    if let Some(pos) = held.iter().position(|k| k == key) {
                        held.remove(pos);
                        self.output.release(*key);
                    }
                }
            }
            Action::TypeText(span) => {
                for c in tree.text(*span).chars() {
                    self.output.type_char(c);
                }
            }
            Action::Wait { ms } => return *ms,
            Action::WaitRandom { min_ms, max_ms } => return uniform(&mut *self.rng, *min_ms, *max_ms),
            Action::MouseClick(button) => self.output.mouse_click(*button),
            Action::MouseMove { dx, dy } => self.output.mouse_move(*dx, *dy),
            Action::MouseScroll { amount } => self.output.mouse_scroll(*amount),
            Action::Repeat { .. } => {}
        }

        self.delay(node.post_wait)
    }

    fn delay(&mut self, post_wait: PostWait) -> u32 {
        match post_wait {
            PostWait::None => 0,
            PostWait::Fixed(ms) => ms,
            PostWait::Random { min_ms, max_ms } => uniform(&mut *self.rng, min_ms, max_ms),
        }
    }
}

/// Release held keys, last pressed first
pub fn release_held<O: MacroOutput>(held: &mut HeldKeys, output: &mut O) {
    while let Some(key) = held.pop() {
        output.release(key);
    }
}

/// Uniform draw from `[min_ms, max_ms]`, both inclusive
pub fn uniform<R: RngCore>(rng: &mut R, min_ms: u32, max_ms: u32) -> u32 {
    if min_ms >= max_ms {
        return min_ms;
    }
    rng.gen_range(min_ms..=max_ms)
}
