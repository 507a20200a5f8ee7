//! The compiled action tree of a macro.
//!
//! A macro's actions are stored in a flat arena: every action list (the root
//! list and each `repeat` body) occupies a contiguous run of nodes, and a
//! `repeat` node refers to its body by [`ActionSpan`]. Text of `type` actions
//! lives in one shared string pool. The tree is built once at load time by
//! [`ActionTree::compile`] and never changes afterwards.
use core::fmt;

use heapless::{String, Vec};

use crate::keycode::{HidKeyCode, KeySet};
use crate::mouse_button::MouseButton;
use crate::{MAX_ACTIONS, MAX_NESTING, MAX_TEXT_LEN};

/// A contiguous run of nodes in an [`ActionTree`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActionSpan {
    pub start: u16,
    pub len: u16,
}

/// Byte range of a `type` action's text in the tree's string pool
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextSpan {
    start: u16,
    len: u16,
}

/// Delay applied after a leaf action, or once after the last pass of a `repeat`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PostWait {
    #[default]
    None,
    Fixed(u32),
    /// Uniform in `[min_ms, max_ms]`, both inclusive
    Random { min_ms: u32, max_ms: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Press all keys in order, then release them in reverse order
    PressCombo(KeySet),
    PressDown(KeySet),
    PressUp(KeySet),
    TypeText(TextSpan),
    Wait { ms: u32 },
    WaitRandom { min_ms: u32, max_ms: u32 },
    MouseClick(MouseButton),
    MouseMove { dx: i16, dy: i16 },
    MouseScroll { amount: i8 },
    /// Run `body` `count` times
    Repeat { count: u32, body: ActionSpan },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActionNode {
    pub action: Action,
    pub post_wait: PostWait,
}

impl ActionNode {
    const PLACEHOLDER: Self = Self {
        action: Action::Wait { ms: 0 },
        post_wait: PostWait::None,
    };
}

/// Reasons an action list cannot be compiled
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TreeError {
    /// The root action list is empty
    Empty,
    TooManyActions,
    TooDeep,
    ZeroRepeat,
    EmptyKeys,
    TooManyKeys,
    TextTooLong,
    InvalidRange { min_ms: u32, max_ms: u32 },
    /// `post_wait` given on `wait` or `wait_random`
    PostWaitNotAllowed,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Empty => write!(f, "macro has no actions"),
            TreeError::TooManyActions => write!(f, "more than {} actions", MAX_ACTIONS),
            TreeError::TooDeep => write!(f, "repeat nested deeper than {} levels", MAX_NESTING),
            TreeError::ZeroRepeat => write!(f, "repeat count must be at least 1"),
            TreeError::EmptyKeys => write!(f, "press action without keys"),
            TreeError::TooManyKeys => write!(f, "too many keys in one action"),
            TreeError::TextTooLong => write!(f, "more than {} bytes of text", MAX_TEXT_LEN),
            TreeError::InvalidRange { min_ms, max_ms } => {
                write!(f, "random wait min {} is greater than max {}", min_ms, max_ms)
            }
            TreeError::PostWaitNotAllowed => write!(f, "wait and wait_random take no post wait"),
        }
    }
}

/// Where a node sits while a tree is compiled
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodePosition {
    /// Index in its own list
    pub index: usize,
    /// 0 for the root list, n for the body of the n-th nested repeat
    pub depth: usize,
}

/// A leaf action as produced by an [`ActionSource`], text still borrowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf<'t> {
    PressCombo(KeySet),
    PressDown(KeySet),
    PressUp(KeySet),
    TypeText(&'t str),
    Wait { ms: u32 },
    WaitRandom { min_ms: u32, max_ms: u32 },
    MouseClick(MouseButton),
    MouseMove { dx: i16, dy: i16 },
    MouseScroll { amount: i8 },
}

/// One source node lowered for the tree builder
pub enum Lowered<'t, S> {
    Leaf { action: Leaf<'t>, post_wait: PostWait },
    Repeat { count: u32, post_wait: PostWait, body: &'t [S] },
}

/// Anything that can be compiled into an [`ActionTree`].
///
/// Implemented by the profile parser's raw actions and by [`ActionStep`].
pub trait ActionSource: Sized {
    type Error: From<TreeError>;

    fn lower(&self, position: NodePosition) -> Result<Lowered<'_, Self>, Self::Error>;
}

/// Immutable, compiled action tree of one macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTree {
    nodes: Vec<ActionNode, MAX_ACTIONS>,
    text: String<MAX_TEXT_LEN>,
    root: ActionSpan,
    nesting: u8,
}

impl ActionTree {
    /// Compile and validate a root action list
    pub fn compile<S: ActionSource>(root: &[S]) -> Result<Self, S::Error> {
        if root.is_empty() {
            return Err(TreeError::Empty.into());
        }
        let mut tree = Self {
            nodes: Vec::new(),
            text: String::new(),
            root: ActionSpan::default(),
            nesting: 0,
        };
        tree.root = tree.compile_list(root, 0)?;
        Ok(tree)
    }

    fn compile_list<S: ActionSource>(&mut self, list: &[S], depth: usize) -> Result<ActionSpan, S::Error> {
        if depth > MAX_NESTING {
            return Err(TreeError::TooDeep.into());
        }
        // Reserve the whole list first so that its nodes stay contiguous
        let start = self.nodes.len();
        for _ in list {
            self.nodes
                .push(ActionNode::PLACEHOLDER)
                .map_err(|_| TreeError::TooManyActions)?;
        }
        for (index, source) in list.iter().enumerate() {
            let node = match source.lower(NodePosition { index, depth })? {
                Lowered::Leaf { action, post_wait } => {
                    if matches!(action, Leaf::Wait { .. } | Leaf::WaitRandom { .. }) && post_wait != PostWait::None {
                        return Err(TreeError::PostWaitNotAllowed.into());
                    }
                    if let PostWait::Random { min_ms, max_ms } = post_wait {
                        check_range(min_ms, max_ms)?;
                    }
                    ActionNode {
                        action: self.push_leaf(action)?,
                        post_wait,
                    }
                }
                Lowered::Repeat { count, post_wait, body } => {
                    if count == 0 {
                        return Err(TreeError::ZeroRepeat.into());
                    }
                    if let PostWait::Random { min_ms, max_ms } = post_wait {
                        check_range(min_ms, max_ms)?;
                    }
                    let body = self.compile_list(body, depth + 1)?;
                    ActionNode {
                        action: Action::Repeat { count, body },
                        post_wait,
                    }
                }
            };
            self.nodes[start + index] = node;
        }
        self.nesting = self.nesting.max(depth as u8);
        Ok(ActionSpan {
            start: start as u16,
            len: list.len() as u16,
        })
    }

    fn push_leaf(&mut self, leaf: Leaf<'_>) -> Result<Action, TreeError> {
        let action = match leaf {
            Leaf::PressCombo(keys) => Action::PressCombo(non_empty(keys)?),
            Leaf::PressDown(keys) => Action::PressDown(non_empty(keys)?),
            Leaf::PressUp(keys) => Action::PressUp(non_empty(keys)?),
            Leaf::TypeText(text) => {
                let start = self.text.len();
                self.text.push_str(text).map_err(|_| TreeError::TextTooLong)?;
                Action::TypeText(TextSpan {
                    start: start as u16,
                    len: text.len() as u16,
                })
            }
            Leaf::Wait { ms } => Action::Wait { ms },
            Leaf::WaitRandom { min_ms, max_ms } => {
                check_range(min_ms, max_ms)?;
                Action::WaitRandom { min_ms, max_ms }
            }
            Leaf::MouseClick(button) => Action::MouseClick(button),
            Leaf::MouseMove { dx, dy } => Action::MouseMove { dx, dy },
            Leaf::MouseScroll { amount } => Action::MouseScroll { amount },
        };
        Ok(action)
    }

    /// The root action list
    pub fn root(&self) -> ActionSpan {
        self.root
    }

    /// Nodes of a list, empty if the span is out of range
    pub fn list(&self, span: ActionSpan) -> &[ActionNode] {
        let start = span.start as usize;
        self.nodes.get(start..start + span.len as usize).unwrap_or(&[])
    }

    pub fn text(&self, span: TextSpan) -> &str {
        let start = span.start as usize;
        self.text.get(start..start + span.len as usize).unwrap_or("")
    }

    /// Total number of nodes, nested ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest repeat nesting in this tree, 0 when there is no repeat
    pub fn nesting(&self) -> usize {
        self.nesting as usize
    }
}

fn non_empty(keys: KeySet) -> Result<KeySet, TreeError> {
    if keys.is_empty() { Err(TreeError::EmptyKeys) } else { Ok(keys) }
}

fn check_range(min_ms: u32, max_ms: u32) -> Result<(), TreeError> {
    if min_ms > max_ms {
        Err(TreeError::InvalidRange { min_ms, max_ms })
    } else {
        Ok(())
    }
}

/// Borrowed action description, used to build trees in code
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionSpec<'a> {
    PressCombo(&'a [HidKeyCode]),
    PressDown(&'a [HidKeyCode]),
    PressUp(&'a [HidKeyCode]),
    TypeText(&'a str),
    Wait(u32),
    WaitRandom(u32, u32),
    MouseClick(MouseButton),
    MouseMove(i16, i16),
    MouseScroll(i8),
    Repeat(u32, &'a [ActionStep<'a>]),
}

/// An [`ActionSpec`] with its post wait
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActionStep<'a> {
    pub spec: ActionSpec<'a>,
    pub post_wait: PostWait,
}

impl<'a> ActionStep<'a> {
    pub const fn new(spec: ActionSpec<'a>) -> Self {
        Self {
            spec,
            post_wait: PostWait::None,
        }
    }

    pub const fn wait(mut self, ms: u32) -> Self {
        self.post_wait = PostWait::Fixed(ms);
        self
    }

    pub const fn wait_random(mut self, min_ms: u32, max_ms: u32) -> Self {
        self.post_wait = PostWait::Random { min_ms, max_ms };
        self
    }
}

impl ActionSource for ActionStep<'_> {
    type Error = TreeError;

    fn lower(&self, _position: NodePosition) -> Result<Lowered<'_, Self>, TreeError> {
        let keys = |keys: &[HidKeyCode]| KeySet::from_slice(keys).map_err(|_| TreeError::TooManyKeys);
        let action = match self.spec {
            ActionSpec::Repeat(count, body) => {
                return Ok(Lowered::Repeat {
                    count,
                    post_wait: self.post_wait,
                    body,
                });
            }
            ActionSpec::PressCombo(k) => Leaf::PressCombo(keys(k)?),
            ActionSpec::PressDown(k) => Leaf::PressDown(keys(k)?),
            ActionSpec::PressUp(k) => Leaf::PressUp(keys(k)?),
            ActionSpec::TypeText(text) => Leaf::TypeText(text),
            ActionSpec::Wait(ms) => Leaf::Wait { ms },
            ActionSpec::WaitRandom(min_ms, max_ms) => Leaf::WaitRandom { min_ms, max_ms },
            ActionSpec::MouseClick(button) => Leaf::MouseClick(button),
            ActionSpec::MouseMove(dx, dy) => Leaf::MouseMove { dx, dy },
            ActionSpec::MouseScroll(amount) => Leaf::MouseScroll { amount },
        };
        Ok(Lowered::Leaf {
            action,
            post_wait: self.post_wait,
        })
    }
}
