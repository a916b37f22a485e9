//! The event vocabulary published on `/events/bus`. Codes are fixed by the
//! upstream protocol. A condition is ended by publishing its code plus
//! [`OFF`].

/// Added to a code to signal the end of that condition.
pub const OFF: i32 = 32768;

/// Fixation cross shown
pub const FIXATION: i32 = 786;
/// CVSA bottom-left cue
pub const CUE_BL_CVSA: i32 = 730;
/// CVSA bottom-right cue
pub const CUE_BR_CVSA: i32 = 731;
/// Motor-imagery left hand cue
pub const CUE_LH_MI: i32 = 769;
/// Motor-imagery right hand cue
pub const CUE_RH_MI: i32 = 770;
/// Both hands cue, the left class of the hybrid paradigm
pub const CUE_BH: i32 = 771;
/// Both feet cue, the right class of the hybrid paradigm
pub const CUE_BF: i32 = 773;
/// Continuous feedback start
pub const CF: i32 = 781;
/// Rest cue
pub const REST: i32 = 783;
/// Trial hit
pub const HIT: i32 = 897;
/// Trial miss
pub const MISS: i32 = 898;
/// Trial timeout
pub const TIMEOUT: i32 = 899;

/// Which class a cue asks the user to attend to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueClass {
    /// Left hand, bottom-left target, or both hands
    Left,
    /// Right hand, bottom-right target, or both feet
    Right,
    /// No task
    Rest,
}

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The decoder reached the cued class
    Hit,
    /// The decoder reached the other class
    Miss,
    /// Neither class was reached in time
    Timeout,
}

/// What a raw event code means for the feedback front-end.
///
/// Several codes map to the same kind: the three paradigms each have their
/// own left and right cue codes, but they all route to the same handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Show the fixation cross
    FixationStart,
    /// Hide the fixation cross
    FixationEnd,
    /// Show the centre point and play the cue for a class
    Cue(CueClass),
    /// Continuous feedback period begins
    FeedbackStart,
    /// Continuous feedback period ends
    FeedbackEnd,
    /// Colour the outcome indicator
    Outcome(Outcome),
    /// Hide the indicator and reset the scene for the next trial
    OutcomeEnd(Outcome),
    /// Anything this front-end does not react to
    Ignored,
}

impl EventKind {
    /// Classifies a raw code. Total over `i32`: unknown codes, and offsets of
    /// codes that have no end semantics (cues, rest), are [`EventKind::Ignored`].
    pub fn from_code(code: i32) -> Self {
        use EventKind as EK;
        match code {
            FIXATION => EK::FixationStart,
            c if c == OFF + FIXATION => EK::FixationEnd,
            CUE_LH_MI | CUE_BL_CVSA | CUE_BH => EK::Cue(CueClass::Left),
            CUE_RH_MI | CUE_BR_CVSA | CUE_BF => EK::Cue(CueClass::Right),
            REST => EK::Cue(CueClass::Rest),
            CF => EK::FeedbackStart,
            c if c == OFF + CF => EK::FeedbackEnd,
            HIT => EK::Outcome(Outcome::Hit),
            MISS => EK::Outcome(Outcome::Miss),
            TIMEOUT => EK::Outcome(Outcome::Timeout),
            c if c == OFF + HIT => EK::OutcomeEnd(Outcome::Hit),
            c if c == OFF + MISS => EK::OutcomeEnd(Outcome::Miss),
            c if c == OFF + TIMEOUT => EK::OutcomeEnd(Outcome::Timeout),
            _ => EK::Ignored,
        }
    }
}

impl From<i32> for EventKind {
    fn from(code: i32) -> Self {
        EventKind::from_code(code)
    }
}

impl Outcome {
    /// The code that announces this outcome.
    pub fn code(self) -> i32 {
        match self {
            Outcome::Hit => HIT,
            Outcome::Miss => MISS,
            Outcome::Timeout => TIMEOUT,
        }
    }
}
