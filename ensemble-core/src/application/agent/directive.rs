use crate::domain::calls::CallOutcome;
use crate::domain::history::TaskStatus;

/// What the loop does after one model round.
#[derive(Debug)]
pub enum TurnDirective {
    /// Feed call outcomes back under `tag` and run another round.
    Feedback {
        tag: &'static str,
        outcomes: Vec<CallOutcome>,
    },
    /// No `<response>` block; ask the model to fix its output.
    Correct,
    /// Terminal turn.
    Finish { response: String, status: TaskStatus },
}
