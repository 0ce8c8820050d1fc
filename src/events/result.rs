use std::ops::AddAssign;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ProcessingResult {
    /// The processor had nothing to do for the context.
    #[default]
    Ignored,
    Success,
    Failure,
}

/// Folds the results of several processors: any failure wins, otherwise a single success
/// makes the whole a success.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ProcessingResultCombiner {
    result: ProcessingResult,
}

impl ProcessingResultCombiner {
    pub fn new() -> ProcessingResultCombiner {
        ProcessingResultCombiner::default()
    }

    pub fn add(&mut self, result: ProcessingResult) {
        self.result = match (self.result, result) {
            (ProcessingResult::Failure, _) | (_, ProcessingResult::Failure) => ProcessingResult::Failure,
            (ProcessingResult::Success, _) | (_, ProcessingResult::Success) => ProcessingResult::Success,
            _ => ProcessingResult::Ignored,
        };
    }

    pub fn result(&self) -> ProcessingResult {
        self.result
    }
}

impl AddAssign<ProcessingResult> for ProcessingResultCombiner {
    fn add_assign(&mut self, rhs: ProcessingResult) {
        self.add(rhs);
    }
}

impl FromIterator<ProcessingResult> for ProcessingResultCombiner {
    fn from_iter<T: IntoIterator<Item = ProcessingResult>>(iter: T) -> Self {
        let mut combiner = ProcessingResultCombiner::new();
        for result in iter {
            combiner += result;
        }
        combiner
    }
}
