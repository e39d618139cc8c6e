//! Transition table: what each trigger does, step by step.

/// An external change the table reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A column filter (or the global search, `None`) changed.
    FilterChanged(Option<String>),
    /// The sort on a column changed.
    SortChanged(String),
    /// The current page changed.
    PageChanged,
    /// The page size changed.
    PageSizeChanged,
    /// The local rows were replaced, or a server refresh was asked for.
    RowsReplaced,
    /// The body scrolled.
    Scrolled,
}

/// One unit of work executed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    ResetPage,
    ClearSelection,
    ClearPageCache,
    /// Filter, sort and count the local rows.
    Recompute,
    /// Fetch the current window under a new generation, replacing the
    /// server rows.
    RequestFetch,
    /// Fetch pages under the viewport not fetched yet.
    FetchVisiblePages,
    ResetScroll,
    ScrollToPage,
    /// Follow the scroll position with the pager.
    SyncPageFromScroll,
    ChunkRows { reset: bool },
    EmitFilter(Option<String>),
    EmitSort(String),
    EmitPage,
    EmitScroll,
}

/// The table configuration the transitions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub client_side: bool,
    pub virtual_scroll: bool,
}

impl Mode {
    /// Steps that rebuild the row set after filter, sort or page size
    /// changed.
    fn reload(self) -> Vec<Step> {
        let mut steps = vec![Step::ResetPage, Step::ClearSelection, Step::ClearPageCache];
        if self.virtual_scroll {
            steps.push(Step::ResetScroll);
        }
        steps.push(if self.client_side {
            Step::Recompute
        } else {
            Step::RequestFetch
        });
        steps.push(Step::ChunkRows { reset: true });
        steps
    }
}

/// Looks up the steps for `trigger` in `mode`.
pub fn steps(trigger: &Trigger, mode: Mode) -> Vec<Step> {
    match trigger {
        Trigger::FilterChanged(column) => {
            let mut steps = mode.reload();
            steps.push(Step::EmitFilter(column.clone()));
            steps
        }
        Trigger::SortChanged(column) => {
            let mut steps = mode.reload();
            steps.push(Step::EmitSort(column.clone()));
            steps
        }
        Trigger::PageSizeChanged => {
            let mut steps = mode.reload();
            steps.push(Step::EmitPage);
            steps
        }
        Trigger::PageChanged => {
            let mut steps = vec![Step::ClearSelection];
            match (mode.virtual_scroll, mode.client_side) {
                (true, true) => steps.push(Step::ScrollToPage),
                (true, false) => steps.extend([Step::ScrollToPage, Step::FetchVisiblePages]),
                (false, true) => {}
                (false, false) => steps.push(Step::RequestFetch),
            }
            steps.extend([Step::ChunkRows { reset: true }, Step::EmitPage]);
            steps
        }
        Trigger::RowsReplaced => {
            let mut steps = vec![Step::ClearSelection, Step::ClearPageCache];
            steps.push(if mode.client_side {
                Step::Recompute
            } else {
                Step::RequestFetch
            });
            steps.push(Step::ChunkRows { reset: true });
            steps
        }
        Trigger::Scrolled if mode.virtual_scroll => {
            let mut steps = vec![Step::SyncPageFromScroll, Step::ChunkRows { reset: false }];
            if !mode.client_side {
                steps.push(Step::FetchVisiblePages);
            }
            steps.push(Step::EmitScroll);
            steps
        }
        Trigger::Scrolled => vec![Step::EmitScroll],
    }
}
